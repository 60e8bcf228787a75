use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, FormField};
use crate::tui::AppEvent;
use echo_core::{PanelCommand, PanelMessage, PanelState};

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key).await?,
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse).await,
        AppEvent::Resize(_, _) => {}
        // Redraw only, so "time ago" labels stay current
        AppEvent::Tick => {}
    }
    Ok(())
}

async fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Ok(());
    }

    match app.panel_state() {
        PanelState::Closed => handle_page(app, key).await,
        PanelState::OpenList => handle_list(app, key).await,
        PanelState::OpenForm(_) => handle_form(app, key).await,
    }
    Ok(())
}

async fn handle_page(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        KeyCode::Char('j') | KeyCode::Down => app.page.cursor_down(),
        KeyCode::Char('k') | KeyCode::Up => app.page.cursor_up(),
        KeyCode::Char('g') => app.page.cursor_first(),
        KeyCode::Char('G') => app.page.cursor_last(),

        KeyCode::Char('v') => app.page.toggle_selection(),
        KeyCode::Esc => app.page.anchor = None,

        // Send selection to the panel, like the "Save to Echo" menu item
        KeyCode::Char('s') => {
            let text = app.page.selected_text();
            app.page.anchor = None;
            app.send(PanelMessage::SaveSelectedText { text }).await;
        }
        KeyCode::Char('p') => app.send(PanelMessage::TogglePanel).await,

        _ => {}
    }
    app.page.follow_cursor(app.page_height);
}

async fn handle_list(app: &mut App, key: KeyEvent) {
    let command = match key.code {
        KeyCode::Esc => {
            close_panel(app);
            return;
        }
        KeyCode::Char('p') => {
            app.send(PanelMessage::TogglePanel).await;
            return;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.card_down();
            return;
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.card_up();
            return;
        }
        KeyCode::Char('n') => PanelCommand::RequestNew,
        KeyCode::Char('c') | KeyCode::Enter => match app.selected_card() {
            Some(index) => PanelCommand::Copy(index),
            None => return,
        },
        KeyCode::Char('d') | KeyCode::Delete => match app.selected_card() {
            Some(index) => PanelCommand::Delete(index),
            None => return,
        },
        _ => return,
    };
    dispatch(app, command).await;
}

async fn handle_form(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => close_panel(app),
        KeyCode::Char('s') if ctrl => {
            let Some(draft) = app.panel().and_then(|p| p.draft()).cloned() else {
                return;
            };
            dispatch(
                app,
                PanelCommand::SubmitForm {
                    description: draft.description,
                    text: draft.text,
                },
            )
            .await;
        }
        KeyCode::Char('g') if ctrl => dispatch(app, PanelCommand::Cancel).await,
        KeyCode::Tab | KeyCode::BackTab => app.next_field(),
        KeyCode::Enter => {
            if app.form_field == FormField::Description {
                app.next_field();
            } else if let Some(input) = app.focused_input() {
                input.push('\n');
            }
        }
        KeyCode::Backspace => {
            if let Some(input) = app.focused_input() {
                input.pop();
            }
        }
        KeyCode::Char(c) if !ctrl => {
            if let Some(input) = app.focused_input() {
                input.push(c);
            }
        }
        _ => {}
    }
}

async fn dispatch(app: &mut App, command: PanelCommand) {
    let result = match app.panel_mut() {
        Some(panel) => panel.dispatch(command).await,
        None => return,
    };
    app.report(result);
}

fn close_panel(app: &mut App) {
    if let Some(panel) = app.panel_mut() {
        panel.close();
    }
    app.sync_panel();
}

async fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let (x, y) = (mouse.column, mouse.row);
    let in_panel = app.panel_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let on_button = app.button_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if on_button {
                app.send(PanelMessage::TogglePanel).await;
            } else if app.is_panel_open() && !in_panel {
                close_panel(app);
            }
        }
        MouseEventKind::ScrollDown => {
            if in_panel && app.panel_state() == PanelState::OpenList {
                app.card_down();
            } else if !app.is_panel_open() {
                app.page.cursor_down();
                app.page.follow_cursor(app.page_height);
            }
        }
        MouseEventKind::ScrollUp => {
            if in_panel && app.panel_state() == PanelState::OpenList {
                app.card_up();
            } else if !app.is_panel_open() {
                app.page.cursor_up();
                app.page.follow_cursor(app.page_height);
            }
        }
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Page;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use echo_core::{MemoryArea, MemoryClipboard, PanelController, PromptStore, StorageArea};
    use std::sync::Arc;

    async fn app() -> App {
        let area: Arc<dyn StorageArea> = Arc::new(MemoryArea::new());
        let panel = PanelController::init(
            PromptStore::new(area, "echoPrompts"),
            Box::new(MemoryClipboard::new()),
            "notes.txt",
        )
        .await;
        App::new(Page::new("notes.txt", "alpha\nbeta\ngamma"), panel)
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn ctrl(c: char) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    async fn press(app: &mut App, events: Vec<AppEvent>) {
        for event in events {
            handle_event(app, event).await.unwrap();
        }
    }

    #[test]
    fn test_point_in_rect() {
        let rect = Rect::new(10, 5, 4, 2);
        assert!(point_in_rect(10, 5, rect));
        assert!(point_in_rect(13, 6, rect));
        assert!(!point_in_rect(14, 5, rect));
        assert!(!point_in_rect(10, 7, rect));
    }

    #[tokio::test]
    async fn test_capture_selection_and_save() {
        let mut app = app().await;
        press(
            &mut app,
            vec![
                key(KeyCode::Char('v')),
                key(KeyCode::Char('j')),
                key(KeyCode::Char('s')),
            ],
        )
        .await;
        let draft = app.panel().unwrap().draft().unwrap().clone();
        assert_eq!(draft.text, "alpha\nbeta");
        assert_eq!(app.form_field, FormField::Description);

        press(
            &mut app,
            vec![key(KeyCode::Char('h')), key(KeyCode::Char('i')), ctrl('s')],
        )
        .await;
        let panel = app.panel().unwrap();
        assert_eq!(panel.state(), &PanelState::OpenList);
        assert_eq!(panel.library()[0].description, "hi");
        assert_eq!(panel.library()[0].text, "alpha\nbeta");
        assert_eq!(app.selected_card(), Some(0));
    }

    #[tokio::test]
    async fn test_escape_closes_form_and_drops_draft() {
        let mut app = app().await;
        press(&mut app, vec![key(KeyCode::Char('s')), key(KeyCode::Char('x'))]).await;
        assert_eq!(app.panel().unwrap().draft().unwrap().description, "x");

        press(&mut app, vec![key(KeyCode::Esc)]).await;
        assert_eq!(app.panel_state(), PanelState::Closed);

        press(&mut app, vec![key(KeyCode::Char('p'))]).await;
        assert_eq!(app.panel_state(), PanelState::OpenList);
    }

    #[tokio::test]
    async fn test_list_keys_create_and_delete() {
        let mut app = app().await;
        press(
            &mut app,
            vec![
                key(KeyCode::Char('p')),
                key(KeyCode::Char('n')),
                key(KeyCode::Char('a')),
                key(KeyCode::Tab),
                key(KeyCode::Char('b')),
                ctrl('s'),
            ],
        )
        .await;
        assert_eq!(app.panel().unwrap().library().len(), 1);

        press(&mut app, vec![key(KeyCode::Char('d')), key(KeyCode::Char('d'))]).await;
        assert!(app.panel().unwrap().library().is_empty());
        assert_eq!(app.selected_card(), None);
        assert_eq!(app.panel_state(), PanelState::OpenList);
    }

    #[tokio::test]
    async fn test_empty_submit_keeps_form() {
        let mut app = app().await;
        press(&mut app, vec![key(KeyCode::Char('s')), ctrl('s')]).await;
        assert!(matches!(app.panel_state(), PanelState::OpenForm(_)));
        assert!(app.panel().unwrap().notice().is_some());
        assert!(app.panel().unwrap().library().is_empty());
    }

    #[tokio::test]
    async fn test_click_outside_closes_panel() {
        let mut app = app().await;
        press(&mut app, vec![key(KeyCode::Char('p'))]).await;
        app.panel_area = Some(Rect::new(40, 0, 40, 20));

        let click = |column, row| {
            AppEvent::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                modifiers: KeyModifiers::NONE,
            })
        };
        press(&mut app, vec![click(50, 5)]).await;
        assert!(app.is_panel_open());
        press(&mut app, vec![click(5, 5)]).await;
        assert!(!app.is_panel_open());
    }
}
