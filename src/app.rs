use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tracing::debug;

use echo_core::{PanelController, PanelError, PanelHost, PanelMessage, PanelState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Description,
    Text,
}

/// Terminal stand-in for a web page: a scrollable document whose lines can
/// be selected and sent to the panel.
pub struct Page {
    pub title: String,
    pub lines: Vec<String>,
    pub cursor: usize,
    pub anchor: Option<usize>,
    /// First line shown in the viewport.
    pub scroll: usize,
}

impl Page {
    pub fn new(title: impl Into<String>, content: &str) -> Self {
        let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self {
            title: title.into(),
            lines,
            cursor: 0,
            anchor: None,
            scroll: 0,
        }
    }

    /// Inclusive line range covered by the selection, if one is active.
    pub fn selection(&self) -> Option<(usize, usize)> {
        self.anchor
            .map(|anchor| (anchor.min(self.cursor), anchor.max(self.cursor)))
    }

    pub fn is_selected(&self, line: usize) -> bool {
        self.selection()
            .map(|(start, end)| line >= start && line <= end)
            .unwrap_or(false)
    }

    /// Selected lines, or the cursor line when nothing is selected.
    pub fn selected_text(&self) -> String {
        let (start, end) = self.selection().unwrap_or((self.cursor, self.cursor));
        self.lines[start..=end].join("\n")
    }

    pub fn toggle_selection(&mut self) {
        self.anchor = match self.anchor {
            Some(_) => None,
            None => Some(self.cursor),
        };
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.lines.len() {
            self.cursor += 1;
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_first(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_last(&mut self) {
        self.cursor = self.lines.len().saturating_sub(1);
    }

    /// Keep the cursor inside a viewport of `height` rows.
    pub fn follow_cursor(&mut self, height: u16) {
        let height = usize::from(height);
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if height > 0 && self.cursor >= self.scroll.saturating_add(height) {
            self.scroll = self.cursor + 1 - height;
        }
    }
}

pub struct App {
    pub should_quit: bool,
    pub page: Page,
    pub host: PanelHost,

    // Panel widgets
    pub card_state: ListState,
    pub form_field: FormField,
    pub last_revision: u64,

    // Layout areas for mouse hit-testing
    pub panel_area: Option<Rect>,
    pub button_area: Option<Rect>,
    pub page_height: u16,
}

impl App {
    pub fn new(page: Page, panel: PanelController) -> Self {
        let mut host = PanelHost::new();
        let last_revision = panel.revision();
        host.activate(panel);
        Self {
            should_quit: false,
            page,
            host,
            card_state: ListState::default(),
            form_field: FormField::Description,
            last_revision,
            panel_area: None,
            button_area: None,
            page_height: 0,
        }
    }

    pub fn panel(&self) -> Option<&PanelController> {
        self.host.panel()
    }

    pub fn panel_mut(&mut self) -> Option<&mut PanelController> {
        self.host.panel_mut()
    }

    pub fn panel_state(&self) -> PanelState {
        self.panel()
            .map(|panel| panel.state().clone())
            .unwrap_or(PanelState::Closed)
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel().map(PanelController::is_open).unwrap_or(false)
    }

    pub async fn send(&mut self, message: PanelMessage) {
        let ack = self.host.handle(message).await;
        if !ack.success {
            debug!("panel not active, message dropped");
        }
        self.sync_panel();
    }

    /// Log panel errors the way the panel surfaces them: validation and
    /// storage failures already carry an inline notice, stale indexes are ignored.
    pub fn report(&mut self, result: Result<(), PanelError>) {
        match result {
            Ok(()) => {}
            Err(PanelError::Index { index, len }) => {
                debug!(index, len, "stale prompt index ignored");
            }
            Err(e) => debug!(error = %e, "panel action rejected"),
        }
        self.sync_panel();
    }

    /// Reset widget state when the panel re-rendered into a new state.
    pub fn sync_panel(&mut self) {
        let Some(panel) = self.host.panel() else {
            return;
        };
        if panel.revision() == self.last_revision {
            return;
        }
        self.last_revision = panel.revision();
        let len = panel.library().len();

        match panel.state() {
            PanelState::OpenForm(draft) => {
                // Captured text arrives pre-filled, so start on the description.
                if draft.description.is_empty() {
                    self.form_field = FormField::Description;
                }
            }
            PanelState::OpenList | PanelState::Closed => {
                self.form_field = FormField::Description;
                let selected = match self.card_state.selected() {
                    _ if len == 0 => None,
                    Some(i) => Some(i.min(len - 1)),
                    None => Some(0),
                };
                self.card_state.select(selected);
            }
        }
    }

    pub fn selected_card(&self) -> Option<usize> {
        self.card_state.selected()
    }

    pub fn card_down(&mut self) {
        let len = self.panel().map(|p| p.library().len()).unwrap_or(0);
        if len == 0 {
            return;
        }
        let next = match self.card_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.card_state.select(Some(next));
    }

    pub fn card_up(&mut self) {
        if let Some(i) = self.card_state.selected() {
            self.card_state.select(Some(i.saturating_sub(1)));
        }
    }

    pub fn next_field(&mut self) {
        self.form_field = match self.form_field {
            FormField::Description => FormField::Text,
            FormField::Text => FormField::Description,
        };
    }

    /// The draft field under edit.
    pub fn focused_input(&mut self) -> Option<&mut String> {
        let field = self.form_field;
        let draft = self.host.panel_mut()?.draft_mut()?;
        Some(match field {
            FormField::Description => &mut draft.description,
            FormField::Text => &mut draft.text,
        })
    }
}
