use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::app::{App, FormField};
use echo_core::view::{CardView, FormView, ListView, PanelBody, PanelView, EMPTY_HINT, EMPTY_TITLE};
use echo_core::{Notice, NoticeLevel};

const PANEL_WIDTH: u16 = 56;
const BUTTON_LABEL: &str = " ✎ Echo ";
/// Lines of a card preview shown in the terminal list.
const PREVIEW_LINES: usize = 3;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_page(app, frame, body_area);
    render_footer(app, frame, footer_area);
    render_button(app, frame, body_area);

    let view = app.panel().map(|panel| PanelView::build(panel, panel.now()));
    match view {
        Some(view) if view.visible => render_panel(app, frame, body_area, &view),
        _ => app.panel_area = None,
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let count = app.panel().map(|p| p.library().len()).unwrap_or(0);
    let title = Line::from(vec![
        Span::styled(" Echo ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!(" {} ", app.page.title), Style::default().fg(Color::White)),
        Span::styled(format!("[{} saved]", count), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_page(app: &mut App, frame: &mut Frame, area: Rect) {
    app.page_height = area.height;
    app.page.follow_cursor(area.height);

    let lines: Vec<Line> = app
        .page
        .lines
        .iter()
        .enumerate()
        .skip(app.page.scroll)
        .take(usize::from(area.height))
        .map(|(i, text)| {
            let style = if app.page.is_selected(i) {
                Style::default().bg(Color::Blue).fg(Color::White)
            } else if i == app.page.cursor {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };
            Line::from(Span::styled(text.clone(), style))
        })
        .collect();

    let page = Paragraph::new(Text::from(lines));
    frame.render_widget(page, area);
}

fn render_button(app: &mut App, frame: &mut Frame, area: Rect) {
    let width = BUTTON_LABEL.chars().count() as u16;
    if area.width < width || area.height == 0 {
        app.button_area = None;
        return;
    }
    let rect = Rect::new(
        area.x + area.width - width,
        area.y + area.height - 1,
        width,
        1,
    );
    let style = if app.is_panel_open() {
        Style::default().bg(Color::Cyan).fg(Color::Black).bold()
    } else {
        Style::default().bg(Color::Magenta).fg(Color::White).bold()
    };
    frame.render_widget(Paragraph::new(BUTTON_LABEL).style(style), rect);
    app.button_area = Some(rect);
}

fn render_panel(app: &mut App, frame: &mut Frame, area: Rect, view: &PanelView) {
    let width = PANEL_WIDTH.min(area.width.saturating_sub(2));
    // Leave the bottom row for the floating button
    let height = area.height.saturating_sub(1);
    let panel_area = Rect::new(area.x + area.width.saturating_sub(width + 1), area.y, width, height);
    app.panel_area = Some(panel_area);

    // Clear the page behind the panel
    frame.render_widget(Clear, panel_area);

    let title = match &view.body {
        PanelBody::List(list) => list.title.clone(),
        PanelBody::Form(form) => form.title.to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", title));
    let inner = block.inner(panel_area);
    frame.render_widget(block, panel_area);

    let notice_height = if view.notice.is_some() { 1 } else { 0 };
    let [notice_area, content_area] =
        Layout::vertical([Constraint::Length(notice_height), Constraint::Min(0)]).areas(inner);

    if let Some(notice) = &view.notice {
        frame.render_widget(notice_line(notice), notice_area);
    }

    match &view.body {
        PanelBody::List(list) => render_list(app, frame, content_area, list),
        PanelBody::Form(form) => render_form(app, frame, content_area, form),
    }
}

fn notice_line(notice: &Notice) -> Paragraph<'static> {
    let color = match notice.level {
        NoticeLevel::Info => Color::Green,
        NoticeLevel::Warning => Color::Yellow,
        NoticeLevel::Error => Color::Red,
    };
    Paragraph::new(notice.message.clone()).style(Style::default().fg(color))
}

fn render_list(app: &mut App, frame: &mut Frame, area: Rect, list: &ListView) {
    if list.is_empty() {
        let empty = Paragraph::new(vec![
            Line::default(),
            Line::from(Span::styled(EMPTY_TITLE, Style::default().bold())),
            Line::from(Span::styled(EMPTY_HINT, Style::default().fg(Color::Gray))),
        ])
        .alignment(ratatui::layout::Alignment::Center)
        .wrap(Wrap { trim: true });
        frame.render_widget(empty, area);
        return;
    }

    let width = area.width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = list.cards.iter().map(|card| card_item(card, width)).collect();

    let cards = List::new(items)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(cards, area, &mut app.card_state);
}

fn card_item(card: &CardView, width: usize) -> ListItem<'static> {
    let mut lines = vec![Line::from(Span::styled(
        card.description.clone(),
        Style::default().fg(Color::Cyan).bold(),
    ))];
    for text in card.preview.lines().take(PREVIEW_LINES) {
        let clipped: String = text.chars().take(width).collect();
        lines.push(Line::from(clipped));
    }
    lines.push(Line::from(Span::styled(
        format!("{} chars · {}", card.char_count, card.time_ago),
        Style::default().fg(Color::Gray),
    )));
    lines.push(Line::default());
    ListItem::new(lines)
}

fn render_form(app: &App, frame: &mut Frame, area: Rect, form: &FormView) {
    let [description_area, text_area, counter_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(area);

    let field_block = |label: &'static str, field: FormField| {
        let color = if app.form_field == field { Color::Yellow } else { Color::Gray };
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(label)
    };

    let description = Paragraph::new(form.description.clone())
        .block(field_block(" Description ", FormField::Description));
    frame.render_widget(description, description_area);

    let text = Paragraph::new(form.text.clone())
        .wrap(Wrap { trim: false })
        .block(field_block(" Prompt ", FormField::Text));
    frame.render_widget(text, text_area);

    let counter = Paragraph::new(format!("{} characters", form.char_count))
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(counter, counter_area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    use echo_core::PanelState;

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let (mode, keys): (&str, Vec<(&str, &str)>) = match app.panel_state() {
        PanelState::Closed => (
            " PAGE ",
            vec![
                ("j/k", "move"),
                ("v", "select"),
                ("s", "save to echo"),
                ("p", "panel"),
                ("q", "quit"),
            ],
        ),
        PanelState::OpenList => (
            " PROMPTS ",
            vec![
                ("j/k", "nav"),
                ("n", "new"),
                ("c", "copy"),
                ("d", "delete"),
                ("Esc", "close"),
            ],
        ),
        PanelState::OpenForm(_) => (
            " EDIT ",
            vec![
                ("Tab", "field"),
                ("Ctrl-s", "save"),
                ("Ctrl-g", "cancel"),
                ("Esc", "close"),
            ],
        ),
    };

    let mut spans = vec![Span::styled(mode, Style::default().bg(Color::Blue).fg(Color::White))];
    for (key, label) in keys {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {} ", label), label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
