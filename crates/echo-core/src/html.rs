//! Markup for the in-page overlay. The whole panel is re-rendered from a
//! [`PanelView`]; every piece of user text goes through [`escape_html`].

use std::fmt::Write;

use crate::panel::NoticeLevel;
use crate::view::{CardView, FormView, ListView, PanelBody, PanelView, EMPTY_HINT, EMPTY_TITLE};

pub const PANEL_ID: &str = "echo-panel";

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render(view: &PanelView) -> String {
    let mut html = String::new();
    let class = if view.visible { " class=\"echo-visible\"" } else { "" };
    let _ = write!(html, "<div id=\"{}\"{}><div class=\"echo-content\">", PANEL_ID, class);

    if let Some(notice) = &view.notice {
        let level = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        let _ = write!(
            html,
            "<div class=\"echo-notice echo-notice-{}\">{}</div>",
            level,
            escape_html(&notice.message)
        );
    }

    match &view.body {
        PanelBody::List(list) => render_list(&mut html, list),
        PanelBody::Form(form) => render_form(&mut html, form),
    }

    html.push_str("</div></div>");
    html
}

fn render_list(html: &mut String, list: &ListView) {
    let _ = write!(
        html,
        "<div class=\"echo-header\"><div class=\"echo-title\">{}</div>\
         <button class=\"echo-btn-new\" data-action=\"new-prompt\">New</button></div>",
        escape_html(&list.title)
    );
    html.push_str("<div class=\"echo-prompts-list\">");
    if list.is_empty() {
        let _ = write!(
            html,
            "<div class=\"echo-empty\"><div class=\"echo-empty-title\">{}</div>\
             <div class=\"echo-empty-text\">{}</div></div>",
            EMPTY_TITLE,
            escape_html(EMPTY_HINT)
        );
    } else {
        for card in &list.cards {
            render_card(html, card);
        }
    }
    html.push_str("</div>");
}

fn render_card(html: &mut String, card: &CardView) {
    let _ = write!(
        html,
        "<div class=\"echo-prompt-card\">\
         <div class=\"echo-prompt-header\">{description}</div>\
         <div class=\"echo-prompt-text\">{preview}</div>\
         <div class=\"echo-prompt-meta\"><span>{chars} chars</span><span>{ago}</span></div>\
         <div class=\"echo-prompt-actions\">\
         <button class=\"echo-btn-small echo-btn-copy\" data-action=\"copy\" data-index=\"{index}\">Copy</button>\
         <button class=\"echo-btn-small echo-btn-delete\" data-action=\"delete\" data-index=\"{index}\">Delete</button>\
         </div></div>",
        description = escape_html(&card.description),
        preview = escape_html(&card.preview),
        chars = card.char_count,
        ago = card.time_ago,
        index = card.index,
    );
}

fn render_form(html: &mut String, form: &FormView) {
    let _ = write!(
        html,
        "<div class=\"echo-header\"><div class=\"echo-title\">{title}</div></div>\
         <form class=\"echo-form\" id=\"echo-prompt-form\">\
         <div class=\"echo-form-group\"><label class=\"echo-label\">Description</label>\
         <input type=\"text\" class=\"echo-input\" id=\"echo-description\" \
         placeholder=\"e.g., Blog post prompt\" value=\"{description}\" required /></div>\
         <div class=\"echo-form-group\"><label class=\"echo-label\">Prompt</label>\
         <textarea class=\"echo-textarea\" id=\"echo-prompt-text\" \
         placeholder=\"Type or paste your prompt here...\" required>{text}</textarea>\
         <div class=\"echo-char-count\" id=\"echo-char-count\">{chars} characters</div></div>\
         <div class=\"echo-btn-group\">\
         <button type=\"button\" class=\"echo-btn echo-btn-secondary\" data-action=\"cancel\">Cancel</button>\
         <button type=\"submit\" class=\"echo-btn echo-btn-primary\">Save Prompt</button>\
         </div></form>",
        title = form.title,
        description = escape_html(&form.description),
        text = escape_html(&form.text),
        chars = form.char_count,
    );
}
