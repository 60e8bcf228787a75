//! What the panel shows, computed from controller state.
//!
//! Hosts draw from a [`PanelView`] instead of reading controller internals, so
//! the terminal popup and the HTML markup render the same thing.

use chrono::{DateTime, Utc};

use crate::panel::{DraftKind, Notice, PanelController, PanelState};
use crate::prompt::PromptRecord;

/// Characters of prompt text shown on a list card before truncating.
pub const PREVIEW_CHARS: usize = 150;

pub const EMPTY_TITLE: &str = "No prompts saved yet";
pub const EMPTY_HINT: &str = "Highlight text and send it to Echo, or start a new prompt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub visible: bool,
    pub body: PanelBody,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelBody {
    List(ListView),
    Form(FormView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub title: String,
    /// Empty means the empty-state message is shown instead of cards.
    pub cards: Vec<CardView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub index: usize,
    pub description: String,
    pub preview: String,
    pub char_count: usize,
    pub time_ago: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub title: &'static str,
    pub description: String,
    pub text: String,
    pub char_count: usize,
}

impl PanelView {
    pub fn build(panel: &PanelController, now: DateTime<Utc>) -> Self {
        let body = match panel.state() {
            PanelState::OpenForm(draft) => PanelBody::Form(FormView {
                title: match draft.kind {
                    DraftKind::New => "Save New Prompt",
                    DraftKind::Captured => "Edit Prompt",
                },
                description: draft.description.clone(),
                text: draft.text.clone(),
                char_count: draft.text.chars().count(),
            }),
            PanelState::Closed | PanelState::OpenList => {
                PanelBody::List(ListView::build(panel.library(), now))
            }
        };
        Self {
            visible: panel.is_open(),
            body,
            notice: panel.notice().cloned(),
        }
    }
}

impl ListView {
    pub fn build(library: &[PromptRecord], now: DateTime<Utc>) -> Self {
        Self {
            title: format!("Saved Prompts ({})", library.len()),
            cards: library
                .iter()
                .enumerate()
                .map(|(index, record)| CardView {
                    index,
                    description: record.description.clone(),
                    preview: preview(&record.text),
                    char_count: record.char_count(),
                    time_ago: time_ago(record.saved_at, now),
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// First [`PREVIEW_CHARS`] characters, with "..." when anything was cut.
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Relative age label. Future timestamps read as "just now".
pub fn time_ago(saved_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - saved_at).num_seconds().max(0);
    match seconds {
        s if s < 60 => "just now".to_string(),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s if s < 2_592_000 => format!("{}d ago", s / 86_400),
        s => format!("{}mo ago", s / 2_592_000),
    }
}
