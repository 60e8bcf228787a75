//! The panel's view-state machine.
//!
//! The panel is either closed, showing the list of saved prompts, or showing
//! the create form with a draft. Closing always drops the draft, so a closed
//! panel reopens on the list. Every transition bumps `revision`; hosts
//! re-render the whole panel when it changes.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::clipboard::Clipboard;
use crate::error::{PanelError, ValidationError};
use crate::prompt::PromptRecord;
use crate::store::PromptStore;

/// Where a draft came from; decides the form title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DraftKind {
    #[default]
    New,
    Captured,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub description: String,
    pub text: String,
    pub kind: DraftKind,
}

impl Draft {
    pub fn captured(text: &str) -> Self {
        Self {
            description: String::new(),
            text: text.to_string(),
            kind: DraftKind::Captured,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelState {
    Closed,
    OpenList,
    OpenForm(Draft),
}

/// Actions a user can take from inside the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelCommand {
    RequestNew,
    Copy(usize),
    Delete(usize),
    Cancel,
    SubmitForm { description: String, text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Inline, non-blocking feedback shown inside the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

pub type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct PanelController {
    store: PromptStore,
    clipboard: Box<dyn Clipboard>,
    origin: String,
    state: PanelState,
    notice: Option<Notice>,
    revision: u64,
    clock: Clock,
}

impl PanelController {
    /// Build the panel for a page and load the current library.
    pub async fn init(
        mut store: PromptStore,
        clipboard: Box<dyn Clipboard>,
        origin: impl Into<String>,
    ) -> Self {
        store.load().await;
        Self {
            store,
            clipboard,
            origin: origin.into(),
            state: PanelState::Closed,
            notice: None,
            revision: 0,
            clock: Box::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != PanelState::Closed
    }

    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            PanelState::OpenForm(draft) => Some(draft),
            _ => None,
        }
    }

    /// Live edits from the form inputs. Editing does not count as a transition.
    pub fn draft_mut(&mut self) -> Option<&mut Draft> {
        match &mut self.state {
            PanelState::OpenForm(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn library(&self) -> &[PromptRecord] {
        self.store.library()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    fn transition(&mut self, next: PanelState) {
        debug!(from = state_name(&self.state), to = state_name(&next), "panel transition");
        self.state = next;
        self.notice = None;
        self.revision += 1;
    }

    fn rerender_with(&mut self, notice: Notice) {
        self.notice = Some(notice);
        self.revision += 1;
    }

    pub async fn toggle(&mut self) {
        match self.state {
            PanelState::Closed => {
                let refreshed = self.store.refresh().await;
                self.transition(PanelState::OpenList);
                if let Err(e) = refreshed {
                    warn!(error = %e, "showing in-memory prompts");
                    self.rerender_with(Notice::new(
                        NoticeLevel::Warning,
                        format!("Could not reach storage: {}", e),
                    ));
                }
            }
            PanelState::OpenList | PanelState::OpenForm(_) => self.close(),
        }
    }

    pub fn open_with_text(&mut self, text: &str) {
        self.transition(PanelState::OpenForm(Draft::captured(text)));
    }

    pub fn request_new(&mut self) -> Result<(), PanelError> {
        if self.state != PanelState::OpenList {
            return Err(PanelError::WrongView);
        }
        self.transition(PanelState::OpenForm(Draft::default()));
        Ok(())
    }

    /// Validate and persist the form. An empty field keeps the form open with
    /// the submitted values and an inline notice.
    pub async fn submit_form(&mut self, description: &str, text: &str) -> Result<(), PanelError> {
        let Some(draft) = self.draft_mut() else {
            return Err(ValidationError::NotEditing.into());
        };
        draft.description = description.to_string();
        draft.text = text.to_string();

        let (description, text) = (description.trim(), text.trim());
        let invalid = if description.is_empty() {
            Some(ValidationError::EmptyDescription)
        } else if text.is_empty() {
            Some(ValidationError::EmptyText)
        } else {
            None
        };
        if let Some(err) = invalid {
            self.rerender_with(Notice::new(NoticeLevel::Error, err.to_string()));
            return Err(err.into());
        }

        let record = PromptRecord::new(description, text, &self.origin, self.now());
        debug!(id = %record.id, chars = record.char_count(), "saving prompt");
        let saved = self.store.append(record).await;
        self.transition(PanelState::OpenList);
        if let Err(e) = saved {
            warn!(error = %e, "prompt kept in memory but not persisted");
            self.rerender_with(Notice::new(
                NoticeLevel::Warning,
                format!("Saved for this session only: {}", e),
            ));
            return Err(e.into());
        }
        Ok(())
    }

    pub fn cancel_form(&mut self) -> Result<(), PanelError> {
        if self.draft().is_none() {
            return Err(PanelError::WrongView);
        }
        self.transition(PanelState::OpenList);
        Ok(())
    }

    /// Copy a record's full text. Clipboard failures are logged, never raised.
    pub fn copy_record(&mut self, index: usize) -> Result<(), PanelError> {
        if self.state != PanelState::OpenList {
            return Err(PanelError::WrongView);
        }
        let Some(record) = self.store.get(index) else {
            return Err(PanelError::Index {
                index,
                len: self.store.len(),
            });
        };
        let text = record.text.clone();
        match self.clipboard.copy(&text) {
            Ok(()) => self.rerender_with(Notice::new(NoticeLevel::Info, "Copied to clipboard")),
            Err(e) => warn!(error = %e, "copy failed"),
        }
        Ok(())
    }

    pub async fn delete_record(&mut self, index: usize) -> Result<(), PanelError> {
        if self.state != PanelState::OpenList {
            return Err(PanelError::WrongView);
        }
        let result = self.store.remove_at(index).await;
        self.transition(PanelState::OpenList);
        match result {
            Ok(removed) => {
                debug!(id = %removed.id, "deleted prompt");
                Ok(())
            }
            Err(PanelError::Storage(e)) => {
                warn!(error = %e, "prompt removed in memory but not persisted");
                self.rerender_with(Notice::new(
                    NoticeLevel::Warning,
                    format!("Deleted for this session only: {}", e),
                ));
                Err(e.into())
            }
            Err(e) => Err(e),
        }
    }

    /// Escape or an outside click. Any open draft is lost.
    pub fn close(&mut self) {
        if self.state != PanelState::Closed {
            self.transition(PanelState::Closed);
        }
    }

    pub async fn dispatch(&mut self, command: PanelCommand) -> Result<(), PanelError> {
        match command {
            PanelCommand::RequestNew => self.request_new(),
            PanelCommand::Copy(index) => self.copy_record(index),
            PanelCommand::Delete(index) => self.delete_record(index).await,
            PanelCommand::Cancel => self.cancel_form(),
            PanelCommand::SubmitForm { description, text } => {
                self.submit_form(&description, &text).await
            }
        }
    }
}

fn state_name(state: &PanelState) -> &'static str {
    match state {
        PanelState::Closed => "closed",
        PanelState::OpenList => "list",
        PanelState::OpenForm(_) => "form",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::storage::{MemoryArea, StorageArea};
    use crate::store::DEFAULT_STORAGE_KEY;
    use std::sync::{Arc, Mutex};

    struct Fixture {
        area: Arc<MemoryArea>,
        clipboard: Arc<Mutex<MemoryClipboard>>,
        panel: PanelController,
    }

    async fn fixture() -> Fixture {
        let area = Arc::new(MemoryArea::new());
        let clipboard = Arc::new(Mutex::new(MemoryClipboard::new()));
        let dyn_area: Arc<dyn StorageArea> = area.clone();
        let panel = PanelController::init(
            PromptStore::new(dyn_area, DEFAULT_STORAGE_KEY),
            Box::new(Arc::clone(&clipboard)),
            "example.com",
        )
        .await;
        Fixture { area, clipboard, panel }
    }

    async fn persisted(area: &Arc<MemoryArea>) -> Vec<PromptRecord> {
        let dyn_area: Arc<dyn StorageArea> = area.clone();
        PromptStore::new(dyn_area, DEFAULT_STORAGE_KEY).load().await
    }

    #[tokio::test]
    async fn test_starts_closed_and_toggles() {
        let mut f = fixture().await;
        assert_eq!(f.panel.state(), &PanelState::Closed);

        f.panel.toggle().await;
        assert_eq!(f.panel.state(), &PanelState::OpenList);

        f.panel.toggle().await;
        assert_eq!(f.panel.state(), &PanelState::Closed);
    }

    #[tokio::test]
    async fn test_open_with_text_from_any_state() {
        let mut f = fixture().await;
        f.panel.open_with_text("foo");
        assert_eq!(f.panel.draft().map(|d| d.text.as_str()), Some("foo"));

        f.panel.toggle().await; // closes
        f.panel.toggle().await; // list
        f.panel.open_with_text("bar");
        let draft = f.panel.draft().unwrap();
        assert_eq!(draft.text, "bar");
        assert_eq!(draft.description, "");
        assert_eq!(draft.kind, DraftKind::Captured);

        f.panel.open_with_text("baz");
        assert_eq!(f.panel.draft().unwrap().text, "baz");
    }

    #[tokio::test]
    async fn test_submit_saves_and_returns_to_list() {
        let mut f = fixture().await;
        f.panel.open_with_text("Hello world");
        f.panel.submit_form("  Test ", "Hello world\n").await.unwrap();

        assert_eq!(f.panel.state(), &PanelState::OpenList);
        let library = f.panel.library();
        assert_eq!(library.len(), 1);
        assert_eq!(library[0].description, "Test");
        assert_eq!(library[0].text, "Hello world");
        assert_eq!(library[0].source, "example.com");
        assert_eq!(persisted(&f.area).await, library.to_vec());
    }

    #[tokio::test]
    async fn test_blank_fields_keep_form_open() {
        let mut f = fixture().await;
        f.panel.toggle().await;
        f.panel.request_new().unwrap();

        let err = f.panel.submit_form("   ", "text").await.unwrap_err();
        assert!(matches!(err, PanelError::Validation(ValidationError::EmptyDescription)));
        let err = f.panel.submit_form("desc", " \t\n").await.unwrap_err();
        assert!(matches!(err, PanelError::Validation(ValidationError::EmptyText)));

        let draft = f.panel.draft().unwrap();
        assert_eq!(draft.description, "desc");
        assert_eq!(f.panel.notice().unwrap().level, NoticeLevel::Error);
        assert!(f.panel.library().is_empty());
        assert!(persisted(&f.area).await.is_empty());
    }

    #[tokio::test]
    async fn test_submit_outside_form_is_rejected() {
        let mut f = fixture().await;
        let err = f.panel.submit_form("a", "b").await.unwrap_err();
        assert!(matches!(err, PanelError::Validation(ValidationError::NotEditing)));
        assert_eq!(f.panel.state(), &PanelState::Closed);
    }

    #[tokio::test]
    async fn test_close_discards_draft() {
        let mut f = fixture().await;
        f.panel.open_with_text("unsaved");
        f.panel.draft_mut().unwrap().description = "typed".to_string();
        f.panel.close();
        assert_eq!(f.panel.state(), &PanelState::Closed);

        f.panel.toggle().await;
        assert_eq!(f.panel.state(), &PanelState::OpenList);
        assert!(f.panel.draft().is_none());
    }

    #[tokio::test]
    async fn test_cancel_returns_to_list() {
        let mut f = fixture().await;
        f.panel.open_with_text("draft");
        f.panel.dispatch(PanelCommand::Cancel).await.unwrap();
        assert_eq!(f.panel.state(), &PanelState::OpenList);
        assert!(matches!(
            f.panel.dispatch(PanelCommand::Cancel).await,
            Err(PanelError::WrongView)
        ));
    }

    #[tokio::test]
    async fn test_copy_uses_full_text_and_ignores_denied_clipboard() {
        let mut f = fixture().await;
        let long = "x".repeat(200);
        f.panel.open_with_text(&long);
        f.panel.submit_form("long", &long).await.unwrap();

        f.panel.dispatch(PanelCommand::Copy(0)).await.unwrap();
        assert_eq!(f.clipboard.lock().unwrap().last().map(str::len), Some(200));

        f.clipboard.lock().unwrap().deny = true;
        f.panel.dispatch(PanelCommand::Copy(0)).await.unwrap();
        assert_eq!(f.clipboard.lock().unwrap().copied.len(), 1);
        assert_eq!(f.panel.state(), &PanelState::OpenList);
    }

    #[tokio::test]
    async fn test_stale_delete_is_index_error() {
        let mut f = fixture().await;
        f.panel.open_with_text("one");
        f.panel.submit_form("one", "one").await.unwrap();

        f.panel.dispatch(PanelCommand::Delete(0)).await.unwrap();
        let err = f.panel.dispatch(PanelCommand::Delete(0)).await.unwrap_err();
        assert!(matches!(err, PanelError::Index { index: 0, len: 0 }));
        assert_eq!(f.panel.state(), &PanelState::OpenList);
    }

    #[tokio::test]
    async fn test_storage_failure_keeps_panel_usable() {
        let mut f = fixture().await;
        f.area.set_available(false);
        f.panel.open_with_text("kept");

        let err = f.panel.submit_form("d", "kept").await.unwrap_err();
        assert!(matches!(err, PanelError::Storage(_)));
        assert_eq!(f.panel.state(), &PanelState::OpenList);
        assert_eq!(f.panel.library().len(), 1);
        assert_eq!(f.panel.notice().unwrap().level, NoticeLevel::Warning);
    }

    #[tokio::test]
    async fn test_toggle_with_unreachable_storage_keeps_library() {
        let mut f = fixture().await;
        for name in ["a", "b", "c"] {
            f.panel.open_with_text(name);
            f.panel.submit_form(name, name).await.unwrap();
        }
        f.panel.close();

        f.area.set_available(false);
        f.panel.toggle().await;
        assert_eq!(f.panel.state(), &PanelState::OpenList);
        assert_eq!(f.panel.library().len(), 3);
        assert_eq!(f.panel.notice().unwrap().level, NoticeLevel::Warning);

        f.area.set_available(true);
        f.panel.open_with_text("d");
        f.panel.submit_form("d", "d").await.unwrap();
        assert_eq!(persisted(&f.area).await.len(), 4);
    }

    #[tokio::test]
    async fn test_every_transition_bumps_revision() {
        let mut f = fixture().await;
        let start = f.panel.revision();
        f.panel.toggle().await;
        f.panel.request_new().unwrap();
        f.panel.close();
        assert_eq!(f.panel.revision(), start + 3);

        // closing a closed panel is not a transition
        f.panel.close();
        assert_eq!(f.panel.revision(), start + 3);
    }
}
