//! Error kinds raised by the store and the panel.
//!
//! None of these are fatal to the host: storage failures leave the in-memory
//! library usable, validation failures keep the form open, and stale indexes
//! are treated as no-ops by callers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage area unavailable: {0}")]
    Unavailable(String),
    #[error("storage quota exceeded: {needed} bytes needed, {quota} bytes allowed")]
    QuotaExceeded { needed: usize, quota: usize },
    #[error("failed to encode prompt library: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::Unavailable(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("description is required")]
    EmptyDescription,
    #[error("prompt text is required")]
    EmptyText,
    #[error("no form is open")]
    NotEditing,
}

#[derive(Debug, Error)]
pub enum PanelError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no prompt at index {index} (library has {len})")]
    Index { index: usize, len: usize },
    #[error("action not available in the current view")]
    WrongView,
}

#[derive(Debug, Error)]
#[error("clipboard unavailable: {0}")]
pub struct ClipboardError(pub String);
