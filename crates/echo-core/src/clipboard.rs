use std::sync::{Arc, Mutex};

use crate::error::ClipboardError;

/// Where copied prompt text goes. Copying is best-effort; callers log and move on.
pub trait Clipboard: Send {
    fn copy(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Keeps everything copied, newest last. Useful for tests and headless runs.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    pub copied: Vec<String>,
    pub deny: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&str> {
        self.copied.last().map(String::as_str)
    }
}

impl Clipboard for MemoryClipboard {
    fn copy(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.deny {
            return Err(ClipboardError("access denied".to_string()));
        }
        self.copied.push(text.to_string());
        Ok(())
    }
}

/// Shared handle, so a test can keep reading what the panel copied.
impl<C: Clipboard> Clipboard for Arc<Mutex<C>> {
    fn copy(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.lock()
            .map_err(|_| ClipboardError("clipboard lock poisoned".to_string()))?
            .copy(text)
    }
}
