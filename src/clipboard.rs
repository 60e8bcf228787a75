use arboard::Clipboard as SystemHandle;
use echo_core::{Clipboard, ClipboardError};

/// The OS clipboard. A fresh handle per copy keeps this type `Send` on every platform.
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn copy(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut handle = SystemHandle::new().map_err(|e| ClipboardError(e.to_string()))?;
        handle
            .set_text(text.to_string())
            .map_err(|e| ClipboardError(e.to_string()))
    }
}
