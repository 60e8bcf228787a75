pub mod clipboard;
pub mod config;
pub mod error;
pub mod html;
pub mod message;
pub mod panel;
pub mod prompt;
pub mod storage;
pub mod store;
pub mod view;

// Re-export main types for convenience
pub use clipboard::{Clipboard, MemoryClipboard};
pub use config::Config;
pub use error::{ClipboardError, PanelError, StorageError, ValidationError};
pub use message::{Ack, PanelHost, PanelMessage};
pub use panel::{Draft, DraftKind, Notice, NoticeLevel, PanelCommand, PanelController, PanelState};
pub use prompt::{PromptLibrary, PromptRecord};
pub use storage::{MemoryArea, SqliteArea, StorageArea};
pub use store::PromptStore;
pub use view::{PanelBody, PanelView};
