//! Messages delivered by the trigger layer, and the host that owns the panel.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::panel::PanelController;

/// Inbound trigger messages, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PanelMessage {
    #[serde(alias = "TOGGLE_ECHO_PANEL")]
    TogglePanel,
    SaveSelectedText { text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub const OK: Ack = Ack { success: true };
    pub const MISSING: Ack = Ack { success: false };
}

enum Lifecycle {
    Pending,
    Active(Box<PanelController>),
    Disposed,
}

/// Owns the page's single panel through `init -> active -> disposed`.
/// Messages that arrive while no panel is active are acknowledged with
/// `success: false` so the trigger layer can set the panel up.
pub struct PanelHost {
    lifecycle: Lifecycle,
}

impl Default for PanelHost {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelHost {
    pub fn new() -> Self {
        Self {
            lifecycle: Lifecycle::Pending,
        }
    }

    pub fn activate(&mut self, panel: PanelController) {
        info!(origin = panel.origin(), "panel active");
        self.lifecycle = Lifecycle::Active(Box::new(panel));
    }

    /// Tear the panel down. Later messages are refused.
    pub fn dispose(&mut self) -> Option<PanelController> {
        match std::mem::replace(&mut self.lifecycle, Lifecycle::Disposed) {
            Lifecycle::Active(panel) => {
                info!("panel disposed");
                Some(*panel)
            }
            Lifecycle::Pending | Lifecycle::Disposed => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Active(_))
    }

    pub fn panel(&self) -> Option<&PanelController> {
        match &self.lifecycle {
            Lifecycle::Active(panel) => Some(&**panel),
            _ => None,
        }
    }

    pub fn panel_mut(&mut self) -> Option<&mut PanelController> {
        match &mut self.lifecycle {
            Lifecycle::Active(panel) => Some(&mut **panel),
            _ => None,
        }
    }

    pub async fn handle(&mut self, message: PanelMessage) -> Ack {
        let Some(panel) = self.panel_mut() else {
            debug!(?message, "no active panel for message");
            return Ack::MISSING;
        };
        match message {
            PanelMessage::TogglePanel => panel.toggle().await,
            PanelMessage::SaveSelectedText { text } => panel.open_with_text(&text),
        }
        Ack::OK
    }
}
