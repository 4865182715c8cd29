//! Message types exchanged with the device

use serde::{Deserialize, Serialize};
use crate::session::CellUpdate;

/// Messages sent from client to device over the live channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LiveMessage {
    /// One cell changed; `color` is `null` when erased
    Cell {
        r: usize,
        c: usize,
        color: Option<String>,
    },
}

impl From<CellUpdate> for LiveMessage {
    fn from(update: CellUpdate) -> Self {
        LiveMessage::Cell {
            r: update.row,
            c: update.col,
            color: update.cell.color().map(|c| c.to_hex()),
        }
    }
}

/// Body of `GET /status` and of successful grid posts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    #[serde(default)]
    pub status: Option<String>,
}

impl DeviceStatus {
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some("ok")
    }
}
