use crate::device_client::PushReceipt;
use magnetboard_core::{DeviceAddress, Rgb};
use std::time::Instant;

/// How long a button shows its success/failure state before reverting, in seconds
pub const FEEDBACK_DURATION: f32 = 2.0;

/// Network operations the user can start
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DeviceOp {
    Probe,
    Send,
    PushMagnets,
}

/// Results delivered from background tasks
#[derive(Debug)]
pub enum DeviceEvent {
    ProbeFinished {
        address: DeviceAddress,
        reachable: bool,
    },
    SendFinished(Result<PushReceipt, String>),
    PushFinished(Result<PushReceipt, String>),
}

/// Transient outcome shown on a button
#[derive(Clone, Debug)]
pub struct Feedback {
    pub success: bool,
    pub at: Instant,
}

impl Feedback {
    pub fn new(success: bool) -> Self {
        Self {
            success,
            at: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.at.elapsed().as_secs_f32() >= FEEDBACK_DURATION
    }
}

pub fn to_color32(color: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(color.r, color.g, color.b)
}

/// Grid cell under a point, for a square grid drawn into `rect`
pub fn cell_at(rect: egui::Rect, pos: egui::Pos2, size: usize) -> Option<(usize, usize)> {
    if size == 0 || !rect.contains(pos) {
        return None;
    }
    let side = rect.width() / size as f32;
    let col = ((pos.x - rect.min.x) / side).floor() as usize;
    let row = ((pos.y - rect.min.y) / side).floor() as usize;
    (row < size && col < size).then_some((row, col))
}

/// Like [`cell_at`], but `None` when another layer such as the settings window
/// is drawn over the canvas at `pos`
pub fn uncovered_cell_at(
    ctx: &egui::Context,
    canvas_layer: egui::LayerId,
    rect: egui::Rect,
    pos: egui::Pos2,
    size: usize,
) -> Option<(usize, usize)> {
    match ctx.layer_id_at(pos) {
        Some(top) if top != canvas_layer => None,
        _ => cell_at(rect, pos, size),
    }
}
