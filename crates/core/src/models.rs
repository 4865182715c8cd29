//! Shared data models used by every front end

use chrono::{DateTime, Utc};
use crate::color::Rgb;
use std::collections::VecDeque;

/// Swatches offered by the color picker, white first and selected at startup
pub const DEFAULT_PALETTE: [(Rgb, &str); 8] = [
    (Rgb::WHITE, "White"),
    (Rgb::new(0xFF, 0x00, 0x00), "Red"),
    (Rgb::new(0x00, 0xC8, 0x00), "Green"),
    (Rgb::new(0x00, 0x00, 0xFF), "Blue"),
    (Rgb::new(0xFF, 0xD7, 0x00), "Yellow"),
    (Rgb::new(0xFF, 0x8C, 0x00), "Orange"),
    (Rgb::new(0x80, 0x00, 0x80), "Purple"),
    (Rgb::BLACK, "Black"),
];

/// Grid sizes offered in settings
pub const GRID_SIZES: [usize; 2] = [5, 16];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Probe,
    Send,
    Push,
    Live,
    Config,
}

impl ActivityKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActivityKind::Probe => "probe",
            ActivityKind::Send => "send",
            ActivityKind::Push => "push",
            ActivityKind::Live => "live",
            ActivityKind::Config => "config",
        }
    }
}

/// One line in the activity log
#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub at: DateTime<Utc>,
    pub kind: ActivityKind,
    pub success: bool,
    pub message: String,
}

impl ActivityEntry {
    pub fn new(kind: ActivityKind, success: bool, message: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            kind,
            success,
            message: message.into(),
        }
    }
}

/// Bounded activity log, oldest entries drop first
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
}

impl ActivityLog {
    pub const CAPACITY: usize = 200;

    pub fn push(&mut self, entry: ActivityEntry) {
        if self.entries.len() == Self::CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Oldest first
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &ActivityEntry> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_starts_with_white() {
        assert_eq!(DEFAULT_PALETTE[0].0, Rgb::WHITE);
    }

    #[test]
    fn log_is_bounded() {
        let mut log = ActivityLog::default();
        for i in 0..ActivityLog::CAPACITY + 5 {
            log.push(ActivityEntry::new(ActivityKind::Send, true, format!("entry {}", i)));
        }
        assert_eq!(log.len(), ActivityLog::CAPACITY);
        assert_eq!(log.entries().next().unwrap().message, "entry 5");
        assert_eq!(
            log.entries().next_back().unwrap().message,
            format!("entry {}", ActivityLog::CAPACITY + 4)
        );

        log.clear();
        assert!(log.is_empty());
    }
}
