//! Error types for Magnet Board

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MagnetBoardError {
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("Delivery failed: {0}")]
    DeliveryFailed(DeliveryFailure),

    #[error("Invalid grid: {0}")]
    InvalidGrid(GridViolation),

    #[error("Palette overflow: {distinct} distinct colors, the compact alphabet holds {max}", max = crate::payload::MAX_PALETTE_COLORS)]
    PaletteOverflow { distinct: usize },

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid device address: {0}")]
    InvalidAddress(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MagnetBoardError>;

/// The last thing that went wrong while walking the candidate URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryFailure {
    /// The device answered, but not with a 2xx
    Http { url: String, status: u16, body: String },
    /// No HTTP response at all (refused, reset, timed out)
    Transport { url: String, message: String },
    /// There was nothing to try
    NoCandidates,
}

impl DeliveryFailure {
    pub fn status(&self) -> Option<u16> {
        match self {
            DeliveryFailure::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for DeliveryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryFailure::Http { url, status, body } if body.is_empty() => {
                write!(f, "{} answered HTTP {}", url, status)
            }
            DeliveryFailure::Http { url, status, body } => {
                write!(f, "{} answered HTTP {}: {}", url, status, body)
            }
            DeliveryFailure::Transport { url, message } => write!(f, "{}: {}", url, message),
            DeliveryFailure::NoCandidates => write!(f, "no candidate URLs"),
        }
    }
}

/// Why a full-grid payload was rejected, with the offending position
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridViolation {
    NotAnArray,
    RowCount { expected: usize, found: usize },
    RaggedRow { row: usize, expected: usize, found: usize },
    InvalidCellType { row: usize, col: usize },
    ColorTooLong { row: usize, col: usize, len: usize },
    CompactLength { expected: usize, found: usize },
    UnknownSymbol { position: usize, symbol: char },
}

impl fmt::Display for GridViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridViolation::NotAnArray => write!(f, "grid is not an array of rows"),
            GridViolation::RowCount { expected, found } => {
                write!(f, "expected {} rows, found {}", expected, found)
            }
            GridViolation::RaggedRow { row, expected, found } => {
                write!(f, "row {} has {} cells, expected {}", row, found, expected)
            }
            GridViolation::InvalidCellType { row, col } => {
                write!(f, "cell ({}, {}) is neither null nor a color string", row, col)
            }
            GridViolation::ColorTooLong { row, col, len } => {
                write!(f, "cell ({}, {}) color is {} characters long", row, col, len)
            }
            GridViolation::CompactLength { expected, found } => {
                write!(f, "compact string has {} cells, expected {}", found, expected)
            }
            GridViolation::UnknownSymbol { position, symbol } => {
                write!(f, "symbol '{}' at position {} has no palette entry", symbol, position)
            }
        }
    }
}
