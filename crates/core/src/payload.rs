//! Grid payload encodings sent to the device
//!
//! Three shapes exist on the wire:
//! - full grid: `{"grid": [[null | "#RRGGBB", ...], ...]}` posted to `/grid`
//! - palette compact: `{"compact": "0..1", "palette": ["#FF0000", ...]}` posted to `/grid`
//! - binary compact: `{"compact": "1000...1"}` posted to `/grid-simple`

use crate::color::{Rgb, MAX_COLOR_LEN};
use crate::error::{GridViolation, MagnetBoardError, Result};
use crate::grid::{Cell, Grid};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Index alphabet for palette-compact strings, one symbol per palette slot
pub const PALETTE_ALPHABET: &[u8; 62] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Distinct colors a palette-compact string can carry
pub const MAX_PALETTE_COLORS: usize = PALETTE_ALPHABET.len();

pub const EMPTY_SYMBOL: char = '.';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadFormat {
    Full,
    PaletteCompact,
    #[default]
    BinaryCompact,
}

impl PayloadFormat {
    pub const ALL: [PayloadFormat; 3] = [
        PayloadFormat::Full,
        PayloadFormat::PaletteCompact,
        PayloadFormat::BinaryCompact,
    ];

    /// Device path that ingests this format
    pub fn endpoint(&self) -> &'static str {
        match self {
            PayloadFormat::Full | PayloadFormat::PaletteCompact => "/grid",
            PayloadFormat::BinaryCompact => "/grid-simple",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PayloadFormat::Full => "Full grid (colors)",
            PayloadFormat::PaletteCompact => "Compact + palette",
            PayloadFormat::BinaryCompact => "Compact on/off",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullGridPayload {
    pub grid: Vec<Vec<Option<String>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteCompactPayload {
    pub compact: String,
    pub palette: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryCompactPayload {
    pub compact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GridPayload {
    Full(FullGridPayload),
    PaletteCompact(PaletteCompactPayload),
    BinaryCompact(BinaryCompactPayload),
}

impl GridPayload {
    pub fn format(&self) -> PayloadFormat {
        match self {
            GridPayload::Full(_) => PayloadFormat::Full,
            GridPayload::PaletteCompact(_) => PayloadFormat::PaletteCompact,
            GridPayload::BinaryCompact(_) => PayloadFormat::BinaryCompact,
        }
    }

    pub fn endpoint(&self) -> &'static str {
        self.format().endpoint()
    }
}

impl Grid {
    /// Rows of `null` or `#RRGGBB`
    pub fn serialize_full(&self) -> FullGridPayload {
        let grid = self
            .rows()
            .map(|row| row.iter().map(|cell| cell.color().map(|c| c.to_hex())).collect())
            .collect();
        FullGridPayload { grid }
    }

    /// One symbol per cell, palette in first-seen row-major order
    pub fn serialize_palette_compact(&self) -> Result<PaletteCompactPayload> {
        let mut palette: Vec<Rgb> = Vec::new();
        let mut symbols: HashMap<Rgb, char> = HashMap::new();
        let mut compact = String::with_capacity(self.cells().len());

        for cell in self.cells() {
            match cell {
                Cell::Empty => compact.push(EMPTY_SYMBOL),
                Cell::Filled(color) => {
                    let symbol = match symbols.get(color) {
                        Some(symbol) => *symbol,
                        None => {
                            let index = palette.len();
                            if index >= PALETTE_ALPHABET.len() {
                                return Err(MagnetBoardError::PaletteOverflow {
                                    distinct: self.distinct_colors(),
                                });
                            }
                            let symbol = PALETTE_ALPHABET[index] as char;
                            palette.push(*color);
                            symbols.insert(*color, symbol);
                            symbol
                        }
                    };
                    compact.push(symbol);
                }
            }
        }

        Ok(PaletteCompactPayload {
            compact,
            palette: palette.iter().map(Rgb::to_hex).collect(),
        })
    }

    /// `'1'` for filled and `'0'` for empty; colors are dropped
    pub fn serialize_binary_compact(&self) -> BinaryCompactPayload {
        let compact = self
            .cells()
            .iter()
            .map(|cell| if cell.is_filled() { '1' } else { '0' })
            .collect();
        BinaryCompactPayload { compact }
    }

    fn distinct_colors(&self) -> usize {
        let mut seen: Vec<Rgb> = Vec::new();
        for color in self.cells().iter().filter_map(Cell::color) {
            if !seen.contains(&color) {
                seen.push(color);
            }
        }
        seen.len()
    }
}

impl PaletteCompactPayload {
    /// Rebuild the grid by mapping each symbol back through the palette
    pub fn decode(&self, size: usize) -> Result<Grid> {
        let expected = size * size;
        let found = self.compact.chars().count();
        if found != expected {
            return Err(MagnetBoardError::InvalidGrid(GridViolation::CompactLength {
                expected,
                found,
            }));
        }

        let palette = self
            .palette
            .iter()
            .map(|text| Rgb::parse(text))
            .collect::<Result<Vec<_>>>()?;

        let mut grid = Grid::new(size);
        for (position, symbol) in self.compact.chars().enumerate() {
            if symbol == EMPTY_SYMBOL {
                continue;
            }
            let color = PALETTE_ALPHABET
                .iter()
                .position(|&b| b as char == symbol)
                .and_then(|index| palette.get(index))
                .ok_or(MagnetBoardError::InvalidGrid(GridViolation::UnknownSymbol {
                    position,
                    symbol,
                }))?;
            grid.set(position / size, position % size, Cell::Filled(*color));
        }
        Ok(grid)
    }
}

impl BinaryCompactPayload {
    /// Filled/empty per cell in row-major order
    pub fn filled_mask(&self) -> Vec<bool> {
        self.compact.chars().map(|c| c == '1').collect()
    }
}

/// Check the shape of a full-grid value before it goes anywhere
pub fn validate_full_grid(grid: &Value, size: usize) -> std::result::Result<(), GridViolation> {
    let rows = grid.as_array().ok_or(GridViolation::NotAnArray)?;
    if rows.len() != size {
        return Err(GridViolation::RowCount {
            expected: size,
            found: rows.len(),
        });
    }

    for (r, row) in rows.iter().enumerate() {
        let cells = row.as_array().ok_or(GridViolation::RaggedRow {
            row: r,
            expected: size,
            found: 0,
        })?;
        if cells.len() != size {
            return Err(GridViolation::RaggedRow {
                row: r,
                expected: size,
                found: cells.len(),
            });
        }
        for (c, value) in cells.iter().enumerate() {
            match value {
                Value::Null => {}
                Value::String(color) if color.len() > MAX_COLOR_LEN => {
                    return Err(GridViolation::ColorTooLong {
                        row: r,
                        col: c,
                        len: color.len(),
                    });
                }
                Value::String(_) => {}
                _ => return Err(GridViolation::InvalidCellType { row: r, col: c }),
            }
        }
    }
    Ok(())
}

/// Serialize the grid in the requested format. The full form is validated first
/// and a bad shape blocks the send.
pub fn build_payload(grid: &Grid, format: PayloadFormat) -> Result<GridPayload> {
    match format {
        PayloadFormat::Full => {
            let payload = grid.serialize_full();
            let value = serde_json::to_value(&payload.grid)
                .map_err(|e| MagnetBoardError::InvalidColor(e.to_string()))?;
            validate_full_grid(&value, grid.size()).map_err(MagnetBoardError::InvalidGrid)?;
            Ok(GridPayload::Full(payload))
        }
        PayloadFormat::PaletteCompact => grid.serialize_palette_compact().map(GridPayload::PaletteCompact),
        PayloadFormat::BinaryCompact => Ok(GridPayload::BinaryCompact(grid.serialize_binary_compact())),
    }
}
