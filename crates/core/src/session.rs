//! Paint session - grid, current color, mode and the drag gesture in one place
//!
//! Every path that changes the color or the mode goes through here, so exactly
//! one of "a color is selected" and "erase is active" holds at any time.

use crate::color::Rgb;
use crate::grid::{Cell, Grid, Mode};

/// A cell that changed as the result of painting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellUpdate {
    pub row: usize,
    pub col: usize,
    pub cell: Cell,
}

#[derive(Debug, Clone)]
pub struct PaintSession {
    grid: Grid,
    color: Rgb,
    mode: Mode,
    is_painting: bool,
}

impl PaintSession {
    pub fn new(size: usize, color: Rgb) -> Self {
        Self {
            grid: Grid::new(size),
            color,
            mode: Mode::Draw,
            is_painting: false,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_painting(&self) -> bool {
        self.is_painting
    }

    /// The swatch that should be highlighted, if any
    pub fn highlighted_color(&self) -> Option<Rgb> {
        match self.mode {
            Mode::Draw => Some(self.color),
            Mode::Erase => None,
        }
    }

    /// Picking a color always returns to drawing
    pub fn select_color(&mut self, color: Rgb) {
        self.color = color;
        self.mode = Mode::Draw;
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn toggle_erase(&mut self) -> Mode {
        self.mode = self.mode.toggle();
        self.mode
    }

    /// Apply the current mode to one cell. Fills rather than flips, so repeating
    /// it is a no-op and returns `None`.
    pub fn toggle(&mut self, row: usize, col: usize) -> Option<CellUpdate> {
        let cell = match self.mode {
            Mode::Draw => Cell::Filled(self.color),
            Mode::Erase => Cell::Empty,
        };
        self.grid
            .set(row, col, cell)
            .then_some(CellUpdate { row, col, cell })
    }

    pub fn pointer_down(&mut self, row: usize, col: usize) -> Option<CellUpdate> {
        self.is_painting = true;
        self.toggle(row, col)
    }

    /// Re-applies the mode while a drag is in progress
    pub fn pointer_over(&mut self, row: usize, col: usize) -> Option<CellUpdate> {
        if !self.is_painting {
            return None;
        }
        self.toggle(row, col)
    }

    /// Pointer released anywhere, not only over the grid
    pub fn pointer_up(&mut self) {
        self.is_painting = false;
    }

    pub fn clear(&mut self) {
        self.grid.clear();
    }

    /// Start over with a grid of another size
    pub fn resize(&mut self, size: usize) {
        if size != self.grid.size() {
            self.grid = Grid::new(size);
        }
        self.is_painting = false;
    }
}
