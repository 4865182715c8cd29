//! Grid state: an N×N matrix of cells

use crate::color::Rgb;

/// Largest grid the board accepts
pub const MAX_GRID_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(Rgb),
}

impl Cell {
    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }

    pub fn color(&self) -> Option<Rgb> {
        match self {
            Cell::Filled(color) => Some(*color),
            Cell::Empty => None,
        }
    }
}

/// Paint or erase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Draw,
    Erase,
}

impl Mode {
    pub fn toggle(&self) -> Self {
        match self {
            Mode::Draw => Mode::Erase,
            Mode::Erase => Mode::Draw,
        }
    }
}

/// Row-major N×N storage. Rows can't be ragged since there is only one buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// An all-empty grid. Panics on a size of 0 or above `MAX_GRID_SIZE`.
    pub fn new(size: usize) -> Self {
        assert!(
            (1..=MAX_GRID_SIZE).contains(&size),
            "grid size {} outside 1..={}",
            size,
            MAX_GRID_SIZE
        );
        Self {
            size,
            cells: vec![Cell::Empty; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.size && col < self.size,
            "cell ({}, {}) outside {}x{} grid",
            row,
            col,
            self.size,
            self.size
        );
        row * self.size + col
    }

    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[self.index(row, col)]
    }

    /// Store a cell, returning whether the stored value changed
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) -> bool {
        let idx = self.index(row, col);
        let changed = self.cells[idx] != cell;
        self.cells[idx] = cell;
        changed
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
    }

    /// Cells in row-major order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.size)
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_filled()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_square_and_empty() {
        let grid = Grid::new(5);
        assert_eq!(grid.size(), 5);
        assert_eq!(grid.rows().count(), 5);
        assert!(grid.rows().all(|row| row.len() == 5));
        assert_eq!(grid.filled_count(), 0);
    }

    #[test]
    fn set_reports_changes_only() {
        let mut grid = Grid::new(3);
        let red = Cell::Filled(Rgb::new(255, 0, 0));
        assert!(grid.set(1, 2, red));
        assert!(!grid.set(1, 2, red));
        assert_eq!(grid.get(1, 2), red);
        assert!(grid.set(1, 2, Cell::Empty));
    }

    #[test]
    fn clear_empties_everything() {
        let mut grid = Grid::new(4);
        grid.set(0, 0, Cell::Filled(Rgb::BLACK));
        grid.set(3, 3, Cell::Filled(Rgb::WHITE));
        grid.clear();
        assert_eq!(grid.filled_count(), 0);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn out_of_range_cell_is_a_contract_violation() {
        let grid = Grid::new(5);
        let _ = grid.get(5, 0);
    }

    #[test]
    fn mode_toggles_back_and_forth() {
        assert_eq!(Mode::Draw.toggle(), Mode::Erase);
        assert_eq!(Mode::Erase.toggle(), Mode::Draw);
    }
}
