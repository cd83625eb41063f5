//! Level grid: a row-major 2-D arrangement of pieces
//!
//! A cell whose piece has zero lives is out of play. The live cells form the
//! active set the ball collides with.

use serde::{Deserialize, Serialize};

use super::piece::Piece;
use super::rect::Rect;
use crate::config::GameConfig;

/// Parsed level description: initial lives per cell, row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub rows: usize,
    pub cols: usize,
    pub lives: Vec<u32>,
}

impl LevelLayout {
    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        if row < self.rows && col < self.cols {
            self.lives.get(row * self.cols + col).copied()
        } else {
            None
        }
    }
}

/// The pieces of the level in play
///
/// Only serialized for snapshots; a grid is always built from a layout so
/// `cells` matches `rows * cols`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LevelGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Piece>,
}

impl LevelGrid {
    /// A grid with no cells (trivially cleared)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Lay out blocks for `layout`: one block per cell, spaced by the block gap
    /// and starting just below the HUD bar
    pub fn from_layout(layout: &LevelLayout, config: &GameConfig) -> Self {
        let mut cells = Vec::with_capacity(layout.rows * layout.cols);
        for row in 0..layout.rows {
            for col in 0..layout.cols {
                let x = config.block_gap + col as f32 * (config.block_width + config.block_gap);
                let y = config.hud_height
                    + config.block_gap
                    + row as f32 * (config.block_height + config.block_gap);
                let lives = layout.get(row, col).unwrap_or(0);
                cells.push(Piece::block(
                    Rect::new(x, y, config.block_width, config.block_height),
                    lives,
                ));
            }
        }
        Self {
            rows: layout.rows,
            cols: layout.cols,
            cells,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// (row, col) of a flat cell index
    pub fn coords(&self, index: usize) -> (usize, usize) {
        if self.cols == 0 {
            (0, 0)
        } else {
            (index / self.cols, index % self.cols)
        }
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Piece> {
        self.index(row, col).and_then(|i| self.cells.get(i))
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Piece> {
        let i = self.index(row, col)?;
        self.cells.get_mut(i)
    }

    /// Replace the piece in a cell. Returns false if out of range.
    pub fn set(&mut self, row: usize, col: usize, piece: Piece) -> bool {
        match self.index(row, col).and_then(|i| self.cells.get_mut(i)) {
            Some(cell) => {
                *cell = piece;
                true
            }
            None => false,
        }
    }

    pub(crate) fn cell(&self, index: usize) -> &Piece {
        &self.cells[index]
    }

    pub(crate) fn cell_mut(&mut self, index: usize) -> &mut Piece {
        &mut self.cells[index]
    }

    /// Every cell with its coordinates, row-major
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Piece)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, piece)| (i / self.cols.max(1), i % self.cols.max(1), piece))
    }

    /// Pieces still in play
    pub fn active(&self) -> impl Iterator<Item = (usize, usize, &Piece)> {
        self.iter().filter(|(_, _, piece)| !piece.is_destroyed())
    }

    pub fn active_count(&self) -> usize {
        self.cells.iter().filter(|p| !p.is_destroyed()).count()
    }

    /// Level is cleared when every cell has zero lives
    pub fn has_won(&self) -> bool {
        self.cells.iter().all(|p| p.is_destroyed())
    }

    /// Knock out every piece
    pub fn clear_all(&mut self) {
        for piece in &mut self.cells {
            piece.force_clear();
        }
    }

    /// First live piece scanning from the bottom row up, left to right
    pub fn lowest_active(&self) -> Option<(usize, usize)> {
        (0..self.rows)
            .rev()
            .flat_map(|row| (0..self.cols).map(move |col| (row, col)))
            .find(|&(row, col)| self.get(row, col).is_some_and(|p| !p.is_destroyed()))
    }

    /// Lives of every cell, row-major
    pub fn lives(&self) -> Vec<u32> {
        self.cells.iter().map(|p| p.lives()).collect()
    }
}
