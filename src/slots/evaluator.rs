//! Win evaluation over the settled grid
//!
//! The evaluator is pure: it reads an R-reels-by-C-rows grid of symbol ids
//! and classifies the outcome. A row wins when all R cells across the
//! reels match; a reel wins when all C cells of its column match. Any
//! winning row plus any winning reel upgrades the spin to a big win.
//! Forced outcomes go through the same classification: the evaluator is
//! the single source of truth, there is no separate "fake win" path.

use serde::{Deserialize, Serialize};

use super::SymbolId;

/// Settled R x C symbol matrix, column-major (one column per reel).
/// Produced fresh each spin and discarded after evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    reels: usize,
    rows: usize,
    cells: Vec<SymbolId>,
}

impl Grid {
    pub fn new(reels: usize, rows: usize) -> Self {
        Self {
            reels,
            rows,
            cells: vec![0; reels * rows],
        }
    }

    /// Build from per-reel columns (exit edge first), as read off settled
    /// reels. Columns must be non-empty and of equal length.
    pub fn from_columns(columns: &[Vec<SymbolId>]) -> Self {
        let reels = columns.len();
        let rows = columns.first().map_or(0, |c| c.len());
        debug_assert!(columns.iter().all(|c| c.len() == rows));

        let mut grid = Self::new(reels, rows);
        for (reel, column) in columns.iter().enumerate() {
            for (row, &symbol) in column.iter().enumerate() {
                grid.set(reel, row, symbol);
            }
        }
        grid
    }

    /// Build from row-major data, the way paytable examples read.
    pub fn from_rows(rows: &[Vec<SymbolId>]) -> Self {
        let row_count = rows.len();
        let reels = rows.first().map_or(0, |r| r.len());
        debug_assert!(rows.iter().all(|r| r.len() == reels));

        let mut grid = Self::new(reels, row_count);
        for (row, data) in rows.iter().enumerate() {
            for (reel, &symbol) in data.iter().enumerate() {
                grid.set(reel, row, symbol);
            }
        }
        grid
    }

    pub fn reels(&self) -> usize {
        self.reels
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn get(&self, reel: usize, row: usize) -> SymbolId {
        self.cells[reel * self.rows + row]
    }

    pub fn set(&mut self, reel: usize, row: usize, symbol: SymbolId) {
        self.cells[reel * self.rows + row] = symbol;
    }

    /// Force one symbol across a whole row (guaranteed horizontal win).
    pub fn set_row(&mut self, row: usize, symbol: SymbolId) {
        for reel in 0..self.reels {
            self.set(reel, row, symbol);
        }
    }

    /// Force one symbol down a whole reel (guaranteed vertical win).
    pub fn set_reel(&mut self, reel: usize, symbol: SymbolId) {
        for row in 0..self.rows {
            self.set(reel, row, symbol);
        }
    }
}

/// Classified spin outcome. Every simultaneous winning row and reel is
/// recorded; classification only asks whether each set is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpinOutcome {
    None,
    Vertical { reels: Vec<usize> },
    Horizontal { rows: Vec<usize> },
    BigWin { reels: Vec<usize>, rows: Vec<usize> },
}

/// Outcome class, the key into the multiplier table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinKind {
    None,
    Vertical,
    Horizontal,
    BigWin,
}

impl SpinOutcome {
    pub fn kind(&self) -> WinKind {
        match self {
            SpinOutcome::None => WinKind::None,
            SpinOutcome::Vertical { .. } => WinKind::Vertical,
            SpinOutcome::Horizontal { .. } => WinKind::Horizontal,
            SpinOutcome::BigWin { .. } => WinKind::BigWin,
        }
    }

    pub fn is_win(&self) -> bool {
        self.kind() != WinKind::None
    }
}

/// Classify a settled grid.
pub fn evaluate(grid: &Grid) -> SpinOutcome {
    let winning_rows: Vec<usize> = (0..grid.rows())
        .filter(|&row| {
            let first = grid.get(0, row);
            (1..grid.reels()).all(|reel| grid.get(reel, row) == first)
        })
        .collect();

    let winning_reels: Vec<usize> = (0..grid.reels())
        .filter(|&reel| {
            let first = grid.get(reel, 0);
            (1..grid.rows()).all(|row| grid.get(reel, row) == first)
        })
        .collect();

    match (winning_rows.is_empty(), winning_reels.is_empty()) {
        (false, false) => SpinOutcome::BigWin {
            reels: winning_reels,
            rows: winning_rows,
        },
        (false, true) => SpinOutcome::Horizontal { rows: winning_rows },
        (true, false) => SpinOutcome::Vertical {
            reels: winning_reels,
        },
        (true, true) => SpinOutcome::None,
    }
}
