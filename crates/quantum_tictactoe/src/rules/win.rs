//! Win detection.

use crate::{BoardStatus, CellState, Mark};
use tracing::instrument;

/// The eight winning lines in row-major cell order.
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2], [3, 4, 5], [6, 7, 8], // Rows
    [0, 3, 6], [1, 4, 7], [2, 5, 8], // Columns
    [0, 4, 8], [2, 4, 6],             // Diagonals
];

/// A value that can sit in one of the nine slots of a line check.
pub trait LineCell {
    /// Mark contributed to a line, if any.
    fn mark(&self) -> Option<Mark>;

    /// Whether the slot counts toward a full board.
    fn is_filled(&self) -> bool;
}

impl LineCell for CellState {
    fn mark(&self) -> Option<Mark> {
        CellState::mark(*self)
    }

    fn is_filled(&self) -> bool {
        *self != CellState::Empty
    }
}

impl LineCell for BoardStatus {
    fn mark(&self) -> Option<Mark> {
        self.winner()
    }

    fn is_filled(&self) -> bool {
        self.is_decided()
    }
}

/// Evaluates nine cells in row-major order.
///
/// Completed lines for two different marks yield a draw even when the board
/// is not full, since a single collapse can complete both at once.
#[instrument(skip(cells))]
pub fn check_winner<C: LineCell>(cells: &[C; 9]) -> BoardStatus {
    let mut winner: Option<Mark> = None;

    for [a, b, c] in LINES {
        let Some(mark) = cells[a].mark() else {
            continue;
        };
        if cells[b].mark() != Some(mark) || cells[c].mark() != Some(mark) {
            continue;
        }
        match winner {
            None => winner = Some(mark),
            Some(existing) if existing != mark => return BoardStatus::Draw,
            Some(_) => {}
        }
    }

    match winner {
        Some(mark) => BoardStatus::Won(mark),
        None if super::is_full(cells) => BoardStatus::Draw,
        None => BoardStatus::InProgress,
    }
}
