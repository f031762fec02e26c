//! Active-set bookkeeping matches cell states.

use super::Invariant;
use crate::{CellState, GameState};

/// Invariant: every committed cell awaits measurement, and no cell awaiting
/// measurement already holds a mark.
pub struct ActiveCellsInvariant;

impl Invariant<GameState> for ActiveCellsInvariant {
    fn holds(state: &GameState) -> bool {
        (0..state.board_count()).all(|b| {
            let Some(board) = state.sub_board(b) else {
                return false;
            };
            board.cells().iter().enumerate().all(|(cell, s)| match s {
                CellState::Committed => board.active().contains(&cell),
                CellState::Occupied(_) => !board.active().contains(&cell),
                CellState::Empty => true,
            })
        })
    }

    fn description() -> &'static str {
        "Committed cells are active and marked cells are not"
    }
}
