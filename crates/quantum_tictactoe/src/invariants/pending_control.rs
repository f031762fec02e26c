//! A pending control is a committed cell waiting for exactly one target.

use super::Invariant;
use crate::{CellState, GameState};

/// Invariant: the pending control cell is committed and the turn has
/// exactly one move left.
pub struct PendingControlInvariant;

impl Invariant<GameState> for PendingControlInvariant {
    fn holds(state: &GameState) -> bool {
        match state.control() {
            None => true,
            Some(at) => {
                state.cell_state(at.board, at.cell) == Some(CellState::Committed)
                    && state.moves_left_in_turn() == 1
            }
        }
    }

    fn description() -> &'static str {
        "Pending control is committed and awaits exactly one target"
    }
}
