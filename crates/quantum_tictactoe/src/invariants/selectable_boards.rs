//! Someone can always move while the game is undecided.

use super::Invariant;
use crate::GameState;

/// Invariant: the selectable set is non-empty, in range, and free of
/// decided boards while the aggregate game is undecided.
pub struct SelectableBoardsInvariant;

impl Invariant<GameState> for SelectableBoardsInvariant {
    fn holds(state: &GameState) -> bool {
        if state.aggregate_status().is_decided() {
            return true;
        }
        !state.selectable().is_empty()
            && state.selectable().iter().all(|&b| {
                state
                    .sub_board_status(b)
                    .is_some_and(|status| !status.is_decided())
            })
    }

    fn description() -> &'static str {
        "Selectable boards are non-empty and undecided while the game runs"
    }
}
