//! Contract-based validation for moves.
//!
//! Contracts formalize Hoare-style reasoning: {P} action {Q}. Preconditions
//! reject illegal moves before anything changes; postconditions re-check the
//! invariant set after the transition in debug builds.

use crate::action::{ControlledRotation, MoveError, Rotation};
use crate::invariants::check_game;
use crate::{CellRef, CellState, GameError, GameState};
use tracing::{instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// A contract defines preconditions and postconditions for state transitions.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), MoveError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), GameError>;
}

// ─────────────────────────────────────────────────────────────
//  Shared Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: the aggregate game is undecided.
pub struct GameRunning;

impl GameRunning {
    #[instrument(skip(state))]
    pub fn check(state: &GameState) -> Result<(), MoveError> {
        if state.aggregate_status().is_decided() {
            Err(MoveError::GameOver)
        } else {
            Ok(())
        }
    }
}

/// Precondition: board and cell indices exist.
pub struct CellInRange;

impl CellInRange {
    #[instrument(skip(state))]
    pub fn check(state: &GameState, at: CellRef) -> Result<(), MoveError> {
        if at.board >= state.board_count() {
            return Err(MoveError::BoardOutOfRange(at.board));
        }
        if at.cell >= crate::CELLS {
            return Err(MoveError::CellOutOfRange(at.cell));
        }
        Ok(())
    }
}

/// Precondition: the board is in this turn's selectable set.
pub struct BoardSelectable;

impl BoardSelectable {
    #[instrument(skip(state))]
    pub fn check(state: &GameState, board: usize) -> Result<(), MoveError> {
        if state.selectable().contains(&board) {
            Ok(())
        } else {
            Err(MoveError::BoardNotSelectable(board))
        }
    }
}

/// Precondition: the cell holds no mark.
pub struct CellUnmarked;

impl CellUnmarked {
    #[instrument(skip(state))]
    pub fn check(state: &GameState, at: CellRef) -> Result<(), MoveError> {
        match state.cell_state(at.board, at.cell) {
            Some(CellState::Occupied(_)) => Err(MoveError::CellOccupied(at)),
            Some(_) => Ok(()),
            None => Err(MoveError::CellOutOfRange(at.cell)),
        }
    }
}

/// Precondition: no control is waiting for a target.
pub struct NoPendingControl;

impl NoPendingControl {
    #[instrument(skip(state))]
    pub fn check(state: &GameState) -> Result<(), MoveError> {
        match state.control() {
            Some(control) => Err(MoveError::ControlPending(control)),
            None => Ok(()),
        }
    }
}

/// Precondition: the previous turn is complete.
pub struct TurnBoundary;

impl TurnBoundary {
    #[instrument(skip(state))]
    pub fn check(state: &GameState) -> Result<(), MoveError> {
        match state.moves_left_in_turn() {
            0 => Ok(()),
            left => Err(MoveError::TurnInProgress(left)),
        }
    }
}

/// Composite precondition for any cell a move lands on.
pub struct PlayableCell;

impl PlayableCell {
    #[instrument(skip(state))]
    pub fn check(state: &GameState, at: CellRef) -> Result<(), MoveError> {
        GameRunning::check(state)?;
        CellInRange::check(state, at)?;
        BoardSelectable::check(state, at.board)?;
        CellUnmarked::check(state, at)?;
        Ok(())
    }
}

/// Precondition: a turn plans between one step and the number of cells it
/// could reach.
pub struct PlannedWithinReach;

impl PlannedWithinReach {
    #[instrument(skip(state, action), fields(planned = action.planned))]
    pub fn check(state: &GameState, action: &Rotation) -> Result<(), MoveError> {
        if action.planned == 0 {
            return Err(MoveError::NoPlannedRotations);
        }
        let kind = action.kind();
        let available: usize = state
            .available_boards(kind)
            .into_iter()
            .map(|board| state.available_cells(board, kind).len())
            .sum();
        if action.planned > available {
            return Err(MoveError::TooManyPlanned {
                planned: action.planned,
                available,
            });
        }
        Ok(())
    }
}

/// Postcondition shared by every transition: the invariant set holds.
#[instrument(skip(_before, after))]
fn invariants_hold(_before: &GameState, after: &GameState) -> Result<(), GameError> {
    check_game(after).map_err(|descriptions| {
        warn!(%descriptions, "Postcondition failed");
        GameError::InvariantViolation(format!("Postcondition failed: {}", descriptions))
    })
}

// ─────────────────────────────────────────────────────────────
//  Rotation Contract
// ─────────────────────────────────────────────────────────────

/// Contract for one step of a single-qubit rotation turn.
///
/// Preconditions:
/// - Cell playable and not marked
/// - No control waiting
/// - Committed cells reject the symbol-destructive axis
/// - Angle within the per-cell budget for this turn
/// - First step plans at least one rotation and no more than the
///   available cells
pub struct RotateContract;

impl Contract<GameState, Rotation> for RotateContract {
    fn pre(state: &GameState, action: &Rotation) -> Result<(), MoveError> {
        PlayableCell::check(state, action.target)?;
        NoPendingControl::check(state)?;

        let at = action.target;
        if action.axis.is_symbol_destructive()
            && state.cell_state(at.board, at.cell) == Some(CellState::Committed)
        {
            return Err(MoveError::CellCommitted(at));
        }

        let max = *state.config().max_angle();
        let total = state.spent(at.qubit()) + action.angle.abs();
        // NaN fails the comparison and is rejected
        if !(total <= max) {
            return Err(MoveError::AngleTooLarge { angle: total, max });
        }

        if state.moves_left_in_turn() == 0 {
            PlannedWithinReach::check(state, action)?;
        }
        Ok(())
    }

    fn post(before: &GameState, after: &GameState) -> Result<(), GameError> {
        invariants_hold(before, after)
    }
}

// ─────────────────────────────────────────────────────────────
//  Control Contract
// ─────────────────────────────────────────────────────────────

/// Contract for selecting the control qubit.
///
/// Preconditions:
/// - Turn boundary, no other control waiting
/// - Cell playable and still empty
pub struct ControlContract;

impl Contract<GameState, CellRef> for ControlContract {
    fn pre(state: &GameState, at: &CellRef) -> Result<(), MoveError> {
        PlayableCell::check(state, *at)?;
        NoPendingControl::check(state)?;
        TurnBoundary::check(state)?;
        if state.cell_state(at.board, at.cell) == Some(CellState::Committed) {
            return Err(MoveError::CellCommitted(*at));
        }
        Ok(())
    }

    fn post(before: &GameState, after: &GameState) -> Result<(), GameError> {
        invariants_hold(before, after)
    }
}

// ─────────────────────────────────────────────────────────────
//  Controlled Rotation Contract
// ─────────────────────────────────────────────────────────────

/// Contract for the target half of a controlled rotation.
///
/// Preconditions:
/// - A control is waiting and differs from the target
/// - Target playable and not marked
/// - Angle within the controlled budget
pub struct ControlledRotateContract;

impl Contract<GameState, ControlledRotation> for ControlledRotateContract {
    fn pre(state: &GameState, action: &ControlledRotation) -> Result<(), MoveError> {
        let control = state.control().ok_or(MoveError::NoControl)?;
        PlayableCell::check(state, action.target)?;
        if control == action.target {
            return Err(MoveError::TargetIsControl(control));
        }

        let max = *state.config().max_controlled_angle();
        let angle = action.angle.abs();
        if !(angle <= max) {
            return Err(MoveError::AngleTooLarge { angle, max });
        }
        Ok(())
    }

    fn post(before: &GameState, after: &GameState) -> Result<(), GameError> {
        invariants_hold(before, after)
    }
}

// ─────────────────────────────────────────────────────────────
//  Collapse Contract
// ─────────────────────────────────────────────────────────────

/// Contract for a collapse chosen as a move.
///
/// Preconditions:
/// - Game running, turn boundary, no control waiting
/// - Seed board, when given, exists and is selectable
pub struct CollapseContract;

impl Contract<GameState, Option<usize>> for CollapseContract {
    fn pre(state: &GameState, board: &Option<usize>) -> Result<(), MoveError> {
        GameRunning::check(state)?;
        NoPendingControl::check(state)?;
        TurnBoundary::check(state)?;
        if let Some(board) = *board {
            if board >= state.board_count() {
                return Err(MoveError::BoardOutOfRange(board));
            }
            BoardSelectable::check(state, board)?;
        }
        Ok(())
    }

    fn post(before: &GameState, after: &GameState) -> Result<(), GameError> {
        invariants_hold(before, after)
    }
}
