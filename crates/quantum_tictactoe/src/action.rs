//! First-class move types.
//!
//! Moves are domain events: they carry the player's intent and are
//! validated against the game state before anything is applied.

use crate::{Axis, Mark, MoveKind, Qubit};
use derive_new::new;
use serde::{Deserialize, Serialize};

/// A cell on a specific sub-board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, new)]
pub struct CellRef {
    /// Sub-board index.
    pub board: usize,
    /// Cell index within the sub-board (0-8, row-major).
    pub cell: usize,
}

impl CellRef {
    /// Qubit backing this cell.
    pub fn qubit(self) -> Qubit {
        Qubit::of(self.board, self.cell)
    }
}

impl std::fmt::Display for CellRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "board {} cell {}", self.board, self.cell)
    }
}

/// One step of a single-qubit rotation turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, new)]
pub struct Rotation {
    /// Rotated cell.
    pub target: CellRef,
    /// Rotation axis.
    pub axis: Axis,
    /// Angle in radians.
    pub angle: f64,
    /// Number of rotations the player plans this turn.
    ///
    /// Read on the first step only.
    pub planned: usize,
}

impl Rotation {
    /// Single-qubit kind for this axis.
    pub fn kind(&self) -> MoveKind {
        match self.axis {
            Axis::X => MoveKind::RotateX,
            Axis::Y => MoveKind::RotateY,
            Axis::Z => MoveKind::RotateZ,
        }
    }
}

/// Second half of a controlled rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, new)]
pub struct ControlledRotation {
    /// Target cell.
    pub target: CellRef,
    /// Rotation axis.
    pub axis: Axis,
    /// Angle in radians.
    pub angle: f64,
}

/// A player action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Move {
    /// Rotate a cell.
    Rotate(Rotation),
    /// Select the control qubit of a controlled rotation.
    Control(CellRef),
    /// Rotate the target conditioned on the selected control.
    ControlledRotate(ControlledRotation),
    /// Measure a board and its entanglement closure, or every board.
    Collapse {
        /// Seed board, `None` for every board.
        board: Option<usize>,
    },
}

impl Move {
    /// Coarse kind of the move, for controlled steps the controlled kind of
    /// the given axis.
    pub fn kind(&self) -> Option<MoveKind> {
        match self {
            Move::Rotate(r) => Some(r.kind()),
            Move::ControlledRotate(r) => Some(match r.axis {
                Axis::X => MoveKind::ControlledX,
                Axis::Y => MoveKind::ControlledY,
                Axis::Z => MoveKind::ControlledZ,
            }),
            Move::Collapse { .. } => Some(MoveKind::Collapse),
            Move::Control(_) => None,
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Move::Rotate(r) => write!(f, "r{}({:.3}) on {}", r.axis, r.angle, r.target),
            Move::Control(cell) => write!(f, "control on {}", cell),
            Move::ControlledRotate(r) => {
                write!(f, "cr{}({:.3}) on {}", r.axis, r.angle, r.target)
            }
            Move::Collapse { board: Some(b) } => write!(f, "collapse board {}", b),
            Move::Collapse { board: None } => write!(f, "collapse all boards"),
        }
    }
}

/// Why a move was rejected. State is unchanged after any of these.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum MoveError {
    /// Board index outside the game.
    #[display("Board {} does not exist", _0)]
    BoardOutOfRange(usize),

    /// Cell index outside 0-8.
    #[display("Cell {} does not exist", _0)]
    CellOutOfRange(usize),

    /// Board is not in the selectable set this turn.
    #[display("Board {} is not selectable this turn", _0)]
    BoardNotSelectable(usize),

    /// Cell already holds a mark.
    #[display("{} already holds a mark", _0)]
    CellOccupied(CellRef),

    /// Committed cell targeted by a symbol-destructive rotation or a control.
    #[display("{} is committed", _0)]
    CellCommitted(CellRef),

    /// Rotation exceeds its budget.
    #[display("Angle {:.3} exceeds the budget of {:.3}", angle, max)]
    AngleTooLarge {
        /// Requested angle, or accumulated angle for the cell this turn.
        angle: f64,
        /// Budget.
        max: f64,
    },

    /// A rotation turn must plan at least one step.
    #[display("A turn needs at least one planned rotation")]
    NoPlannedRotations,

    /// More rotations planned than cells available on selectable boards.
    #[display("{} rotations planned but only {} cells are available", planned, available)]
    TooManyPlanned {
        /// Requested step count.
        planned: usize,
        /// Available cells for the rotation's kind.
        available: usize,
    },

    /// Controlled rotation without a selected control.
    #[display("No control qubit has been selected")]
    NoControl,

    /// A control is waiting for its target.
    #[display("Control on {} is waiting for its target", _0)]
    ControlPending(CellRef),

    /// Target and control are the same cell.
    #[display("{} cannot control itself", _0)]
    TargetIsControl(CellRef),

    /// Move only allowed at a turn boundary.
    #[display("{} moves remain in the current turn", _0)]
    TurnInProgress(usize),

    /// The aggregate game is decided.
    #[display("Game is already over")]
    GameOver,

    /// Move submitted on behalf of the player who is not to move.
    #[display("It is not {}'s turn", _0)]
    WrongPlayer(Mark),
}

impl std::error::Error for MoveError {}
