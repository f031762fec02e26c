//! Core domain types for quantum tic-tac-toe.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Number of cells on a sub-board.
pub const CELLS: usize = 9;

/// Mark produced when a cell collapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Mark {
    /// Player X.
    X,
    /// Player O.
    O,
}

impl Mark {
    /// Returns the opposing mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// State of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CellState {
    /// No mark, possibly carrying single-axis rotations awaiting measurement.
    #[default]
    Empty,
    /// Concrete mark, terminal until reset.
    Occupied(Mark),
    /// Control qubit or controlled-rotation target; no longer z-rotatable.
    Committed,
}

impl CellState {
    /// Returns the mark held by the cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            CellState::Occupied(mark) => Some(mark),
            CellState::Empty | CellState::Committed => None,
        }
    }

    /// Returns true if the cell holds a concrete mark.
    pub fn is_occupied(self) -> bool {
        matches!(self, CellState::Occupied(_))
    }
}

impl std::fmt::Display for CellState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellState::Empty => write!(f, " "),
            CellState::Occupied(mark) => write!(f, "{mark}"),
            CellState::Committed => write!(f, "z"),
        }
    }
}

/// Outcome of a sub-board or of the aggregate board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BoardStatus {
    /// Nothing decided yet.
    #[default]
    InProgress,
    /// Three in a row for one mark.
    Won(Mark),
    /// Full board without a winner, or simultaneous lines for both marks.
    Draw,
}

impl BoardStatus {
    /// Returns true once the board is decided.
    pub fn is_decided(self) -> bool {
        !matches!(self, BoardStatus::InProgress)
    }

    /// Returns the winning mark, if any.
    pub fn winner(self) -> Option<Mark> {
        match self {
            BoardStatus::Won(mark) => Some(mark),
            BoardStatus::InProgress | BoardStatus::Draw => None,
        }
    }
}

impl std::fmt::Display for BoardStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoardStatus::InProgress => write!(f, "in progress"),
            BoardStatus::Won(mark) => write!(f, "{mark} wins"),
            BoardStatus::Draw => write!(f, "draw"),
        }
    }
}

/// Rotation axis.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum Axis {
    /// Rotation around the x-axis.
    X,
    /// Rotation around the y-axis.
    Y,
    /// Rotation around the z-axis. Changes the symbol a cell collapses to.
    Z,
}

impl Axis {
    /// Returns true for the axis that scrambles the symbol basis.
    ///
    /// Committed cells may not be rotated around this axis.
    pub fn is_symbol_destructive(self) -> bool {
        matches!(self, Axis::Z)
    }
}

/// Kind of move a player can choose.
///
/// The `strum` serialization is the short key a front end shows to players.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
pub enum MoveKind {
    /// Rotate one or more cells around x.
    #[strum(serialize = "x")]
    RotateX,
    /// Rotate one or more cells around y.
    #[strum(serialize = "y")]
    RotateY,
    /// Rotate one or more cells around z.
    #[strum(serialize = "z")]
    RotateZ,
    /// Controlled rotation around x.
    #[strum(serialize = "cx")]
    ControlledX,
    /// Controlled rotation around y.
    #[strum(serialize = "cy")]
    ControlledY,
    /// Controlled rotation around z.
    #[strum(serialize = "cz")]
    ControlledZ,
    /// Measure a board and everything entangled with it.
    #[strum(serialize = "c")]
    Collapse,
}

impl MoveKind {
    /// Short key for the move.
    pub fn key(self) -> &'static str {
        self.into()
    }

    /// Human-readable description.
    pub fn description(self) -> &'static str {
        match self {
            MoveKind::RotateX => "x-rotation",
            MoveKind::RotateY => "y-rotation",
            MoveKind::RotateZ => "z-rotation",
            MoveKind::ControlledX => "controlled x-rotation",
            MoveKind::ControlledY => "controlled y-rotation",
            MoveKind::ControlledZ => "controlled z-rotation",
            MoveKind::Collapse => "collapse",
        }
    }

    /// Minimum number of eligible cells required to offer the move.
    pub fn min_empty(self) -> usize {
        match self {
            MoveKind::ControlledX | MoveKind::ControlledY | MoveKind::ControlledZ => 2,
            MoveKind::RotateX | MoveKind::RotateY | MoveKind::RotateZ | MoveKind::Collapse => 1,
        }
    }

    /// Rotation axis of the move, `None` for a collapse.
    pub fn axis(self) -> Option<Axis> {
        match self {
            MoveKind::RotateX | MoveKind::ControlledX => Some(Axis::X),
            MoveKind::RotateY | MoveKind::ControlledY => Some(Axis::Y),
            MoveKind::RotateZ | MoveKind::ControlledZ => Some(Axis::Z),
            MoveKind::Collapse => None,
        }
    }

    /// Returns true for the two-qubit moves.
    pub fn is_controlled(self) -> bool {
        matches!(
            self,
            MoveKind::ControlledX | MoveKind::ControlledY | MoveKind::ControlledZ
        )
    }

    /// Returns true if committed cells are eligible for this move.
    ///
    /// Only the single-qubit z-rotation excludes them.
    pub fn accepts_committed(self) -> bool {
        !(matches!(self.axis(), Some(axis) if axis.is_symbol_destructive()) && !self.is_controlled())
    }
}

impl std::fmt::Display for MoveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.description(), self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_move_keys_round_trip() {
        for kind in MoveKind::iter() {
            let parsed: MoveKind = kind.key().parse().expect("Key parses");
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_controlled_moves_need_two_cells() {
        assert_eq!(MoveKind::ControlledY.min_empty(), 2);
        assert_eq!(MoveKind::RotateX.min_empty(), 1);
        assert_eq!(MoveKind::Collapse.min_empty(), 1);
    }

    #[test]
    fn test_only_z_rotation_rejects_committed() {
        let rejecting: Vec<_> = MoveKind::iter().filter(|k| !k.accepts_committed()).collect();
        assert_eq!(rejecting, vec![MoveKind::RotateZ]);
    }

    #[test]
    fn test_collapse_has_no_axis() {
        assert_eq!(MoveKind::Collapse.axis(), None);
        assert_eq!(MoveKind::ControlledZ.axis(), Some(Axis::Z));
    }

    #[test]
    fn test_board_status_decided() {
        assert!(!BoardStatus::InProgress.is_decided());
        assert!(BoardStatus::Draw.is_decided());
        assert_eq!(BoardStatus::Won(Mark::O).winner(), Some(Mark::O));
    }
}
