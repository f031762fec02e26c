//! Engine error taxonomy.

use crate::{ExecutorError, MoveError};
use derive_more::{Display, Error, From};

/// Failure of an engine operation.
///
/// The game state is restored to its pre-call snapshot for every variant.
#[derive(Debug, Clone, Display, Error, From)]
pub enum GameError {
    /// Player-facing rejection; re-prompt and carry on.
    #[display("Illegal move: {}", _0)]
    IllegalMove(MoveError),

    /// The executor failed or timed out during a collapse.
    #[display("Executor unavailable: {}", _0)]
    ExecutorUnavailable(ExecutorError),

    /// The executor answered with the wrong number of bits.
    #[display("Malformed result: expected {} bits, got {}", expected, actual)]
    #[from(ignore)]
    MalformedResult {
        /// Requested qubit count.
        expected: usize,
        /// Returned bit count.
        actual: usize,
    },

    /// Internal consistency check failed. Indicates an engine bug.
    #[display("Invariant violation: {}", _0)]
    #[from(ignore)]
    InvariantViolation(#[error(not(source))] String),
}

impl GameError {
    /// Returns true for errors a player can recover from by choosing again.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, GameError::IllegalMove(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_illegal_move_is_recoverable() {
        let err: GameError = MoveError::NoControl.into();
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "Illegal move: No control qubit has been selected");
    }

    #[test]
    fn test_executor_failure_is_not_recoverable() {
        let err: GameError = ExecutorError::new("backend offline").into();
        assert!(!err.is_recoverable());
        assert!(matches!(err, GameError::ExecutorUnavailable(_)));
    }

    #[test]
    fn test_malformed_message() {
        let err = GameError::MalformedResult { expected: 3, actual: 1 };
        assert_eq!(err.to_string(), "Malformed result: expected 3 bits, got 1");
    }
}
