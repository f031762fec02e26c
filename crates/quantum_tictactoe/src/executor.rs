//! Contract for the external capability that measures qubits.
//!
//! The engine never simulates amplitudes. It hands an executor the ordered
//! operations touching the measured qubits and reads back one sampled bit
//! per requested qubit.

use crate::{Operation, Qubit};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumIter};
use tracing::instrument;

/// Measurement basis.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, StrumDisplay, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum Basis {
    /// Computational basis: 1 means the cell holds a mark.
    Existence,
    /// Hadamard before measuring: 1 means X, 0 means O.
    Symbol,
}

/// Sampled outcome, one bit per requested qubit in request order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Bitstring(Vec<bool>);

impl Bitstring {
    /// Wraps bits.
    pub fn new(bits: Vec<bool>) -> Self {
        Self(bits)
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no bits.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bit at `index`.
    pub fn get(&self, index: usize) -> Option<bool> {
        self.0.get(index).copied()
    }

    /// All bits.
    pub fn bits(&self) -> &[bool] {
        &self.0
    }
}

impl From<Vec<bool>> for Bitstring {
    fn from(bits: Vec<bool>) -> Self {
        Self(bits)
    }
}

impl FromStr for Bitstring {
    type Err = ExecutorError;

    #[instrument]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(ExecutorError::new(format!(
                    "Invalid bit '{}' in result \"{}\"",
                    other, s
                ))),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl std::fmt::Display for Bitstring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for bit in &self.0 {
            write!(f, "{}", if *bit { '1' } else { '0' })?;
        }
        Ok(())
    }
}

/// Something that can run operations and sample a measurement.
///
/// Implementations must return exactly `qubits.len()` bits; anything else is
/// treated as a malformed result by the engine.
#[async_trait::async_trait]
pub trait Executor: Send + Sync {
    /// Applies `operations`, changes basis if requested, measures `qubits`.
    async fn execute(
        &self,
        operations: &[Operation],
        qubits: &[Qubit],
        basis: Basis,
    ) -> Result<Bitstring, ExecutorError>;
}

#[async_trait::async_trait]
impl<E: Executor + ?Sized> Executor for std::sync::Arc<E> {
    async fn execute(
        &self,
        operations: &[Operation],
        qubits: &[Qubit],
        basis: Basis,
    ) -> Result<Bitstring, ExecutorError> {
        (**self).execute(operations, qubits, basis).await
    }
}

/// Executor failure with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Executor error: {} at {}:{}", message, file, line)]
pub struct ExecutorError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ExecutorError {
    /// Creates a new executor error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bitstring() {
        let bits: Bitstring = "0110".parse().expect("Valid bits");
        assert_eq!(bits.bits(), &[false, true, true, false]);
        assert_eq!(bits.to_string(), "0110");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = "01x".parse::<Bitstring>().unwrap_err();
        assert!(err.message.contains("Invalid bit 'x'"));
    }

    #[test]
    fn test_empty_bitstring() {
        let bits: Bitstring = "".parse().expect("Empty is valid");
        assert!(bits.is_empty());
    }
}
