//! Accumulated rotation operations awaiting measurement.
//!
//! The log is the engine's only record of superposition. Collapse submits a
//! slice of it to an executor and then discards what was measured.

use crate::{Axis, CELLS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::instrument;

/// Global qubit index: `board * 9 + cell`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Qubit(pub usize);

impl Qubit {
    /// Qubit backing a cell.
    pub fn of(board: usize, cell: usize) -> Self {
        Self(board * CELLS + cell)
    }

    /// Sub-board holding the qubit.
    pub fn board(self) -> usize {
        self.0 / CELLS
    }

    /// Cell within the sub-board.
    pub fn cell(self) -> usize {
        self.0 % CELLS
    }
}

impl std::fmt::Display for Qubit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// One gate in the operation log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Single-qubit rotation.
    Rotation {
        /// Rotation axis.
        axis: Axis,
        /// Angle in radians.
        angle: f64,
        /// Rotated qubit.
        qubit: Qubit,
    },
    /// Rotation of `target` conditioned on `control`.
    ControlledRotation {
        /// Rotation axis.
        axis: Axis,
        /// Angle in radians.
        angle: f64,
        /// Control qubit.
        control: Qubit,
        /// Target qubit.
        target: Qubit,
    },
}

impl Operation {
    /// Returns true if the operation acts on `qubit`.
    pub fn touches(&self, qubit: Qubit) -> bool {
        match *self {
            Operation::Rotation { qubit: q, .. } => q == qubit,
            Operation::ControlledRotation {
                control, target, ..
            } => control == qubit || target == qubit,
        }
    }

    /// Qubits the operation acts on.
    pub fn qubits(&self) -> Vec<Qubit> {
        match *self {
            Operation::Rotation { qubit, .. } => vec![qubit],
            Operation::ControlledRotation {
                control, target, ..
            } => vec![control, target],
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Rotation { axis, angle, qubit } => {
                write!(f, "r{axis}({angle:.3}) {qubit}")
            }
            Operation::ControlledRotation {
                axis,
                angle,
                control,
                target,
            } => write!(f, "cr{axis}({angle:.3}) {control} -> {target}"),
        }
    }
}

/// Ordered log of operations not yet measured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    operations: Vec<Operation>,
}

impl Circuit {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an operation.
    pub fn push(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    /// Returns true if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Number of pending operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Pending operations in application order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Iterates pending operations in application order.
    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }

    /// Ordered sub-log of operations touching any of `qubits`.
    #[instrument(skip(self, qubits))]
    pub fn restricted_to(&self, qubits: &BTreeSet<Qubit>) -> Vec<Operation> {
        self.operations
            .iter()
            .filter(|op| qubits.iter().any(|q| op.touches(*q)))
            .copied()
            .collect()
    }

    /// Drops every operation touching a measured qubit.
    #[instrument(skip(self, qubits))]
    pub fn discard(&mut self, qubits: &BTreeSet<Qubit>) {
        self.operations
            .retain(|op| !qubits.iter().any(|q| op.touches(*q)));
    }

    /// Drops everything.
    pub fn clear(&mut self) {
        self.operations.clear();
    }
}

impl std::fmt::Display for Circuit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.operations.is_empty() {
            return write!(f, "(empty)");
        }
        for (i, op) in self.operations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{op}")?;
        }
        Ok(())
    }
}
