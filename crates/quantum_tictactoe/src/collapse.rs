//! Collapse protocol.
//!
//! Measures a board together with everything it is entangled with, or every
//! board at once, and turns the sampled bits into marks.

use crate::contracts::{CollapseContract, Contract};
use crate::{
    Basis, Bitstring, CellRef, CellState, Collapsed, Engine, Executor, ExecutorError, GameError,
    Mark, Operation, Qubit,
};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

impl<E: Executor> Engine<E> {
    /// Collapses `board` and its entanglement closure, or every board when
    /// `board` is `None`.
    ///
    /// Returns the boards in the closure. A closure without active cells is
    /// left untouched and no measurement is requested.
    ///
    /// # Errors
    ///
    /// `IllegalMove` mid-turn, while a control is pending or for a board that
    /// may not be chosen; `ExecutorUnavailable` and `MalformedResult` when
    /// measurement fails. State is unchanged on error.
    #[instrument(skip(self))]
    pub async fn collapse(&mut self, board: Option<usize>) -> Result<Collapsed, GameError> {
        let before = self.state.clone();
        let result = match CollapseContract::pre(&self.state, &board) {
            Ok(()) => self.measure(board).await,
            Err(err) => Err(err.into()),
        };
        self.settle(before, result, CollapseContract::post)
    }

    /// Runs the measurement and applies its outcome.
    ///
    /// Callers snapshot and restore state around this on error.
    pub(crate) async fn measure(&mut self, board: Option<usize>) -> Result<Collapsed, GameError> {
        let closure = match board {
            Some(seed) => self.state.entanglement.closure(&BTreeSet::from([seed])),
            None => {
                self.state.entanglement.clear();
                (0..self.state.board_count()).collect()
            }
        };

        let cells: Vec<CellRef> = closure
            .iter()
            .filter_map(|&b| self.state.sub_board(b).map(|sub| (b, sub)))
            .flat_map(|(b, sub)| sub.active().iter().map(move |&cell| CellRef::new(b, cell)))
            .collect();

        if cells.is_empty() && board.is_some() {
            debug!(?closure, "Nothing to measure");
            return Ok(closure);
        }

        let idle = closure
            .iter()
            .find(|&&b| self.state.sub_board(b).is_some_and(|s| s.active().is_empty()));
        if let (true, Some(idle)) = (board.is_some() && closure.len() > 1, idle) {
            return Err(GameError::InvariantViolation(format!(
                "Entangled board {} has no active cells",
                idle
            )));
        }

        let qubits: Vec<Qubit> = cells.iter().map(|c| c.qubit()).collect();
        let measured: BTreeSet<Qubit> = qubits.iter().copied().collect();
        let operations = self.state.circuit.restricted_to(&measured);
        if let Some(stray) = operations
            .iter()
            .flat_map(Operation::qubits)
            .find(|q| !measured.contains(q))
        {
            return Err(GameError::InvariantViolation(format!(
                "Operation reaches unmeasured qubit {}",
                stray
            )));
        }

        let (existence, symbol) = if qubits.is_empty() {
            (Bitstring::default(), Bitstring::default())
        } else {
            let timeout = self.state.config().executor_timeout();
            futures::try_join!(
                request(&self.executor, &operations, &qubits, Basis::Existence, timeout),
                request(&self.executor, &operations, &qubits, Basis::Symbol, timeout),
            )?
        };

        for (i, &at) in cells.iter().enumerate() {
            if self.state.cell_state(at.board, at.cell).is_some_and(CellState::is_occupied) {
                continue;
            }
            let outcome = match (existence.get(i), symbol.get(i)) {
                (Some(false), _) => CellState::Empty,
                (Some(true), Some(true)) => CellState::Occupied(Mark::X),
                (Some(true), Some(false)) => CellState::Occupied(Mark::O),
                _ => {
                    return Err(GameError::MalformedResult {
                        expected: qubits.len(),
                        actual: existence.len().min(symbol.len()),
                    });
                }
            };
            self.state.set_cell(at, outcome);
        }

        for &b in &closure {
            self.state.clear_active(b);
        }
        if board.is_none() {
            self.state.circuit.clear();
        } else {
            self.state.circuit.discard(&measured);
        }
        for &b in &closure {
            if self.state.refresh_status(b).is_decided() {
                self.state.entanglement.unlink_all(b);
            }
        }

        self.state.turns_since_collapse = 0;
        self.state.control = None;
        self.state.moves_left_in_turn = 0;
        // Marks are settled, so the next turn is a free choice
        self.state.clear_turn_touched();
        self.state.end_turn();

        info!(
            boards = ?closure,
            measured = qubits.len(),
            outcome = %self.state.aggregate_status(),
            "Collapsed"
        );
        Ok(closure)
    }
}

/// Submits one measurement request and checks the result shape.
#[instrument(skip(executor, operations, qubits), fields(qubits = qubits.len()))]
async fn request<E: Executor>(
    executor: &E,
    operations: &[Operation],
    qubits: &[Qubit],
    basis: Basis,
    timeout: Option<Duration>,
) -> Result<Bitstring, GameError> {
    let call = executor.execute(operations, qubits, basis);
    let bits = match timeout {
        Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
            warn!(?limit, %basis, "Executor timed out");
            ExecutorError::new(format!("No {} result within {:?}", basis, limit))
        })?,
        None => call.await,
    }
    .inspect_err(|e| warn!(error = %e, %basis, "Executor failed"))?;

    if bits.len() != qubits.len() {
        warn!(expected = qubits.len(), actual = bits.len(), %basis, "Malformed result");
        return Err(GameError::MalformedResult {
            expected: qubits.len(),
            actual: bits.len(),
        });
    }
    debug!(%basis, %bits, "Measured");
    Ok(bits)
}
