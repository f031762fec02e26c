//! Shared test helpers.

#![allow(dead_code)]

use quantum_tictactoe::{Basis, Bitstring, Executor, ExecutorError, Operation, Qubit};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Installs a test subscriber once; later calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One recorded executor request.
#[derive(Debug, Clone)]
pub struct Call {
    pub operations: Vec<Operation>,
    pub qubits: Vec<Qubit>,
    pub basis: Basis,
}

/// Executor answering from per-basis queues.
///
/// An empty queue answers with `fill` bits for every requested qubit.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    existence: Mutex<VecDeque<Result<Bitstring, ExecutorError>>>,
    symbol: Mutex<VecDeque<Result<Bitstring, ExecutorError>>>,
    fill: (bool, bool),
    delay: Option<Duration>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every unscripted qubit exists (`exists`) with symbol bit `symbol`.
    pub fn filled(exists: bool, symbol: bool) -> Self {
        Self {
            fill: (exists, symbol),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push(&self, basis: Basis, answer: Result<Bitstring, ExecutorError>) {
        let queue = match basis {
            Basis::Existence => &self.existence,
            Basis::Symbol => &self.symbol,
        };
        queue.lock().expect("Queue lock").push_back(answer);
    }

    pub fn push_bits(&self, basis: Basis, bits: &str) {
        self.push(basis, Ok(bits.parse().expect("Valid bits")));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("Calls lock").clone()
    }
}

#[async_trait::async_trait]
impl Executor for ScriptedExecutor {
    async fn execute(
        &self,
        operations: &[Operation],
        qubits: &[Qubit],
        basis: Basis,
    ) -> Result<Bitstring, ExecutorError> {
        self.calls.lock().expect("Calls lock").push(Call {
            operations: operations.to_vec(),
            qubits: qubits.to_vec(),
            basis,
        });

        let (queue, fill) = match basis {
            Basis::Existence => (&self.existence, self.fill.0),
            Basis::Symbol => (&self.symbol, self.fill.1),
        };
        let scripted = queue.lock().expect("Queue lock").pop_front();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        scripted.unwrap_or_else(|| Ok(Bitstring::new(vec![fill; qubits.len()])))
    }
}
