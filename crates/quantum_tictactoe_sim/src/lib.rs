//! Local executor for the quantum tic-tac-toe engine.
//!
//! Simulates the qubits a collapse asks about with a dense state vector and
//! samples one shot per measurement request.
//!
//! ```no_run
//! use quantum_tictactoe::{Engine, GameConfig};
//! use quantum_tictactoe_sim::StateVectorExecutor;
//!
//! let _engine = Engine::new(GameConfig::ultimate(), StateVectorExecutor::new())?;
//! # Ok::<(), quantum_tictactoe::ConfigError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod executor;
mod register;

pub use executor::{DEFAULT_MAX_QUBITS, StateVectorExecutor};
pub use register::{Complex, Register};
