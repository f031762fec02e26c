//! Quantum tic-tac-toe engine.
//!
//! Cells hold rotatable qubits instead of fixed marks. Players rotate cells,
//! entangle them with controlled rotations and collapse boards to turn
//! superposition into X and O. Ultimate mode plays on nine linked
//! sub-boards.
//!
//! # Architecture
//!
//! - **Rules**: win detection over nine cells
//! - **State**: sub-boards, per-turn bookkeeping and the pending circuit
//! - **Entanglement**: which sub-boards share a controlled rotation
//! - **Turn controller**: move legality, multi-step turns, forced boards
//! - **Collapse**: measurement through an [`Executor`]
//! - **Engine**: the facade a front end talks to
//!
//! # Example
//!
//! ```no_run
//! use quantum_tictactoe::{Axis, CellRef, Engine, Executor, GameConfig, Move, Rotation};
//!
//! # async fn example<E: Executor>(executor: E) -> Result<(), Box<dyn std::error::Error>> {
//! let mut engine = Engine::new(GameConfig::classic(), executor)?;
//! let rotation = Rotation::new(CellRef::new(0, 4), Axis::Y, 0.785, 1);
//! engine.play(Move::Rotate(rotation)).await?;
//! println!("{}", engine.circuit_string());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod circuit;
mod collapse;
mod config;
mod contracts;
mod engine;
mod entanglement;
mod error;
mod executor;
pub mod invariants;
pub mod rules;
mod state;
mod turn;
mod types;

// Crate-level exports - Domain types
pub use types::{Axis, BoardStatus, CELLS, CellState, Mark, MoveKind};

// Crate-level exports - Moves
pub use action::{CellRef, ControlledRotation, Move, MoveError, Rotation};

// Crate-level exports - Circuit and entanglement
pub use circuit::{Circuit, Operation, Qubit};
pub use entanglement::EntanglementTracker;

// Crate-level exports - Configuration
pub use config::{ConfigError, ForcedBoard, GameConfig};

// Crate-level exports - Executor contract
pub use executor::{Basis, Bitstring, Executor, ExecutorError};

// Crate-level exports - State and engine
pub use engine::{Collapsed, Engine};
pub use error::GameError;
pub use state::{GameState, SubBoard};
