//! Game engine facade.
//!
//! Owns the game state and the executor, dispatches player moves and exposes
//! the read-only queries a front end needs.

use crate::contracts::{CollapseContract, Contract};
use crate::{
    BoardStatus, CELLS, CellRef, CellState, ConfigError, Executor, GameConfig, GameError,
    GameState, Mark, Move, MoveError, MoveKind,
};
use std::collections::BTreeSet;
use tracing::{info, instrument, warn};

/// Boards measured as a side effect of a move.
pub type Collapsed = BTreeSet<usize>;

/// Quantum tic-tac-toe engine.
///
/// One engine runs one game at a time. Calls must be serialized by the
/// owner; nothing here locks.
#[derive(Debug)]
pub struct Engine<E> {
    pub(crate) state: GameState,
    pub(crate) executor: E,
}

impl<E: Executor> Engine<E> {
    /// Creates an engine for a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is invalid.
    #[instrument(skip(executor))]
    pub fn new(config: GameConfig, executor: E) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(boards = config.board_count(), "Game created");
        Ok(Self {
            state: GameState::new(config),
            executor,
        })
    }

    /// Starts a new round with the same configuration.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.state = GameState::new(self.state.config().clone());
        info!("Game reset");
    }

    /// Applies a player move.
    ///
    /// # Errors
    ///
    /// Whatever the underlying operation reports. State is unchanged on
    /// error.
    #[instrument(skip(self), fields(action = %action))]
    pub async fn play(&mut self, action: Move) -> Result<Collapsed, GameError> {
        match action {
            Move::Rotate(rotation) => self.rotate(rotation).await,
            Move::Control(at) => self.set_control(at).map(|()| Collapsed::new()),
            Move::ControlledRotate(rotation) => self.apply_controlled_rotation(rotation).await,
            Move::Collapse { board } => self.collapse(board).await,
        }
    }

    /// Applies a move on behalf of `player`.
    ///
    /// # Errors
    ///
    /// `IllegalMove(WrongPlayer)` when `player` is not to move, otherwise as
    /// [`Engine::play`].
    #[instrument(skip(self), fields(action = %action))]
    pub async fn play_as(&mut self, player: Mark, action: Move) -> Result<Collapsed, GameError> {
        if player != self.state.to_move() {
            warn!(%player, "Move out of turn");
            return Err(MoveError::WrongPlayer(player).into());
        }
        self.play(action).await
    }

    /// Keeps or rolls back the outcome of a transition.
    ///
    /// Postconditions run in debug builds only.
    pub(crate) fn settle<T>(
        &mut self,
        before: GameState,
        result: Result<T, GameError>,
        post: fn(&GameState, &GameState) -> Result<(), GameError>,
    ) -> Result<T, GameError> {
        let result = result.and_then(|value| {
            #[cfg(debug_assertions)]
            post(&before, &self.state)?;
            #[cfg(not(debug_assertions))]
            let _ = post;
            Ok(value)
        });
        if let Err(err) = &result {
            warn!(error = %err, "Move rejected, state restored");
            self.state = before;
        }
        result
    }

    // ─────────────────────────────────────────────────────────────
    //  Queries
    // ─────────────────────────────────────────────────────────────

    /// Full game state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Configuration in use.
    pub fn config(&self) -> &GameConfig {
        self.state.config()
    }

    /// Executor in use.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Number of sub-boards.
    pub fn board_count(&self) -> usize {
        self.state.board_count()
    }

    /// Cells of a sub-board.
    pub fn board(&self, board: usize) -> Option<&[CellState; CELLS]> {
        self.state.board(board)
    }

    /// State of one cell.
    pub fn cell_state(&self, board: usize, cell: usize) -> Option<CellState> {
        self.state.cell_state(board, cell)
    }

    /// Outcome of one sub-board.
    pub fn sub_board_status(&self, board: usize) -> Option<BoardStatus> {
        self.state.sub_board_status(board)
    }

    /// Outcome of the whole game.
    pub fn aggregate_status(&self) -> BoardStatus {
        self.state.aggregate_status()
    }

    /// Returns true once the game is decided.
    pub fn is_over(&self) -> bool {
        self.aggregate_status().is_decided()
    }

    /// Player to move.
    pub fn to_move(&self) -> Mark {
        self.state.to_move()
    }

    /// See [`GameState::available_boards`].
    pub fn available_boards(&self, kind: MoveKind) -> Vec<usize> {
        self.state.available_boards(kind)
    }

    /// See [`GameState::available_cells`].
    pub fn available_cells(&self, board: usize, kind: MoveKind) -> Vec<usize> {
        if self.is_over() || !self.state.selectable().contains(&board) {
            return Vec::new();
        }
        self.state.available_cells(board, kind)
    }

    /// Kinds the current player may choose.
    ///
    /// Collapse is offered only at a turn boundary with no control pending.
    pub fn available_moves(&self, candidates: &[MoveKind]) -> Vec<MoveKind> {
        let collapse_open = CollapseContract::pre(&self.state, &None).is_ok();
        self.state
            .available_moves(candidates)
            .into_iter()
            .filter(|&kind| kind != MoveKind::Collapse || collapse_open)
            .collect()
    }

    /// Returns true if a control waits for its target.
    pub fn has_control(&self) -> bool {
        self.state.control().is_some()
    }

    /// Pending control.
    pub fn control(&self) -> Option<CellRef> {
        self.state.control()
    }

    /// Returns true if the current turn has steps left.
    pub fn has_moves_remaining_in_turn(&self) -> bool {
        self.state.moves_left_in_turn() > 0
    }

    /// Budget for single rotations on one cell per turn.
    pub fn max_angle(&self) -> f64 {
        *self.config().max_angle()
    }

    /// Budget for one controlled rotation.
    pub fn max_controlled_angle(&self) -> f64 {
        *self.config().max_controlled_angle()
    }

    /// Completed turns since the last collapse.
    pub fn turns_since_collapse(&self) -> u32 {
        self.state.turns_since_collapse()
    }

    /// Boards the current turn may use.
    pub fn selectable_boards(&self) -> &BTreeSet<usize> {
        self.state.selectable()
    }

    /// Boards currently entangled with `board`.
    pub fn entangled_with(&self, board: usize) -> BTreeSet<usize> {
        self.state.entanglement().linked(board)
    }

    /// Cells of `board` awaiting measurement.
    pub fn active_cells(&self, board: usize) -> BTreeSet<usize> {
        self.state
            .sub_board(board)
            .map(|sub| sub.active().clone())
            .unwrap_or_default()
    }

    /// Diagnostic listing of pending operations.
    pub fn circuit_string(&self) -> String {
        self.state.circuit().to_string()
    }
}
