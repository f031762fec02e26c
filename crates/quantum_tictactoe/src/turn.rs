//! Turn controller.
//!
//! Validates and applies rotation moves, tracks multi-step turns, decides
//! which boards the next turn may use and fires the automatic collapse.

use crate::action::{ControlledRotation, Rotation};
use crate::contracts::{ControlContract, ControlledRotateContract, Contract, RotateContract};
use crate::{
    CellRef, CellState, Collapsed, Engine, Executor, ForcedBoard, GameError, GameState, MoveKind,
    Operation,
};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

// ─────────────────────────────────────────────────────────────
//  Selection queries
// ─────────────────────────────────────────────────────────────

impl GameState {
    /// Cells of `board` a front end should offer for `kind`.
    ///
    /// Excludes marked cells, cells already touched this turn and, for the
    /// single z-rotation, committed cells.
    #[instrument(skip(self))]
    pub fn available_cells(&self, board: usize, kind: MoveKind) -> Vec<usize> {
        let Some(sub) = self.sub_board(board) else {
            return Vec::new();
        };
        sub.cells()
            .iter()
            .enumerate()
            .filter(|(cell, state)| {
                let eligible = match state {
                    CellState::Empty => true,
                    CellState::Committed => kind.accepts_committed(),
                    CellState::Occupied(_) => false,
                };
                eligible && !sub.touched().contains(cell)
            })
            .map(|(cell, _)| cell)
            .collect()
    }

    /// Selectable boards with at least one cell available for `kind`.
    #[instrument(skip(self))]
    pub fn available_boards(&self, kind: MoveKind) -> Vec<usize> {
        if self.aggregate_status().is_decided() {
            return Vec::new();
        }
        self.selectable()
            .iter()
            .copied()
            .filter(|&board| !self.available_cells(board, kind).is_empty())
            .collect()
    }

    /// Kinds from `candidates` with enough available cells on selectable boards.
    #[instrument(skip(self))]
    pub fn available_moves(&self, candidates: &[MoveKind]) -> Vec<MoveKind> {
        candidates
            .iter()
            .copied()
            .filter(|&kind| {
                let cells: usize = self
                    .available_boards(kind)
                    .into_iter()
                    .map(|board| self.available_cells(board, kind).len())
                    .sum();
                cells >= kind.min_empty()
            })
            .collect()
    }

    /// Applies the forced-board rule and starts the next player's turn.
    ///
    /// The selectable set is only recomputed here, at the turn boundary.
    #[instrument(skip(self))]
    pub(crate) fn end_turn(&mut self) {
        let open: BTreeSet<usize> = (0..self.board_count())
            .filter(|&b| {
                self.sub_board_status(b)
                    .is_some_and(|status| !status.is_decided())
            })
            .collect();

        let forced: BTreeSet<usize> = match self.config().forced_board() {
            ForcedBoard::SameBoard => (0..self.board_count())
                .filter(|&b| self.sub_board(b).is_some_and(|s| !s.touched().is_empty()))
                .collect(),
            ForcedBoard::CellIndex => self
                .boards
                .iter()
                .flat_map(|s| s.touched().iter().copied())
                .filter(|&cell| cell < self.board_count())
                .collect(),
        };

        let next: BTreeSet<usize> = forced.intersection(&open).copied().collect();
        self.selectable = if next.is_empty() { open } else { next };
        self.clear_turn_touched();
        self.to_move = self.to_move.opponent();
        debug!(selectable = ?self.selectable, to_move = %self.to_move, "Turn ended");
    }
}

// ─────────────────────────────────────────────────────────────
//  Moves
// ─────────────────────────────────────────────────────────────

impl<E: Executor> Engine<E> {
    /// Records one rotation step.
    ///
    /// The first step of a turn fixes how many steps the turn has. When the
    /// last one lands the turn advances, which may collapse every board.
    ///
    /// # Errors
    ///
    /// `IllegalMove` when a precondition fails; executor errors when the
    /// turn advance collapses. State is unchanged on error.
    #[instrument(skip(self), fields(target = %rotation.target, axis = %rotation.axis))]
    pub async fn rotate(&mut self, rotation: Rotation) -> Result<Collapsed, GameError> {
        let before = self.state.clone();
        let result = match RotateContract::pre(&self.state, &rotation) {
            Ok(()) => self.apply_rotation(rotation).await,
            Err(err) => Err(err.into()),
        };
        self.settle(before, result, RotateContract::post)
    }

    async fn apply_rotation(&mut self, rotation: Rotation) -> Result<Collapsed, GameError> {
        let at = rotation.target;
        let qubit = at.qubit();
        self.state.circuit.push(Operation::Rotation {
            axis: rotation.axis,
            angle: rotation.angle,
            qubit,
        });
        *self.state.spent.entry(qubit).or_default() += rotation.angle.abs();
        self.state.mark_touched(at);
        self.state.mark_active(at);
        self.state.leave_board(at.board);

        if self.state.moves_left_in_turn == 0 {
            self.state.moves_left_in_turn = rotation.planned;
        }
        self.state.moves_left_in_turn -= 1;
        debug!(
            %qubit,
            angle = rotation.angle,
            moves_left = self.state.moves_left_in_turn,
            "Rotation recorded"
        );

        if self.state.moves_left_in_turn == 0 {
            self.advance_turn().await
        } else {
            Ok(Collapsed::new())
        }
    }

    /// Selects the control qubit of a controlled rotation.
    ///
    /// # Errors
    ///
    /// `IllegalMove` unless the cell is empty, playable and the turn is at a
    /// boundary.
    #[instrument(skip(self), fields(control = %at))]
    pub fn set_control(&mut self, at: CellRef) -> Result<(), GameError> {
        let before = self.state.clone();
        let result = ControlContract::pre(&self.state, &at)
            .map_err(GameError::from)
            .map(|()| {
                self.state.control = Some(at);
                self.state.set_cell(at, CellState::Committed);
                self.state.mark_touched(at);
                self.state.mark_active(at);
                self.state.leave_board(at.board);
                self.state.moves_left_in_turn = 1;
                debug!("Control selected");
                Collapsed::new()
            });
        self.settle(before, result, ControlContract::post).map(|_| ())
    }

    /// Rotates the target conditioned on the selected control, entangling
    /// the two boards, and advances the turn.
    ///
    /// # Errors
    ///
    /// `IllegalMove` when no control is waiting or the target is not
    /// playable; executor errors when the turn advance collapses.
    #[instrument(skip(self), fields(target = %rotation.target, axis = %rotation.axis))]
    pub async fn apply_controlled_rotation(
        &mut self,
        rotation: ControlledRotation,
    ) -> Result<Collapsed, GameError> {
        let before = self.state.clone();
        let result = match ControlledRotateContract::pre(&self.state, &rotation) {
            Ok(()) => self.apply_controlled(rotation).await,
            Err(err) => Err(err.into()),
        };
        self.settle(before, result, ControlledRotateContract::post)
    }

    async fn apply_controlled(&mut self, rotation: ControlledRotation) -> Result<Collapsed, GameError> {
        let control = self
            .state
            .control
            .take()
            .ok_or_else(|| GameError::InvariantViolation("control vanished".to_string()))?;
        let target = rotation.target;

        self.state.circuit.push(Operation::ControlledRotation {
            axis: rotation.axis,
            angle: rotation.angle,
            control: control.qubit(),
            target: target.qubit(),
        });
        self.state.entanglement.link(control.board, target.board);
        self.state.set_cell(target, CellState::Committed);
        self.state.mark_touched(target);
        self.state.mark_active(target);
        self.state.leave_board(target.board);
        self.state.moves_left_in_turn = 0;
        debug!(%control, "Controlled rotation recorded");

        self.advance_turn().await
    }

    /// Counts a finished turn, collapsing everything once the configured
    /// number of turns has passed.
    #[instrument(skip(self))]
    pub(crate) async fn advance_turn(&mut self) -> Result<Collapsed, GameError> {
        self.state.turns_since_collapse += 1;
        let threshold = *self.state.config().turns_until_collapse();

        if self.state.turns_since_collapse >= threshold {
            info!(turns = self.state.turns_since_collapse, "Automatic collapse");
            // A collapse ends the turn itself
            return self.measure(None).await;
        }

        self.state.end_turn();
        Ok(Collapsed::new())
    }
}
