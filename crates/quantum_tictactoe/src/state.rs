//! Board state store.
//!
//! Holds every sub-board plus the per-turn bookkeeping. Mutators are
//! crate-private: legality lives in the turn controller and collapse
//! protocol, not here.

use crate::rules::check_winner;
use crate::{
    BoardStatus, CELLS, CellRef, CellState, Circuit, EntanglementTracker, GameConfig, Mark, Qubit,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::instrument;

/// One 3x3 grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubBoard {
    cells: [CellState; CELLS],
    touched: BTreeSet<usize>,
    active: BTreeSet<usize>,
    status: BoardStatus,
}

impl SubBoard {
    /// Creates an empty sub-board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> &[CellState; CELLS] {
        &self.cells
    }

    /// Cells touched during the current turn.
    pub fn touched(&self) -> &BTreeSet<usize> {
        &self.touched
    }

    /// Cells carrying rotations that await measurement.
    pub fn active(&self) -> &BTreeSet<usize> {
        &self.active
    }

    /// Cached outcome.
    pub fn status(&self) -> BoardStatus {
        self.status
    }

    /// Number of cells still holding no mark.
    pub fn unmarked(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_occupied()).count()
    }
}

/// Complete game state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub(crate) config: GameConfig,
    pub(crate) boards: Vec<SubBoard>,
    pub(crate) to_move: Mark,
    pub(crate) control: Option<CellRef>,
    pub(crate) moves_left_in_turn: usize,
    pub(crate) turns_since_collapse: u32,
    pub(crate) selectable: BTreeSet<usize>,
    pub(crate) entanglement: EntanglementTracker,
    pub(crate) circuit: Circuit,
    pub(crate) spent: BTreeMap<Qubit, f64>,
}

impl GameState {
    /// Creates a fresh game.
    #[instrument]
    pub fn new(config: GameConfig) -> Self {
        let boards = config.board_count();
        Self {
            boards: vec![SubBoard::new(); boards],
            to_move: Mark::X,
            control: None,
            moves_left_in_turn: 0,
            turns_since_collapse: 0,
            selectable: (0..boards).collect(),
            entanglement: EntanglementTracker::new(boards),
            circuit: Circuit::new(),
            spent: BTreeMap::new(),
            config,
        }
    }

    /// Configuration the game was created with.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Number of sub-boards.
    pub fn board_count(&self) -> usize {
        self.boards.len()
    }

    /// Sub-board at `board`.
    pub fn sub_board(&self, board: usize) -> Option<&SubBoard> {
        self.boards.get(board)
    }

    /// Cells of sub-board `board`.
    pub fn board(&self, board: usize) -> Option<&[CellState; CELLS]> {
        self.boards.get(board).map(SubBoard::cells)
    }

    /// State of one cell.
    pub fn cell_state(&self, board: usize, cell: usize) -> Option<CellState> {
        self.boards.get(board)?.cells.get(cell).copied()
    }

    /// Cached outcome of a sub-board.
    pub fn sub_board_status(&self, board: usize) -> Option<BoardStatus> {
        self.boards.get(board).map(SubBoard::status)
    }

    /// Outcome of the whole game.
    ///
    /// Classic mode reports the single board; ultimate mode scores the
    /// sub-board outcomes as a board of their own.
    pub fn aggregate_status(&self) -> BoardStatus {
        if !self.config.is_ultimate() {
            return self.boards[0].status;
        }
        let mut outcomes = [BoardStatus::InProgress; CELLS];
        for (slot, board) in outcomes.iter_mut().zip(&self.boards) {
            *slot = board.status;
        }
        check_winner(&outcomes)
    }

    /// Player whose turn it is. X opens every round.
    pub fn to_move(&self) -> Mark {
        self.to_move
    }

    /// Pending control, if a controlled rotation is half done.
    pub fn control(&self) -> Option<CellRef> {
        self.control
    }

    /// Moves remaining in a multi-step turn.
    pub fn moves_left_in_turn(&self) -> usize {
        self.moves_left_in_turn
    }

    /// Completed turns since the last collapse.
    pub fn turns_since_collapse(&self) -> u32 {
        self.turns_since_collapse
    }

    /// Boards the current turn may use.
    pub fn selectable(&self) -> &BTreeSet<usize> {
        &self.selectable
    }

    /// Entanglement links.
    pub fn entanglement(&self) -> &EntanglementTracker {
        &self.entanglement
    }

    /// Operations awaiting measurement.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Rotation already spent on `qubit` this turn.
    pub fn spent(&self, qubit: Qubit) -> f64 {
        self.spent.get(&qubit).copied().unwrap_or(0.0)
    }

    pub(crate) fn set_cell(&mut self, at: CellRef, state: CellState) {
        self.boards[at.board].cells[at.cell] = state;
    }

    pub(crate) fn mark_touched(&mut self, at: CellRef) {
        self.boards[at.board].touched.insert(at.cell);
    }

    pub(crate) fn mark_active(&mut self, at: CellRef) {
        self.boards[at.board].active.insert(at.cell);
    }

    /// Drops `board` from the selectable set after a step lands on it, when
    /// the game spreads turns over distinct boards and another board remains.
    pub(crate) fn leave_board(&mut self, board: usize) {
        if *self.config.distinct_boards_in_turn() && self.selectable.len() > 1 {
            self.selectable.remove(&board);
        }
    }

    pub(crate) fn clear_active(&mut self, board: usize) {
        self.boards[board].active.clear();
    }

    pub(crate) fn clear_turn_touched(&mut self) {
        for board in &mut self.boards {
            board.touched.clear();
        }
        self.spent.clear();
    }

    pub(crate) fn refresh_status(&mut self, board: usize) -> BoardStatus {
        let sub = &mut self.boards[board];
        sub.status = check_winner(&sub.cells);
        sub.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_classic_state() {
        let state = GameState::new(GameConfig::classic());
        assert_eq!(state.board_count(), 1);
        assert_eq!(state.selectable().len(), 1);
        assert_eq!(state.board(0), Some(&[CellState::Empty; CELLS]));
        assert_eq!(state.aggregate_status(), BoardStatus::InProgress);
        assert!(state.board(1).is_none());
    }

    #[test]
    fn test_new_ultimate_state() {
        let state = GameState::new(GameConfig::ultimate());
        assert_eq!(state.board_count(), 9);
        assert_eq!(state.selectable(), &(0..9).collect::<BTreeSet<_>>());
    }

    #[test]
    fn test_refresh_status() {
        let mut state = GameState::new(GameConfig::classic());
        for cell in [2, 4, 6] {
            state.set_cell(CellRef::new(0, cell), CellState::Occupied(Mark::O));
        }
        assert_eq!(state.sub_board_status(0), Some(BoardStatus::InProgress));
        assert_eq!(state.refresh_status(0), BoardStatus::Won(Mark::O));
        assert_eq!(state.aggregate_status(), BoardStatus::Won(Mark::O));
    }

    #[test]
    fn test_aggregate_in_ultimate() {
        let mut state = GameState::new(GameConfig::ultimate());
        for board in [0, 3, 6] {
            for cell in [0, 1, 2] {
                state.set_cell(CellRef::new(board, cell), CellState::Occupied(Mark::X));
            }
            state.refresh_status(board);
        }
        assert_eq!(state.aggregate_status(), BoardStatus::Won(Mark::X));
    }

    #[test]
    fn test_clear_turn_touched() {
        let mut state = GameState::new(GameConfig::classic());
        let at = CellRef::new(0, 5);
        state.mark_touched(at);
        state.mark_active(at);
        state.spent.insert(at.qubit(), 0.4);
        state.clear_turn_touched();
        assert!(state.sub_board(0).unwrap().touched().is_empty());
        assert!(state.sub_board(0).unwrap().active().contains(&5));
        assert_eq!(state.spent(at.qubit()), 0.0);
    }

    #[test]
    fn test_state_serializes_for_front_ends() {
        let state = GameState::new(GameConfig::ultimate());
        let json = serde_json::to_value(&state).expect("Serializable");
        assert_eq!(json["to_move"], "X");
        assert_eq!(json["selectable"].as_array().map(Vec::len), Some(9));
        assert_eq!(json["boards"][4]["status"], "InProgress");
    }
}
