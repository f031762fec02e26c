//! Games played against the local simulator.

use quantum_tictactoe::{
    Axis, CellRef, CellState, ControlledRotation, Engine, GameConfig, Move, Rotation,
};
use quantum_tictactoe_sim::StateVectorExecutor;
use std::f64::consts::PI;
use tracing_subscriber::EnvFilter;

fn engine(config: GameConfig, seed: u64) -> Engine<StateVectorExecutor> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    Engine::new(config, StateVectorExecutor::seeded(seed)).expect("Valid config")
}

#[tokio::test]
async fn test_idle_control_never_marks() {
    let mut engine = engine(GameConfig::classic(), 1);

    engine
        .play(Move::Control(CellRef::new(0, 0)))
        .await
        .expect("Control");
    engine
        .play(Move::ControlledRotate(ControlledRotation::new(
            CellRef::new(0, 1),
            Axis::X,
            PI,
        )))
        .await
        .expect("Target");
    engine
        .play(Move::Collapse { board: Some(0) })
        .await
        .expect("Collapse");

    assert_eq!(engine.cell_state(0, 0), Some(CellState::Empty));
    assert_eq!(engine.cell_state(0, 1), Some(CellState::Empty));
}

#[tokio::test]
async fn test_full_flip_always_marks() {
    let mut engine = engine(GameConfig::classic().with_max_angle(PI), 2);

    engine
        .play(Move::Rotate(Rotation::new(CellRef::new(0, 4), Axis::X, PI, 1)))
        .await
        .expect("Rotate");
    engine
        .play(Move::Collapse { board: None })
        .await
        .expect("Collapse");

    let cell = engine.cell_state(0, 4).expect("Cell exists");
    assert!(cell.is_occupied());
}

#[tokio::test]
async fn test_ultimate_game_reaches_an_end() {
    let config = GameConfig::ultimate()
        .with_max_angle(PI)
        .with_turns_until_collapse(3);
    let mut engine = engine(config, 3);

    let mut turns = 0;
    while !engine.is_over() && turns < 500 {
        let board = engine.selectable_boards().iter().copied().next().expect("Open board");
        let cells = engine.available_cells(board, quantum_tictactoe::MoveKind::RotateX);
        let cell = *cells.first().expect("Open cell");
        engine
            .play(Move::Rotate(Rotation::new(CellRef::new(board, cell), Axis::X, PI, 1)))
            .await
            .expect("Legal move");
        turns += 1;
    }

    assert!(engine.is_over(), "Game should finish, played {turns} turns");
    assert!(engine.state().entanglement().is_symmetric());
}
