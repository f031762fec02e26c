//! Game rules for quantum tic-tac-toe.
//!
//! Pure functions over nine cells. The same detector scores a sub-board
//! and, in ultimate mode, the aggregate board built from sub-board results.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::{LINES, LineCell, check_winner};
