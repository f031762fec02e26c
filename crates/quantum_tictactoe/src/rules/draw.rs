//! Fullness check used for draw detection.

use super::win::LineCell;
use tracing::instrument;

/// Checks if every cell is filled.
///
/// Committed cells and decided sub-boards count as filled.
#[instrument(skip(cells))]
pub fn is_full<C: LineCell>(cells: &[C]) -> bool {
    cells.iter().all(LineCell::is_filled)
}
