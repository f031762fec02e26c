//! Sub-board entanglement bookkeeping.
//!
//! The operation log does not say which sub-boards share a controlled
//! gate, so links are recorded as moves are applied.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::{debug, instrument};

/// Symmetric adjacency between sub-boards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntanglementTracker {
    links: BTreeMap<usize, BTreeSet<usize>>,
}

impl EntanglementTracker {
    /// Creates a tracker with an empty adjacency set for each board.
    pub fn new(boards: usize) -> Self {
        Self {
            links: (0..boards).map(|b| (b, BTreeSet::new())).collect(),
        }
    }

    /// Links `a` and `b` in both directions.
    #[instrument(skip(self))]
    pub fn link(&mut self, a: usize, b: usize) {
        self.links.entry(a).or_default().insert(b);
        self.links.entry(b).or_default().insert(a);
        debug!(a, b, "Boards entangled");
    }

    /// Boards currently linked to `board`.
    pub fn linked(&self, board: usize) -> BTreeSet<usize> {
        self.links.get(&board).cloned().unwrap_or_default()
    }

    /// Every board reachable from `seed`, seed included.
    ///
    /// Visited boards lose their adjacency: once collapsed together they are
    /// no longer entangled.
    #[instrument(skip(self))]
    pub fn closure(&mut self, seed: &BTreeSet<usize>) -> BTreeSet<usize> {
        let mut visited = BTreeSet::new();
        let mut queue: VecDeque<usize> = seed.iter().copied().collect();

        while let Some(board) = queue.pop_front() {
            if !visited.insert(board) {
                continue;
            }
            if let Some(neighbours) = self.links.get_mut(&board) {
                queue.extend(neighbours.iter().copied());
                neighbours.clear();
            }
        }

        for neighbours in self.links.values_mut() {
            neighbours.retain(|b| !visited.contains(b));
        }

        debug!(?visited, "Entanglement closure computed");
        visited
    }

    /// Removes `board` from every adjacency set, including its own.
    #[instrument(skip(self))]
    pub fn unlink_all(&mut self, board: usize) {
        if let Some(neighbours) = self.links.get_mut(&board) {
            neighbours.clear();
        }
        for neighbours in self.links.values_mut() {
            neighbours.remove(&board);
        }
    }

    /// Clears every link.
    pub fn clear(&mut self) {
        for neighbours in self.links.values_mut() {
            neighbours.clear();
        }
    }

    /// Returns true if every link has its mirror.
    pub fn is_symmetric(&self) -> bool {
        self.links.iter().all(|(a, neighbours)| {
            neighbours
                .iter()
                .all(|b| self.links.get(b).is_some_and(|back| back.contains(a)))
        })
    }
}
