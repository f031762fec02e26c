//! Entanglement links always come in pairs.

use super::Invariant;
use crate::GameState;

/// Invariant: if board A is linked to B, B is linked to A.
pub struct SymmetricEntanglementInvariant;

impl Invariant<GameState> for SymmetricEntanglementInvariant {
    fn holds(state: &GameState) -> bool {
        state.entanglement().is_symmetric()
    }

    fn description() -> &'static str {
        "Entanglement links are symmetric"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameConfig;

    #[test]
    fn test_linked_pair_holds() {
        let mut state = GameState::new(GameConfig::ultimate());
        state.entanglement.link(1, 8);
        assert!(SymmetricEntanglementInvariant::holds(&state));
    }

    #[test]
    fn test_one_way_link_violates() {
        let mut state = GameState::new(GameConfig::ultimate());
        let json = serde_json::json!({ "links": { "0": [4], "4": [] } });
        state.entanglement = serde_json::from_value(json).expect("Valid tracker");
        assert!(!SymmetricEntanglementInvariant::holds(&state));
    }
}
