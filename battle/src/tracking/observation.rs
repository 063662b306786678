//! Immutable per-turn snapshots

use zoroark_protocol::Player;

use crate::types::{FieldState, PokemonState, SideState, Weather};

/// An immutable snapshot committed once per completed turn.
///
/// Carries the field, every side's cumulative team knowledge (which includes
/// side conditions and active combatants), and the ordered raw protocol
/// lines processed during that turn. Useful for replay/debugging and for
/// agents that want a turn-indexed history instead of only current state.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Observation {
    /// The turn this snapshot closes (0 = pre-battle setup)
    pub turn: u32,

    /// Field state at the boundary
    pub field: FieldState,

    /// Every initialized side, cloned as known at the boundary
    pub sides: Vec<SideState>,

    /// Raw protocol lines processed during this turn, in arrival order
    pub events: Vec<String>,
}

impl Observation {
    /// Weather at the boundary
    pub fn weather(&self) -> Option<Weather> {
        self.field.weather
    }

    /// A player's side in this snapshot
    pub fn side(&self, player: Player) -> Option<&SideState> {
        self.sides.iter().find(|s| s.player == player)
    }

    /// A player's active combatants in this snapshot
    pub fn active(&self, player: Player) -> Vec<&PokemonState> {
        self.side(player)
            .map(|s| s.get_active().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SideState;

    #[test]
    fn test_side_lookup() {
        let obs = Observation {
            turn: 3,
            field: FieldState::new(),
            sides: vec![
                SideState::new(Player::P1, "Alice"),
                SideState::new(Player::P2, "Bob"),
            ],
            events: vec!["|turn|3".to_string()],
        };

        assert_eq!(obs.side(Player::P1).unwrap().username, "Alice");
        assert_eq!(obs.side(Player::P2).unwrap().username, "Bob");
        assert!(obs.side(Player::P3).is_none());
        assert!(obs.active(Player::P1).is_empty());
    }
}
