//! Side (player) state

use std::collections::HashMap;

use zoroark_protocol::Player;

use super::conditions::{SideCondition, SideConditionState};
use super::pokemon::PokemonState;

/// One player's side of the battle
///
/// Pokemon are stored in reveal order, not party order — the opponent's team
/// is discovered incrementally from preview and switch messages. Once-per-
/// battle mechanic usage is tracked here because a side that already mega
/// evolved (or dynamaxed, etc.) can never do it again this battle.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SideState {
    /// Player identifier (P1, P2, etc.)
    #[cfg_attr(feature = "serde", serde(serialize_with = "super::serialize_player"))]
    pub player: Player,

    /// Player's username
    pub username: String,

    /// Pokemon on this side (reveal order)
    pub pokemon: Vec<PokemonState>,

    /// Announced team size, if known
    pub team_size: Option<u8>,

    /// Currently active Pokemon indices, one entry per slot
    pub active_indices: Vec<Option<usize>>,

    /// Side conditions (hazards, screens, etc.)
    #[cfg_attr(feature = "serde", serde(serialize_with = "super::serialize_conditions"))]
    pub conditions: HashMap<SideCondition, SideConditionState>,

    // === Once-per-battle mechanics ===
    pub used_mega: bool,
    pub used_zmove: bool,
    pub used_dynamax: bool,
    pub used_tera: bool,

    /// Whether this side may have an unresolved Illusion in play; while set,
    /// identity-consistency failures degrade to warnings instead of errors.
    pub illusion_suspect: bool,
}

impl SideState {
    /// Create a new side state
    pub fn new(player: Player, username: impl Into<String>) -> Self {
        Self {
            player,
            username: username.into(),
            pokemon: Vec::new(),
            team_size: None,
            active_indices: vec![None], // Default to singles
            conditions: HashMap::new(),
            used_mega: false,
            used_zmove: false,
            used_dynamax: false,
            used_tera: false,
            illusion_suspect: false,
        }
    }

    /// Set the number of active slots (1 for singles, 2 for doubles, etc.)
    pub fn set_active_slots(&mut self, count: usize) {
        self.active_indices.resize(count, None);
    }

    /// Get the active Pokemon at a slot (0-indexed)
    pub fn active(&self, slot: usize) -> Option<&PokemonState> {
        self.active_indices
            .get(slot)
            .and_then(|idx| idx.as_ref())
            .and_then(|&idx| self.pokemon.get(idx))
    }

    /// Get the active Pokemon at a slot mutably
    pub fn active_mut(&mut self, slot: usize) -> Option<&mut PokemonState> {
        if let Some(Some(idx)) = self.active_indices.get(slot) {
            let idx = *idx;
            self.pokemon.get_mut(idx)
        } else {
            None
        }
    }

    /// Get the first active Pokemon (convenience for singles)
    pub fn active_pokemon(&self) -> Option<&PokemonState> {
        self.active(0)
    }

    /// Iterate over all active Pokemon
    pub fn get_active(&self) -> impl Iterator<Item = &PokemonState> {
        self.active_indices
            .iter()
            .filter_map(|idx| idx.as_ref())
            .filter_map(|&idx| self.pokemon.get(idx))
    }

    /// Iterate over bench Pokemon (not active, not fainted) with indices
    pub fn get_bench(&self) -> impl Iterator<Item = (usize, &PokemonState)> {
        let active_set: std::collections::HashSet<usize> =
            self.active_indices.iter().filter_map(|idx| *idx).collect();

        self.pokemon
            .iter()
            .enumerate()
            .filter(move |(idx, poke)| !active_set.contains(idx) && poke.is_alive())
    }

    /// Count non-fainted Pokemon
    pub fn alive_count(&self) -> usize {
        self.pokemon.iter().filter(|p| p.is_alive()).count()
    }

    /// Count fainted Pokemon
    pub fn fainted_count(&self) -> usize {
        self.pokemon.iter().filter(|p| p.fainted).count()
    }

    /// Whether every announced team member has been revealed
    pub fn is_full(&self) -> bool {
        self.team_size
            .map(|size| self.pokemon.len() >= size as usize)
            .unwrap_or(false)
    }

    /// Find a Pokemon by name (nickname or species)
    pub fn find_pokemon(&self, name: &str) -> Option<usize> {
        self.pokemon
            .iter()
            .position(|p| p.name() == name || p.species == name || p.base_species == name)
    }

    /// Find a Pokemon by name and get a mutable reference
    pub fn find_pokemon_mut(&mut self, name: &str) -> Option<&mut PokemonState> {
        self.find_pokemon(name).map(|idx| &mut self.pokemon[idx])
    }

    /// Get a Pokemon by index
    pub fn get_pokemon(&self, index: usize) -> Option<&PokemonState> {
        self.pokemon.get(index)
    }

    /// Get a Pokemon by index mutably
    pub fn get_pokemon_mut(&mut self, index: usize) -> Option<&mut PokemonState> {
        self.pokemon.get_mut(index)
    }

    // === Side conditions ===

    /// Check if side has a condition
    pub fn has_condition(&self, cond: SideCondition) -> bool {
        self.conditions.contains_key(&cond)
    }

    /// Get layers for a condition (0 if not present)
    pub fn condition_layers(&self, cond: SideCondition) -> u8 {
        self.conditions.get(&cond).map_or(0, |s| s.layers)
    }

    /// Add a side condition.
    /// Returns true if a layer was added (false when already at max layers).
    pub fn add_condition(&mut self, cond: SideCondition) -> bool {
        if let Some(state) = self.conditions.get_mut(&cond) {
            state.add_layer(cond)
        } else {
            self.conditions.insert(cond, SideConditionState::new());
            true
        }
    }

    /// Remove a side condition
    pub fn remove_condition(&mut self, cond: SideCondition) -> bool {
        self.conditions.remove(&cond).is_some()
    }

    /// Clear all side conditions
    pub fn clear_conditions(&mut self) {
        self.conditions.clear();
    }

    /// Check if any hazards are set
    pub fn has_hazards(&self) -> bool {
        self.conditions.keys().any(|c| c.is_hazard())
    }

    /// Check if any screens are active
    pub fn has_screens(&self) -> bool {
        self.conditions.keys().any(|c| c.is_screen())
    }

    // === Active slot management ===

    /// Set the active Pokemon at a slot, running switch-out/in hooks
    pub fn set_active(&mut self, slot: usize, pokemon_index: Option<usize>) {
        if slot >= self.active_indices.len() {
            return;
        }

        if let Some(old_idx) = self.active_indices[slot]
            && let Some(old_poke) = self.pokemon.get_mut(old_idx)
        {
            old_poke.on_switch_out();
        }

        self.active_indices[slot] = pokemon_index;

        if let Some(idx) = pokemon_index
            && let Some(new_poke) = self.pokemon.get_mut(idx)
        {
            new_poke.on_switch_in();
        }
    }

    /// Find the active slot for a Pokemon index
    pub fn find_active_slot(&self, pokemon_index: usize) -> Option<usize> {
        self.active_indices
            .iter()
            .position(|idx| *idx == Some(pokemon_index))
    }

    /// Check if all Pokemon have fainted
    pub fn all_fainted(&self) -> bool {
        !self.pokemon.is_empty() && self.pokemon.iter().all(|p| p.fainted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_side() -> SideState {
        let mut side = SideState::new(Player::P1, "TestUser");

        let mut poke1 = PokemonState::new("Pikachu", 50);
        poke1.hp_current = 100;

        let mut poke2 = PokemonState::new("Charizard", 50);
        poke2.hp_current = 100;

        let mut poke3 = PokemonState::new("Blastoise", 50);
        poke3.set_fainted();

        side.pokemon.push(poke1);
        side.pokemon.push(poke2);
        side.pokemon.push(poke3);

        side
    }

    #[test]
    fn test_new_side() {
        let side = SideState::new(Player::P1, "Alice");
        assert_eq!(side.player, Player::P1);
        assert_eq!(side.username, "Alice");
        assert!(side.pokemon.is_empty());
        assert_eq!(side.active_indices.len(), 1);
        assert!(!side.used_mega && !side.used_dynamax);
    }

    #[test]
    fn test_set_active_slots() {
        let mut side = SideState::new(Player::P1, "Test");
        side.set_active_slots(2);
        assert_eq!(side.active_indices.len(), 2);
    }

    #[test]
    fn test_bench_excludes_active_and_fainted() {
        let mut side = create_test_side();
        side.active_indices[0] = Some(0); // Pikachu active

        let bench: Vec<_> = side.get_bench().collect();
        assert_eq!(bench.len(), 1);
        assert_eq!(bench[0].1.species, "Charizard");
    }

    #[test]
    fn test_alive_and_fainted_counts() {
        let side = create_test_side();
        assert_eq!(side.alive_count(), 2);
        assert_eq!(side.fainted_count(), 1);
    }

    #[test]
    fn test_is_full() {
        let mut side = create_test_side();
        assert!(!side.is_full());

        side.team_size = Some(3);
        assert!(side.is_full());

        side.team_size = Some(6);
        assert!(!side.is_full());
    }

    #[test]
    fn test_find_pokemon_by_name_or_species() {
        let mut side = create_test_side();
        side.pokemon[0].identity.nickname = Some("Sparky".to_string());

        assert_eq!(side.find_pokemon("Sparky"), Some(0));
        assert_eq!(side.find_pokemon("Pikachu"), Some(0));
        assert_eq!(side.find_pokemon("Charizard"), Some(1));
        assert_eq!(side.find_pokemon("Mewtwo"), None);
    }

    #[test]
    fn test_safeguard_set_transitions() {
        let mut side = SideState::new(Player::P1, "Test");

        assert!(!side.has_condition(SideCondition::Safeguard));
        side.add_condition(SideCondition::Safeguard);
        assert!(side.has_condition(SideCondition::Safeguard));
        side.remove_condition(SideCondition::Safeguard);
        assert!(!side.has_condition(SideCondition::Safeguard));
        assert!(side.conditions.is_empty());
    }

    #[test]
    fn test_spikes_stack_to_cap() {
        let mut side = SideState::new(Player::P2, "Test");

        assert!(side.add_condition(SideCondition::Spikes));
        assert!(side.add_condition(SideCondition::Spikes));
        assert!(side.add_condition(SideCondition::Spikes));
        assert_eq!(side.condition_layers(SideCondition::Spikes), 3);

        // Fourth application is a no-op at the cap
        assert!(!side.add_condition(SideCondition::Spikes));
        assert_eq!(side.condition_layers(SideCondition::Spikes), 3);
    }

    #[test]
    fn test_set_active_runs_switch_hooks() {
        let mut side = create_test_side();

        side.set_active(0, Some(0));
        assert!(side.pokemon[0].active);

        side.pokemon[0].boosts.atk = 2;
        side.set_active(0, Some(1));
        assert!(!side.pokemon[0].active);
        assert!(side.pokemon[0].boosts.is_clear());
        assert!(side.pokemon[1].active);
    }

    #[test]
    fn test_all_fainted() {
        let mut side = create_test_side();
        assert!(!side.all_fainted());

        for poke in &mut side.pokemon {
            poke.set_fainted();
        }
        assert!(side.all_fainted());
    }
}
