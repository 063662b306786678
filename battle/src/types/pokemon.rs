//! Combatant state types

use std::collections::HashMap;

use zoroark_protocol::{HpStatus, PokemonDetails};

use super::pokemon_type::Type;
use super::stats::StatStages;
use super::status::{Status, Volatile};
use super::to_id;

/// Standard move set cap. Lifted while transformed (Transform copies the
/// target's full set, which can exceed what the original ever revealed).
pub const MOVE_CAP: usize = 4;

/// Core identity (doesn't change during battle)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PokemonIdentity {
    /// Nickname (if different from species)
    pub nickname: Option<String>,

    /// Level (1-100)
    pub level: u8,

    /// Gender ('M', 'F', or None for genderless)
    pub gender: Option<char>,

    /// Whether the Pokemon is shiny
    pub shiny: bool,
}

impl Default for PokemonIdentity {
    fn default() -> Self {
        Self {
            nickname: None,
            level: 100,
            gender: None,
            shiny: false,
        }
    }
}

/// Per-combatant usage record for one revealed move
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MoveRecord {
    /// Normalized move id ("thunderbolt")
    pub id: String,

    /// Display name ("Thunderbolt")
    pub name: String,

    /// How many times we have seen it used
    pub times_used: u32,

    /// Whether the server currently reports it disabled
    pub disabled: bool,

    /// Current PP, when tracked (our own side)
    pub pp: Option<u32>,

    /// Maximum PP, when tracked
    pub max_pp: Option<u32>,
}

impl MoveRecord {
    pub fn new(name: &str) -> Self {
        Self {
            id: to_id(name),
            name: name.to_string(),
            times_used: 0,
            disabled: false,
            pp: None,
            max_pp: None,
        }
    }
}

/// Combatant state during battle
///
/// Fields are progressively filled in as protocol lines reveal them: an
/// opponent's pokemon may exist in mostly-unknown form until switched in.
/// Species and ability keep an explicit base alongside the current value so
/// temporary changes (forme change, ability override) restore on switch-out.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PokemonState {
    /// Core identity
    pub identity: PokemonIdentity,

    /// Species as originally revealed (restored on switch-out)
    pub base_species: String,

    /// Current species (forme changes, Transform)
    pub species: String,

    // === HP ===
    /// Current HP (percentage for opponent, exact value for our Pokemon)
    pub hp_current: u32,

    /// Maximum HP (only known for our Pokemon)
    pub hp_max: Option<u32>,

    // === Status ===
    /// Non-volatile status condition (at most one)
    pub status: Option<Status>,

    /// Whether this Pokemon has fainted
    pub fainted: bool,

    /// Whether this Pokemon is currently active on the field
    pub active: bool,

    /// Whether this Pokemon has been seen on the field (vs. preview-only)
    pub revealed: bool,

    // === Combat state (cleared on switch) ===
    /// Stat stage modifiers
    pub boosts: StatStages,

    /// Active volatile conditions with counters (layers or countdown)
    #[cfg_attr(feature = "serde", serde(serialize_with = "super::serialize_volatiles"))]
    pub volatiles: HashMap<Volatile, u8>,

    // === Type tracking ===
    /// Original types from species
    pub base_types: Vec<Type>,

    /// Current types (may change via Soak, forme change, terastallizing)
    pub current_types: Vec<Type>,

    /// Tera type (known from details or after terastallizing)
    pub tera_type: Option<Type>,

    /// Whether currently terastallized (persists through switching)
    pub terastallized: bool,

    // === Revealed information ===
    /// Moves revealed so far, in reveal order
    pub moves: Vec<MoveRecord>,

    /// Move set saved when Transform took effect
    pub moves_before_transform: Option<Vec<MoveRecord>>,

    /// Ability as originally revealed (restored on switch-out)
    pub base_ability: Option<String>,

    /// Current ability (may be overridden mid-battle)
    pub ability: Option<String>,

    /// Exact stats, known only for our own side (from the request)
    pub stats: Option<zoroark_protocol::PokemonStats>,

    /// Item that has been revealed
    pub item: Option<String>,

    /// Whether the revealed item has been consumed or removed
    pub item_consumed: bool,

    // === Special states ===
    /// Species this Pokemon has transformed into
    pub transformed: Option<String>,

    /// Whether currently Dynamaxed
    pub dynamaxed: bool,

    /// Dynamax turns remaining (3 at activation)
    pub dynamax_turns: Option<u8>,

    /// Turn counter value when dynamax started
    pub dynamax_started_turn: u32,

    /// Max HP before dynamax doubled it
    pub pre_dynamax_max_hp: Option<u32>,

    /// Whether this Pokemon has mega evolved this battle
    pub mega_evolved: bool,

    // === Per-turn ephemera ===
    /// Must spend the next action recharging (Hyper Beam family)
    pub must_recharge: bool,

    /// Acted already this turn (reset at the turn boundary)
    pub moved_this_turn: bool,
}

impl PokemonState {
    /// Create a new Pokemon state
    pub fn new(species: impl Into<String>, level: u8) -> Self {
        let species = species.into();
        Self {
            identity: PokemonIdentity {
                level,
                ..Default::default()
            },
            base_species: species.clone(),
            species,
            hp_current: 100,
            hp_max: None,
            status: None,
            fainted: false,
            active: false,
            revealed: false,
            boosts: StatStages::new(),
            volatiles: HashMap::new(),
            base_types: Vec::new(),
            current_types: Vec::new(),
            tera_type: None,
            terastallized: false,
            moves: Vec::new(),
            moves_before_transform: None,
            base_ability: None,
            ability: None,
            stats: None,
            item: None,
            item_consumed: false,
            transformed: None,
            dynamaxed: false,
            dynamax_turns: None,
            dynamax_started_turn: 0,
            pre_dynamax_max_hp: None,
            mega_evolved: false,
            must_recharge: false,
            moved_this_turn: false,
        }
    }

    /// Create from protocol PokemonDetails
    pub fn from_details(details: &PokemonDetails) -> Self {
        let mut state = Self::new(&details.species, details.level.unwrap_or(100));
        state.identity.gender = details.gender;
        state.identity.shiny = details.shiny;

        if let Some(ref tera_str) = details.tera_type {
            state.tera_type = Type::from_protocol(tera_str);
        }

        state
    }

    /// Create from protocol PokemonDetails with a displayed name
    pub fn from_details_with_name(details: &PokemonDetails, name: &str) -> Self {
        let mut state = Self::from_details(details);
        if name != details.species {
            state.identity.nickname = Some(name.to_string());
        }
        state
    }

    /// Get display name (nickname or species)
    pub fn name(&self) -> &str {
        self.identity.nickname.as_deref().unwrap_or(&self.species)
    }

    /// Get HP as percentage (0-100)
    pub fn hp_percent(&self) -> u32 {
        match self.hp_max {
            Some(0) => 0,
            Some(max) => (self.hp_current * 100) / max,
            // For opponent Pokemon, hp_current IS the percentage
            None => self.hp_current,
        }
    }

    // === Volatiles ===

    /// Check for a volatile condition
    pub fn has_volatile(&self, v: &Volatile) -> bool {
        self.volatiles.contains_key(v)
    }

    /// Get the counter for a volatile (0 if absent)
    pub fn volatile_count(&self, v: &Volatile) -> u8 {
        self.volatiles.get(v).copied().unwrap_or(0)
    }

    /// Add a volatile condition with a starting counter.
    /// Re-applying a stacking volatile bumps its counter; re-applying a timed
    /// one overwrites the countdown; anything else is a refresh.
    pub fn add_volatile(&mut self, v: Volatile, count: u8) {
        if v.is_stacking() {
            *self.volatiles.entry(v).or_insert(0) += count.max(1);
        } else {
            self.volatiles.insert(v, count.max(1));
        }
    }

    /// Remove a volatile condition
    pub fn remove_volatile(&mut self, v: &Volatile) -> bool {
        self.volatiles.remove(v).is_some()
    }

    /// Clear all volatiles
    pub fn clear_volatiles(&mut self) {
        self.volatiles.clear();
    }

    /// Drop single-turn volatiles and per-turn flags at the turn boundary
    pub fn clear_turn_flags(&mut self) {
        self.volatiles.retain(|v, _| !v.is_single_turn());
        self.moved_this_turn = false;
    }

    // === Reveals ===

    /// Record a move being used (reveals it and bumps its usage count)
    pub fn note_move_used(&mut self, move_name: &str) {
        let id = to_id(move_name);
        if let Some(record) = self.moves.iter_mut().find(|m| m.id == id) {
            record.times_used += 1;
            return;
        }

        if self.moves.len() >= MOVE_CAP && self.transformed.is_none() {
            // A fifth distinct move without Transform means our attribution
            // is wrong somewhere (usually Illusion); don't compound it.
            tracing::warn!(move_name, species = %self.species, "move cap exceeded, not recording");
            return;
        }

        let mut record = MoveRecord::new(move_name);
        record.times_used = 1;
        self.moves.push(record);
    }

    /// Record a move known without having seen it used (request sync)
    pub fn sync_move(&mut self, move_name: &str) {
        let id = to_id(move_name);
        if !self.moves.iter().any(|m| m.id == id) && self.moves.len() < MOVE_CAP {
            self.moves.push(MoveRecord::new(move_name));
        }
    }

    /// Record a revealed ability. The first reveal also fixes the base
    /// ability; later reveals only change the current one.
    pub fn record_ability(&mut self, ability: &str) {
        if self.base_ability.is_none() {
            self.base_ability = Some(ability.to_string());
        }
        self.ability = Some(ability.to_string());
    }

    /// Record a revealed item
    pub fn record_item(&mut self, item: &str) {
        self.item = Some(item.to_string());
        self.item_consumed = false;
    }

    /// Mark item as consumed
    pub fn consume_item(&mut self) {
        self.item_consumed = true;
    }

    // === HP/status ===

    /// Apply HP and status from a protocol HpStatus
    pub fn apply_hp_status(&mut self, hp_status: &HpStatus) {
        self.hp_current = hp_status.current;
        if let Some(max) = hp_status.max {
            self.hp_max = Some(max);
        }

        if let Some(ref status_str) = hp_status.status {
            if status_str == "fnt" {
                self.set_fainted();
            } else {
                self.status = Status::from_protocol(status_str);
            }
        }
    }

    /// Faint: zero HP, no status, no combat state, off the field
    pub fn set_fainted(&mut self) {
        self.fainted = true;
        self.hp_current = 0;
        self.status = None;
        self.active = false;
        self.boosts.clear();
        self.volatiles.clear();
        if self.dynamaxed {
            self.end_dynamax();
        }
    }

    // === Transformations ===

    /// Protocol lines keep referring to the mon by its displayed name even
    /// after its species changes; pin it down before mutating species.
    fn preserve_display_name(&mut self) {
        if self.identity.nickname.is_none() {
            self.identity.nickname = Some(self.species.clone());
        }
    }

    /// Transform into another species (copies move set; ours is saved)
    pub fn start_transform(&mut self, species: &str) {
        self.preserve_display_name();
        if self.transformed.is_none() {
            self.moves_before_transform = Some(self.moves.clone());
            self.moves.clear();
        }
        self.transformed = Some(species.to_string());
        self.species = species.to_string();
        self.add_volatile(Volatile::Transformed, 1);
    }

    /// Temporary forme change (reverts on switch-out)
    pub fn change_forme(&mut self, species: &str) {
        self.preserve_display_name();
        self.species = species.to_string();
    }

    /// Permanent details change (Mega Evolution, Primal Reversion): the new
    /// forme becomes the base for the rest of the battle.
    pub fn change_details(&mut self, details: &PokemonDetails) {
        self.preserve_display_name();
        self.species = details.species.clone();
        self.base_species = details.species.clone();
        if let Some(level) = details.level {
            self.identity.level = level;
        }
    }

    /// Terastallize into the given type
    pub fn terastallize(&mut self, tera: Type) {
        self.terastallized = true;
        self.tera_type = Some(tera);
        self.current_types = vec![tera];
        self.add_volatile(Volatile::Terastallized, 1);
    }

    // === Dynamax ===

    /// Start dynamax: HP scale doubles, 3-turn countdown begins
    pub fn start_dynamax(&mut self, current_turn: u32) {
        if self.dynamaxed {
            return;
        }
        self.dynamaxed = true;
        self.dynamax_turns = Some(3);
        self.dynamax_started_turn = current_turn;
        self.pre_dynamax_max_hp = self.hp_max;

        if let Some(max) = self.hp_max {
            self.hp_max = Some(max * 2);
            self.hp_current *= 2;
        }
        self.add_volatile(Volatile::Dynamaxed, 1);
    }

    /// End dynamax: HP reverts proportionally to the original scale
    pub fn end_dynamax(&mut self) {
        if !self.dynamaxed {
            return;
        }
        if let (Some(pre), Some(cur_max)) = (self.pre_dynamax_max_hp, self.hp_max) {
            if cur_max > 0 {
                self.hp_current = self.hp_current * pre / cur_max;
            }
            self.hp_max = Some(pre);
        }
        self.dynamaxed = false;
        self.dynamax_turns = None;
        self.pre_dynamax_max_hp = None;
        self.remove_volatile(&Volatile::Dynamaxed);
    }

    /// Count down the dynamax window at a committed turn boundary
    pub fn tick_dynamax(&mut self, committed_turn: u32) {
        if self.dynamaxed
            && self.dynamax_started_turn < committed_turn
            && let Some(turns) = self.dynamax_turns.as_mut()
        {
            *turns = turns.saturating_sub(1);
        }
    }

    // === Switching ===

    /// Called when this Pokemon switches out: combat state clears and all
    /// temporary overrides restore from their base fields.
    pub fn on_switch_out(&mut self) {
        self.active = false;
        self.boosts.clear();
        self.volatiles.clear();
        self.must_recharge = false;
        self.moved_this_turn = false;

        if self.dynamaxed {
            self.end_dynamax();
        }

        self.species = self.base_species.clone();
        self.ability = self.base_ability.clone();
        self.transformed = None;
        if let Some(saved) = self.moves_before_transform.take() {
            self.moves = saved;
        }

        // Tera persists for the rest of the battle; everything else reverts
        if !self.terastallized {
            self.current_types = self.base_types.clone();
        }
    }

    /// Called when this Pokemon switches in
    pub fn on_switch_in(&mut self) {
        self.active = true;
        self.revealed = true;
    }

    // === Queries ===

    /// Check if Pokemon is alive (not fainted)
    pub fn is_alive(&self) -> bool {
        !self.fainted && self.hp_current > 0
    }

    /// Check if Pokemon can be switched to
    pub fn can_switch_to(&self) -> bool {
        self.is_alive() && !self.active
    }

    /// Check if Pokemon has a specific type
    pub fn has_type(&self, t: Type) -> bool {
        self.current_types.contains(&t)
    }

    /// Set types (forme changes, Soak)
    pub fn set_types(&mut self, types: Vec<Type>) {
        self.current_types = types;
    }

    /// Add a type (Forest's Curse, Trick-or-Treat)
    pub fn add_type(&mut self, t: Type) {
        if !self.current_types.contains(&t) {
            self.current_types.push(t);
        }
    }
}

impl Default for PokemonState {
    fn default() -> Self {
        Self::new("Unknown", 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = PokemonState::new("Charizard", 100);
        assert_eq!(state.species, "Charizard");
        assert_eq!(state.base_species, "Charizard");
        assert!(!state.fainted);
        assert!(!state.active);
        assert!(state.boosts.is_clear());
    }

    #[test]
    fn test_name_prefers_nickname() {
        let details = PokemonDetails::parse("Pikachu, L50, M");
        let state = PokemonState::from_details_with_name(&details, "Sparky");
        assert_eq!(state.name(), "Sparky");
        assert_eq!(state.species, "Pikachu");
    }

    #[test]
    fn test_hp_percent() {
        let mut state = PokemonState::new("Test", 100);

        // Without max HP (opponent), hp_current is the percentage
        state.hp_current = 75;
        assert_eq!(state.hp_percent(), 75);

        // With max HP (our Pokemon)
        state.hp_current = 150;
        state.hp_max = Some(200);
        assert_eq!(state.hp_percent(), 75);
    }

    #[test]
    fn test_volatile_counters() {
        let mut state = PokemonState::new("Test", 100);

        state.add_volatile(Volatile::Confusion, 1);
        assert!(state.has_volatile(&Volatile::Confusion));

        state.add_volatile(Volatile::Stockpile, 1);
        state.add_volatile(Volatile::Stockpile, 1);
        assert_eq!(state.volatile_count(&Volatile::Stockpile), 2);

        state.add_volatile(Volatile::PerishSong, 3);
        assert_eq!(state.volatile_count(&Volatile::PerishSong), 3);
        state.add_volatile(Volatile::PerishSong, 2);
        assert_eq!(state.volatile_count(&Volatile::PerishSong), 2);

        state.remove_volatile(&Volatile::Confusion);
        assert!(!state.has_volatile(&Volatile::Confusion));
    }

    #[test]
    fn test_move_cap() {
        let mut state = PokemonState::new("Test", 100);
        for name in ["Tackle", "Surf", "Protect", "Toxic"] {
            state.note_move_used(name);
        }
        assert_eq!(state.moves.len(), 4);

        // Fifth distinct move is refused without Transform
        state.note_move_used("Earthquake");
        assert_eq!(state.moves.len(), 4);

        // Repeat use bumps the counter, not the set
        state.note_move_used("Tackle");
        assert_eq!(state.moves.len(), 4);
        assert_eq!(state.moves[0].times_used, 2);
    }

    #[test]
    fn test_transform_lifts_cap_and_restores() {
        let mut state = PokemonState::new("Ditto", 100);
        state.note_move_used("Transform");
        state.start_transform("Rayquaza");
        for name in ["Dragon Ascent", "Extreme Speed", "Earthquake", "Swords Dance", "Outrage"] {
            state.note_move_used(name);
        }
        assert_eq!(state.moves.len(), 5);
        assert_eq!(state.species, "Rayquaza");

        state.on_switch_out();
        assert_eq!(state.species, "Ditto");
        assert_eq!(state.moves.len(), 1);
        assert_eq!(state.moves[0].id, "transform");
    }

    #[test]
    fn test_ability_base_restore() {
        let mut state = PokemonState::new("Test", 100);
        state.record_ability("Intimidate");
        assert_eq!(state.base_ability.as_deref(), Some("Intimidate"));

        // Mid-battle override keeps the base
        state.record_ability("Simple");
        assert_eq!(state.ability.as_deref(), Some("Simple"));
        assert_eq!(state.base_ability.as_deref(), Some("Intimidate"));

        state.on_switch_out();
        assert_eq!(state.ability.as_deref(), Some("Intimidate"));
    }

    #[test]
    fn test_dynamax_hp_doubling() {
        let mut state = PokemonState::new("Test", 100);
        state.hp_current = 150;
        state.hp_max = Some(200);

        state.start_dynamax(1);
        assert!(state.dynamaxed);
        assert_eq!(state.hp_max, Some(400));
        assert_eq!(state.hp_current, 300);
        assert_eq!(state.dynamax_turns, Some(3));

        state.end_dynamax();
        assert!(!state.dynamaxed);
        assert_eq!(state.hp_max, Some(200));
        assert_eq!(state.hp_current, 150);
    }

    #[test]
    fn test_dynamax_tick() {
        let mut state = PokemonState::new("Test", 100);
        state.start_dynamax(1);

        // Boundary committing the activation turn doesn't count down
        state.tick_dynamax(1);
        assert_eq!(state.dynamax_turns, Some(3));

        state.tick_dynamax(2);
        assert_eq!(state.dynamax_turns, Some(2));
    }

    #[test]
    fn test_fainted_clears_status() {
        let mut state = PokemonState::new("Test", 100);
        state.status = Some(Status::Paralysis);

        state.apply_hp_status(&HpStatus {
            current: 0,
            max: None,
            status: Some("fnt".to_string()),
        });

        assert!(state.fainted);
        assert_eq!(state.hp_current, 0);
        assert!(state.status.is_none());
    }

    #[test]
    fn test_switch_out_resets_combat_state() {
        let mut state = PokemonState::new("Test", 100);
        state.active = true;
        state.boosts.atk = 2;
        state.add_volatile(Volatile::Confusion, 1);
        state.must_recharge = true;

        state.on_switch_out();

        assert!(!state.active);
        assert!(state.boosts.is_clear());
        assert!(state.volatiles.is_empty());
        assert!(!state.must_recharge);
    }

    #[test]
    fn test_tera_persists_through_switch() {
        let mut state = PokemonState::new("Test", 100);
        state.base_types = vec![Type::Rock];
        state.current_types = vec![Type::Rock];
        state.terastallize(Type::Water);
        assert_eq!(state.current_types, vec![Type::Water]);

        state.on_switch_out();
        assert!(state.terastallized);
        assert_eq!(state.current_types, vec![Type::Water]);
    }

    #[test]
    fn test_clear_turn_flags() {
        let mut state = PokemonState::new("Test", 100);
        state.add_volatile(Volatile::Protect, 1);
        state.add_volatile(Volatile::LeechSeed, 1);
        state.moved_this_turn = true;

        state.clear_turn_flags();

        assert!(!state.has_volatile(&Volatile::Protect));
        assert!(state.has_volatile(&Volatile::LeechSeed));
        assert!(!state.moved_this_turn);
    }
}
