//! TrackedBattle - main battle state tracking struct

use std::sync::Arc;

use zoroark_protocol::{BattleRequest, GameType, Player};

use crate::choices::{Action, ChoiceSet, Strictness};
use crate::dex::{Dex, DexStore};
use crate::error::TrackError;
use crate::types::{FieldState, SideState};

use super::observation::Observation;

/// A battle being tracked from server messages
///
/// This struct reconstructs battle state from the protocol messages
/// received from the Pokemon Showdown server. It maintains the perspective
/// of one player and tracks what information has been revealed. One
/// aggregate per battle room; nothing is shared between battles.
#[derive(Debug, Clone)]
pub struct TrackedBattle {
    // === Battle metadata ===
    /// Room identifier (">battle-gen9ou-123"), carried in error context
    pub room_id: Option<String>,

    /// Game type (singles, doubles, etc.)
    pub game_type: Option<GameType>,

    /// Generation (1-9)
    pub generation: u8,

    /// Format/tier name
    pub tier: String,

    /// Whether the battle is rated
    pub rated: bool,

    /// Active clauses/rules announced at init
    pub rules: Vec<String>,

    /// Current turn number (0 = not started)
    pub turn: u32,

    // === State ===
    /// Global field state (weather, terrain, etc.)
    pub field: FieldState,

    /// Player sides (indexed by Player enum)
    /// Up to 4 players for multi battles
    pub(crate) sides: [Option<SideState>; 4],

    /// Static data for this battle's generation
    pub(crate) dex: Arc<Dex>,

    // === Perspective ===
    /// Which player we are (for me()/opponent() methods)
    perspective: Option<Player>,

    // === Requests and derived choices ===
    /// The most recent request payload, verbatim
    pub(crate) last_request: Option<BattleRequest>,

    /// Legal actions derived from the last request
    pub(crate) choices: Option<ChoiceSet>,

    // === Turn history ===
    /// Raw lines processed since the last committed turn boundary
    pub(crate) pending_events: Vec<String>,

    /// Committed per-turn snapshots
    pub(crate) observations: Vec<Observation>,

    // === Outcome ===
    /// Whether the battle has ended
    pub ended: bool,

    /// Winner's username (if ended)
    pub winner: Option<String>,

    /// Whether the battle ended in a tie
    pub tie: bool,

    /// Whether we conceded
    pub forfeited: bool,
}

impl TrackedBattle {
    /// Create a new battle tracker
    pub fn new() -> Self {
        Self {
            room_id: None,
            game_type: None,
            generation: 9, // Default to latest gen until |gen| arrives
            tier: String::new(),
            rated: false,
            rules: Vec::new(),
            turn: 0,
            field: FieldState::new(),
            sides: [None, None, None, None],
            dex: DexStore::for_gen(9),
            perspective: None,
            last_request: None,
            choices: None,
            pending_events: Vec::new(),
            observations: Vec::new(),
            ended: false,
            winner: None,
            tie: false,
            forfeited: false,
        }
    }

    /// Create a tracker bound to a battle room
    pub fn with_room(room_id: impl Into<String>) -> Self {
        let mut battle = Self::new();
        battle.room_id = Some(room_id.into());
        battle
    }

    /// Room label for error context and logging
    pub fn room_label(&self) -> String {
        self.room_id
            .clone()
            .unwrap_or_else(|| "<unbound battle>".to_string())
    }

    /// Set the perspective (which player we are)
    pub fn set_perspective(&mut self, player: Player) {
        self.perspective = Some(player);
    }

    /// Get the current perspective
    pub fn perspective(&self) -> Option<Player> {
        self.perspective
    }

    /// Set the generation, switching the dex to match
    pub fn set_generation(&mut self, generation: u8) {
        self.generation = generation;
        self.dex = DexStore::for_gen(generation);
    }

    /// Static data tables for this battle's generation
    pub fn dex(&self) -> &Dex {
        &self.dex
    }

    /// Get our side (based on perspective)
    pub fn me(&self) -> Option<&SideState> {
        self.perspective.and_then(|p| self.get_side(p))
    }

    /// Get our side mutably
    pub fn me_mut(&mut self) -> Option<&mut SideState> {
        self.perspective.and_then(|p| self.get_side_mut(p))
    }

    /// Get opponent's side (assumes 1v1 battle)
    pub fn opponent(&self) -> Option<&SideState> {
        self.get_side(self.perspective?.opponent())
    }

    /// Get opponent's side mutably
    pub fn opponent_mut(&mut self) -> Option<&mut SideState> {
        let opp = self.perspective?.opponent();
        self.get_side_mut(opp)
    }

    /// Get a side by player
    pub fn get_side(&self, player: Player) -> Option<&SideState> {
        self.sides[player_to_index(player)].as_ref()
    }

    /// Get a side mutably by player
    pub fn get_side_mut(&mut self, player: Player) -> Option<&mut SideState> {
        self.sides[player_to_index(player)].as_mut()
    }

    /// Get or create a side for a player
    pub fn get_or_create_side(&mut self, player: Player, username: &str) -> &mut SideState {
        let idx = player_to_index(player);
        if self.sides[idx].is_none() {
            let mut side = SideState::new(player, username);
            side.set_active_slots(self.active_slots_per_side());
            self.sides[idx] = Some(side);
        }
        self.sides[idx].as_mut().unwrap()
    }

    /// Check if a side exists
    pub fn has_side(&self, player: Player) -> bool {
        self.sides[player_to_index(player)].is_some()
    }

    /// Iterate over all initialized sides
    pub fn sides(&self) -> impl Iterator<Item = &SideState> {
        self.sides.iter().filter_map(|s| s.as_ref())
    }

    /// Iterate over all initialized sides mutably
    pub fn sides_mut(&mut self) -> impl Iterator<Item = &mut SideState> {
        self.sides.iter_mut().filter_map(|s| s.as_mut())
    }

    /// Set game type and update active slots accordingly
    pub fn set_game_type(&mut self, game_type: GameType) {
        self.game_type = Some(game_type);
        let slots = game_type.active_slots();
        for side in self.sides_mut() {
            side.set_active_slots(slots);
        }
    }

    /// Active slots per side for this battle (1 until |gametype| arrives)
    pub fn active_slots_per_side(&self) -> usize {
        self.game_type.map(|g| g.active_slots()).unwrap_or(1)
    }

    /// Check if the battle is in progress
    pub fn is_active(&self) -> bool {
        self.turn > 0 && !self.ended
    }

    /// Check if we're waiting for the battle to start
    pub fn is_waiting_to_start(&self) -> bool {
        self.turn == 0 && !self.ended
    }

    // === Requests and choices ===

    /// The most recent request payload
    pub fn last_request(&self) -> Option<&BattleRequest> {
        self.last_request.as_ref()
    }

    /// Request id to echo back with a choice
    pub fn rqid(&self) -> Option<u64> {
        self.last_request.as_ref().and_then(|r| r.rqid)
    }

    /// Legal choices derived from the last request
    pub fn choices(&self) -> Option<&ChoiceSet> {
        self.choices.as_ref()
    }

    /// The currently legal single-slot orders. Every non-finished battle has
    /// at least one (the default no-op before the first request arrives).
    pub fn valid_orders(&self) -> Vec<Action> {
        if self.ended {
            return Vec::new();
        }
        self.choices
            .as_ref()
            .map(|c| c.valid_orders())
            .unwrap_or_else(|| vec![Action::Default])
    }

    /// Decode a wire directive against the current legal set
    pub fn decode_order(&self, wire: &str, strictness: Strictness) -> Result<Action, TrackError> {
        match self.choices.as_ref() {
            Some(choices) => choices.decode(wire, strictness),
            None => Err(TrackError::IllegalChoice {
                room: self.room_label(),
                turn: self.turn,
                directive: wire.to_string(),
            }),
        }
    }

    // === Mechanic availability (battle-level view) ===

    /// Whether our side can still mega evolve this battle
    pub fn can_mega_evolve(&self) -> bool {
        self.dex.allows_mega() && !self.me().map(|s| s.used_mega).unwrap_or(false)
    }

    /// Whether our side can still use a z-move this battle
    pub fn can_z_move(&self) -> bool {
        self.dex.allows_zmove() && !self.me().map(|s| s.used_zmove).unwrap_or(false)
    }

    /// Whether our side can still dynamax this battle
    pub fn can_dynamax(&self) -> bool {
        self.dex.allows_dynamax() && !self.me().map(|s| s.used_dynamax).unwrap_or(false)
    }

    /// Whether our side can still terastallize this battle
    pub fn can_terastallize(&self) -> bool {
        self.dex.allows_tera() && !self.me().map(|s| s.used_tera).unwrap_or(false)
    }

    // === History ===

    /// Committed per-turn snapshots, oldest first
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// The most recently committed snapshot
    pub fn latest_observation(&self) -> Option<&Observation> {
        self.observations.last()
    }

    // === Terminal transitions ===

    /// Concede the battle. Accepted from any non-finished state without
    /// requiring further protocol lines.
    pub fn forfeit(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        self.forfeited = true;
        self.winner = self.opponent().map(|s| s.username.clone());
    }
}

impl Default for TrackedBattle {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert Player enum to array index
pub fn player_to_index(player: Player) -> usize {
    match player {
        Player::P1 => 0,
        Player::P2 => 1,
        Player::P3 => 2,
        Player::P4 => 3,
    }
}

/// Convert position character to slot index
pub fn position_to_slot(pos: char) -> usize {
    match pos {
        'a' => 0,
        'b' => 1,
        'c' => 2,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_battle() {
        let battle = TrackedBattle::new();
        assert_eq!(battle.turn, 0);
        assert!(!battle.ended);
        assert!(battle.perspective.is_none());
        assert!(battle.game_type.is_none());
        assert!(battle.is_waiting_to_start());
    }

    #[test]
    fn test_room_label() {
        let battle = TrackedBattle::with_room("battle-gen9ou-7");
        assert_eq!(battle.room_label(), "battle-gen9ou-7");

        let unbound = TrackedBattle::new();
        assert_eq!(unbound.room_label(), "<unbound battle>");
    }

    #[test]
    fn test_me_and_opponent() {
        let mut battle = TrackedBattle::new();
        battle.get_or_create_side(Player::P1, "Alice");
        battle.get_or_create_side(Player::P2, "Bob");

        assert!(battle.me().is_none());

        battle.set_perspective(Player::P1);
        assert_eq!(battle.me().unwrap().username, "Alice");
        assert_eq!(battle.opponent().unwrap().username, "Bob");
    }

    #[test]
    fn test_set_game_type_resizes_existing_sides() {
        let mut battle = TrackedBattle::new();
        battle.get_or_create_side(Player::P1, "Test");

        battle.set_game_type(GameType::Doubles);
        assert_eq!(battle.get_side(Player::P1).unwrap().active_indices.len(), 2);
        assert_eq!(battle.active_slots_per_side(), 2);

        // Sides created afterwards pick up the slot count too
        battle.get_or_create_side(Player::P2, "Other");
        assert_eq!(battle.get_side(Player::P2).unwrap().active_indices.len(), 2);
    }

    #[test]
    fn test_set_generation_switches_dex() {
        let mut battle = TrackedBattle::new();
        assert!(battle.dex().allows_tera());

        battle.set_generation(8);
        assert!(battle.dex().allows_dynamax());
        assert!(!battle.dex().allows_tera());
    }

    #[test]
    fn test_valid_orders_before_any_request() {
        let battle = TrackedBattle::new();
        let orders = battle.valid_orders();
        assert_eq!(orders, vec![Action::Default]);
    }

    #[test]
    fn test_forfeit_from_any_state() {
        let mut battle = TrackedBattle::new();
        battle.get_or_create_side(Player::P1, "Alice");
        battle.get_or_create_side(Player::P2, "Bob");
        battle.set_perspective(Player::P1);

        battle.forfeit();
        assert!(battle.ended);
        assert!(battle.forfeited);
        assert_eq!(battle.winner.as_deref(), Some("Bob"));
        assert!(battle.valid_orders().is_empty());

        // Idempotent once ended
        battle.forfeit();
        assert!(battle.ended);
    }

    #[test]
    fn test_player_and_position_helpers() {
        assert_eq!(player_to_index(Player::P1), 0);
        assert_eq!(player_to_index(Player::P4), 3);
        assert_eq!(position_to_slot('a'), 0);
        assert_eq!(position_to_slot('b'), 1);
        assert_eq!(position_to_slot('d'), 0); // Default
    }
}
