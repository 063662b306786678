//! Battle request types
//!
//! These types represent the JSON structure of |request| messages — the
//! server's private "what can you do" payload for one side. The legality
//! flags here (trapped, canMegaEvo, forceSwitch, ...) are authoritative; the
//! tracking layer cross-references them against its own mirror but never
//! tries to re-derive them.

use super::ident::Player;
use serde::Deserialize;

/// A battle request asking the player to make a decision
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRequest {
    /// Request ID for synchronization
    pub rqid: Option<u64>,

    /// Active slots and their available moves
    #[serde(default)]
    pub active: Option<Vec<ActiveSlot>>,

    /// Information about the player's side/team
    pub side: Option<SideInfo>,

    /// Which slots need to switch (one flag per slot in multi-slot formats)
    #[serde(default)]
    pub force_switch: Option<Vec<bool>>,

    /// Whether this is team preview
    #[serde(default)]
    pub team_preview: bool,

    /// Maximum team size to bring (team preview formats)
    #[serde(default)]
    pub max_team_size: Option<u8>,

    /// Whether we're waiting for the opponent (no decision needed)
    #[serde(default)]
    pub wait: bool,

    /// Whether the choice can no longer be cancelled
    #[serde(default)]
    pub no_cancel: bool,
}

impl BattleRequest {
    /// Parse a request from JSON
    pub fn parse(json: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(json.clone()).ok()
    }

    /// Check if this request requires a decision
    pub fn needs_decision(&self) -> bool {
        !self.wait && (self.team_preview || self.force_switch.is_some() || self.active.is_some())
    }

    /// Check if any slot is being forced to switch
    pub fn is_force_switch(&self) -> bool {
        self.force_switch
            .as_ref()
            .map(|fs| fs.iter().any(|&b| b))
            .unwrap_or(false)
    }

    /// Whether this request permits reviving fainted team members
    /// (Revival Blessing): switch targets flip from bench to fainted.
    pub fn is_reviving(&self) -> bool {
        self.side
            .as_ref()
            .map(|s| s.pokemon.iter().any(|p| p.reviving))
            .unwrap_or(false)
    }

    /// Get pokemon that can legally be switched in
    pub fn available_switches(&self) -> Vec<(usize, &SidePokemon)> {
        let reviving = self.is_reviving();
        self.side
            .as_ref()
            .map(|s| {
                s.pokemon
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| {
                        if reviving {
                            p.is_fainted()
                        } else {
                            !p.active && !p.is_fainted()
                        }
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Legality flags and moves for one active slot
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSlot {
    /// Available moves
    #[serde(default)]
    pub moves: Vec<MoveSlot>,

    /// Whether the pokemon is trapped
    #[serde(default)]
    pub trapped: bool,

    /// Whether the pokemon might be trapped (server won't say for sure)
    #[serde(default)]
    pub maybe_trapped: bool,

    /// Whether mega evolution is available
    #[serde(default)]
    pub can_mega_evo: bool,

    /// Whether ultra burst is available
    #[serde(default)]
    pub can_ultra_burst: bool,

    /// Per-move z-move options (None for moves without a z-variant)
    #[serde(default)]
    pub can_z_move: Option<Vec<Option<ZMoveOption>>>,

    /// Whether dynamax is available
    #[serde(default)]
    pub can_dynamax: bool,

    /// Whether gigantamax is available
    #[serde(default)]
    pub can_gigantamax: Option<String>,

    /// Terastallization type (if available)
    #[serde(default)]
    pub can_terastallize: Option<String>,

    /// Max moves (when dynamaxed or able to dynamax)
    #[serde(default)]
    pub max_moves: Option<MaxMoves>,
}

impl ActiveSlot {
    /// Get usable (non-disabled, with PP) moves with their 1-based slot number
    pub fn usable_moves(&self) -> Vec<(usize, &MoveSlot)> {
        self.moves
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.disabled && (m.pp.is_none() || m.pp.unwrap_or(0) > 0))
            .map(|(i, m)| (i + 1, m))
            .collect()
    }

    /// Check if the pokemon can switch out (Maybe-trapped still allows trying)
    pub fn can_switch(&self) -> bool {
        !self.trapped
    }
}

/// A move slot on an active pokemon
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveSlot {
    /// Display name of the move
    #[serde(rename = "move")]
    pub name: String,

    /// Move ID (lowercase, no spaces)
    pub id: String,

    /// Current PP (absent for locked-in pseudo-moves like Recharge)
    #[serde(default)]
    pub pp: Option<u32>,

    /// Maximum PP
    #[serde(rename = "maxpp", default)]
    pub max_pp: Option<u32>,

    /// Target type (normal, self, allAdjacentFoes, etc.)
    #[serde(default)]
    pub target: Option<String>,

    /// Whether the move is disabled
    #[serde(default)]
    pub disabled: bool,
}

/// Z-move option for one move slot
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZMoveOption {
    /// Z-move name
    #[serde(rename = "move")]
    pub name: String,

    /// Target type
    pub target: String,
}

/// Max move information (for dynamax)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxMoves {
    /// Available max moves
    #[serde(default)]
    pub max_moves: Vec<MaxMoveSlot>,
}

/// A max move slot
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxMoveSlot {
    /// Max move name
    #[serde(rename = "move")]
    pub name: String,

    /// Target type
    #[serde(default)]
    pub target: Option<String>,
}

/// Information about the player's side
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideInfo {
    /// Player's display name
    pub name: String,

    /// Player ID (p1, p2, etc.)
    pub id: String,

    /// Pokemon on this side
    #[serde(default)]
    pub pokemon: Vec<SidePokemon>,
}

impl SideInfo {
    /// Get the player enum
    pub fn player(&self) -> Option<Player> {
        Player::parse(&self.id)
    }
}

/// A pokemon on the player's side
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidePokemon {
    /// Pokemon identifier (e.g., "p1: Pikachu")
    pub ident: String,

    /// Details string (species, level, gender, shiny)
    pub details: String,

    /// Current condition (HP/MaxHP status)
    pub condition: String,

    /// Whether this pokemon is currently active
    #[serde(default)]
    pub active: bool,

    /// Stats (atk, def, spa, spd, spe)
    #[serde(default)]
    pub stats: PokemonStats,

    /// Known moves
    #[serde(default)]
    pub moves: Vec<String>,

    /// Base ability
    #[serde(default)]
    pub base_ability: String,

    /// Current ability
    #[serde(default)]
    pub ability: String,

    /// Held item
    #[serde(default)]
    pub item: String,

    /// Pokeball used
    #[serde(default)]
    pub pokeball: String,

    /// Terastallize type
    #[serde(default)]
    pub teratype: Option<String>,

    /// Whether already terastallized
    #[serde(default)]
    pub terastallized: Option<String>,

    /// Whether this (fainted) pokemon can be revived right now
    #[serde(default)]
    pub reviving: bool,
}

impl SidePokemon {
    /// Check if the pokemon is fainted
    pub fn is_fainted(&self) -> bool {
        self.condition == "0 fnt" || self.condition.ends_with(" fnt")
    }

    /// Get current HP as a fraction (current, max)
    pub fn hp(&self) -> Option<(u32, u32)> {
        let hp_part = self.condition.split_whitespace().next()?;
        let (current, max) = hp_part.split_once('/')?;
        Some((current.parse().ok()?, max.parse().ok()?))
    }

    /// Get the status condition (if any)
    pub fn status(&self) -> Option<&str> {
        self.condition.split_whitespace().nth(1)
    }

    /// Get the species name from details
    pub fn species(&self) -> &str {
        self.details.split(',').next().unwrap_or(&self.details)
    }

    /// Get the display name from the ident ("p1: Sparky" -> "Sparky")
    pub fn name(&self) -> &str {
        self.ident
            .split_once(": ")
            .map(|(_, n)| n)
            .unwrap_or(&self.ident)
    }
}

/// Pokemon stats as reported in the request
#[derive(Debug, Clone, PartialEq, Default, Deserialize, serde::Serialize)]
pub struct PokemonStats {
    pub atk: u32,
    pub def: u32,
    pub spa: u32,
    pub spd: u32,
    pub spe: u32,
}
