//! Battle state reconstruction for Pokemon Showdown.
//!
//! This crate maintains an authoritative local mirror of everything a player
//! can observe in a live battle, built purely from the server's line-oriented
//! protocol stream: both teams as revealed so far, active combatants, field
//! and side conditions, and — after every |request| — the exact set of
//! legally submittable actions.
//!
//! # Overview
//!
//! ```text
//! zoroark-protocol (wire format)
//!        │
//!        ▼
//! zoroark-battle (state mirror + legal choices) ← THIS CRATE
//!        │
//!        └─> transport/agent layer (submits one of the legal actions)
//! ```
//!
//! # Main Types
//!
//! ## Domain Types
//! - [`Type`] - Pokemon types; per-generation effectiveness via [`dex::Dex`]
//! - [`Status`] - Non-volatile status conditions (Burn, Freeze, etc.)
//! - [`Volatile`] - Volatile conditions with optional counters
//! - [`StatStages`] - Stat stage modifiers (-6 to +6)
//! - [`Weather`], [`Terrain`], [`SideCondition`] - Field conditions
//! - [`PokemonState`] - Full combatant battle state
//! - [`SideState`] - One player's side of the battle
//! - [`FieldState`] - Global field conditions with duration counters
//!
//! ## State Tracking
//! - [`TrackedBattle`] - ingests protocol lines via
//!   [`TrackedBattle::process_line`] and request payloads via
//!   [`TrackedBattle::apply_request`]
//! - [`Observation`] - immutable per-turn snapshot
//!
//! ## Choices
//! - [`Action`] - an abstract submittable decision
//! - [`ChoiceSet`] - the legal action sets derived from the latest request
//!
//! # Example Usage
//!
//! ```ignore
//! use zoroark_battle::{TrackedBattle, Strictness};
//!
//! let mut battle = TrackedBattle::with_room("battle-gen9ou-1");
//!
//! for line in incoming_lines {
//!     battle.process_line(&line)?;
//! }
//!
//! if let Some(choices) = battle.choices() {
//!     let orders = choices.valid_orders();
//!     let command = orders[0].to_command(battle.rqid());
//! }
//! ```

pub mod choices;
pub mod dex;
pub mod error;
pub mod tracking;
pub mod types;

// Re-export main types at crate root for convenience
pub use choices::{Action, ChoiceSet, Gimmick, SlotChoices, Strictness, TargetSlot, Trapping};
pub use error::TrackError;
pub use tracking::{Observation, TrackedBattle, player_to_index, position_to_slot};
pub use types::{
    FieldState, MoveRecord, PokemonIdentity, PokemonState, SideCondition, SideConditionState,
    SideState, StatStages, Status, Terrain, Type, Volatile, Weather,
};

// Re-export commonly used protocol types
pub use zoroark_protocol::{BattleRequest, GameType, Player, Stat};
