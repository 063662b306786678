//! Global field state

use super::conditions::{Terrain, Weather};

/// Default duration for weather/terrain/room effects.
///
/// Extending items (Heat Rock, Terrain Extender) are not visible client-side
/// until revealed, so the counter is a lower bound; the protocol's explicit
/// end message is authoritative.
const DEFAULT_DURATION: u8 = 5;

/// Global field state affecting all Pokemon
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldState {
    /// Current weather condition
    pub weather: Option<Weather>,

    /// Turns of weather remaining (None for primal weathers)
    pub weather_turns: Option<u8>,

    /// Current terrain
    pub terrain: Option<Terrain>,

    /// Turns of terrain remaining
    pub terrain_turns: Option<u8>,

    /// Trick Room active (slower Pokemon move first)
    pub trick_room: bool,

    /// Turns of Trick Room remaining
    pub trick_room_turns: Option<u8>,

    /// Magic Room active (items suppressed)
    pub magic_room: bool,

    /// Wonder Room active (Def/SpD swapped)
    pub wonder_room: bool,

    /// Gravity active (Flying immunity removed, accuracy boosted)
    pub gravity: bool,

    /// Mud Sport active (Electric moves weakened) - older gens
    pub mud_sport: bool,

    /// Water Sport active (Fire moves weakened) - older gens
    pub water_sport: bool,

    /// Ion Deluge active (Normal moves become Electric)
    pub ion_deluge: bool,

    /// Fairy Lock active (no switching)
    pub fairy_lock: bool,
}

impl FieldState {
    /// Create a new empty field state
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all field conditions
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Set weather, starting its duration counter
    pub fn set_weather(&mut self, weather: Option<Weather>) {
        self.weather = weather;
        self.weather_turns = match weather {
            Some(w) if !w.is_primal() => Some(DEFAULT_DURATION),
            _ => None,
        };
    }

    /// Tick the weather counter down on an upkeep message
    pub fn weather_upkeep(&mut self) {
        if let Some(turns) = self.weather_turns.as_mut() {
            *turns = turns.saturating_sub(1);
        }
    }

    /// Apply a field start condition from protocol
    pub fn apply_field_start(&mut self, condition: &str) {
        let clean = condition.strip_prefix("move: ").unwrap_or(condition);
        let normalized = clean.to_lowercase().replace([' ', '-'], "");

        match normalized.as_str() {
            // Weather normally arrives via |-weather|, but handle it here too
            "sunnyday" | "raindance" | "sandstorm" | "hail" | "snow" | "desolateland"
            | "primordialsea" | "deltastream" => {
                self.set_weather(Weather::from_protocol(condition));
            }

            // Terrain
            "electricterrain" | "grassyterrain" | "mistyterrain" | "psychicterrain" => {
                self.terrain = Terrain::from_protocol(condition);
                self.terrain_turns = Some(DEFAULT_DURATION);
            }

            // Rooms
            "trickroom" => {
                self.trick_room = true;
                self.trick_room_turns = Some(DEFAULT_DURATION);
            }
            "magicroom" => self.magic_room = true,
            "wonderroom" => self.wonder_room = true,

            // Other
            "gravity" => self.gravity = true,
            "mudsport" => self.mud_sport = true,
            "watersport" => self.water_sport = true,
            "iondeluge" => self.ion_deluge = true,
            "fairylock" => self.fairy_lock = true,

            _ => {}
        }
    }

    /// Apply a field end condition from protocol
    pub fn apply_field_end(&mut self, condition: &str) {
        let clean = condition.strip_prefix("move: ").unwrap_or(condition);
        let normalized = clean.to_lowercase().replace([' ', '-'], "");

        match normalized.as_str() {
            // Terrain
            "electricterrain" | "grassyterrain" | "mistyterrain" | "psychicterrain" => {
                self.terrain = None;
                self.terrain_turns = None;
            }

            // Rooms
            "trickroom" => {
                self.trick_room = false;
                self.trick_room_turns = None;
            }
            "magicroom" => self.magic_room = false,
            "wonderroom" => self.wonder_room = false,

            // Other
            "gravity" => self.gravity = false,
            "mudsport" => self.mud_sport = false,
            "watersport" => self.water_sport = false,
            "iondeluge" => self.ion_deluge = false,
            "fairylock" => self.fairy_lock = false,

            _ => {}
        }
    }

    /// Tick per-turn duration counters at a turn boundary. Counters are
    /// advisory; conditions are only removed by explicit end messages.
    pub fn tick_turn(&mut self) {
        for turns in [
            &mut self.terrain_turns,
            &mut self.trick_room_turns,
        ]
        .into_iter()
        .flatten()
        {
            *turns = turns.saturating_sub(1);
        }
    }

    /// Check if any field condition is active
    pub fn has_any_condition(&self) -> bool {
        self.weather.is_some()
            || self.terrain.is_some()
            || self.trick_room
            || self.magic_room
            || self.wonder_room
            || self.gravity
            || self.mud_sport
            || self.water_sport
            || self.ion_deluge
            || self.fairy_lock
    }
}
