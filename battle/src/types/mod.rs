//! Domain types for battle state tracking

mod conditions;
mod field;
mod pokemon;
mod pokemon_type;
mod side;
mod stats;
mod status;

pub use conditions::{SideCondition, SideConditionState, Terrain, Weather};
pub use field::FieldState;
pub use pokemon::{MOVE_CAP, MoveRecord, PokemonIdentity, PokemonState};
pub use pokemon_type::Type;
pub use side::SideState;
pub use stats::StatStages;
pub use status::{Status, Volatile};

/// Normalize a display name to a protocol id ("Thunder Wave" -> "thunderwave")
pub fn to_id(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase()
}

/// Serialize a player as its protocol id ("p1")
#[cfg(feature = "serde")]
pub(crate) fn serialize_player<S>(
    player: &zoroark_protocol::Player,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(player.as_str())
}

/// Serialize a side-condition map as display-name keys
#[cfg(feature = "serde")]
pub(crate) fn serialize_conditions<S>(
    conditions: &std::collections::HashMap<SideCondition, SideConditionState>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeMap;
    let mut map = serializer.serialize_map(Some(conditions.len()))?;
    for (condition, state) in conditions {
        map.serialize_entry(condition.as_str(), &state.layers)?;
    }
    map.end()
}

/// Serialize a volatile map as display-name keys (map keys must be strings)
#[cfg(feature = "serde")]
pub(crate) fn serialize_volatiles<S>(
    volatiles: &std::collections::HashMap<Volatile, u8>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeMap;
    let mut map = serializer.serialize_map(Some(volatiles.len()))?;
    for (volatile, count) in volatiles {
        map.serialize_entry(volatile.as_str(), count)?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::to_id;

    #[test]
    fn test_to_id() {
        assert_eq!(to_id("Thunder Wave"), "thunderwave");
        assert_eq!(to_id("King's Shield"), "kingsshield");
        assert_eq!(to_id("U-turn"), "uturn");
        assert_eq!(to_id("10,000,000 Volt Thunderbolt"), "10000000voltthunderbolt");
    }
}
