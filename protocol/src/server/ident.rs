//! Shared field types for battle protocol messages

use crate::ParseError;

/// Player in a battle (p1, p2, p3, p4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    P1,
    P2,
    P3,
    P4,
}

impl Player {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "p1" => Some(Player::P1),
            "p2" => Some(Player::P2),
            "p3" => Some(Player::P3),
            "p4" => Some(Player::P4),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Player::P1 => "p1",
            Player::P2 => "p2",
            Player::P3 => "p3",
            Player::P4 => "p4",
        }
    }

    /// The player across the field in a 1v1 pairing
    pub fn opponent(&self) -> Player {
        match self {
            Player::P1 => Player::P2,
            Player::P2 => Player::P1,
            Player::P3 => Player::P4,
            Player::P4 => Player::P3,
        }
    }
}

/// Positional combatant reference in the form "POSITION: NAME" (e.g., "p1a: Pikachu")
///
/// This names a position and a displayed identity, not a creature — with
/// Illusion in play the displayed identity can be a lie until a |replace|
/// message corrects it.
#[derive(Debug, Clone, PartialEq)]
pub struct PokemonRef {
    /// Player who owns this slot
    pub player: Player,
    /// Position letter (a, b, c for active slots, or None if inactive)
    pub position: Option<char>,
    /// Displayed name/nickname
    pub name: String,
}

impl PokemonRef {
    /// Parse an identifier string like "p1a: Pikachu" or "p1: Pikachu"
    pub fn parse(s: &str) -> Option<Self> {
        let (pos_part, name) = s.split_once(": ")?;

        let player = Player::parse(pos_part.get(..2)?)?;
        let position = pos_part.chars().nth(2);

        Some(PokemonRef {
            player,
            position,
            name: name.to_string(),
        })
    }
}

/// Pokemon details string (species, level, gender, shiny, tera)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PokemonDetails {
    pub species: String,
    pub level: Option<u8>,
    pub gender: Option<char>,
    pub shiny: bool,
    pub tera_type: Option<String>,
}

impl PokemonDetails {
    /// Parse a details string like "Pikachu, L50, M, shiny" or "Arceus-*"
    pub fn parse(s: &str) -> Self {
        let mut details = PokemonDetails::default();
        let parts: Vec<&str> = s.split(", ").collect();

        if let Some(species) = parts.first() {
            details.species = species.to_string();
        }

        for part in parts.iter().skip(1) {
            if let Some(level_str) = part.strip_prefix('L') {
                details.level = level_str.parse().ok();
            } else if *part == "M" {
                details.gender = Some('M');
            } else if *part == "F" {
                details.gender = Some('F');
            } else if *part == "shiny" {
                details.shiny = true;
            } else if let Some(tera) = part.strip_prefix("tera:") {
                details.tera_type = Some(tera.to_string());
            }
        }

        details
    }
}

/// HP and status condition (e.g., "100/100", "50/100 slp", "0 fnt")
#[derive(Debug, Clone, PartialEq)]
pub struct HpStatus {
    /// Current HP (raw value for our side, percentage for the opponent)
    pub current: u32,
    /// Max HP (if known)
    pub max: Option<u32>,
    /// Status condition (slp, par, brn, psn, tox, frz, fnt)
    pub status: Option<String>,
}

impl HpStatus {
    /// Parse an HP status string like "100/100", "50/100 slp", or "0 fnt"
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.is_empty() {
            return None;
        }

        let hp_part = parts[0];
        let status = parts.get(1).map(|s| s.to_string());

        if let Some((current_str, max_str)) = hp_part.split_once('/') {
            Some(HpStatus {
                current: current_str.parse().ok()?,
                max: Some(max_str.parse().ok()?),
                status,
            })
        } else {
            Some(HpStatus {
                current: hp_part.parse().ok()?,
                max: None,
                status,
            })
        }
    }
}

/// Game type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameType {
    Singles,
    Doubles,
    Triples,
    Multi,
    FreeForAll,
}

impl GameType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "singles" => Some(GameType::Singles),
            "doubles" => Some(GameType::Doubles),
            "triples" => Some(GameType::Triples),
            "multi" => Some(GameType::Multi),
            "freeforall" => Some(GameType::FreeForAll),
            _ => None,
        }
    }

    /// Active slots per side for this game type
    pub fn active_slots(&self) -> usize {
        match self {
            GameType::Singles | GameType::FreeForAll => 1,
            GameType::Doubles | GameType::Multi => 2,
            GameType::Triples => 3,
        }
    }
}

/// Stat abbreviation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    Atk,
    Def,
    Spa,
    Spd,
    Spe,
    Accuracy,
    Evasion,
}

impl Stat {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "atk" => Some(Stat::Atk),
            "def" => Some(Stat::Def),
            "spa" => Some(Stat::Spa),
            "spd" => Some(Stat::Spd),
            "spe" => Some(Stat::Spe),
            "accuracy" => Some(Stat::Accuracy),
            "evasion" => Some(Stat::Evasion),
            _ => None,
        }
    }
}

/// Side of the field (for side conditions)
#[derive(Debug, Clone, PartialEq)]
pub struct Side {
    pub player: Player,
    pub raw: String,
}

impl Side {
    pub fn parse(s: &str) -> Option<Self> {
        let player = Player::parse(s.get(..2)?)?;

        Some(Side {
            player,
            raw: s.to_string(),
        })
    }
}

/// Helper to parse a PokemonRef from message parts
pub fn parse_pokemon(parts: &[&str], index: usize) -> Result<PokemonRef, anyhow::Error> {
    parts
        .get(index)
        .and_then(|s| PokemonRef::parse(s))
        .ok_or_else(|| ParseError::MissingField("pokemon".to_string()).into())
}

/// Helper to parse PokemonDetails from message parts
pub fn parse_details(parts: &[&str], index: usize) -> PokemonDetails {
    parts
        .get(index)
        .map(|s| PokemonDetails::parse(s))
        .unwrap_or_default()
}

/// Helper to parse HpStatus from message parts
pub fn parse_hp_status(parts: &[&str], index: usize) -> Option<HpStatus> {
    parts.get(index).and_then(|s| HpStatus::parse(s))
}

/// Helper to find a `[from] EFFECT` tag in trailing message parts
pub fn parse_from_tag(parts: &[&str]) -> Option<String> {
    parts
        .iter()
        .find_map(|p| p.strip_prefix("[from] ").map(|s| s.to_string()))
}

/// Helper to find an `[of] POKEMON` tag in trailing message parts
pub fn parse_of_tag(parts: &[&str]) -> Option<PokemonRef> {
    parts
        .iter()
        .find_map(|p| p.strip_prefix("[of] ").and_then(PokemonRef::parse))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_parse() {
        assert_eq!(Player::parse("p1"), Some(Player::P1));
        assert_eq!(Player::parse("p4"), Some(Player::P4));
        assert_eq!(Player::parse("p5"), None);
    }

    #[test]
    fn test_player_opponent() {
        assert_eq!(Player::P1.opponent(), Player::P2);
        assert_eq!(Player::P3.opponent(), Player::P4);
    }

    #[test]
    fn test_pokemon_ref_parse() {
        let r = PokemonRef::parse("p1a: Pikachu").unwrap();
        assert_eq!(r.player, Player::P1);
        assert_eq!(r.position, Some('a'));
        assert_eq!(r.name, "Pikachu");

        let r = PokemonRef::parse("p2: Mr. Mime").unwrap();
        assert_eq!(r.player, Player::P2);
        assert_eq!(r.position, None);
        assert_eq!(r.name, "Mr. Mime");

        assert!(PokemonRef::parse("garbage").is_none());
    }

    #[test]
    fn test_details_parse() {
        let d = PokemonDetails::parse("Pikachu, L50, M, shiny");
        assert_eq!(d.species, "Pikachu");
        assert_eq!(d.level, Some(50));
        assert_eq!(d.gender, Some('M'));
        assert!(d.shiny);

        let d = PokemonDetails::parse("Garchomp, F, tera:Steel");
        assert_eq!(d.level, None);
        assert_eq!(d.tera_type.as_deref(), Some("Steel"));
    }

    #[test]
    fn test_hp_status_parse() {
        let hp = HpStatus::parse("150/200").unwrap();
        assert_eq!(hp.current, 150);
        assert_eq!(hp.max, Some(200));
        assert!(hp.status.is_none());

        let hp = HpStatus::parse("50/100 slp").unwrap();
        assert_eq!(hp.status.as_deref(), Some("slp"));

        let hp = HpStatus::parse("0 fnt").unwrap();
        assert_eq!(hp.current, 0);
        assert_eq!(hp.max, None);
        assert_eq!(hp.status.as_deref(), Some("fnt"));
    }

    #[test]
    fn test_from_and_of_tags() {
        let parts = vec!["", "-damage", "p2a: Garchomp", "88/100", "[from] item: Life Orb", "[of] p1a: Clefable"];
        assert_eq!(parse_from_tag(&parts).as_deref(), Some("item: Life Orb"));
        assert_eq!(parse_of_tag(&parts).unwrap().name, "Clefable");
    }
}
