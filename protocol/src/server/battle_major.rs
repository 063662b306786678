//! Major battle action message parsers
//!
//! The primary actions in battle: moves, switches, forme changes, faints.

use super::ServerMessage;
use super::ident::{PokemonRef, parse_details, parse_hp_status, parse_pokemon};
use anyhow::Result;

fn text(parts: &[&str], index: usize) -> String {
    parts.get(index).unwrap_or(&"").to_string()
}

/// Parse |move|POKEMON|MOVE|TARGET with optional tags
pub fn parse_move(parts: &[&str]) -> Result<ServerMessage> {
    let pokemon = parse_pokemon(parts, 2)?;
    let move_name = text(parts, 3);
    let target = parts.get(4).and_then(|s| PokemonRef::parse(s));

    let mut miss = false;
    let mut still = false;
    let mut anim = None;

    for part in parts.iter().skip(5) {
        match *part {
            "[miss]" => miss = true,
            "[still]" => still = true,
            other => {
                if let Some(anim_move) = other.strip_prefix("[anim] ") {
                    anim = Some(anim_move.to_string());
                }
            }
        }
    }

    Ok(ServerMessage::Move {
        pokemon,
        move_name,
        target,
        miss,
        still,
        anim,
    })
}

/// Parse |switch|POKEMON|DETAILS|HP STATUS
pub fn parse_switch(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Switch {
        pokemon: parse_pokemon(parts, 2)?,
        details: parse_details(parts, 3),
        hp_status: parse_hp_status(parts, 4),
    })
}

/// Parse |drag|POKEMON|DETAILS|HP STATUS (forced switch, e.g. Roar)
pub fn parse_drag(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Drag {
        pokemon: parse_pokemon(parts, 2)?,
        details: parse_details(parts, 3),
        hp_status: parse_hp_status(parts, 4),
    })
}

/// Parse |detailschange|POKEMON|DETAILS|HP STATUS (permanent forme change)
pub fn parse_detailschange(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::DetailsChange {
        pokemon: parse_pokemon(parts, 2)?,
        details: parse_details(parts, 3),
        hp_status: parse_hp_status(parts, 4),
    })
}

/// Parse |-formechange|POKEMON|SPECIES|HP STATUS (reverts on switch-out)
pub fn parse_formechange(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::FormeChange {
        pokemon: parse_pokemon(parts, 2)?,
        species: text(parts, 3),
        hp_status: parse_hp_status(parts, 4),
    })
}

/// Parse |replace|POKEMON|DETAILS|HP STATUS (Illusion ending)
pub fn parse_replace(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Replace {
        pokemon: parse_pokemon(parts, 2)?,
        details: parse_details(parts, 3),
        hp_status: parse_hp_status(parts, 4),
    })
}

/// Parse |swap|POKEMON|POSITION
pub fn parse_swap(parts: &[&str]) -> Result<ServerMessage> {
    let pokemon = parse_pokemon(parts, 2)?;
    let position = parts
        .get(3)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Missing position"))?;

    Ok(ServerMessage::Swap { pokemon, position })
}

/// Parse |cant|POKEMON|REASON or |cant|POKEMON|REASON|MOVE
pub fn parse_cant(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Cant {
        pokemon: parse_pokemon(parts, 2)?,
        reason: text(parts, 3),
        move_name: parts.get(4).map(|s| s.to_string()),
    })
}

/// Parse |faint|POKEMON
pub fn parse_faint(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Faint(parse_pokemon(parts, 2)?))
}
