//! Battle initialization message parsers
//!
//! Sent at the start of a battle to set up metadata, team preview, and rules.

use super::ServerMessage;
use super::ident::{GameType, Player, PokemonDetails};
use anyhow::Result;

fn player_at(parts: &[&str], index: usize) -> Result<Player> {
    parts
        .get(index)
        .and_then(|s| Player::parse(s))
        .ok_or_else(|| anyhow::anyhow!("Missing player"))
}

/// Parse |player|PLAYER|USERNAME|AVATAR|RATING
pub fn parse_player(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::BattlePlayer {
        player: player_at(parts, 2)?,
        username: parts.get(3).unwrap_or(&"").to_string(),
        avatar: parts.get(4).unwrap_or(&"").to_string(),
        rating: parts.get(5).and_then(|s| s.parse().ok()),
    })
}

/// Parse |teamsize|PLAYER|NUMBER
pub fn parse_teamsize(parts: &[&str]) -> Result<ServerMessage> {
    let player = player_at(parts, 2)?;
    let size = parts
        .get(3)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Missing team size"))?;

    Ok(ServerMessage::TeamSize { player, size })
}

/// Parse |gametype|GAMETYPE
pub fn parse_gametype(parts: &[&str]) -> Result<ServerMessage> {
    let game_type = parts
        .get(2)
        .and_then(|s| GameType::parse(s))
        .ok_or_else(|| anyhow::anyhow!("Missing game type"))?;

    Ok(ServerMessage::GameType(game_type))
}

/// Parse |gen|GENNUM
pub fn parse_gen(parts: &[&str]) -> Result<ServerMessage> {
    let generation = parts
        .get(2)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Missing generation"))?;

    Ok(ServerMessage::Gen(generation))
}

/// Parse |tier|FORMATNAME
pub fn parse_tier(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Tier(parts.get(2).unwrap_or(&"").to_string()))
}

/// Parse |rated| or |rated|MESSAGE
pub fn parse_rated(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Rated(parts.get(2).map(|s| s.to_string())))
}

/// Parse |rule|RULE: DESCRIPTION
pub fn parse_rule(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Rule(parts.get(2).unwrap_or(&"").to_string()))
}

/// Parse |clearpoke
pub fn parse_clearpoke(_parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::ClearPoke)
}

/// Parse |poke|PLAYER|DETAILS|ITEM
pub fn parse_poke(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Poke {
        player: player_at(parts, 2)?,
        details: parts
            .get(3)
            .map(|s| PokemonDetails::parse(s))
            .unwrap_or_default(),
        has_item: parts.get(4).map(|s| *s == "item").unwrap_or(false),
    })
}

/// Parse |teampreview or |teampreview|NUMBER
pub fn parse_teampreview(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::TeamPreview(
        parts.get(2).and_then(|s| s.parse().ok()),
    ))
}

/// Parse |start
pub fn parse_start(_parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::BattleStart)
}
