//! Battle progress message parsers
//!
//! Turn markers, the private |request| payload, and terminal outcomes.

use super::ServerMessage;
use anyhow::Result;
use serde_json::Value;

/// Parse |request|REQUEST (JSON)
pub fn parse_request(parts: &[&str]) -> Result<ServerMessage> {
    // The JSON body can legally contain | inside string values
    let json_str = if parts.len() > 3 {
        parts[2..].join("|")
    } else {
        parts.get(2).unwrap_or(&"{}").to_string()
    };
    let request: Value = serde_json::from_str(&json_str)?;
    Ok(ServerMessage::Request(request))
}

/// Parse |inactive|MESSAGE (battle timer on)
pub fn parse_inactive(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Inactive(
        parts.get(2).unwrap_or(&"").to_string(),
    ))
}

/// Parse |inactiveoff|MESSAGE (battle timer off)
pub fn parse_inactiveoff(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::InactiveOff(
        parts.get(2).unwrap_or(&"").to_string(),
    ))
}

/// Parse |upkeep
pub fn parse_upkeep(_parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Upkeep)
}

/// Parse |turn|NUMBER
pub fn parse_turn(parts: &[&str]) -> Result<ServerMessage> {
    let turn = parts
        .get(2)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("Missing turn number"))?;

    Ok(ServerMessage::Turn(turn))
}

/// Parse |win|USER
pub fn parse_win(parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Win(parts.get(2).unwrap_or(&"").to_string()))
}

/// Parse |tie
pub fn parse_tie(_parts: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Tie)
}
