//! Tracking and choice errors

use thiserror::Error;

/// Errors surfaced by the state mirror.
///
/// A [`TrackError::Desync`] means the local mirror has diverged from the
/// server and this battle's state can no longer be trusted; the caller must
/// abort the battle or rebuild from a fresh request. The server will not
/// resend history, so there is nothing to retry.
#[derive(Error, Debug)]
pub enum TrackError {
    #[error("state desync in {room} (turn {turn}): {line}")]
    Desync {
        room: String,
        turn: u32,
        line: String,
    },

    #[error("illegal choice in {room} (turn {turn}): {directive}")]
    IllegalChoice {
        room: String,
        turn: u32,
        directive: String,
    },

    #[error("no legal actions in {room} (turn {turn}) but battle is not finished")]
    EmptyChoiceSet { room: String, turn: u32 },

    #[error("malformed request payload in {room}: {reason}")]
    BadRequest { room: String, reason: String },
}
