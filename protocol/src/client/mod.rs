/// Commands that clients can send to the server
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    /// /choose DIRECTIVE|RQID — submit a battle decision
    Choose {
        directive: String,
        rqid: Option<u64>,
    },

    /// /forfeit — concede the battle
    Forfeit,

    /// /timer on|off
    Timer(bool),

    /// /join ROOMID
    JoinRoom(String),

    /// /leave ROOMID
    LeaveRoom(String),

    /// Raw chat message
    Chat(String),

    /// Raw command for catch-all
    Raw(String),
}

impl ClientCommand {
    /// Serialize command to protocol format
    pub fn to_protocol_string(&self) -> String {
        match self {
            Self::Choose { directive, rqid } => match rqid {
                Some(id) => format!("/choose {}|{}", directive, id),
                None => format!("/choose {}", directive),
            },
            Self::Forfeit => "/forfeit".to_string(),
            Self::Timer(on) => format!("/timer {}", if *on { "on" } else { "off" }),
            Self::JoinRoom(room) => format!("/join {}", room),
            Self::LeaveRoom(room) => format!("/leave {}", room),
            Self::Chat(message) => message.clone(),
            Self::Raw(command) => command.clone(),
        }
    }
}

/// Client message with optional room context
pub struct ClientMessage {
    pub room_id: Option<String>,
    pub command: ClientCommand,
}

impl ClientMessage {
    /// Serialize to wire format: ROOMID|TEXT or |TEXT
    pub fn to_wire_format(&self) -> String {
        let text = self.command.to_protocol_string();
        match &self.room_id {
            Some(room) => format!("{}|{}", room, text),
            None => format!("|{}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose_with_rqid() {
        let cmd = ClientCommand::Choose {
            directive: "move 1 mega".to_string(),
            rqid: Some(7),
        };
        assert_eq!(cmd.to_protocol_string(), "/choose move 1 mega|7");
    }

    #[test]
    fn test_choose_without_rqid() {
        let cmd = ClientCommand::Choose {
            directive: "switch 3".to_string(),
            rqid: None,
        };
        assert_eq!(cmd.to_protocol_string(), "/choose switch 3");
    }

    #[test]
    fn test_wire_format_with_room() {
        let msg = ClientMessage {
            room_id: Some("battle-gen9ou-1".to_string()),
            command: ClientCommand::Forfeit,
        };
        assert_eq!(msg.to_wire_format(), "battle-gen9ou-1|/forfeit");
    }
}
