use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::clock;

/// Recipient meaning "everyone in the room".
pub const BROADCAST: &str = "Todos";

pub const JOIN_TEXT: &str = "entra na sala...";
pub const LEAVE_TEXT: &str = "sai da sala...";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub name: String,
    /// Epoch milliseconds of the last heartbeat or of registration.
    pub last_status: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Message,
    PrivateMessage,
    Status,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        use MessageType::*;
        match self {
            Message => "message",
            PrivateMessage => "private_message",
            Status => "status",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "message" => Ok(MessageType::Message),
            "private_message" => Ok(MessageType::PrivateMessage),
            "status" => Ok(MessageType::Status),
            other => Err(anyhow::anyhow!("unknown message type {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub from: String,
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub time: String,
}

impl Message {
    pub fn joined(name: &str) -> Self {
        Self::status(name, JOIN_TEXT)
    }

    pub fn left(name: &str) -> Self {
        Self::status(name, LEAVE_TEXT)
    }

    fn status(name: &str, text: &str) -> Self {
        Message {
            from: name.to_owned(),
            to: BROADCAST.to_owned(),
            text: text.to_owned(),
            kind: MessageType::Status,
            time: clock::time_of_day(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_serializes_camel_case() {
        let json = serde_json::to_value(Participant { name: "Alice".into(), last_status: 42 }).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Alice", "lastStatus": 42 }));
    }

    #[test]
    fn message_type_field_is_named_type() {
        let json = serde_json::to_value(Message::left("Bob")).unwrap();
        assert_eq!(json["type"], "status");
        assert_eq!(json["to"], BROADCAST);
        assert_eq!(json["text"], LEAVE_TEXT);
    }

    #[test]
    fn message_type_parses_its_own_names() {
        for kind in [MessageType::Message, MessageType::PrivateMessage, MessageType::Status] {
            assert_eq!(kind.as_str().parse::<MessageType>().unwrap(), kind);
        }
        assert!("shout".parse::<MessageType>().is_err());
    }
}
