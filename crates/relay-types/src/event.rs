//! Realtime channel frames.
//!
//! Every frame is a JSON text frame shaped `{"event": <name>, "data": <payload>}`.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{MessageRecord, NewMessage, TypesError};

/// Frames sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Full message history, sent once to a connection right after it opens.
    InitialData(Vec<MessageRecord>),
    /// A freshly persisted message, fanned out to every connection.
    NewMessage(MessageRecord),
    /// The sender's last frame was rejected.
    Error { message: String },
}

/// Frames accepted from clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    NewMessage(NewMessage),
}

impl ClientEvent {
    /// Decode a text frame and validate its payload.
    pub fn parse(text: &str) -> Result<Self, TypesError> {
        let event: ClientEvent = serde_json::from_str(text)?;
        match &event {
            ClientEvent::NewMessage(msg) => msg.validate()?,
        }
        Ok(event)
    }
}

impl ServerEvent {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
