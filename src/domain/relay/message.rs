//! The JSON envelope exchanged with clients.

use serde::{Deserialize, Serialize};

use super::{ClientId, OutboundFrame};

/// Category given to inbound text that is not a conforming envelope.
pub const MESSAGE_TYPE: &str = "message";
/// Category for server-originated notices such as the welcome.
pub const SYSTEM_TYPE: &str = "system";
/// Category of replies produced by the echo policy.
pub const ECHO_TYPE: &str = "echo";
/// Sender used for messages the server authors itself.
pub const SERVER_SENDER: &str = "server";

/// Wire-level message: `{"type": ..., "sender": ..., "payload": ...}`.
///
/// `sender` and `payload` are omitted from the encoding when empty. Fields are
/// private so a message cannot be altered after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type", default)]
    kind: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    sender: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    payload: String,
}

impl Message {
    pub fn new(
        kind: impl Into<String>,
        sender: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            sender: sender.into(),
            payload: payload.into(),
        }
    }

    /// A server notice with no sender.
    pub fn system(payload: impl Into<String>) -> Self {
        Self::new(SYSTEM_TYPE, "", payload)
    }

    /// Decodes one inbound text frame received from `origin`.
    ///
    /// Never fails. Text that is not a JSON envelope is wrapped verbatim as a
    /// [`MESSAGE_TYPE`] message. JSON `null` decodes as an empty envelope. An
    /// empty sender is replaced with `origin`; a sender the client supplied is
    /// kept as-is.
    pub fn from_wire(raw: &str, origin: &ClientId) -> Self {
        match serde_json::from_str::<Option<Message>>(raw) {
            Ok(decoded) => decoded.unwrap_or_default().with_default_sender(origin),
            Err(_) => Self::new(MESSAGE_TYPE, origin.as_str(), raw),
        }
    }

    /// Returns this message with `origin` as sender if none was set.
    pub fn with_default_sender(self, origin: &ClientId) -> Self {
        if self.sender.is_empty() {
            Self {
                sender: origin.as_str().to_string(),
                ..self
            }
        } else {
            self
        }
    }

    /// Serializes into a frame ready for an outbound queue.
    pub fn to_frame(&self) -> Result<OutboundFrame, serde_json::Error> {
        serde_json::to_string(self).map(OutboundFrame::from)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }
}
