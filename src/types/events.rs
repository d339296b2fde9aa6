use serde::{Deserialize, Serialize};

use crate::types::{Message, Usage};

/// A streaming update to a content block.
///
/// Tool-use and thinking deltas exist on the wire but carry nothing this
/// client consumes; they deserialize to `Other` and are skipped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ContentBlockDelta {
    /// A text delta.
    #[serde(rename = "text_delta")]
    TextDelta {
        /// The appended text.
        text: String,
    },

    /// Any delta type this client does not consume.
    #[serde(other)]
    Other,
}

/// Event marking the start of a streamed message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageStartEvent {
    /// The message shell; content arrives via deltas.
    pub message: Message,
}

/// Event marking the start of a content block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentBlockStartEvent {
    /// Index of the content block within the message.
    pub index: usize,
}

/// Event carrying an incremental content update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentBlockDeltaEvent {
    /// Index of the content block within the message.
    pub index: usize,

    /// The delta payload.
    pub delta: ContentBlockDelta,
}

/// Event marking the end of a content block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentBlockStopEvent {
    /// Index of the content block within the message.
    pub index: usize,
}

/// Event carrying top-level message updates (stop reason, usage).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageDeltaEvent {
    /// Usage totals, when reported.
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// A server-sent event from a streaming messages request.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageStreamEvent {
    /// Keep-alive ping.
    Ping,

    /// Stream started.
    MessageStart(MessageStartEvent),

    /// A content block started.
    ContentBlockStart(ContentBlockStartEvent),

    /// A content block received an incremental update.
    ContentBlockDelta(ContentBlockDeltaEvent),

    /// A content block finished.
    ContentBlockStop(ContentBlockStopEvent),

    /// Top-level message fields updated.
    MessageDelta(MessageDeltaEvent),

    /// Stream finished.
    MessageStop,
}

impl MessageStreamEvent {
    /// Returns the text carried by this event, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            MessageStreamEvent::ContentBlockDelta(event) => match &event.delta {
                ContentBlockDelta::TextDelta { text } => Some(text),
                ContentBlockDelta::Other => None,
            },
            _ => None,
        }
    }
}
