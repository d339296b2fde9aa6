use serde::{Deserialize, Serialize};

use crate::types::Model;

/// Role type for a message parameter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User role.
    User,

    /// Assistant role.
    Assistant,
}

/// Parameters for a single message in a request.
///
/// Conversation context is assembled into the prompt text itself (see
/// `prompt::assemble`), so requests always carry exactly one user message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageParam {
    /// The role of the message.
    pub role: MessageRole,

    /// The content of the message.
    pub content: String,
}

impl MessageParam {
    /// Create a new `MessageParam` with the given content and role.
    pub fn new(content: impl Into<String>, role: MessageRole) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new user `MessageParam`.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(content, MessageRole::User)
    }
}

/// A content block in an API response.
///
/// Only text blocks carry anything this client consumes; other block types
/// are preserved as `Other` and skipped during text extraction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ContentBlock {
    /// A text block.
    #[serde(rename = "text")]
    Text {
        /// The text content.
        text: String,
    },

    /// Any block type this client does not consume.
    #[serde(other)]
    Other,
}

/// Token usage reported by the API.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Usage {
    /// Input tokens consumed by the request.
    #[serde(default)]
    pub input_tokens: u64,

    /// Output tokens produced by the response.
    #[serde(default)]
    pub output_tokens: u64,
}

/// A complete message response from the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Unique message identifier.
    #[serde(default)]
    pub id: String,

    /// Ordered content blocks.
    #[serde(default)]
    pub content: Vec<ContentBlock>,

    /// The model that produced the response.
    #[serde(default)]
    pub model: Option<Model>,

    /// Why generation stopped, when reported.
    #[serde(default)]
    pub stop_reason: Option<String>,

    /// Token accounting, when reported.
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl Message {
    /// Concatenates all text blocks into the response text.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect()
    }
}
