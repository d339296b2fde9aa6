use serde::{Deserialize, Serialize};

use crate::types::{MessageParam, Model};

/// Default maximum tokens per response.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Parameters for creating a message via the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageCreateParams {
    /// The model to use.
    pub model: Model,

    /// Maximum number of output tokens.
    pub max_tokens: u32,

    /// The messages to send.
    pub messages: Vec<MessageParam>,

    /// Whether to stream the response.
    #[serde(default)]
    pub stream: bool,
}

impl MessageCreateParams {
    /// Create non-streaming parameters.
    pub fn new(max_tokens: u32, messages: Vec<MessageParam>, model: Model) -> Self {
        Self {
            model,
            max_tokens,
            messages,
            stream: false,
        }
    }

    /// Create streaming parameters.
    pub fn new_streaming(max_tokens: u32, messages: Vec<MessageParam>, model: Model) -> Self {
        Self {
            model,
            max_tokens,
            messages,
            stream: true,
        }
    }
}
