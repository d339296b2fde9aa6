//! Configuration types for the chat client.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::path::PathBuf;

use arrrg_derive::CommandLine;

use crate::types::{DEFAULT_MAX_TOKENS, Model};

/// Command-line arguments for the quill-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Anthropic API key.
    #[arrrg(optional, "API key (default: ANTHROPIC_API_KEY env var)", "KEY")]
    pub api_key: Option<String>,

    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: claude-3-5-sonnet-latest)", "MODEL")]
    pub model: Option<String>,

    /// Maximum tokens per response.
    #[arrrg(optional, "Max tokens per response (default: 4096)", "TOKENS")]
    pub max_tokens: Option<u32>,

    /// Disable preserving conversation context.
    #[arrrg(flag, "Disable preserving conversation context")]
    pub no_context: bool,

    /// Disable streaming output.
    #[arrrg(flag, "Wait for complete responses instead of streaming")]
    pub no_stream: bool,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Path to the append-only history log.
    #[arrrg(optional, "Append turns to this history log file", "FILE")]
    pub history_file: Option<String>,
}

/// Resolved configuration for a chat session.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: Model,

    /// Whether prior turns are prepended to each new prompt.
    pub preserve_context: bool,

    /// Maximum tokens per response.
    pub max_tokens: u32,

    /// Whether to stream responses token by token.
    pub streaming: bool,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Optional history log path.
    pub history_path: Option<PathBuf>,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: claude-3-5-sonnet-latest
    /// - Context preservation: enabled
    /// - Max tokens: 4096
    /// - Streaming: enabled
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            model: Model::default_model(),
            preserve_context: true,
            max_tokens: DEFAULT_MAX_TOKENS,
            streaming: true,
            use_color: true,
            history_path: None,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Disables context preservation.
    pub fn without_context(mut self) -> Self {
        self.preserve_context = false;
        self
    }

    /// Sets the maximum tokens per response.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Disables streaming output.
    pub fn without_streaming(mut self) -> Self {
        self.streaming = false;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets the history log path.
    pub fn with_history_path(mut self, path: Option<PathBuf>) -> Self {
        self.history_path = path;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&ChatArgs> for ChatConfig {
    fn from(args: &ChatArgs) -> Self {
        let model = args
            .model
            .as_deref()
            .map(Model::from)
            .unwrap_or_else(Model::default_model);

        ChatConfig {
            model,
            preserve_context: !args.no_context,
            max_tokens: args.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            streaming: !args.no_stream,
            use_color: !args.no_color,
            history_path: args.history_file.as_ref().map(PathBuf::from),
        }
    }
}
