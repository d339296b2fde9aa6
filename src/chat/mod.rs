//! Interactive chat plumbing for the quill-chat binary.
//!
//! This module provides the pieces the REPL shell is built from:
//!
//! - [`config`]: CLI argument parsing and resolved configuration
//! - [`commands`]: control-token parsing and help text

mod commands;
mod config;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
