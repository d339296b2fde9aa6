// Public modules
pub mod backend;
pub mod chat;
pub mod client;
pub mod error;
pub mod extract;
pub mod history;
pub mod output;
pub mod prompt;
pub mod render;
pub mod session;
pub mod sse;
pub mod types;

// Re-exports
pub use backend::{CompletionBackend, TextChunkStream};
pub use client::Anthropic;
pub use error::{Error, Result};
pub use extract::CodeBlock;
pub use history::{HistoryLog, HistoryRecord};
pub use render::{PlainTextRenderer, Renderer};
pub use session::{ChatSession, SessionConfig, Turn};
pub use types::*;
