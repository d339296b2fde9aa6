// Public modules
pub mod events;
pub mod message;
pub mod model;
pub mod params;

// Re-exports
pub use events::{
    ContentBlockDelta, ContentBlockDeltaEvent, ContentBlockStartEvent, ContentBlockStopEvent,
    MessageDeltaEvent, MessageStartEvent, MessageStreamEvent,
};
pub use message::{ContentBlock, Message, MessageParam, MessageRole, Usage};
pub use model::{KnownModel, Model};
pub use params::{DEFAULT_MAX_TOKENS, MessageCreateParams};
