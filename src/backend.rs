//! Completion capability consumed by the session layer.
//!
//! The session never talks HTTP directly; it sends a prompt string through
//! this trait and gets back response text, either whole or as a stream of
//! chunks. Tests supply scripted implementations.

use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};

use crate::client::Anthropic;
use crate::error::Result;
use crate::types::{MessageCreateParams, MessageParam, Model};

/// A stream of response text chunks.
///
/// Concatenating every chunk yields the same text a non-streaming call
/// would have returned.
pub type TextChunkStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// The remote completion capability: send prompt text, receive response
/// text, optionally streamed.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Sends the prompt and returns the complete response text.
    async fn complete(
        &self,
        model: &Model,
        prompt_text: &str,
        max_output_tokens: u32,
    ) -> Result<String>;

    /// Sends the prompt and returns the response as a stream of text chunks.
    async fn complete_streaming(
        &self,
        model: &Model,
        prompt_text: &str,
        max_output_tokens: u32,
    ) -> Result<TextChunkStream>;
}

#[async_trait]
impl CompletionBackend for Anthropic {
    async fn complete(
        &self,
        model: &Model,
        prompt_text: &str,
        max_output_tokens: u32,
    ) -> Result<String> {
        let params = MessageCreateParams::new(
            max_output_tokens,
            vec![MessageParam::user(prompt_text)],
            model.clone(),
        );
        let message = self.send(params).await?;
        Ok(message.text())
    }

    async fn complete_streaming(
        &self,
        model: &Model,
        prompt_text: &str,
        max_output_tokens: u32,
    ) -> Result<TextChunkStream> {
        let params = MessageCreateParams::new_streaming(
            max_output_tokens,
            vec![MessageParam::user(prompt_text)],
            model.clone(),
        );
        let events = self.stream(params).await?;
        // Keep only the text deltas; pings and block bookkeeping carry no
        // text for this client.
        let chunks = events.filter_map(|event| async move {
            match event {
                Ok(event) => event.text().map(|text| Ok(text.to_string())),
                Err(e) => Some(Err(e)),
            }
        });
        Ok(Box::pin(chunks))
    }
}
