//! Core chat session management.
//!
//! A session owns the ordered turn history and drives one turn at a time:
//! assemble the prompt, call the completion backend, route the response.
//! Single-threaded, single-session use is the only supported mode; there is
//! no eviction, no size cap, and no concurrent-writer protection.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::StreamExt;

use crate::backend::CompletionBackend;
use crate::history::HistoryLog;
use crate::prompt::assemble;
use crate::render::Renderer;
use crate::types::Model;

/// One (prompt, response) exchange with the remote model.
///
/// The prompt is the composed current-turn text (context framing and
/// code-output instruction applied), without the history prefix. Immutable
/// once recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// The composed prompt for this turn.
    pub prompt: String,

    /// The response text (or the substituted error message).
    pub response: String,
}

impl Turn {
    /// Creates a new turn.
    pub fn new(prompt: String, response: String) -> Self {
        Self { prompt, response }
    }
}

/// Configuration for a chat session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The model to use for completions.
    pub model: Model,

    /// Whether prior turns are prepended to each new prompt.
    pub preserve_context: bool,

    /// Maximum output tokens per response.
    pub max_tokens: u32,
}

impl SessionConfig {
    /// Creates a configuration with the given model and context policy.
    pub fn new(model: Model, preserve_context: bool) -> Self {
        Self {
            model,
            preserve_context,
            max_tokens: crate::types::DEFAULT_MAX_TOKENS,
        }
    }

    /// Sets the maximum output tokens per response.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A chat session holding ordered turn history and configuration.
///
/// The in-memory history only grows, append-only, in chronological order.
/// When `preserve_context` is off the history stays empty and every prompt
/// sent is exactly the caller-supplied text.
pub struct ChatSession<C: CompletionBackend> {
    backend: C,
    config: SessionConfig,
    history: Vec<Turn>,
    journal: Option<HistoryLog>,
}

impl<C: CompletionBackend> ChatSession<C> {
    /// Creates a new session over the given backend.
    pub fn new(backend: C, config: SessionConfig) -> Self {
        Self {
            backend,
            config,
            history: Vec::new(),
            journal: None,
        }
    }

    /// Attaches an on-disk history journal mirroring every recorded turn.
    ///
    /// The journal is a side channel: it receives turns even when context
    /// preservation is off, and never feeds back into prompt assembly.
    pub fn with_journal(mut self, journal: HistoryLog) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Returns the current model.
    pub fn model(&self) -> &Model {
        &self.config.model
    }

    /// Returns the underlying completion backend.
    pub fn backend(&self) -> &C {
        &self.backend
    }

    /// Returns whether context preservation is enabled.
    pub fn preserve_context(&self) -> bool {
        self.config.preserve_context
    }

    /// Returns the ordered turn history snapshot.
    pub fn snapshot(&self) -> &[Turn] {
        &self.history
    }

    /// Clears the in-memory conversation history.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Sends one message and returns the response text.
    ///
    /// Remote failures are never raised from here: the error's message is
    /// substituted for the response, and the turn is recorded with that
    /// text, exactly as a successful turn would be.
    pub async fn send(
        &mut self,
        message: &str,
        file_context: Option<&str>,
        code_output: bool,
    ) -> String {
        let (turn_prompt, full_prompt) = self.assemble_prompts(message, file_context, code_output);

        let response = match self
            .backend
            .complete(&self.config.model, &full_prompt, self.config.max_tokens)
            .await
        {
            Ok(text) => text,
            Err(e) => format!("An error occurred: {e}"),
        };

        self.record_turn(turn_prompt, response.clone());
        response
    }

    /// Sends one message, streaming chunks to the renderer as they arrive.
    ///
    /// Each chunk is appended to an accumulator and echoed immediately; the
    /// completed accumulation is then treated identically to a non-streamed
    /// response. If `interrupted` is set mid-stream the partial accumulation
    /// is dropped without being recorded and `None` is returned. A
    /// mid-stream backend error substitutes the error text for the
    /// response, like the non-streaming path.
    pub async fn send_streaming(
        &mut self,
        message: &str,
        file_context: Option<&str>,
        code_output: bool,
        renderer: &mut dyn Renderer,
        interrupted: Arc<AtomicBool>,
    ) -> Option<String> {
        let (turn_prompt, full_prompt) = self.assemble_prompts(message, file_context, code_output);

        let stream = self
            .backend
            .complete_streaming(&self.config.model, &full_prompt, self.config.max_tokens)
            .await;

        let response = match stream {
            Ok(mut chunks) => {
                let mut accumulator = String::new();
                let mut failure = None;
                while let Some(chunk) = chunks.next().await {
                    if interrupted.load(Ordering::Relaxed) {
                        renderer.print_interrupted();
                        return None;
                    }
                    match chunk {
                        Ok(text) => {
                            renderer.print_text(&text);
                            accumulator.push_str(&text);
                        }
                        Err(e) => {
                            failure = Some(e);
                            break;
                        }
                    }
                }
                renderer.finish_response();
                match failure {
                    Some(e) => format!("An error occurred: {e}"),
                    None => accumulator,
                }
            }
            Err(e) => {
                renderer.finish_response();
                format!("An error occurred: {e}")
            }
        };

        self.record_turn(turn_prompt, response.clone());
        Some(response)
    }

    /// Records one completed turn.
    ///
    /// Appends to in-memory history only when context preservation is on;
    /// always mirrors to the journal when one is attached. Journal write
    /// failures are reported and do not abort the session.
    pub fn record_turn(&mut self, prompt: String, response: String) {
        if let Some(journal) = &self.journal {
            if let Err(e) = journal.append(&self.config.model, &prompt, &response) {
                eprintln!("Warning: failed to write history log: {e}");
            }
        }
        if self.config.preserve_context {
            self.history.push(Turn::new(prompt, response));
        }
    }

    fn assemble_prompts(
        &self,
        message: &str,
        file_context: Option<&str>,
        code_output: bool,
    ) -> (String, String) {
        let turn_prompt = assemble(message, file_context, &[], code_output);
        let full_prompt = if self.config.preserve_context {
            assemble(message, file_context, &self.history, code_output)
        } else {
            turn_prompt.clone()
        };
        (turn_prompt, full_prompt)
    }
}
