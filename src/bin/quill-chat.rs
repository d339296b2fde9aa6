//! Interactive chat client for conversing with Claude.
//!
//! This binary provides a streaming REPL interface for chatting with Claude
//! models via the Anthropic API.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! quill-chat
//!
//! # Specify a model
//! quill-chat --model claude-3-5-haiku-latest
//!
//! # One-shot conversations (no context carried between turns)
//! quill-chat --no-context
//!
//! # Keep an on-disk log of every turn
//! quill-chat --history-file history.json
//! ```
//!
//! # Commands
//!
//! While chatting you can use control commands:
//! - `exit`, `quit`, `q`, or `/quit` - exit
//! - `/save <file>` - multiline code-generation prompt saved to a file
//! - `/multi` - compose the next message across multiple lines
//! - `/clear` - clear conversation history
//! - `/help` - show available commands

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use quill::chat::{ChatArgs, ChatCommand, ChatConfig, help_text, parse_command};
use quill::extract::classify;
use quill::output::write_code_blocks;
use quill::render::{PlainTextRenderer, Renderer};
use quill::session::{ChatSession, SessionConfig};
use quill::{Anthropic, HistoryLog};

/// Main entry point for the quill-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("quill-chat [OPTIONS]");
    let config = ChatConfig::from(&args);

    let mut rl = DefaultEditor::new()?;
    let client = connect(args.api_key.clone(), &mut rl)?;

    let session_config = SessionConfig::new(config.model.clone(), config.preserve_context)
        .with_max_tokens(config.max_tokens);
    let mut session = ChatSession::new(client, session_config);
    if let Some(path) = &config.history_path {
        session = session.with_journal(HistoryLog::new(path));
    }
    let mut renderer = PlainTextRenderer::with_color(config.use_color);

    // Flag for interrupt handling during streaming
    let interrupted = Arc::new(AtomicBool::new(false));

    // Set up Ctrl+C handler
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    println!("Quill Chat (model: {})", session.model());
    println!("Type /help for commands, /quit to exit\n");

    loop {
        // Reset interrupt flag before each input
        interrupted.store(false, Ordering::Relaxed);

        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Clear => {
                            session.clear();
                            renderer.print_info("Conversation cleared.");
                        }
                        ChatCommand::Multiline => {
                            renderer.print_info(
                                "Enter your message (end with '.' on its own line):",
                            );
                            let message = read_multiline(&mut rl);
                            if message.trim().is_empty() {
                                continue;
                            }
                            run_turn(&mut session, &config, &message, &mut renderer, &interrupted)
                                .await;
                        }
                        ChatCommand::Save(path) => {
                            renderer.print_info(
                                "Enter your prompt for code generation (end with '.' on its own line):",
                            );
                            let prompt = read_multiline(&mut rl);
                            if prompt.trim().is_empty() {
                                continue;
                            }
                            let response = session.send(&prompt, None, true).await;
                            save_artifacts(&path, &response, &mut renderer);
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                // Regular message - send to API
                run_turn(&mut session, &config, line, &mut renderer, &interrupted).await;
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

/// Builds the API client, falling back to one interactive key prompt when
/// neither the flag nor the environment supplies a key.
fn connect(
    api_key: Option<String>,
    rl: &mut DefaultEditor,
) -> Result<Anthropic, Box<dyn std::error::Error>> {
    match Anthropic::new(api_key) {
        Ok(client) => Ok(client),
        Err(e) if e.is_authentication() => {
            let key = rl.readline("Anthropic API key: ")?;
            Ok(Anthropic::new(Some(key.trim().to_string()))?)
        }
        Err(e) => Err(e.into()),
    }
}

/// Sends one regular message, streaming unless disabled.
async fn run_turn(
    session: &mut ChatSession<Anthropic>,
    config: &ChatConfig,
    message: &str,
    renderer: &mut PlainTextRenderer,
    interrupted: &Arc<AtomicBool>,
) {
    renderer.print_banner("Claude:");
    if config.streaming {
        session
            .send_streaming(message, None, false, renderer, interrupted.clone())
            .await;
    } else {
        let response = session.send(message, None, false).await;
        renderer.print_text(&response);
        renderer.finish_response();
    }
}

/// Reads lines until a lone `.` or end of input.
fn read_multiline(rl: &mut DefaultEditor) -> String {
    let mut lines = Vec::new();
    loop {
        match rl.readline("") {
            Ok(line) => {
                if line.trim() == "." {
                    break;
                }
                lines.push(line);
            }
            Err(_) => break,
        }
    }
    lines.join("\n")
}

/// Extracts code from a response and writes it per the fan-out policy.
fn save_artifacts(path: &str, response: &str, renderer: &mut PlainTextRenderer) {
    let blocks = classify(response);
    match write_code_blocks(path, &blocks, response) {
        Ok((written, any_valid)) => {
            if !any_valid {
                renderer.print_info("No valid code blocks found; saved raw response.");
            }
            for path in written {
                renderer.print_info(&format!("Code saved to {}", path.display()));
            }
        }
        Err(e) => renderer.print_error(&format!("Failed to save code: {}", e)),
    }
}
