//! Batch-mode client for one-shot prompts against the Anthropic API.
//!
//! # Usage
//!
//! ```bash
//! # Send a prompt and print the response
//! quill-prompt --prompt "Explain borrowing in Rust"
//!
//! # Use a file as context for the prompt
//! quill-prompt --file src/lib.rs --prompt "What does this module do?"
//!
//! # Send a file's content as the prompt itself
//! quill-prompt --file notes.txt
//!
//! # Save the raw response and the extracted code separately
//! quill-prompt --prompt "Write fizzbuzz in Python" \
//!     --output response.txt --code-file fizzbuzz.py
//! ```
//!
//! With `--code-file`, the response is scanned for fenced code blocks;
//! valid blocks are written out, several blocks fanning out to numbered
//! files. Without `--output` or `--code-file`, the response prints to
//! stdout.

use arrrg::CommandLine;
use arrrg_derive::CommandLine;

use quill::extract::classify;
use quill::output::{read_input_file, save_to_file, write_code_blocks};
use quill::session::{ChatSession, SessionConfig};
use quill::types::{DEFAULT_MAX_TOKENS, Model};
use quill::{Anthropic, HistoryLog};

/// Command-line arguments for the quill-prompt tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
struct Args {
    /// Anthropic API key.
    #[arrrg(optional, "API key (default: ANTHROPIC_API_KEY env var)", "KEY")]
    api_key: Option<String>,

    /// Model to use.
    #[arrrg(optional, "Model to use (default: claude-3-5-sonnet-latest)", "MODEL")]
    model: Option<String>,

    /// Prompt to send.
    #[arrrg(optional, "Prompt to send to Claude", "TEXT")]
    prompt: Option<String>,

    /// Path to an input file used as context (or as the prompt itself when
    /// no --prompt is given).
    #[arrrg(optional, "Path to input file", "FILE")]
    file: Option<String>,

    /// Path to save the raw response.
    #[arrrg(optional, "Path to output file for the raw response", "FILE")]
    output: Option<String>,

    /// Path to save extracted code (strips markdown fences).
    #[arrrg(optional, "Path to save generated code/content", "FILE")]
    code_file: Option<String>,

    /// Maximum tokens for the response.
    #[arrrg(optional, "Max tokens per response (default: 4096)", "TOKENS")]
    max_tokens: Option<u32>,

    /// Disable preserving conversation context.
    #[arrrg(flag, "Disable preserving conversation context")]
    no_context: bool,

    /// Path to the append-only history log.
    #[arrrg(optional, "Append the turn to this history log file", "FILE")]
    history_file: Option<String>,
}

/// Main entry point for the quill-prompt command-line tool.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = Args::from_command_line_relaxed("quill-prompt [OPTIONS]");

    if args.prompt.is_none() && args.file.is_none() {
        eprintln!("Error: Must specify --prompt and/or --file");
        std::process::exit(1);
    }

    let client = Anthropic::new(args.api_key.clone())?;
    let model: Model = args
        .model
        .as_deref()
        .map(Model::from)
        .unwrap_or_else(Model::default_model);

    // Batch mode is a single turn, so context preservation rarely matters;
    // the flag is honored anyway and the history log records the exchange
    // when requested.
    let session_config = SessionConfig::new(model, !args.no_context)
        .with_max_tokens(args.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS));
    let mut session = ChatSession::new(client, session_config);
    if let Some(path) = &args.history_file {
        session = session.with_journal(HistoryLog::new(path));
    }

    let file_content = match &args.file {
        Some(path) => match read_input_file(path) {
            Ok(content) => Some(content),
            Err(e) => {
                eprintln!("Error reading file: {e}");
                std::process::exit(1);
            }
        },
        None => None,
    };

    let code_output = args.code_file.is_some();
    let response = match (&args.prompt, &file_content) {
        (Some(prompt), None) => session.send(prompt, None, code_output).await,
        (None, Some(content)) => session.send(content, None, code_output).await,
        (Some(prompt), Some(content)) => {
            session.send(prompt, Some(content.as_str()), code_output).await
        }
        (None, None) => unreachable!("checked above"),
    };

    if let Some(code_path) = &args.code_file {
        let blocks = classify(&response);
        match write_code_blocks(code_path, &blocks, &response) {
            Ok((written, any_valid)) => {
                if !any_valid {
                    println!("No valid code blocks found; saved raw response.");
                }
                for path in written {
                    println!("Code saved to {}", path.display());
                }
            }
            Err(e) => eprintln!("Error saving code: {e}"),
        }
    }

    if let Some(output_path) = &args.output {
        match save_to_file(output_path, &response) {
            Ok(()) => println!("Response saved to {output_path}"),
            Err(e) => eprintln!("Error saving response: {e}"),
        }
    }

    if args.output.is_none() && args.code_file.is_none() {
        println!("Claude: {response}");
    }

    Ok(())
}
