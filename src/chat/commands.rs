//! Control-token parsing for the interactive chat loop.
//!
//! Recognized tokens are handled locally and never sent to the API: bare
//! exit words, `/save <path>` for code generation to a file, `/multi` for
//! multiline entry, and a few session controls.

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Exit the chat.
    Quit,

    /// Display help information.
    Help,

    /// Clear the in-memory conversation history.
    Clear,

    /// Enter multiline mode for the next message.
    Multiline,

    /// Prompt for a multiline code-generation request and save the result
    /// to the given path.
    Save(String),

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for control tokens.
///
/// Returns `Some(ChatCommand)` if the input is a recognized command, or
/// `None` if it should be treated as a regular message. Bare `exit`,
/// `quit`, and `q` are accepted alongside the slash forms.
///
/// # Examples
///
/// ```
/// # use quill::chat::{ChatCommand, parse_command};
/// assert_eq!(parse_command("quit"), Some(ChatCommand::Quit));
/// assert_eq!(
///     parse_command("/save gen.py"),
///     Some(ChatCommand::Save("gen.py".to_string()))
/// );
/// assert!(parse_command("Hello, Claude!").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if matches!(input.to_lowercase().as_str(), "exit" | "quit" | "q") {
        return Some(ChatCommand::Quit);
    }

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "help" | "?" => ChatCommand::Help,
        "clear" => ChatCommand::Clear,
        "multi" | "multiline" => ChatCommand::Multiline,
        "save" => match argument {
            Some(path) => ChatCommand::Save(path.to_string()),
            None => ChatCommand::Invalid("/save requires a file path".to_string()),
        },
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /save <file>    Prompt for a code-generation request (multiline,
                  end with '.' on its own line) and save the result
  /multi          Compose the next message across multiple lines
                  (end with '.' on its own line)
  /clear          Clear conversation history
  /help           Show this help message
  /quit           Exit the chat (also: exit, quit, q)"#
}
