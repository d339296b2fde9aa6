//! Context assembly for outgoing prompts.
//!
//! The assembler is a pure function of its inputs plus an immutable
//! history snapshot. It does no truncation and no token counting; a prompt
//! that outgrows the backend's limit surfaces as a `BadRequest` from the
//! remote call, not here.

use crate::session::Turn;

/// Fixed instruction appended when the caller wants file content back
/// rather than prose.
const CODE_OUTPUT_INSTRUCTION: &str = "Please provide the complete code file/content. \
     Do not include any explanations or markdown formatting - \
     return only the actual file content that should be saved.";

/// Builds the outgoing prompt text for one turn.
///
/// - With `file_context`, the message is framed as
///   `Context:\n{file_context}\n\nQuestion/Instruction:\n{user_message}`.
/// - With `code_output_requested`, a fixed only-file-content instruction is
///   appended.
/// - With a non-empty `history`, every prior turn's prompt and response is
///   prepended, each as a standalone line, in original order.
///
/// Cost and latency therefore grow with conversation length; that is the
/// defined behavior, not something this function compensates for.
pub fn assemble(
    user_message: &str,
    file_context: Option<&str>,
    history: &[Turn],
    code_output_requested: bool,
) -> String {
    let mut prompt_text = match file_context {
        Some(context) => {
            format!("Context:\n{context}\n\nQuestion/Instruction:\n{user_message}")
        }
        None => user_message.to_string(),
    };

    if code_output_requested {
        prompt_text = format!("{prompt_text}\n\n{CODE_OUTPUT_INSTRUCTION}");
    }

    if history.is_empty() {
        return prompt_text;
    }

    let mut lines = Vec::with_capacity(history.len() * 2 + 1);
    for turn in history {
        lines.push(turn.prompt.as_str());
        lines.push(turn.response.as_str());
    }
    lines.push(prompt_text.as_str());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(prompt: &str, response: &str) -> Turn {
        Turn::new(prompt.to_string(), response.to_string())
    }

    #[test]
    fn bare_message_passes_through() {
        assert_eq!(assemble("say hi", None, &[], false), "say hi");
    }

    #[test]
    fn file_context_framed() {
        let out = assemble("what does this do?", Some("fn main() {}"), &[], false);
        assert_eq!(
            out,
            "Context:\nfn main() {}\n\nQuestion/Instruction:\nwhat does this do?"
        );
    }

    #[test]
    fn code_output_appends_instruction() {
        let out = assemble("write fizzbuzz", None, &[], true);
        assert!(out.starts_with("write fizzbuzz\n\n"));
        assert!(out.contains("return only the actual file content"));
    }

    #[test]
    fn history_prepended_in_order() {
        let history = vec![turn("say hi", "hello"), turn("again", "hello again")];
        let out = assemble("bye", None, &history, false);
        assert_eq!(out, "say hi\nhello\nagain\nhello again\nbye");
    }

    #[test]
    fn empty_history_leaves_prompt_untouched() {
        let out = assemble("solo", None, &[], false);
        assert_eq!(out, "solo");
    }

    #[test]
    fn deterministic_for_same_snapshot() {
        let history = vec![turn("a", "b")];
        let first = assemble("c", Some("ctx"), &history, true);
        let second = assemble("c", Some("ctx"), &history, true);
        assert_eq!(first, second);
    }

    #[test]
    fn context_and_history_compose() {
        let history = vec![turn("say hi", "hello")];
        let out = assemble("explain", Some("data"), &history, false);
        assert_eq!(
            out,
            "say hi\nhello\nContext:\ndata\n\nQuestion/Instruction:\nexplain"
        );
    }
}
