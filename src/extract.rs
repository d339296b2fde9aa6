//! Code block extraction from model responses.
//!
//! Extraction is a best-effort string heuristic, not a grammar. Fenced
//! regions are paired lazily: a candidate ends at the nearest subsequent
//! closing fence, so a response with an odd number of fences silently drops
//! the content after the final unmatched opener. That is the defined
//! behavior and a known sharp edge, kept rather than "fixed".
//!
//! When no triple-backtick region exists, alternative delimiter conventions
//! are tried in a fixed priority order, stopping at the first that matches.
//! Failing all of those, runs of lines that start at a code-introducing
//! keyword are collected up to the next blank line.

/// A fence delimiter convention: opening marker, closing marker, and
/// whether a language tag may follow the opener.
struct FenceConvention {
    open: &'static str,
    close: &'static str,
    language_tag: bool,
}

/// Delimiter conventions in priority order. The first that yields at least
/// one candidate wins.
const FENCE_CONVENTIONS: &[FenceConvention] = &[
    FenceConvention { open: "```", close: "```", language_tag: true },
    FenceConvention { open: "'''", close: "'''", language_tag: false },
    FenceConvention { open: "\"\"\"", close: "\"\"\"", language_tag: false },
    FenceConvention { open: "{{{", close: "}}}", language_tag: false },
];

/// Tokens that start a line-run in the keyword heuristic.
const CODE_RUN_STARTERS: &[&str] = &[
    "def ", "class ", "import ", "from ", "fn ", "pub fn", "async fn", "function ", "const ",
    "let ", "var ", "#include", "use ", "struct ", "impl ", "package ",
];

/// Substrings that mark a candidate as plausibly code.
const CODE_INDICATORS: &[&str] = &[
    "def ", "class ", "import ", "from ", "return", "fn ", "let ", "const ", "function",
    "#include", "use ", "struct ", "impl ", "var ", "print", "=", "{", "(",
];

/// Candidates shorter than this are rejected outright.
const MIN_CANDIDATE_LEN: usize = 10;

/// An extracted candidate paired with its validation verdict.
///
/// Ephemeral: exists only during response post-processing and is never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// The trimmed candidate text.
    pub payload: String,

    /// Whether the candidate passed the validation heuristic.
    pub is_valid: bool,
}

/// Extracts ordered code candidates from response text.
///
/// Returns an empty vector when nothing matches; that is a classification
/// result, not an error.
pub fn extract(response_text: &str) -> Vec<String> {
    for convention in FENCE_CONVENTIONS {
        let candidates = extract_delimited(response_text, convention);
        if !candidates.is_empty() {
            return candidates;
        }
    }
    extract_keyword_runs(response_text)
}

/// Validates a candidate against the four-check heuristic: minimum length,
/// at least one code-indicator token, balanced bracket nesting, and at
/// least one indented line. All four must pass.
///
/// This is a heuristic filter, not a language grammar; false positives and
/// negatives are expected and acceptable.
pub fn validate(candidate: &str) -> bool {
    candidate.len() >= MIN_CANDIDATE_LEN
        && CODE_INDICATORS.iter().any(|token| candidate.contains(token))
        && brackets_balanced(candidate)
        && has_indented_line(candidate)
}

/// Extracts candidates and pairs each with its validation verdict.
pub fn classify(response_text: &str) -> Vec<CodeBlock> {
    extract(response_text)
        .into_iter()
        .map(|payload| {
            let is_valid = validate(&payload);
            CodeBlock { payload, is_valid }
        })
        .collect()
}

/// Scans for maximal non-overlapping delimited regions using lazy pairing.
fn extract_delimited(text: &str, convention: &FenceConvention) -> Vec<String> {
    let mut candidates = Vec::new();
    let mut pos = 0;
    while let Some(found) = text[pos..].find(convention.open) {
        let start = pos + found + convention.open.len();
        // Lazy pairing: the candidate ends at the nearest subsequent close.
        // An opener with no close drops the remainder of the text.
        let Some(close_at) = text[start..].find(convention.close) else {
            break;
        };
        let end = start + close_at;
        let mut body = &text[start..end];
        if convention.language_tag {
            body = strip_language_tag(body);
        }
        candidates.push(body.trim().to_string());
        pos = end + convention.close.len();
    }
    candidates
}

/// Drops a `\w*` language tag on the line immediately after an opening
/// fence. A first line containing anything other than word characters is
/// code, not a tag, and is kept.
fn strip_language_tag(body: &str) -> &str {
    match body.split_once('\n') {
        Some((first_line, rest)) => {
            let looks_like_tag = first_line
                .trim_end_matches('\r')
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_');
            if looks_like_tag { rest } else { body }
        }
        None => body,
    }
}

/// Collects runs of lines starting at a code-introducing keyword, each run
/// extending to the next blank line or end of text.
fn extract_keyword_runs(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    let mut candidates = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        if CODE_RUN_STARTERS
            .iter()
            .any(|starter| lines[i].starts_with(starter))
        {
            let start = i;
            while i < lines.len() && !lines[i].trim().is_empty() {
                i += 1;
            }
            candidates.push(lines[start..i].join("\n").trim().to_string());
        } else {
            i += 1;
        }
    }
    candidates
}

/// Checks `()[]{}` nesting with a stack: push on opener, pop-and-match on
/// closer; a mismatch, an early closer, or leftover openers all fail.
fn brackets_balanced(candidate: &str) -> bool {
    let mut stack = Vec::new();
    for c in candidate.chars() {
        match c {
            '(' | '[' | '{' => stack.push(c),
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                if stack.pop() != Some(expected) {
                    return false;
                }
            }
            _ => {}
        }
    }
    stack.is_empty()
}

/// True when at least one line carries leading whitespace before content,
/// a proxy for an indented code body rather than prose.
fn has_indented_line(candidate: &str) -> bool {
    candidate
        .lines()
        .any(|line| (line.starts_with(' ') || line.starts_with('\t')) && !line.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backtick_round_trip() {
        let body = "def f():\n    return 1";
        let response = format!("```python\n{body}\n```");
        let candidates = extract(&response);
        assert_eq!(candidates, vec![body.to_string()]);
    }

    #[test]
    fn backtick_without_language_tag() {
        let response = "```\nx = [1, 2]\n```";
        assert_eq!(extract(response), vec!["x = [1, 2]".to_string()]);
    }

    #[test]
    fn first_code_line_not_mistaken_for_tag() {
        // "x = 1" contains non-word characters, so it is body, not a tag.
        let response = "```x = 1\ny = 2\n```";
        assert_eq!(extract(response), vec!["x = 1\ny = 2".to_string()]);
    }

    #[test]
    fn two_fenced_regions_in_source_order() {
        let response = "first:\n```\naaa\n```\nthen:\n```\nbbb\n```\ndone";
        assert_eq!(
            extract(response),
            vec!["aaa".to_string(), "bbb".to_string()]
        );
    }

    #[test]
    fn odd_fence_count_drops_unclosed_tail() {
        // Three fences: the lazy pairing yields one block and drops the
        // content after the final opener.
        let response = "```\nkept\n```\ntrailing\n```\ndropped";
        assert_eq!(extract(response), vec!["kept".to_string()]);
    }

    #[test]
    fn no_fences_and_no_keywords_yields_empty() {
        let response = "Sure! Here is a plain prose answer with nothing else.";
        assert!(extract(response).is_empty());
    }

    #[test]
    fn fallback_single_quote_fence() {
        let response = "'''\nimport os\nprint(os.name)\n'''";
        assert_eq!(
            extract(response),
            vec!["import os\nprint(os.name)".to_string()]
        );
    }

    #[test]
    fn fallback_double_quote_fence() {
        let response = "\"\"\"\nlet x = 5;\n\"\"\"";
        assert_eq!(extract(response), vec!["let x = 5;".to_string()]);
    }

    #[test]
    fn fallback_curly_fence() {
        let response = "{{{\nreturn 42\n}}}";
        assert_eq!(extract(response), vec!["return 42".to_string()]);
    }

    #[test]
    fn backticks_win_over_fallback_conventions() {
        let response = "```\nfrom backticks\n```\n'''\nfrom quotes\n'''";
        assert_eq!(extract(response), vec!["from backticks".to_string()]);
    }

    #[test]
    fn keyword_run_heuristic() {
        let response = "Here is the function you asked for:\n\
                        def f():\n    return 1\n\nHope that helps!";
        assert_eq!(
            extract(response),
            vec!["def f():\n    return 1".to_string()]
        );
    }

    #[test]
    fn keyword_run_stops_at_blank_line() {
        let response = "import os\nprint(os.sep)\n\nimport sys\nprint(sys.path)";
        assert_eq!(
            extract(response),
            vec![
                "import os\nprint(os.sep)".to_string(),
                "import sys\nprint(sys.path)".to_string(),
            ]
        );
    }

    #[test]
    fn validate_accepts_plausible_code() {
        assert!(validate("def f():\n    return 1"));
    }

    #[test]
    fn validate_rejects_unbalanced_brackets() {
        assert!(!validate("def f(:\n    pass"));
    }

    #[test]
    fn validate_rejects_early_closer() {
        assert!(!validate("def f):\n    return (1"));
    }

    #[test]
    fn validate_rejects_short_candidates() {
        assert!(!validate("x = 1"));
    }

    #[test]
    fn validate_rejects_prose_without_indentation() {
        assert!(!validate("this sentence mentions return but is prose"));
    }

    #[test]
    fn validate_requires_code_indicator() {
        assert!(!validate("aaaa\n    bbbb\n    cccc"));
    }

    #[test]
    fn classify_pairs_candidates_with_verdicts() {
        let response = "```\ndef f():\n    return 1\n```\n```\nhi\n```";
        let blocks = classify(response);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].is_valid);
        assert!(!blocks[1].is_valid);
    }

    #[test]
    fn brackets_stack_discipline() {
        assert!(brackets_balanced("fn f(a: [u8; 4]) -> Vec<u8> { vec![] }"));
        assert!(!brackets_balanced("([)]"));
        assert!(!brackets_balanced("((("));
        assert!(!brackets_balanced(")"));
    }
}
