// Source extraction
// Resolves a rewrite target (callable value or raw text) to normalized
// source text plus its originating file and 1-based starting line.

use crate::eval::Value;
use crate::rewrite::RewriteError;

/// File identity reported for raw-text inputs.
pub const UNKNOWN_FILE: &str = "<input>";

/// A rewrite target: a callable value, or raw source text.
pub enum SourceInput<'a> {
    Callable(&'a Value),
    Text(&'a str),
}

/// Normalized source text with its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    pub text: String,
    pub file: String,
    pub line: u32,
}

/// Extracts normalized source from a rewrite target.
///
/// Function values report the file and line recorded at definition time and
/// regenerate their source (decorator lines included) from the stored
/// definition. Raw text gets the [`UNKNOWN_FILE`] sentinel and line 1. Any
/// other value kind is an [`RewriteError::UnsupportedInput`].
pub fn extract(input: SourceInput<'_>) -> Result<SourceInfo, RewriteError> {
    match input {
        SourceInput::Callable(Value::Function(func)) => Ok(SourceInfo {
            text: dedent(&func.source()),
            file: func.file.clone(),
            line: func.line(),
        }),
        SourceInput::Callable(other) => Err(RewriteError::UnsupportedInput {
            kind: other.type_name().to_string(),
        }),
        SourceInput::Text(text) => Ok(SourceInfo {
            text: dedent(text),
            file: UNKNOWN_FILE.to_string(),
            line: 1,
        }),
    }
}

/// Strips the longest common leading whitespace from every non-blank line,
/// so an indented definition parses as top-level.
pub fn dedent(text: &str) -> String {
    let margin = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    if margin == 0 {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        if line.trim().is_empty() {
            out.push('\n');
        } else {
            out.push_str(&line[margin..]);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedent_strips_common_margin() {
        let text = "    fn f(x)\n        return x\n    endfn\n";
        assert_eq!(dedent(text), "fn f(x)\n    return x\nendfn\n");
    }

    #[test]
    fn test_dedent_ignores_blank_lines() {
        let text = "  a = 1\n\n  b = 2\n";
        assert_eq!(dedent(text), "a = 1\n\nb = 2\n");
    }

    #[test]
    fn test_dedent_no_margin() {
        let text = "a = 1\n  b = 2\n";
        assert_eq!(dedent(text), text);
    }

    #[test]
    fn test_extract_text_input() {
        let info = extract(SourceInput::Text("  x = 1\n")).unwrap();
        assert_eq!(info.text, "x = 1\n");
        assert_eq!(info.file, UNKNOWN_FILE);
        assert_eq!(info.line, 1);
    }

    #[test]
    fn test_extract_rejects_non_callable() {
        let err = extract(SourceInput::Callable(&Value::Int(3))).unwrap_err();
        assert!(matches!(err, RewriteError::UnsupportedInput { .. }));
    }
}
