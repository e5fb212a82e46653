//! Response cleanup: deterministic repairs of VLM output quirks.
//!
//! Even well-prompted models occasionally disobey formatting instructions in
//! ways that are *semantically correct* but *structurally invalid*:
//!
//! - Wrapping the JSON document in ` ```json ... ``` ` fences despite the
//!   prompt saying not to
//! - Doing the same with ` ```latex ` around a `.tex` document
//! - Using Windows-style `\r\n` line endings
//! - Sprinkling invisible Unicode (zero-width spaces, BOM) into the text
//!
//! These rules are cheap string transformations applied before the JSON
//! parser or the markup exporter ever sees the response. Keeping them here
//! rather than in the prompt means the prompt stays focused on *what to
//! transcribe*, not on formatting edge-cases. Each rule is independently
//! testable.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json|latex|tex|markdown)?\n(.*)\n```\s*$").unwrap());

/// Strip one outer code fence, if the entire response is wrapped in one.
///
/// Fences *inside* the content (e.g. a verbatim listing in the notes) are
/// untouched; only a fence spanning the whole response is removed.
pub fn strip_outer_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

fn remove_invisible_chars(input: &str) -> String {
    input
        .chars()
        .filter(|c| !matches!(c, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}'))
        .collect()
}

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{}\n", trimmed)
    }
}

/// Prepare a structured (JSON) response for parsing.
pub fn clean_structured_response(input: &str) -> String {
    let s = strip_outer_fences(input);
    let s = remove_invisible_chars(&s);
    s.trim().to_string()
}

/// Prepare a markup (LaTeX) response for export.
pub fn clean_markup(input: &str) -> String {
    let s = strip_outer_fences(input);
    let s = normalise_line_endings(&s);
    let s = remove_invisible_chars(&s);
    ensure_final_newline(&s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        let wrapped = "```json\n{\"title\": \"T\"}\n```";
        assert_eq!(strip_outer_fences(wrapped), "{\"title\": \"T\"}");
    }

    #[test]
    fn strips_latex_fence() {
        let wrapped = "```latex\n\\documentclass{article}\n```\n";
        assert_eq!(strip_outer_fences(wrapped), "\\documentclass{article}");
    }

    #[test]
    fn strips_anonymous_fence() {
        let wrapped = "```\ncontent\n```";
        assert_eq!(strip_outer_fences(wrapped), "content");
    }

    #[test]
    fn leaves_unfenced_input_alone() {
        let plain = "{\"title\": \"T\", \"content\": []}";
        assert_eq!(strip_outer_fences(plain), plain);
    }

    #[test]
    fn leaves_interior_fences_alone() {
        let body = "\\begin{verbatim}\n```\ncode\n```\n\\end{verbatim}";
        assert_eq!(strip_outer_fences(body), body);
    }

    #[test]
    fn clean_structured_removes_bom_and_trims() {
        let raw = "\u{FEFF}  {\"title\": \"T\"}  ";
        assert_eq!(clean_structured_response(raw), "{\"title\": \"T\"}");
    }

    #[test]
    fn clean_markup_normalises_crlf_and_final_newline() {
        let raw = "\\section{A}\r\nBody\r\n";
        assert_eq!(clean_markup(raw), "\\section{A}\nBody\n");
    }

    #[test]
    fn clean_markup_of_empty_is_single_newline() {
        assert_eq!(clean_markup("   "), "\n");
    }
}
