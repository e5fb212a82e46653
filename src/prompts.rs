//! System prompts for VLM-based note transcription.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the structured prompt must stay in
//!    lock-step with the serde schema in [`crate::document`]; keeping it in
//!    one place makes that coupling visible.
//!
//! 2. **Testability** — unit tests can assert the prompt names every block
//!    type and field the deserialiser expects, without spinning up a VLM.
//!
//! Callers can override either prompt via
//! [`crate::config::ConversionConfig::system_prompt`]; the constants here are
//! used only when no override is provided.

use crate::config::OutputFormat;

/// System prompt for structured (PDF) output.
///
/// The model receives every page image of one document in a single request
/// and must return one JSON object for the whole document.
pub const STRUCTURED_SYSTEM_PROMPT: &str = r#"You are an expert at transcribing scanned and handwritten notes. You receive every page of one document as images, in reading order. Transcribe and enhance them into a single structured document.

Follow these rules precisely:

1. CONTENT
   - Transcribe ALL legible content across all pages, in reading order
   - Clean up shorthand and abbreviations into full prose where the meaning is unambiguous
   - Merge content that continues across page boundaries

2. STRUCTURE
   - Infer a concise document title from the content
   - Use heading1 for the main topic, heading2 for sections
   - Group related bullet points into a single list block
   - Keep mathematical work as equation blocks, one displayed equation each

3. DIAGRAMS
   - Redraw sketched figures as clean SVG markup with an explicit viewBox
   - Every diagram needs BOTH a short caption and the SVG markup
   - Use simple shapes, paths, and text; no external references or scripts

4. OUTPUT FORMAT
   Return ONLY a JSON object, no commentary, matching exactly:
   {
     "title": string,
     "content": [
       { "type": "heading1",  "text": string },
       { "type": "heading2",  "text": string },
       { "type": "paragraph", "text": string },
       { "type": "list",      "items": [string, ...] },
       { "type": "equation",  "text": string },
       { "type": "diagram",   "text": string, "svg": string }
     ]
   }
   - "content" is an ordered array; every element has a "type" field
   - Do NOT wrap the JSON in markdown fences
   - Do NOT invent content that is not on the pages"#;

/// System prompt for markup (LaTeX) output.
pub const MARKUP_SYSTEM_PROMPT: &str = r#"You are an expert at transcribing scanned and handwritten notes into LaTeX. You receive every page of one document as images, in reading order.

Follow these rules precisely:

1. CONTENT
   - Transcribe ALL legible content across all pages, in reading order
   - Clean up shorthand into full prose where the meaning is unambiguous

2. STRUCTURE
   - Produce a complete, compilable LaTeX document: \documentclass{article},
     the needed packages (amsmath, amssymb, graphicx), \begin{document} ... \end{document}
   - Use \section and \subsection to mirror the notes' structure
   - Use itemize/enumerate environments for lists
   - Set mathematics in proper math environments (equation, align)

3. OUTPUT FORMAT
   - Output ONLY the LaTeX source
   - Do NOT wrap it in markdown fences
   - Do NOT add commentary before or after the document"#;

/// The built-in prompt for an output format.
pub fn default_prompt(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Pdf => STRUCTURED_SYSTEM_PROMPT,
        OutputFormat::Latex => MARKUP_SYSTEM_PROMPT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_prompt_names_every_block_type() {
        for ty in ["heading1", "heading2", "paragraph", "list", "equation", "diagram"] {
            assert!(
                STRUCTURED_SYSTEM_PROMPT.contains(ty),
                "prompt must mention block type {ty}"
            );
        }
    }

    #[test]
    fn structured_prompt_names_schema_fields() {
        for field in ["\"title\"", "\"content\"", "\"items\"", "\"svg\""] {
            assert!(STRUCTURED_SYSTEM_PROMPT.contains(field));
        }
    }

    #[test]
    fn markup_prompt_demands_complete_document() {
        assert!(MARKUP_SYSTEM_PROMPT.contains("\\documentclass"));
        assert!(MARKUP_SYSTEM_PROMPT.contains("\\begin{document}"));
    }

    #[test]
    fn default_prompt_follows_format() {
        assert_eq!(default_prompt(OutputFormat::Pdf), STRUCTURED_SYSTEM_PROMPT);
        assert_eq!(default_prompt(OutputFormat::Latex), MARKUP_SYSTEM_PROMPT);
    }
}
