//! The structured document model produced by content synthesis.
//!
//! This is the unit exchanged between the synthesizer and the paginating
//! renderer: a title plus an ordered sequence of typed content blocks. The
//! model deserialises the exact JSON schema the VLM is instructed to emit
//! (see [`crate::prompts::STRUCTURED_SYSTEM_PROMPT`]):
//!
//! ```json
//! {
//!   "title": "Lecture 4 — Fourier Series",
//!   "content": [
//!     { "type": "heading1", "text": "Fourier Series" },
//!     { "type": "paragraph", "text": "A periodic function can be..." },
//!     { "type": "list", "items": ["orthogonality", "convergence"] },
//!     { "type": "equation", "text": "f(x) = a0/2 + Σ an cos(nx) + bn sin(nx)" },
//!     { "type": "diagram", "text": "Unit circle", "svg": "<svg ...>...</svg>" }
//!   ]
//! }
//! ```
//!
//! Blocks are produced once by synthesis and are immutable thereafter; the
//! renderer only reads them. A `diagram` block requires BOTH a caption and
//! SVG markup — a response missing either is rejected at deserialisation
//! time rather than patched up downstream.

use serde::{Deserialize, Serialize};

/// A synthesised document: title plus ordered content blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteDocument {
    /// Document title, rendered as the first level-1 heading.
    pub title: String,
    /// Ordered content blocks; layout never reorders them.
    pub content: Vec<ContentBlock>,
}

/// One typed unit of document content.
///
/// The serde representation is internally tagged on `"type"`, matching the
/// wire schema block-for-block. Each variant carries only the fields it
/// needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    /// Level-1 heading.
    #[serde(rename = "heading1")]
    Heading1 { text: String },

    /// Level-2 heading.
    #[serde(rename = "heading2")]
    Heading2 { text: String },

    /// Body paragraph, wrapped to the page width.
    #[serde(rename = "paragraph")]
    Paragraph { text: String },

    /// Bullet list; one indented, wrapped entry per item.
    #[serde(rename = "list")]
    List { items: Vec<String> },

    /// Display equation, centred with symmetric padding.
    #[serde(rename = "equation")]
    Equation { text: String },

    /// Diagram: an italic caption above SVG markup to be rasterised.
    /// Both fields are mandatory.
    #[serde(rename = "diagram")]
    Diagram { text: String, svg: String },
}

impl ContentBlock {
    /// The block kind as recorded in layout placements.
    pub fn kind(&self) -> BlockKind {
        match self {
            ContentBlock::Heading1 { .. } => BlockKind::Heading1,
            ContentBlock::Heading2 { .. } => BlockKind::Heading2,
            ContentBlock::Paragraph { .. } => BlockKind::Paragraph,
            ContentBlock::List { .. } => BlockKind::List,
            ContentBlock::Equation { .. } => BlockKind::Equation,
            ContentBlock::Diagram { .. } => BlockKind::Diagram,
        }
    }
}

/// Discriminant-only view of a block, used by [`crate::layout::LayoutSummary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Heading1,
    Heading2,
    Paragraph,
    List,
    Equation,
    Diagram,
    /// A diagram whose rasterisation failed and was replaced by a marked
    /// error line.
    DiagramError,
}
