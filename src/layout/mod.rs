//! The paginating renderer: deterministic layout of a document model onto
//! fixed-size PDF pages.
//!
//! This is the one part of the crate with real algorithmic content. The
//! renderer walks the ordered content blocks of a [`crate::document::NoteDocument`],
//! chooses font size and weight per block type, wraps text to the content
//! width, and inserts a page break whenever the next placement unit would
//! cross the bottom margin.
//!
//! The layout is **first-fit, single-pass, no lookahead**: blocks are placed
//! in order, earlier pages are never reflowed, and identical input always
//! produces identical layout decisions (the PDF writer may embed timestamps,
//! so the bytes themselves are not guaranteed identical — the
//! [`LayoutSummary`] is).
//!
//! ```text
//! ┌────────────────────┐
//! │  top margin        │◀ cursor resets here on page break
//! │  # Heading         │
//! │  body text wrapped │
//! │  to content width  │
//! │  • list item       │
//! │       eq (centred) │
//! │  [diagram]         │
//! │  bottom margin     │◀ placement may never cross this line
//! └────────────────────┘
//! ```

mod diagram;
mod geometry;
mod renderer;
mod text;

pub use geometry::PageGeometry;
pub use renderer::{render_document, LayoutSummary, Placement};
