//! Page geometry and per-block typography.

use serde::{Deserialize, Serialize};

/// Output page size and margins, in millimetres.
///
/// Defaults to A4 portrait with 20 mm top/bottom and 15 mm left/right
/// margins. The top and bottom margins are the fixed lines the page-break
/// policy works against: the cursor starts at the top margin and no
/// placement may cross the bottom one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_top_mm: f32,
    pub margin_bottom_mm: f32,
    pub margin_left_mm: f32,
    pub margin_right_mm: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_top_mm: 20.0,
            margin_bottom_mm: 20.0,
            margin_left_mm: 15.0,
            margin_right_mm: 15.0,
        }
    }
}

impl PageGeometry {
    /// Horizontal space available to content.
    pub fn content_width_mm(&self) -> f32 {
        self.page_width_mm - self.margin_left_mm - self.margin_right_mm
    }

    /// Vertical space available to content on one page.
    pub fn usable_height_mm(&self) -> f32 {
        self.page_height_mm - self.margin_top_mm - self.margin_bottom_mm
    }

    /// Whether the margins leave any room for content at all.
    pub fn is_usable(&self) -> bool {
        self.content_width_mm() > 0.0 && self.usable_height_mm() > 0.0
    }
}

/// Fixed typography per block type.
///
/// Line heights are in millimetres and deliberately constant per block kind:
/// the page-break arithmetic depends only on line counts, never on glyph
/// metrics, which is what keeps layout decisions reproducible.
pub(crate) mod style {
    /// Heading level 1: bold.
    pub const H1_SIZE_PT: f32 = 18.0;
    pub const H1_LINE_MM: f32 = 9.0;
    pub const H1_AFTER_MM: f32 = 4.0;

    /// Heading level 2: bold.
    pub const H2_SIZE_PT: f32 = 14.0;
    pub const H2_LINE_MM: f32 = 7.0;
    pub const H2_AFTER_MM: f32 = 3.0;

    /// Body text (paragraphs, list items, equations).
    pub const BODY_SIZE_PT: f32 = 11.0;
    pub const BODY_LINE_MM: f32 = 5.6;
    pub const PARA_AFTER_MM: f32 = 2.8;

    /// Bullet lists.
    pub const LIST_INDENT_MM: f32 = 6.0;
    pub const LIST_AFTER_MM: f32 = 2.8;

    /// Equations: symmetric vertical padding around the centred lines.
    pub const EQUATION_PAD_MM: f32 = 3.0;

    /// Diagram captions: italic, slightly smaller than body.
    pub const CAPTION_SIZE_PT: f32 = 10.0;
    pub const CAPTION_LINE_MM: f32 = 5.2;
    pub const DIAGRAM_AFTER_MM: f32 = 3.0;

    /// Fraction of the line height from the top of a line down to its
    /// baseline, used to convert the top-down cursor into PDF baseline
    /// coordinates.
    pub const BASELINE_RATIO: f32 = 0.75;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_default_content_area() {
        let g = PageGeometry::default();
        assert_eq!(g.content_width_mm(), 180.0);
        assert_eq!(g.usable_height_mm(), 257.0);
        assert!(g.is_usable());
    }

    #[test]
    fn degenerate_geometry_is_unusable() {
        let g = PageGeometry {
            page_height_mm: 30.0,
            margin_top_mm: 20.0,
            margin_bottom_mm: 20.0,
            ..PageGeometry::default()
        };
        assert!(!g.is_usable());
    }
}
