//! Diagram handling: SVG aspect-ratio inference and rasterisation.
//!
//! Diagrams arrive from the synthesizer as SVG markup. Embedding them in the
//! output PDF means rasterising: the SVG is rendered with `resvg` at a
//! higher pixel density than the output resolution (oversampling), then
//! placed scaled down so curves stay sharp instead of blurring.
//!
//! The aspect ratio is inferred from the root element's declared `width` and
//! `height` attributes, falling back to the `viewBox`, falling back to 1:1.
//! The inference is done on the raw markup rather than the parsed tree so a
//! diagram that later fails to *render* still gets a sensible reserved box —
//! the break decision must not depend on whether rendering will succeed.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

/// Rasterisation failure; degraded to a marked error line by the renderer,
/// never propagated as a file error.
#[derive(Debug, Error)]
pub(crate) enum SvgRasterError {
    #[error("invalid SVG markup: {0}")]
    Parse(String),
    #[error("rasterisation failed: {0}")]
    Raster(String),
}

/// An opaque RGB8 raster of a diagram, ready for PDF embedding.
///
/// Raw pixels rather than a `DynamicImage` so the PDF writer's own image
/// types can wrap them without tying this module to a specific `image`
/// crate version.
pub(crate) struct RasterImage {
    pub width: u32,
    pub height: u32,
    /// Row-major RGB8, `width * height * 3` bytes.
    pub pixels: Vec<u8>,
}

static RE_SVG_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<svg\b[^>]*>").unwrap());
static RE_WIDTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bwidth\s*=\s*["']\s*([0-9]*\.?[0-9]+)\s*(?:px|pt|mm|cm|in)?\s*["']"#)
        .unwrap()
});
static RE_HEIGHT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bheight\s*=\s*["']\s*([0-9]*\.?[0-9]+)\s*(?:px|pt|mm|cm|in)?\s*["']"#)
        .unwrap()
});
static RE_VIEWBOX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\bviewBox\s*=\s*["']\s*[-0-9.eE]+[\s,]+[-0-9.eE]+[\s,]+([0-9.eE]+)[\s,]+([0-9.eE]+)\s*["']"#,
    )
    .unwrap()
});

/// Width/height aspect ratio declared by the SVG root element.
///
/// Resolution order: explicit `width` + `height` attributes (unit suffixes
/// ignored, percentages don't match), then the `viewBox`, then 1:1.
pub(crate) fn infer_aspect_ratio(svg: &str) -> f32 {
    let root = match RE_SVG_TAG.find(svg) {
        Some(m) => m.as_str(),
        None => return 1.0,
    };

    let attr = |re: &Regex| -> Option<f32> {
        re.captures(root)
            .and_then(|c| c[1].parse::<f32>().ok())
            .filter(|v| *v > 0.0)
    };

    if let (Some(w), Some(h)) = (attr(&RE_WIDTH), attr(&RE_HEIGHT)) {
        return w / h;
    }

    if let Some(caps) = RE_VIEWBOX.captures(root) {
        let w = caps[1].parse::<f32>().ok().filter(|v| *v > 0.0);
        let h = caps[2].parse::<f32>().ok().filter(|v| *v > 0.0);
        if let (Some(w), Some(h)) = (w, h) {
            return w / h;
        }
    }

    1.0
}

/// Upper bound on either rasterised dimension. Keeps a degenerate viewBox
/// from allocating unbounded pixel buffers.
const MAX_RASTER_PX: u32 = 4096;

/// Rasterise SVG markup to an opaque RGB image of `width_mm` × `height_mm`
/// at `px_per_mm` pixels per millimetre (output density × oversample).
pub(crate) fn rasterize_svg(
    svg: &str,
    width_mm: f32,
    height_mm: f32,
    px_per_mm: f32,
) -> Result<RasterImage, SvgRasterError> {
    let px_w = ((width_mm * px_per_mm).round() as u32).clamp(1, MAX_RASTER_PX);
    let px_h = ((height_mm * px_per_mm).round() as u32).clamp(1, MAX_RASTER_PX);

    let options = resvg::usvg::Options::default();
    let tree = resvg::usvg::Tree::from_str(svg, &options)
        .map_err(|e| SvgRasterError::Parse(e.to_string()))?;

    let size = tree.size();
    if size.width() <= 0.0 || size.height() <= 0.0 {
        return Err(SvgRasterError::Raster("zero-sized SVG".into()));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(px_w, px_h)
        .ok_or_else(|| SvgRasterError::Raster(format!("pixmap allocation {px_w}x{px_h}")))?;
    // White ground: PDF pages are white, and compositing here means the
    // embedded image needs no alpha channel.
    pixmap.fill(resvg::tiny_skia::Color::WHITE);

    let transform = resvg::tiny_skia::Transform::from_scale(
        px_w as f32 / size.width(),
        px_h as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    debug!("Rasterised diagram → {}x{} px", px_w, px_h);

    // RGBA over an opaque ground: drop the alpha channel.
    let rgba = pixmap.take();
    let mut pixels = Vec::with_capacity((px_w * px_h * 3) as usize);
    for px in rgba.chunks_exact(4) {
        pixels.extend_from_slice(&px[..3]);
    }

    Ok(RasterImage {
        width: px_w,
        height: px_h,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_from_width_and_height() {
        let svg = r#"<svg width="200" height="100"><rect/></svg>"#;
        assert!((infer_aspect_ratio(svg) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn aspect_from_width_height_with_units() {
        let svg = r#"<svg width="40mm" height="20mm"/>"#;
        assert!((infer_aspect_ratio(svg) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn aspect_falls_back_to_viewbox() {
        let svg = r#"<svg viewBox="0 0 300 100"><circle/></svg>"#;
        assert!((infer_aspect_ratio(svg) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn percent_width_defers_to_viewbox() {
        let svg = r#"<svg width="100%" height="100%" viewBox="0 0 4 2"/>"#;
        assert!((infer_aspect_ratio(svg) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn aspect_defaults_to_square() {
        assert_eq!(infer_aspect_ratio(r#"<svg><path d="M0 0"/></svg>"#), 1.0);
        assert_eq!(infer_aspect_ratio("not svg at all"), 1.0);
        assert_eq!(infer_aspect_ratio(r#"<svg viewBox="0 0 0 10"/>"#), 1.0);
    }

    #[test]
    fn rasterize_simple_rect() {
        let svg = r#"<svg viewBox="0 0 10 10"><rect x="0" y="0" width="10" height="10" fill="black"/></svg>"#;
        let raster = rasterize_svg(svg, 20.0, 20.0, 4.0).expect("valid SVG renders");
        assert_eq!(raster.width, 80);
        assert_eq!(raster.height, 80);
        assert_eq!(raster.pixels.len(), 80 * 80 * 3);
        // Centre of a black rect over a white ground.
        let mid = ((40 * 80 + 40) * 3) as usize;
        assert!(raster.pixels[mid] < 32);
    }

    #[test]
    fn rasterize_rejects_invalid_markup() {
        let err = rasterize_svg("<svg", 10.0, 10.0, 4.0).unwrap_err();
        assert!(matches!(err, SvgRasterError::Parse(_)));
    }

    #[test]
    fn raster_dimensions_are_capped() {
        let svg = r#"<svg viewBox="0 0 1 1"><rect width="1" height="1"/></svg>"#;
        let raster = rasterize_svg(svg, 10_000.0, 10.0, 100.0).expect("renders despite huge target");
        assert_eq!(raster.width, MAX_RASTER_PX);
    }
}
