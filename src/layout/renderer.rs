//! Document walk and PDF emission.
//!
//! Coordinates are managed top-down in millimetres (`y_mm` grows toward the
//! bottom margin) and converted to PDF's bottom-left origin only at draw
//! time. All break decisions happen against the top-down cursor *before*
//! anything is drawn, so the emitted PDF and the returned [`LayoutSummary`]
//! always agree.

use super::diagram::{infer_aspect_ratio, rasterize_svg, RasterImage};
use super::geometry::{style, PageGeometry};
use super::text::{text_width_mm, wrap};
use crate::document::{BlockKind, ContentBlock, NoteDocument};
use crate::error::FileError;
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Output pixel density diagram sizes are computed against; the oversample
/// factor multiplies this when rasterising.
const OUTPUT_DPI: f32 = 96.0;
const MM_PER_INCH: f32 = 25.4;

/// Where one content block landed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Index of the block in `NoteDocument::content`.
    pub block_index: usize,
    /// What was actually placed; a failed diagram records
    /// [`BlockKind::DiagramError`].
    pub kind: BlockKind,
    /// 1-based page number.
    pub page: usize,
    /// Top-down cursor position of the block's first line, in millimetres.
    pub y_mm: f32,
}

/// The renderer's layout decisions for one document.
///
/// Identical document + geometry must always produce an identical summary;
/// this is the determinism contract the output PDF bytes cannot offer
/// (the PDF writer embeds timestamps).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSummary {
    pub page_count: usize,
    pub placements: Vec<Placement>,
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
}

/// Top-down page cursor over a growing printpdf document.
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    geometry: PageGeometry,
    y_mm: f32,
    page: usize,
}

impl PageWriter {
    fn new(title: &str, geometry: PageGeometry) -> Self {
        let (doc, page_idx, layer_idx) = PdfDocument::new(
            title,
            Mm(geometry.page_width_mm as f64),
            Mm(geometry.page_height_mm as f64),
            "Layer 1",
        );
        let layer = doc.get_page(page_idx).get_layer(layer_idx);
        Self {
            doc,
            layer,
            geometry,
            y_mm: geometry.margin_top_mm,
            page: 1,
        }
    }

    fn load_fonts(&self) -> Result<Fonts, FileError> {
        let load = |f: BuiltinFont| {
            self.doc
                .add_builtin_font(f)
                .map_err(|e| FileError::RenderFailed {
                    detail: format!("builtin font: {e}"),
                })
        };
        Ok(Fonts {
            regular: load(BuiltinFont::Helvetica)?,
            bold: load(BuiltinFont::HelveticaBold)?,
            oblique: load(BuiltinFont::HelveticaOblique)?,
        })
    }

    fn bottom_limit(&self) -> f32 {
        self.geometry.page_height_mm - self.geometry.margin_bottom_mm
    }

    /// First-fit page-break policy: if the next placement unit would cross
    /// the bottom margin, start a new page and reset the cursor to the top
    /// margin. The `y_mm > margin_top` guard keeps a unit taller than a full
    /// page from breaking forever; such a unit lands at the top of a fresh
    /// page and its caller flows it line by line.
    fn break_before(&mut self, needed_mm: f32) {
        if self.y_mm + needed_mm > self.bottom_limit() && self.y_mm > self.geometry.margin_top_mm {
            self.new_page();
        }
    }

    fn new_page(&mut self) {
        let (page_idx, layer_idx) = self.doc.add_page(
            Mm(self.geometry.page_width_mm as f64),
            Mm(self.geometry.page_height_mm as f64),
            "Layer 1",
        );
        self.layer = self.doc.get_page(page_idx).get_layer(layer_idx);
        self.y_mm = self.geometry.margin_top_mm;
        self.page += 1;
        debug!("Page break → page {}", self.page);
    }

    /// Text baseline for a line whose top edge sits at `top_mm`, converted
    /// to PDF's bottom-left origin.
    fn baseline(&self, top_mm: f32, line_mm: f32) -> Mm {
        let baseline = top_mm + line_mm * style::BASELINE_RATIO;
        Mm((self.geometry.page_height_mm - baseline) as f64)
    }

    /// Draw one line at the cursor and advance by its line height.
    fn draw_line(
        &mut self,
        text: &str,
        font: &IndirectFontRef,
        size_pt: f32,
        x_mm: f32,
        line_mm: f32,
    ) {
        let y = self.baseline(self.y_mm, line_mm);
        self.layer
            .use_text(text, size_pt as f64, Mm(x_mm as f64), y, font);
        self.y_mm += line_mm;
    }

    fn here(&self) -> (usize, f32) {
        (self.page, self.y_mm)
    }
}

/// Lay a document model out across fixed-size pages and emit PDF bytes.
///
/// Blocking: rasterisation and PDF assembly are CPU-bound; async callers
/// wrap this in `spawn_blocking`.
///
/// # Errors
/// [`FileError::RenderFailed`] for unusable geometry, font registration, or
/// PDF serialisation failures. A failed *diagram* is not an error — it is
/// degraded in place to a marked line and layout continues.
pub fn render_document(
    document: &NoteDocument,
    geometry: &PageGeometry,
    oversample: f32,
) -> Result<(Vec<u8>, LayoutSummary), FileError> {
    if !geometry.is_usable() {
        return Err(FileError::RenderFailed {
            detail: format!("page geometry leaves no usable content area: {geometry:?}"),
        });
    }

    let mut writer = PageWriter::new(&document.title, *geometry);
    let fonts = writer.load_fonts()?;

    // The title renders as a level-1 heading but is not a content block, so
    // it appears in no placement record.
    if !document.title.trim().is_empty() {
        place_heading(
            &mut writer,
            &fonts,
            &document.title,
            style::H1_SIZE_PT,
            style::H1_LINE_MM,
            style::H1_AFTER_MM,
        );
    }

    let mut placements = Vec::with_capacity(document.content.len());
    for (block_index, block) in document.content.iter().enumerate() {
        let (kind, page, y_mm) = place_block(&mut writer, &fonts, block, oversample);
        placements.push(Placement {
            block_index,
            kind,
            page,
            y_mm,
        });
    }

    let summary = LayoutSummary {
        page_count: writer.page,
        placements,
    };

    let PageWriter { doc, .. } = writer;
    let bytes = doc.save_to_bytes().map_err(|e| FileError::RenderFailed {
        detail: format!("PDF serialisation: {e}"),
    })?;

    Ok((bytes, summary))
}

fn place_block(
    writer: &mut PageWriter,
    fonts: &Fonts,
    block: &ContentBlock,
    oversample: f32,
) -> (BlockKind, usize, f32) {
    match block {
        ContentBlock::Heading1 { text } => {
            let at = place_heading(
                writer,
                fonts,
                text,
                style::H1_SIZE_PT,
                style::H1_LINE_MM,
                style::H1_AFTER_MM,
            );
            (BlockKind::Heading1, at.0, at.1)
        }
        ContentBlock::Heading2 { text } => {
            let at = place_heading(
                writer,
                fonts,
                text,
                style::H2_SIZE_PT,
                style::H2_LINE_MM,
                style::H2_AFTER_MM,
            );
            (BlockKind::Heading2, at.0, at.1)
        }
        ContentBlock::Paragraph { text } => {
            let at = place_paragraph(writer, fonts, text);
            (BlockKind::Paragraph, at.0, at.1)
        }
        ContentBlock::List { items } => {
            let at = place_list(writer, fonts, items);
            (BlockKind::List, at.0, at.1)
        }
        ContentBlock::Equation { text } => {
            let at = place_equation(writer, fonts, text);
            (BlockKind::Equation, at.0, at.1)
        }
        ContentBlock::Diagram { text, svg } => place_diagram(writer, fonts, text, svg, oversample),
    }
}

fn place_heading(
    writer: &mut PageWriter,
    fonts: &Fonts,
    text: &str,
    size_pt: f32,
    line_mm: f32,
    after_mm: f32,
) -> (usize, f32) {
    let width = writer.geometry.content_width_mm();
    let x = writer.geometry.margin_left_mm;
    let lines = wrap(text, size_pt, width);

    writer.break_before(lines.len() as f32 * line_mm);
    let at = writer.here();
    for line in &lines {
        writer.draw_line(line, &fonts.bold, size_pt, x, line_mm);
    }
    writer.y_mm += after_mm;
    at
}

/// Paragraphs are placed atomically: if the wrapped lines would cross the
/// bottom margin the whole paragraph moves to the next page. Only a
/// paragraph taller than a full page is flowed line by line, because it
/// cannot fit anywhere whole.
fn place_paragraph(writer: &mut PageWriter, fonts: &Fonts, text: &str) -> (usize, f32) {
    let width = writer.geometry.content_width_mm();
    let x = writer.geometry.margin_left_mm;
    let lines = wrap(text, style::BODY_SIZE_PT, width);
    let height = lines.len() as f32 * style::BODY_LINE_MM;

    if height <= writer.geometry.usable_height_mm() {
        writer.break_before(height);
        let at = writer.here();
        for line in &lines {
            writer.draw_line(line, &fonts.regular, style::BODY_SIZE_PT, x, style::BODY_LINE_MM);
        }
        writer.y_mm += style::PARA_AFTER_MM;
        return at;
    }

    let at = writer.here();
    for line in &lines {
        writer.break_before(style::BODY_LINE_MM);
        writer.draw_line(line, &fonts.regular, style::BODY_SIZE_PT, x, style::BODY_LINE_MM);
    }
    writer.y_mm += style::PARA_AFTER_MM;
    at
}

/// Each list item is its own placement unit: wrapped within the indent,
/// checked against the remaining space, advanced cumulatively. A long list
/// flows across pages without losing items.
fn place_list(writer: &mut PageWriter, fonts: &Fonts, items: &[String]) -> (usize, f32) {
    let indent_x = writer.geometry.margin_left_mm + style::LIST_INDENT_MM;
    let item_width = writer.geometry.content_width_mm() - style::LIST_INDENT_MM;
    let mut first: Option<(usize, f32)> = None;

    for item in items {
        let lines = wrap(item, style::BODY_SIZE_PT, item_width);
        if lines.is_empty() {
            continue;
        }
        writer.break_before(lines.len() as f32 * style::BODY_LINE_MM);
        if first.is_none() {
            first = Some(writer.here());
        }

        // Bullet on the first line only; continuation lines hang at the
        // same indent.
        let bullet_y = writer.baseline(writer.y_mm, style::BODY_LINE_MM);
        writer.layer.use_text(
            "•",
            style::BODY_SIZE_PT as f64,
            Mm(writer.geometry.margin_left_mm as f64),
            bullet_y,
            &fonts.regular,
        );
        for line in &lines {
            writer.draw_line(line, &fonts.regular, style::BODY_SIZE_PT, indent_x, style::BODY_LINE_MM);
        }
    }

    writer.y_mm += style::LIST_AFTER_MM;
    first.unwrap_or_else(|| writer.here())
}

/// Equations are centred, wrapped like a paragraph, padded symmetrically,
/// and checked against the remaining space before placement.
fn place_equation(writer: &mut PageWriter, fonts: &Fonts, text: &str) -> (usize, f32) {
    let width = writer.geometry.content_width_mm();
    let lines = wrap(text, style::BODY_SIZE_PT, width);
    let height = 2.0 * style::EQUATION_PAD_MM + lines.len() as f32 * style::BODY_LINE_MM;

    writer.break_before(height);
    let at = writer.here();
    writer.y_mm += style::EQUATION_PAD_MM;
    for line in &lines {
        let line_width = text_width_mm(line, style::BODY_SIZE_PT);
        let x = writer.geometry.margin_left_mm + ((width - line_width) / 2.0).max(0.0);
        writer.draw_line(line, &fonts.regular, style::BODY_SIZE_PT, x, style::BODY_LINE_MM);
    }
    writer.y_mm += style::EQUATION_PAD_MM;
    at
}

/// Diagrams render an italic caption above the rasterised image, centred
/// horizontally. On rasterisation failure exactly one marked line is
/// substituted and layout continues with the next block.
fn place_diagram(
    writer: &mut PageWriter,
    fonts: &Fonts,
    caption: &str,
    svg: &str,
    oversample: f32,
) -> (BlockKind, usize, f32) {
    let geometry = writer.geometry;
    let content_width = geometry.content_width_mm();

    let caption_lines = wrap(caption, style::CAPTION_SIZE_PT, content_width);
    let caption_height = caption_lines.len() as f32 * style::CAPTION_LINE_MM;

    // Size against the declared aspect ratio; shrink to keep the whole
    // block on one page.
    let aspect = infer_aspect_ratio(svg);
    let mut image_width = content_width;
    let mut image_height = image_width / aspect;
    let max_image_height =
        (geometry.usable_height_mm() - caption_height - style::DIAGRAM_AFTER_MM).max(1.0);
    if image_height > max_image_height {
        image_height = max_image_height;
        image_width = image_height * aspect;
    }

    let px_per_mm = OUTPUT_DPI / MM_PER_INCH * oversample;
    let raster = match rasterize_svg(svg, image_width, image_height, px_per_mm) {
        Ok(raster) => raster,
        Err(e) => {
            warn!("Diagram rasterisation failed, substituting marker: {e}");
            return place_diagram_marker(writer, fonts, caption);
        }
    };

    writer.break_before(caption_height + image_height);
    let at = writer.here();
    for line in &caption_lines {
        writer.draw_line(
            line,
            &fonts.oblique,
            style::CAPTION_SIZE_PT,
            geometry.margin_left_mm,
            style::CAPTION_LINE_MM,
        );
    }

    embed_raster(writer, raster, image_width, image_height, content_width);
    writer.y_mm += image_height + style::DIAGRAM_AFTER_MM;
    (BlockKind::Diagram, at.0, at.1)
}

/// Place the rasterised pixels, centred, at the current cursor.
fn embed_raster(
    writer: &mut PageWriter,
    raster: RasterImage,
    image_width: f32,
    image_height: f32,
    content_width: f32,
) {
    let RasterImage {
        width,
        height,
        pixels,
    } = raster;
    // The buffer is width*height*3 by construction, so this cannot fail.
    let Some(buffer) = printpdf::image_crate::RgbImage::from_raw(width, height, pixels) else {
        return;
    };

    let x = writer.geometry.margin_left_mm + (content_width - image_width) / 2.0;
    let y_bottom = writer.geometry.page_height_mm - (writer.y_mm + image_height);
    // dpi chosen so the placed image is exactly image_width mm wide;
    // the raster is oversampled, so dpi lands above OUTPUT_DPI.
    let dpi = width as f32 * MM_PER_INCH / image_width;

    Image::from_dynamic_image(&printpdf::image_crate::DynamicImage::ImageRgb8(buffer)).add_to_layer(
        writer.layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x as f64)),
            translate_y: Some(Mm(y_bottom as f64)),
            dpi: Some(dpi as f64),
            ..Default::default()
        },
    );
}

/// The degraded form of a failed diagram: exactly one visibly marked line.
fn place_diagram_marker(
    writer: &mut PageWriter,
    fonts: &Fonts,
    caption: &str,
) -> (BlockKind, usize, f32) {
    writer.break_before(style::BODY_LINE_MM);
    let at = writer.here();
    let marker = format!("[diagram could not be rendered: {caption}]");
    writer.draw_line(
        &marker,
        &fonts.oblique,
        style::BODY_SIZE_PT,
        writer.geometry.margin_left_mm,
        style::BODY_LINE_MM,
    );
    writer.y_mm += style::PARA_AFTER_MM;
    (BlockKind::DiagramError, at.0, at.1)
}
