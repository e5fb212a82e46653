//! PDF rasterisation via pdfium.
//!
//! pdfium keeps thread-local state and must not be driven from async
//! contexts, so both entry points push the actual work onto the blocking
//! thread pool and await the handle.
//!
//! Page images are capped by `max_rendered_pixels` on the longest edge
//! rather than by DPI: scanned notebooks arrive in every physical size from
//! index cards to A3 sketch pages, and a pixel cap keeps memory bounded
//! while staying inside the 1,024–2,048 px sweet spot of current vision
//! models.

use crate::error::FileError;
use crate::output::DocumentMetadata;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Rasterise every page of a PDF, in page order.
pub async fn rasterize(
    pdf_path: &Path,
    max_pixels: u32,
    password: Option<&str>,
) -> Result<Vec<DynamicImage>, FileError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(str::to_string);

    tokio::task::spawn_blocking(move || rasterize_blocking(&path, max_pixels, pwd.as_deref()))
        .await
        .map_err(|e| FileError::RasterisationFailed {
            page: 0,
            detail: format!("render task panicked: {e}"),
        })?
}

fn rasterize_blocking(
    pdf_path: &Path,
    max_pixels: u32,
    password: Option<&str>,
) -> Result<Vec<DynamicImage>, FileError> {
    let pdfium = Pdfium::default();
    let document = pdfium
        .load_pdf_from_file(pdf_path, password)
        .map_err(|e| classify_load_error(pdf_path, e))?;

    let config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let pages = document.pages();
    let mut images = Vec::with_capacity(pages.len() as usize);
    for (idx, page) in pages.iter().enumerate() {
        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| FileError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{e:?}"),
            })?;
        let image = bitmap.as_image();
        debug!("page {}: {}x{} px", idx + 1, image.width(), image.height());
        images.push(image);
    }

    info!("Rasterised {} page(s) from {}", images.len(), pdf_path.display());
    Ok(images)
}

/// Whether a load failure is a password problem or a broken file.
///
/// pdfium reports both through the same error type; the password case gets
/// its own variant so the CLI can tell the user what to actually do.
fn classify_load_error(pdf_path: &Path, e: PdfiumError) -> FileError {
    let detail = format!("{e:?}");
    if detail.to_ascii_lowercase().contains("password") {
        FileError::BadPassword {
            path: pdf_path.to_path_buf(),
        }
    } else {
        FileError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail,
        }
    }
}

/// Read a PDF's metadata and page count without rendering anything.
pub async fn probe(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentMetadata, FileError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(str::to_string);

    tokio::task::spawn_blocking(move || probe_blocking(&path, pwd.as_deref()))
        .await
        .map_err(|e| FileError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: format!("metadata task panicked: {e}"),
        })?
}

fn probe_blocking(pdf_path: &Path, password: Option<&str>) -> Result<DocumentMetadata, FileError> {
    let pdfium = Pdfium::default();
    let document = pdfium
        .load_pdf_from_file(pdf_path, password)
        .map_err(|e| classify_load_error(pdf_path, e))?;

    let tags = document.metadata();
    let tag = |t: PdfDocumentMetadataTagType| {
        tags.get(t)
            .map(|v| v.value().to_string())
            .filter(|v| !v.is_empty())
    };

    Ok(DocumentMetadata {
        title: tag(PdfDocumentMetadataTagType::Title),
        author: tag(PdfDocumentMetadataTagType::Author),
        subject: tag(PdfDocumentMetadataTagType::Subject),
        creator: tag(PdfDocumentMetadataTagType::Creator),
        producer: tag(PdfDocumentMetadataTagType::Producer),
        creation_date: tag(PdfDocumentMetadataTagType::CreationDate),
        modification_date: tag(PdfDocumentMetadataTagType::ModificationDate),
        page_count: document.pages().len() as usize,
        pdf_version: format!("{:?}", document.version()),
    })
}
