//! Image encoding: rasterised pages → base64 PNG attachments.
//!
//! The synthesizer receives the whole document as one multimodal request, so
//! encoding works over the full page sequence at once. PNG over JPEG:
//! handwriting survives lossless compression intact, while JPEG ringing
//! around thin pencil strokes measurably hurts transcription.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use tracing::warn;

/// Encode every rasterised page as a base64 PNG attachment, in page order.
///
/// A page that fails to encode is dropped with a warning rather than failing
/// the file; the caller treats an empty result as an extraction failure.
pub fn encode_pages(pages: &[DynamicImage], name: &str) -> Vec<ImageData> {
    pages
        .iter()
        .enumerate()
        .filter_map(|(idx, page)| match png_attachment(page) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!("'{}': dropping page {}: {e}", name, idx + 1);
                None
            }
        })
        .collect()
}

/// One page as a `detail: "high"` PNG attachment.
///
/// High detail keeps GPT-4-class models from collapsing the page into a
/// single overview tile, which loses faint pencil and sub/superscripts.
fn png_attachment(page: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let mut png = Vec::new();
    page.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
    Ok(ImageData::new(STANDARD.encode(&png), "image/png").with_detail("high"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn page(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([20, 20, 20, 255])))
    }

    #[test]
    fn encodes_every_page_in_order() {
        let pages = vec![page(8, 8), page(64, 8)];
        let encoded = encode_pages(&pages, "notes.pdf");

        assert_eq!(encoded.len(), 2);
        for data in &encoded {
            assert_eq!(data.mime_type, "image/png");
            let png = STANDARD.decode(&data.data).expect("valid base64");
            assert_eq!(&png[1..4], b"PNG");
        }
        // The wider page produces the larger payload, so order is observable.
        assert!(encoded[1].data.len() > encoded[0].data.len());
    }

    #[test]
    fn empty_input_encodes_to_nothing() {
        assert!(encode_pages(&[], "empty.pdf").is_empty());
    }
}
