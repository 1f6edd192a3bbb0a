//! Assembles rendered card pages into a single PDF.
//!
//! Each raster page becomes one PDF page of the given physical size, with
//! the image embedded as a DCTDecode (JPEG) XObject scaled to fill the
//! MediaBox. Nothing here knows about layout — it only packages pixels.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use thiserror::Error;

/// 1 mm = 72 / 25.4 PostScript points.
pub const MM_TO_PT: f64 = 2.834_645_67;

const JPEG_QUALITY: u8 = 90;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("jpeg encode: {0}")]
    Encode(String),

    #[error("pdf build: {0}")]
    Build(String),
}

/// Builds a PDF with one page per input image, each `width_mm × height_mm`.
pub fn images_to_pdf(
    pages: &[RgbImage],
    width_mm: f64,
    height_mm: f64,
) -> Result<Vec<u8>, PdfError> {
    let width_pt = (width_mm * MM_TO_PT) as f32;
    let height_pt = (height_mm * MM_TO_PT) as f32;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => vec![],
        "Count" => 0,
    });

    for page in pages {
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
            .encode(
                page.as_raw(),
                page.width(),
                page.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| PdfError::Encode(e.to_string()))?;

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => page.width() as i64,
                "Height" => page.height() as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        ));

        // q / cm / Do / Q: scale the unit image square up to the full page.
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        width_pt.into(),
                        Object::Integer(0),
                        Object::Integer(0),
                        height_pt.into(),
                        Object::Integer(0),
                        Object::Integer(0),
                    ],
                ),
                Operation::new("Do", vec!["Im0".into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content
            .encode()
            .map_err(|e| PdfError::Build(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                width_pt.into(),
                height_pt.into(),
            ],
            "Contents" => content_id,
        });

        let pages_dict = doc
            .get_object_mut(pages_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| PdfError::Build(e.to_string()))?;
        pages_dict
            .get_mut(b"Kids")
            .and_then(Object::as_array_mut)
            .map_err(|e| PdfError::Build(e.to_string()))?
            .push(Object::Reference(page_id));
    }

    let pages_dict = doc
        .get_object_mut(pages_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| PdfError::Build(e.to_string()))?;
    pages_dict.set("Count", pages.len() as i64);

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| PdfError::Build(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn white(w: u32, h: u32) -> RgbImage {
        ImageBuffer::from_pixel(w, h, Rgb([255, 255, 255]))
    }

    #[test]
    fn test_pdf_has_one_page_per_image() {
        let bytes = images_to_pdf(&[white(2, 2), white(2, 2)], 254.0, 177.8).unwrap();
        assert_eq!(&bytes[..5], b"%PDF-");
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_empty_input_builds_empty_document() {
        let bytes = images_to_pdf(&[], 127.0, 177.8).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 0);
    }
}
