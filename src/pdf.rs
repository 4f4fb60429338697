//! Text extraction from PDF byte streams.

use lopdf::Document;
use std::io::Read;
use thiserror::Error;

/// Errors raised while reading a PDF.
#[derive(Debug, Error)]
pub enum PdfError {
    /// The input stream could not be read.
    #[error("Failed to read PDF stream: {0}")]
    Io(#[from] std::io::Error),
    /// The bytes are not a parseable PDF document.
    #[error("Failed to parse PDF: {0}")]
    Parse(String),
    /// A page was found but its content could not be decoded into text.
    #[error("Failed to extract text from page {page}: {reason}")]
    Extraction {
        /// One-based page number.
        page: u32,
        /// Underlying decoder message.
        reason: String,
    },
}

/// Visible text of a PDF, concatenated across pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    /// Page texts in page order, trimmed at both ends.
    pub text: String,
    /// Number of pages in the document.
    pub page_count: usize,
}

/// Extract the visible text of every page, in page order.
///
/// Page texts are concatenated without separators beyond what each page already ends with, and
/// the result is trimmed. Invalid PDFs are reported as [`PdfError::Parse`].
pub fn extract_text(bytes: &[u8]) -> Result<ExtractedText, PdfError> {
    let document =
        Document::load_mem(bytes).map_err(|error| PdfError::Parse(error.to_string()))?;
    let pages = document.get_pages();
    let page_count = pages.len();

    let mut text = String::new();
    for page in pages.keys().copied() {
        let page_text = document
            .extract_text(&[page])
            .map_err(|error| PdfError::Extraction {
                page,
                reason: error.to_string(),
            })?;
        tracing::trace!(page, chars = page_text.len(), "Extracted page text");
        text.push_str(&page_text);
    }

    let text = text.trim().to_string();
    tracing::debug!(page_count, chars = text.len(), "Extracted PDF text");
    Ok(ExtractedText { text, page_count })
}

/// Read a PDF from `reader` to its end and extract its text.
pub fn extract_text_from_reader<R: Read>(mut reader: R) -> Result<ExtractedText, PdfError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    extract_text(&bytes)
}

/// Build a minimal single-font PDF with one text line per page.
#[cfg(test)]
pub(crate) fn fixture_pdf(pages: &[&str]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{Object, Stream, dictionary};

    let mut document = Document::with_version("1.5");
    let pages_id = document.new_object_id();
    let font_id = document.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = document.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for line in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id =
            document.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    document.save_to(&mut bytes).unwrap();
    bytes
}
