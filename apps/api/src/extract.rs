//! Text extraction for uploaded CVs. PDF via pdf-extract, DOCX via docx-rs
//! (a .docx is a ZIP of XML; docx-rs exposes the paragraph tree), plain text
//! passed through with lossy UTF-8 decoding.

use crate::errors::AppError;
use std::path::Path;

/// The three accepted upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

pub const ALLOWED_EXTENSIONS: [&str; 3] = [".pdf", ".docx", ".txt"];

impl DocumentFormat {
    /// Detects the format from the uploaded filename's extension.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = Path::new(filename).extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "txt" => Some(DocumentFormat::Txt),
            _ => None,
        }
    }
}

/// Extracts raw text from an uploaded document.
/// Returns `AppError::Extraction` when the document cannot be parsed or
/// yields no text at all.
pub fn extract_text(format: DocumentFormat, bytes: &[u8]) -> Result<String, AppError> {
    let text = match format {
        DocumentFormat::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| AppError::Extraction(format!("Error processing PDF: {e}")))?,
        DocumentFormat::Docx => extract_docx(bytes)?,
        DocumentFormat::Txt => String::from_utf8_lossy(bytes).into_owned(),
    };

    if text.trim().is_empty() {
        return Err(AppError::Extraction(
            "Document contains no extractable text".to_string(),
        ));
    }

    Ok(text)
}

/// Walks the docx-rs document tree (Document → Paragraph → Run → Text),
/// joining runs within a paragraph and paragraphs with newlines.
fn extract_docx(bytes: &[u8]) -> Result<String, AppError> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| AppError::Extraction(format!("Error processing DOCX: {e:?}")))?;

    let mut paragraphs: Vec<String> = Vec::new();
    for child in &docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(para) = child {
            let text = paragraph_text(para);
            if !text.trim().is_empty() {
                paragraphs.push(text);
            }
        }
    }

    Ok(paragraphs.join("\n"))
}

fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut parts = Vec::new();
    for child in &para.children {
        if let docx_rs::ParagraphChild::Run(run) = child {
            for rc in &run.children {
                if let docx_rs::RunChild::Text(t) = rc {
                    parts.push(t.text.clone());
                }
            }
        }
    }
    parts.join("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            DocumentFormat::from_filename("cv.pdf"),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(
            DocumentFormat::from_filename("Resume.DOCX"),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(
            DocumentFormat::from_filename("notes.txt"),
            Some(DocumentFormat::Txt)
        );
        assert_eq!(DocumentFormat::from_filename("image.png"), None);
        assert_eq!(DocumentFormat::from_filename("no_extension"), None);
    }

    #[test]
    fn test_txt_passthrough() {
        let text = extract_text(DocumentFormat::Txt, b"Senior researcher with 12 publications")
            .unwrap();
        assert_eq!(text, "Senior researcher with 12 publications");
    }

    #[test]
    fn test_empty_txt_is_extraction_error() {
        let err = extract_text(DocumentFormat::Txt, b"   \n  ").unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }

    #[test]
    fn test_invalid_docx_is_extraction_error() {
        let err = extract_text(DocumentFormat::Docx, b"not a zip archive").unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }

    #[test]
    fn test_invalid_utf8_txt_is_lossy_not_fatal() {
        let text = extract_text(DocumentFormat::Txt, &[0x48, 0x69, 0xFF, 0x21]).unwrap();
        assert!(text.starts_with("Hi"));
    }
}
