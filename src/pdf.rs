//! Article PDF delivery and text extraction.
//!
//! PDFs live in a single configured directory and are addressed by the
//! article's bare `file_name`. Names with path components are rejected so
//! requests cannot escape that directory.

use std::path::{Path, PathBuf};

use thiserror::Error;

pub const MIME_PDF: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("invalid file name: {0}")]
    InvalidName(String),
    #[error("PDF not found: {0}")]
    NotFound(String),
    #[error("failed to read PDF {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("PDF extraction failed: {0}")]
    Extraction(String),
}

/// Map a bare file name to a path inside `pdf_dir`.
pub fn resolve_pdf_path(pdf_dir: &Path, file_name: &str) -> Result<PathBuf, PdfError> {
    let name = file_name.trim();
    let unsafe_name = name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.contains('\0');
    if unsafe_name || !name.to_ascii_lowercase().ends_with(".pdf") {
        return Err(PdfError::InvalidName(file_name.to_string()));
    }
    Ok(pdf_dir.join(name))
}

/// Read a PDF from `pdf_dir`.
pub async fn read_pdf(pdf_dir: &Path, file_name: &str) -> Result<Vec<u8>, PdfError> {
    let path = resolve_pdf_path(pdf_dir, file_name)?;
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(PdfError::NotFound(file_name.to_string()))
        }
        Err(e) => Err(PdfError::Io {
            name: file_name.to_string(),
            source: e,
        }),
    }
}

/// Extract plain text from PDF bytes.
pub fn extract_text(bytes: &[u8]) -> Result<String, PdfError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| PdfError::Extraction(e.to_string()))
}
