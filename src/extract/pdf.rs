//! PDF reader

use std::path::Path;

use crate::error::ExtractionError;

#[cfg(feature = "pdf")]
pub fn extract_pdf(path: &Path) -> Result<String, ExtractionError> {
    // pdf-extract panics on some malformed documents
    let text = super::catch_panics(path, || {
        pdf_extract::extract_text(path).map_err(|e| ExtractionError::failed(path, e))
    })?;
    if text.trim().is_empty() {
        tracing::warn!("PDF {} contains no extractable text", path.display());
    }
    Ok(text.trim().to_string())
}

#[cfg(not(feature = "pdf"))]
pub fn extract_pdf(path: &Path) -> Result<String, ExtractionError> {
    Err(ExtractionError::Unsupported(format!(
        "{} (rebuild with the `pdf` feature)",
        path.display()
    )))
}
