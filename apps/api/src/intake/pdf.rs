//! PDF text extraction — per-page text in document order, joined by
//! single newlines.

use crate::errors::AppError;

/// Extracts the text of every page from an in-memory PDF.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, AppError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| AppError::Pdf(e.to_string()))?;
    Ok(join_pages(&pages))
}

/// Joins page texts with a single `\n`, preserving page order.
/// A document with N pages yields exactly N newline-separated segments.
pub fn join_pages(pages: &[String]) -> String {
    pages.join("\n")
}
