//! Content Extractor (C1): turns one ingest source into a UTF-8 text blob.

use crate::error::{Error, IoError, Result};
use crate::io::read_file;
use std::path::{Path, PathBuf};

/// The single source an ingest request may name.
///
/// Exactly one variant is ever constructed per request; validating that
/// constraint is the orchestrator's job (see
/// [`crate::ingest::IngestRequest`]), not this type's.
#[derive(Debug, Clone)]
pub enum IngestSource {
    /// Content supplied inline by the caller.
    Inline(String),
    /// Content to be read from a local file.
    File(PathBuf),
    /// Content to be fetched from a URL.
    Url(String),
}

/// Extracts plain text from an [`IngestSource`].
///
/// File extraction dispatches on extension: plain text and markdown are
/// read as raw UTF-8 bytes; PDF goes through the page-by-page
/// [`PdfDecoder`] collaborator behind the `pdf` feature. URL ingestion is a
/// declared placeholder that always fails as `Unsupported` — fetching and
/// rendering remote content is explicitly out of scope.
pub struct ContentExtractor {
    #[cfg(feature = "pdf")]
    pdf_decoder: Box<dyn PdfDecoder>,
}

impl ContentExtractor {
    /// Creates an extractor with the default PDF decoder (when the `pdf`
    /// feature is enabled).
    #[must_use]
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "pdf")]
            pdf_decoder: Box::new(PdfExtractDecoder),
        }
    }

    /// Extracts text from `source`.
    ///
    /// Returns an empty string only when the decoded source is genuinely
    /// empty; the caller (the ingestion orchestrator) is responsible for
    /// turning that into the "no content found" response.
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` for URL sources or file extensions with no
    /// registered decoder, and an I/O error if the file cannot be read.
    pub fn extract(&self, source: &IngestSource) -> Result<String> {
        match source {
            IngestSource::Inline(text) => Ok(text.clone()),
            IngestSource::Url(_) => Err(Error::unsupported("URL ingestion is not yet implemented")),
            IngestSource::File(path) => self.extract_file(path),
        }
    }

    fn extract_file(&self, path: &Path) -> Result<String> {
        let extension = path
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .unwrap_or_default()
            .to_lowercase();

        match extension.as_str() {
            "txt" | "md" | "markdown" | "" => read_file(path),
            "pdf" => self.extract_pdf(path),
            other => Err(IoError::UnsupportedExtension {
                extension: other.to_string(),
            }
            .into()),
        }
    }

    #[cfg(feature = "pdf")]
    fn extract_pdf(&self, path: &Path) -> Result<String> {
        let pages = self
            .pdf_decoder
            .decode_pages(path)
            .map_err(|reason| IoError::DecodeFailed {
                path: path.display().to_string(),
                reason,
            })?;

        let mut text = String::new();
        for (i, page) in pages.iter().enumerate() {
            if page.trim().is_empty() {
                tracing::warn!(path = %path.display(), page = i, "skipping undecodable PDF page");
                continue;
            }
            if !text.is_empty() {
                text.push_str("\n\n");
            }
            text.push_str(page);
        }
        Ok(text)
    }

    #[cfg(not(feature = "pdf"))]
    fn extract_pdf(&self, _path: &Path) -> Result<String> {
        Err(Error::unsupported(
            "PDF ingestion requires the 'pdf' feature",
        ))
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Collaborator contract for page-by-page PDF text extraction.
///
/// Out of scope per the crate's boundaries beyond this contract: the
/// shipped implementation wraps `pdf-extract`, a general PDF decoder is
/// not this crate's concern.
#[cfg(feature = "pdf")]
pub trait PdfDecoder: Send + Sync {
    /// Returns one string per page, in order. A page whose text could not
    /// be decoded should come back empty rather than aborting the whole
    /// document.
    fn decode_pages(&self, path: &Path) -> std::result::Result<Vec<String>, String>;
}

#[cfg(feature = "pdf")]
struct PdfExtractDecoder;

#[cfg(feature = "pdf")]
impl PdfDecoder for PdfExtractDecoder {
    fn decode_pages(&self, path: &Path) -> std::result::Result<Vec<String>, String> {
        pdf_extract::extract_text_by_pages(path).map_err(|e| e.to_string())
    }
}
