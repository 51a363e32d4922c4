//! Metadata Extractor (C8): a single generation call that summarizes an
//! ingested blob.

use crate::generation::{GenerateOptions, Generator};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "You analyze a document and respond with a single JSON object of the \
shape {\"summary\": string, \"keywords\": [string], \"document_type\": string, \"creation_date\": \
string|null}. Respond with JSON only, no surrounding prose.";

/// What [`MetadataExtractor::extract`] recovers from a document's text.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedMetadata {
    /// A short summary of the document.
    pub summary: String,
    /// Keywords the model judged salient.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// A free-text document type guess (e.g. "invoice", "article").
    pub document_type: String,
    /// The document's creation date, `YYYY-MM-DD`, if the model could
    /// determine one. Absent (or null) is treated uniformly as "unknown".
    #[serde(default)]
    pub creation_date: Option<String>,
}

/// Issues one generation call to extract structured metadata from ingested
/// text, falling back gracefully when the model's response can't be
/// parsed.
pub struct MetadataExtractor {
    generator: Arc<dyn Generator>,
}

impl MetadataExtractor {
    /// Creates an extractor over the given generator.
    #[must_use]
    pub const fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Extracts metadata from `content`, falling back to a file's
    /// modification time for `creation_date` when the source was a file and
    /// the model didn't supply one.
    ///
    /// Returns `None` on any failure (generation error or unparseable
    /// response); the caller logs and continues ingestion without
    /// extracted metadata. This method itself never fails ingestion.
    pub async fn extract(&self, content: &str, file_path: Option<&Path>) -> Option<ExtractedMetadata> {
        let prompt = format!("{SYSTEM_PROMPT}\n\nDocument:\n{content}");

        let response = match self.generator.generate(&prompt, &GenerateOptions::default()).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "metadata extraction generation call failed");
                return None;
            }
        };

        let mut metadata: ExtractedMetadata = match parse_json_object(&response) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(error = %e, "metadata extraction response was not valid JSON");
                return None;
            }
        };

        if metadata.creation_date.as_deref().unwrap_or("").is_empty() {
            metadata.creation_date = file_path.and_then(file_modified_date);
        }

        Some(metadata)
    }
}

/// Parses a JSON object out of `text`, tolerating surrounding prose some
/// models add despite being asked not to.
fn parse_json_object(text: &str) -> Result<ExtractedMetadata, serde_json::Error> {
    let trimmed = text.trim();
    let candidate = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if end >= start => &trimmed[start..=end],
        _ => trimmed,
    };
    serde_json::from_str(candidate)
}

/// Formats a file's modification time as `YYYY-MM-DD`, best-effort.
fn file_modified_date(path: &Path) -> Option<String> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    let secs = modified.duration_since(std::time::UNIX_EPOCH).ok()?.as_secs();
    let days = secs / 86_400;
    let (year, month, day) = days_to_ymd(days);
    Some(format!("{year:04}-{month:02}-{day:02}"))
}

/// Converts a day count since the Unix epoch to a (year, month, day) civil
/// date, using Howard Hinnant's `days_from_civil` algorithm in reverse.
#[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
fn days_to_ymd(days: u64) -> (i64, u32, u32) {
    let z = days as i64 + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u64;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    let year = if m <= 2 { y + 1 } else { y };
    (year, m, d)
}
