//! Document text extraction for PlanSentry.
//!
//! Converts an uploaded plan file into plain text for analysis. This is a
//! one-shot local operation: no retries, and errors surface to the caller
//! unchanged.
//!
//! # Supported Formats
//!
//! - **PDF** (.pdf): extracted text, guarded by a printable-character
//!   heuristic against OCR-less scans
//! - **DOCX** (.docx): text runs from `word/document.xml`, scrubbed of
//!   control and zero-width characters
//! - **Plain text / Markdown** (.txt, .md): read as-is
//! - Legacy **.doc** and anything else is rejected

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors raised during document extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The file extension is not supported, naming the offender.
    #[error("Unsupported document format: .{0}")]
    UnsupportedFormat(String),

    /// PDF text extraction produced mostly non-printable output, which
    /// indicates a scanned or garbled document with no text layer.
    #[error("PDF appears to be scanned or garbled; no usable text layer")]
    ScannedOrGarbledPdf,

    /// The document could not be parsed.
    #[error("Failed to parse document: {0}")]
    ParseError(String),

    /// The document contains no extractable text.
    #[error("Document is empty or contains no extractable text")]
    EmptyDocument,

    /// The document exceeds the maximum upload size.
    #[error("Document exceeds maximum size limit of {0} bytes")]
    TooLarge(usize),
}

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// PDF document.
    Pdf,
    /// Office Open XML document.
    Docx,
    /// Plain text.
    PlainText,
    /// Markdown, treated as plain text.
    Markdown,
}

impl DocumentFormat {
    /// Detects the format from a file extension. Returns `None` for
    /// unsupported extensions, including legacy `.doc`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "txt" | "text" => Some(DocumentFormat::PlainText),
            "md" | "markdown" => Some(DocumentFormat::Markdown),
            _ => None,
        }
    }

    /// Detects the format from a filename.
    pub fn from_filename(name: &str) -> Option<Self> {
        name.rsplit('.').next().and_then(Self::from_extension)
    }
}

/// Configuration for document extraction.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Maximum document size in bytes.
    pub max_size: usize,
    /// Minimum ratio of printable characters in extracted PDF text before
    /// the document is treated as a scan without a text layer.
    pub garbled_threshold: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_size: 10 * 1024 * 1024,
            garbled_threshold: 0.25,
        }
    }
}

/// Extracts plain text from uploaded plan documents.
pub struct DocumentExtractor {
    config: ExtractionConfig,
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentExtractor {
    /// Creates an extractor with default configuration.
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
        }
    }

    /// Creates an extractor with custom configuration.
    pub fn with_config(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Extracts plain text from an uploaded file.
    pub fn extract(&self, bytes: &[u8], filename: &str) -> Result<String, ExtractionError> {
        if bytes.len() > self.config.max_size {
            return Err(ExtractionError::TooLarge(self.config.max_size));
        }

        let format = DocumentFormat::from_filename(filename).ok_or_else(|| {
            let ext = filename.rsplit('.').next().unwrap_or(filename);
            ExtractionError::UnsupportedFormat(ext.to_lowercase())
        })?;

        let text = match format {
            DocumentFormat::Pdf => self.extract_pdf(bytes)?,
            DocumentFormat::Docx => self.extract_docx(bytes)?,
            DocumentFormat::PlainText | DocumentFormat::Markdown => {
                String::from_utf8(bytes.to_vec())
                    .map_err(|e| ExtractionError::ParseError(e.to_string()))?
            }
        };

        if text.trim().is_empty() {
            return Err(ExtractionError::EmptyDocument);
        }

        debug!(
            format = ?format,
            bytes = bytes.len(),
            chars = text.len(),
            "extracted document text"
        );
        Ok(text)
    }

    /// Extracts PDF text and applies the scanned-document heuristic.
    fn extract_pdf(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractionError::ParseError(e.to_string()))?;

        let total = text.chars().count();
        if total == 0 {
            return Err(ExtractionError::EmptyDocument);
        }
        let printable = text
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_ascii_punctuation() || *c == ' ')
            .count();
        let ratio = printable as f64 / total as f64;
        if ratio < self.config.garbled_threshold {
            return Err(ExtractionError::ScannedOrGarbledPdf);
        }

        Ok(text.trim().to_string())
    }

    /// Extracts the text runs of `word/document.xml` from a DOCX archive.
    fn extract_docx(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| ExtractionError::ParseError(e.to_string()))?;
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .map_err(|e| ExtractionError::ParseError(e.to_string()))?
            .read_to_string(&mut xml)
            .map_err(|e| ExtractionError::ParseError(e.to_string()))?;

        let mut reader = Reader::from_str(&xml);
        let mut text = String::new();
        loop {
            match reader.read_event() {
                Ok(Event::Text(t)) => {
                    let value = t
                        .unescape()
                        .map_err(|e| ExtractionError::ParseError(e.to_string()))?;
                    text.push_str(&value);
                }
                Ok(Event::Empty(e)) if e.name().as_ref() == b"w:br" => text.push('\n'),
                Ok(Event::Empty(e)) if e.name().as_ref() == b"w:tab" => text.push('\t'),
                Ok(Event::End(e)) if e.name().as_ref() == b"w:p" => text.push('\n'),
                Ok(Event::Eof) => break,
                Err(e) => return Err(ExtractionError::ParseError(e.to_string())),
                _ => {}
            }
        }

        Ok(scrub_text(&text))
    }
}

/// Strips control and zero-width characters and collapses runs of three or
/// more newlines down to two.
fn scrub_text(text: &str) -> String {
    let mut cleaned: String = text
        .chars()
        .filter(|c| {
            let zero_width = matches!(c, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}');
            let control = c.is_control() && *c != '\n' && *c != '\t';
            !zero_width && !control
        })
        .collect();

    while cleaned.contains("\n\n\n") {
        cleaned = cleaned.replace("\n\n\n", "\n\n");
    }
    cleaned.trim().to_string()
}
