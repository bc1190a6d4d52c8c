//! # memoir-export
//!
//! Renders a generated autobiography to downloadable documents.
//!
//! Both renderers are pure projections of the record's title, writing style
//! and generated story; nothing else on the record is read. A record without
//! a story cannot be exported.
//!
//! ```rust,ignore
//! use memoir_export::{export_record, ExportFormat};
//!
//! let file = export_record(&record, ExportFormat::Pdf)?;
//! std::fs::write(&file.file_name, &file.bytes)?;
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use memoir_core::defaults::{EXPORT_FILE_STEM, EXPORT_HEADING};
use memoir_core::{AutobiographyRecord, Error, Result, WritingStyle};

pub mod docx;
pub mod pdf;

/// Downloadable document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Docx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }

    /// MIME type for the `Content-Type` header.
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "docx" => Ok(ExportFormat::Docx),
            other => Err(Error::InvalidInput(format!(
                "Unknown export format '{}', expected pdf or docx",
                other
            ))),
        }
    }
}

/// The exportable projection of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub title: String,
    pub style: WritingStyle,
    pub story: String,
}

impl ExportDocument {
    /// Project `record`, failing with `InvalidInput` when it has no story.
    pub fn from_record(record: &AutobiographyRecord) -> Result<Self> {
        let story = record.story().ok_or_else(|| {
            Error::InvalidInput("Generate a story before exporting".to_string())
        })?;
        Ok(Self {
            title: record.customization.title.trim().to_string(),
            style: record.customization.style,
            story: story.to_string(),
        })
    }

    /// Download name: the slugified title plus the format's extension.
    pub fn file_name(&self, format: ExportFormat) -> String {
        format!("{}.{}", slugify(&self.title), format.extension())
    }

    /// Heading line: the title, or a generic heading when it is blank.
    pub fn heading(&self) -> &str {
        if self.title.is_empty() {
            EXPORT_HEADING
        } else {
            &self.title
        }
    }

    /// Subtitle line naming the writing style.
    pub fn subtitle(&self) -> String {
        let style = self.style.as_str();
        let mut chars = style.chars();
        match chars.next() {
            Some(first) => format!("{}{} style", first.to_uppercase(), chars.as_str()),
            None => String::new(),
        }
    }

    /// Story lines in order. Blank lines are kept as paragraph breaks.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.story.lines().map(str::trim_end)
    }

    pub fn render(&self, format: ExportFormat) -> Result<Vec<u8>> {
        match format {
            ExportFormat::Pdf => Ok(pdf::render(self)),
            ExportFormat::Docx => docx::render(self),
        }
    }
}

/// A rendered document ready to send.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Render `record` in `format`.
pub fn export_record(record: &AutobiographyRecord, format: ExportFormat) -> Result<ExportedFile> {
    let start = Instant::now();
    let document = ExportDocument::from_record(record)?;
    let bytes = document.render(format)?;

    debug!(
        subsystem = "export",
        component = format.extension(),
        op = "render",
        record_id = ?record.id,
        response_len = bytes.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Rendered export"
    );

    Ok(ExportedFile {
        file_name: document.file_name(format),
        content_type: format.content_type(),
        bytes,
    })
}

/// Lowercase ASCII slug: alphanumerics kept, every other run becomes one `-`.
/// Falls back to `autobiography` when nothing survives.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        EXPORT_FILE_STEM.to_string()
    } else {
        slug
    }
}
