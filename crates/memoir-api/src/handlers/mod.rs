//! HTTP handlers for memoir-api.

pub mod admin;
pub mod generate;
pub mod health;
pub mod records;
pub mod wizard;

use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use memoir_export::{ExportFormat, ExportedFile};

use crate::ApiError;

/// Query parameters for export downloads.
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// `pdf` (default) or `docx`.
    pub format: Option<String>,
}

impl ExportQuery {
    pub fn format(&self) -> Result<ExportFormat, ApiError> {
        match self.format.as_deref() {
            None => Ok(ExportFormat::Pdf),
            Some(f) => Ok(f.parse()?),
        }
    }
}

/// Query parameters for confirming a deletion.
#[derive(Debug, Deserialize)]
pub struct ConfirmDeleteQuery {
    pub token: Option<String>,
}

/// Send a rendered document as an attachment.
pub(crate) fn attachment(file: ExportedFile) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    (
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response()
}
