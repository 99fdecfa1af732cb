//! Error taxonomy for the dashboard pipeline.
//!
//! Load errors never escape the controller: they are folded into a
//! `Fetch::Failed` state so each panel can render its own muted placeholder.
//! Export errors surface in the export status line and leave no file behind.

use thiserror::Error;

/// A payload that decoded badly or broke a record invariant.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("malformed {resource} payload: {source}")]
    Json {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid {resource} payload: `{field}` {reason}")]
    Invalid {
        resource: &'static str,
        field: String,
        reason: String,
    },
}

impl ShapeError {
    pub(crate) fn invalid(
        resource: &'static str,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Invalid {
            resource,
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Why a resource could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] api::ApiError),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error("backend is not configured: {0}")]
    Config(String),
}

/// Failure while serializing or delivering a tabular export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("row {row}, column {column}: character U+{code:04X} cannot be stored in a spreadsheet")]
    InvalidCharacter {
        row: usize,
        column: &'static str,
        code: u32,
    },

    #[error("row {row}, column {column}: {len} characters exceed the spreadsheet cell limit")]
    CellTooLong {
        row: usize,
        column: &'static str,
        len: usize,
    },

    #[error("could not format event time: {0}")]
    Time(#[from] time::error::Format),

    #[error("event time {at} cannot be shown at UTC offset {offset}")]
    TimeOutOfRange {
        at: time::OffsetDateTime,
        offset: time::UtcOffset,
    },

    #[error("could not build the spreadsheet container: {0}")]
    Container(#[from] zip::result::ZipError),

    #[error("could not write export data: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not deliver {filename}: {reason}")]
    Delivery { filename: String, reason: String },
}
