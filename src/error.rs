//! Error types shared by the table, pipeline and playlist modules.
//!
//! An empty selection is not an error: [`crate::pipeline::select`] returns an
//! empty list and the session reports it as [`crate::session::Outcome::Empty`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type for library operations
pub type Result<T> = std::result::Result<T, CurateError>;

#[derive(Error, Debug)]
pub enum CurateError {
    /// A selected genre/rank tag or a required feature column is not in the table
    #[error("Missing attribute: column '{column}' does not exist in the feature table")]
    MissingAttribute { column: String },

    /// The feature table file is malformed
    #[error("Feature table format error at line {line}: {message}")]
    TableFormat { line: u64, message: String },

    /// The playlist file could not be written
    #[error("Failed to write playlist to {}: {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the feature table failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CurateError {
    pub(crate) fn missing(column: &str) -> Self {
        Self::MissingAttribute {
            column: column.to_string(),
        }
    }

    /// True for errors caused by the user's selection rather than the environment.
    #[must_use]
    pub fn is_invalid_selection(&self) -> bool {
        matches!(self, Self::MissingAttribute { .. })
    }
}
