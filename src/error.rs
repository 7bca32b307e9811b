//! Error taxonomy for link operations.
//!
//! Operations return `anyhow::Result`; the failures a caller may want to
//! tell apart are raised as [`LinkError`] values and recovered with
//! `downcast_ref`. Anything else (permission denied, disk full, ...) is a
//! fatal I/O error.

use log::warn;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    /// Missing or invalid command-line input.
    #[error("{0}")]
    Usage(String),

    /// The link source does not exist or is not a directory.
    #[error("Source directory does not exist: {0:?}")]
    SourceNotFound(PathBuf),

    /// The module root entry is occupied by something that is not a symlink.
    #[error(
        "A non-symlink file/directory already exists at {0:?}; remove it manually or choose a different module name"
    )]
    PathConflict(PathBuf),

    /// A configuration document could not be parsed or lacks the expected shape.
    #[error("Failed to parse {path:?}: {reason}")]
    DocumentParse { path: PathBuf, reason: String },

    /// `revert` was asked for but there are no backups.
    #[error("No backups found in {0:?}. Nothing to revert.")]
    NothingToRevert(PathBuf),
}

impl LinkError {
    pub fn parse(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        LinkError::DocumentParse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            LinkError::Usage(_)
            | LinkError::SourceNotFound(_)
            | LinkError::PathConflict(_)
            | LinkError::DocumentParse { .. }
            | LinkError::NothingToRevert(_) => 1,
        }
    }
}

/// Exit code for any error surfaced to `main`. Errors outside the taxonomy
/// are fatal I/O errors.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<LinkError>()
        .map(LinkError::exit_code)
        .unwrap_or(1)
}

/// Record a non-fatal problem for the report and the log.
pub(crate) fn push_warning(warnings: &mut Vec<String>, message: String) {
    warn!("{}", message);
    warnings.push(message);
}

/// Whether the error should be followed by the usage text.
pub fn is_usage_error(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<LinkError>(), Some(LinkError::Usage(_)))
}
