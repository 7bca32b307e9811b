use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Suffix of every file in the backup directory.
pub const BACKUP_SUFFIX: &str = "backup";

/// Compact ISO-8601 UTC timestamp with milliseconds; sorts chronologically.
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%3fZ";

/// A snapshot of one document: `<basename>.<timestamp>.backup`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupFile {
    pub path: PathBuf,
    /// Base name of the document this is a copy of, e.g. `tsconfig.json`.
    pub document: String,
    pub timestamp: String,
}

impl BackupFile {
    pub fn file_name(document: &str, at: DateTime<Utc>) -> String {
        format!(
            "{}.{}.{}",
            document,
            at.format(BACKUP_TIMESTAMP_FORMAT),
            BACKUP_SUFFIX
        )
    }

    /// Parse a backup path. Returns `None` for files that do not follow the naming scheme.
    pub fn parse(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let stem = name.strip_suffix(BACKUP_SUFFIX)?.strip_suffix('.')?;
        let (document, timestamp) = stem.rsplit_once('.')?;
        if document.is_empty() || timestamp.is_empty() {
            return None;
        }
        Some(Self {
            path: path.to_path_buf(),
            document: document.to_string(),
            timestamp: timestamp.to_string(),
        })
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
