use std::path::PathBuf;

/// Result of probing the module root entry for a linked module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    /// Symlink exists and its target resolves
    Ok { target: PathBuf },
    /// Symlink exists but its target is gone
    Broken { target: PathBuf },
    /// Nothing exists at the expected path
    Missing,
    /// Something other than a symlink occupies the path
    NotSymlink,
}

impl LinkStatus {
    /// Get a human-readable reason for this status.
    pub fn reason(&self) -> &'static str {
        match self {
            LinkStatus::Ok { .. } => "ok",
            LinkStatus::Broken { .. } => "broken link",
            LinkStatus::Missing => "symlink missing",
            LinkStatus::NotSymlink => "not a symlink",
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, LinkStatus::Ok { .. })
    }

    /// Link target, when the entry is a symlink.
    pub fn target(&self) -> Option<&PathBuf> {
        match self {
            LinkStatus::Ok { target } | LinkStatus::Broken { target } => Some(target),
            LinkStatus::Missing | LinkStatus::NotSymlink => None,
        }
    }
}

/// Outcome of removing a module symlink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveLinkResult {
    Removed,
    NotExists,
    /// A real file or directory; left untouched
    NotSymlink,
}
