use anyhow::{Context, Result};
use log::{debug, info};
use std::path::Path;

use crate::domain::model::{LinkStatus, RemoveLinkResult};
use crate::error::LinkError;
use crate::runtime::Runtime;

/// Creates, inspects and removes the module symlinks under the module root.
pub struct SymlinkManager<'a, R: Runtime> {
    runtime: &'a R,
}

impl<'a, R: Runtime> SymlinkManager<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }

    /// Inspect the entry at `path`.
    pub fn check(&self, path: &Path) -> LinkStatus {
        if self.runtime.is_symlink(path) {
            let target = self
                .runtime
                .read_link(path)
                .unwrap_or_else(|_| path.to_path_buf());
            if self.runtime.exists(path) {
                LinkStatus::Ok { target }
            } else {
                LinkStatus::Broken { target }
            }
        } else if self.runtime.exists(path) {
            LinkStatus::NotSymlink
        } else {
            LinkStatus::Missing
        }
    }

    /// Fail with `PathConflict` if something other than a symlink occupies `link`.
    pub fn ensure_replaceable(&self, link: &Path) -> Result<()> {
        if self.check(link) == LinkStatus::NotSymlink {
            return Err(LinkError::PathConflict(link.to_path_buf()).into());
        }
        Ok(())
    }

    /// Point `link` at `target`, replacing an existing symlink.
    ///
    /// A real file or directory at `link` is never touched.
    #[tracing::instrument(skip(self))]
    pub fn replace(&self, target: &Path, link: &Path) -> Result<()> {
        self.ensure_replaceable(link)?;

        if let Some(parent) = link.parent()
            && !self.runtime.exists(parent)
        {
            debug!("Creating module root {:?}", parent);
            self.runtime.create_dir_all(parent)?;
        }

        if self.runtime.is_symlink(link) {
            debug!("Replacing existing symlink {:?}", link);
            self.runtime.remove_symlink(link)?;
        }

        self.runtime
            .symlink_dir(target, link)
            .with_context(|| format!("Failed to create symlink {:?} -> {:?}", link, target))?;
        info!("Linked {:?} -> {:?}", link, target);
        Ok(())
    }

    /// Remove the symlink at `path`. Real files and directories are left alone.
    #[tracing::instrument(skip(self))]
    pub fn remove(&self, path: &Path) -> Result<RemoveLinkResult> {
        if self.runtime.is_symlink(path) {
            self.runtime.remove_symlink(path)?;
            info!("Removed symlink {:?}", path);
            Ok(RemoveLinkResult::Removed)
        } else if self.runtime.exists(path) {
            Ok(RemoveLinkResult::NotSymlink)
        } else {
            Ok(RemoveLinkResult::NotExists)
        }
    }
}
