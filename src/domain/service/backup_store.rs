//! Timestamped copies of the configuration documents.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::domain::model::BackupFile;
use crate::runtime::Runtime;

pub struct BackupStore<'a, R: Runtime> {
    runtime: &'a R,
    dir: PathBuf,
}

impl<'a, R: Runtime> BackupStore<'a, R> {
    pub fn new(runtime: &'a R, dir: PathBuf) -> Self {
        Self { runtime, dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy `document` into the backup directory.
    ///
    /// Returns `None` when the document does not exist; there is nothing to preserve.
    #[tracing::instrument(skip(self))]
    pub fn backup(&self, document: &Path) -> Result<Option<PathBuf>> {
        if !self.runtime.exists(document) {
            debug!("Skipping backup of missing document {:?}", document);
            return Ok(None);
        }
        let Some(base) = document.file_name().and_then(|n| n.to_str()) else {
            anyhow::bail!("Cannot back up {:?}: no file name", document);
        };
        if !self.runtime.exists(&self.dir) {
            self.runtime
                .create_dir_all(&self.dir)
                .with_context(|| format!("Failed to create backup directory {:?}", self.dir))?;
        }

        let dest = self
            .dir
            .join(BackupFile::file_name(base, self.runtime.now()));
        self.runtime
            .copy(document, &dest)
            .with_context(|| format!("Failed to back up {:?} to {:?}", document, dest))?;
        info!("Backed up {:?} to {:?}", document, dest);
        Ok(Some(dest))
    }

    /// All backups, newest first. A missing directory holds no backups.
    pub fn list(&self) -> Result<Vec<BackupFile>> {
        if !self.runtime.is_dir(&self.dir) {
            return Ok(Vec::new());
        }
        let mut backups: Vec<BackupFile> = self
            .runtime
            .read_dir(&self.dir)?
            .iter()
            .filter_map(|path| BackupFile::parse(path))
            .collect();
        backups.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.document.cmp(&b.document))
        });
        Ok(backups)
    }

    /// Most recent backup of the document with base name `document`.
    pub fn latest_for<'b>(backups: &'b [BackupFile], document: &str) -> Option<&'b BackupFile> {
        backups.iter().find(|b| b.document == document)
    }

    /// Copy a backup back over its document.
    #[tracing::instrument(skip(self))]
    pub fn restore(&self, backup: &BackupFile, dest: &Path) -> Result<()> {
        self.runtime
            .copy(&backup.path, dest)
            .with_context(|| format!("Failed to restore {:?} from {:?}", dest, backup.path))?;
        info!("Restored {:?} from {}", dest, backup.name());
        Ok(())
    }
}
