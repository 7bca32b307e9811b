use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use super::LinkManager;
use crate::domain::model::{LinkStatus, LinkedModuleRecord};
use crate::runtime::Runtime;

/// Symlink status of one linked module.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleStatus {
    pub record: LinkedModuleRecord,
    pub link: PathBuf,
    pub status: LinkStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub state_file: PathBuf,
    pub state_exists: bool,
    pub modules: Vec<ModuleStatus>,
    pub backup_dir: PathBuf,
    /// Number of backups; `None` when the backup directory does not exist yet
    pub backup_count: Option<usize>,
}

impl<'a, R: Runtime> LinkManager<'a, R> {
    /// Check every linked module's symlink. Read-only.
    #[tracing::instrument(skip(self))]
    pub fn status(&self) -> Result<StatusReport> {
        let state_store = self.state_store();
        let state = state_store.load()?;
        let symlinks = self.symlinks();

        let modules = state
            .linked_modules
            .into_iter()
            .map(|record| {
                let link = self.config.module_link(&record.name);
                let status = symlinks.check(&link);
                debug!("{}: {}", record.name, status.reason());
                ModuleStatus {
                    record,
                    link,
                    status,
                }
            })
            .collect();

        let backup_store = self.backup_store();
        let backup_count = if self.runtime.is_dir(backup_store.dir()) {
            Some(backup_store.list()?.len())
        } else {
            None
        };

        Ok(StatusReport {
            state_file: state_store.path().to_path_buf(),
            state_exists: state_store.exists(),
            modules,
            backup_dir: backup_store.dir().to_path_buf(),
            backup_count,
        })
    }
}
