//! Application layer - Use cases that coordinate domain services.
//!
//! [`LinkManager`] owns no state between invocations: every operation
//! re-reads the documents it needs and returns a typed report. Printing and
//! process exit codes are left to the CLI layer.

mod link;
mod list;
mod revert;
mod status;
mod unlink;

pub use link::{LinkOptions, LinkReport};
pub use revert::{MAX_LISTED_BACKUPS, RevertOutcome, RevertPlan, RevertReport};
pub use status::{ModuleStatus, StatusReport};
pub use unlink::UnlinkReport;

use crate::config::Config;
use crate::domain::service::{BackupStore, StateStore, SymlinkManager};
use crate::error::LinkError;
use crate::runtime::{Runtime, is_plain_component};

/// Link manager - links external modules into the project and keeps its
/// configuration documents in step.
pub struct LinkManager<'a, R: Runtime> {
    runtime: &'a R,
    config: Config,
}

impl<'a, R: Runtime> LinkManager<'a, R> {
    pub fn new(runtime: &'a R, config: Config) -> Self {
        Self { runtime, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn state_store(&self) -> StateStore<'a, R> {
        StateStore::new(self.runtime, self.config.state_file.clone())
    }

    fn backup_store(&self) -> BackupStore<'a, R> {
        BackupStore::new(self.runtime, self.config.backup_dir.clone())
    }

    fn symlinks(&self) -> SymlinkManager<'a, R> {
        SymlinkManager::new(self.runtime)
    }
}

/// Module names become a single directory under the module root.
fn validate_module_name(name: &str) -> Result<(), LinkError> {
    if is_plain_component(name) {
        Ok(())
    } else {
        Err(LinkError::Usage(format!(
            "Invalid module name '{}': must be a single directory name",
            name
        )))
    }
}

fn document_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
