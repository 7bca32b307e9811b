//! Revert use case - restore the latest backups and drop every tracked link.

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::path::PathBuf;

use super::{LinkManager, document_name};
use crate::domain::model::{BackupFile, LinkState, RemoveLinkResult};
use crate::domain::service::BackupStore;
use crate::error::{LinkError, push_warning};
use crate::runtime::Runtime;

/// How many backups are shown before asking for confirmation.
pub const MAX_LISTED_BACKUPS: usize = 20;

/// Backups available for revert, newest first.
#[derive(Debug, Clone)]
pub struct RevertPlan {
    pub backup_dir: PathBuf,
    pub backups: Vec<BackupFile>,
}

impl RevertPlan {
    /// The most recent backups with their modification times.
    pub fn listing<R: Runtime>(&self, runtime: &R) -> Vec<(BackupFile, Option<DateTime<Utc>>)> {
        self.backups
            .iter()
            .take(MAX_LISTED_BACKUPS)
            .map(|backup| (backup.clone(), runtime.modified(&backup.path).ok()))
            .collect()
    }
}

#[derive(Debug)]
pub struct RevertReport {
    /// Documents restored and the backup each came from
    pub restored: Vec<(PathBuf, BackupFile)>,
    pub removed_links: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

#[derive(Debug)]
pub enum RevertOutcome {
    Cancelled,
    Reverted(RevertReport),
}

impl<'a, R: Runtime> LinkManager<'a, R> {
    /// Collect the backups a revert would draw from.
    /// Fails with `NothingToRevert` when there are none.
    #[tracing::instrument(skip(self))]
    pub fn plan_revert(&self) -> Result<RevertPlan> {
        let backup_store = self.backup_store();
        let backups = backup_store.list()?;
        if backups.is_empty() {
            return Err(LinkError::NothingToRevert(backup_store.dir().to_path_buf()).into());
        }
        debug!("Found {} backup(s)", backups.len());
        Ok(RevertPlan {
            backup_dir: backup_store.dir().to_path_buf(),
            backups,
        })
    }

    /// Restore the newest backup of each document, remove every tracked
    /// symlink and reset the state. Asks for confirmation unless `assume_yes`.
    #[tracing::instrument(skip(self, plan))]
    pub fn revert(&self, plan: &RevertPlan, assume_yes: bool) -> Result<RevertOutcome> {
        if !assume_yes
            && !self
                .runtime
                .confirm("Do you want to restore the most recent backups?")?
        {
            info!("Revert cancelled");
            return Ok(RevertOutcome::Cancelled);
        }

        let mut warnings = Vec::new();
        let backup_store = self.backup_store();
        let mut restored = Vec::new();
        for document in self.config.documents() {
            let name = document_name(document);
            match BackupStore::<R>::latest_for(&plan.backups, &name) {
                Some(backup) => {
                    backup_store.restore(backup, document)?;
                    restored.push((document.to_path_buf(), backup.clone()));
                }
                None => push_warning(&mut warnings, format!("No backup found for {}", name)),
            }
        }

        let state_store = self.state_store();
        let state = state_store.load()?;
        let symlinks = self.symlinks();
        let mut removed_links = Vec::new();
        for record in &state.linked_modules {
            let link = self.config.module_link(&record.name);
            if symlinks.remove(&link)? == RemoveLinkResult::Removed {
                removed_links.push(link);
            }
        }
        state_store.save(&LinkState::default())?;
        info!(
            "Reverted {} document(s), removed {} symlink(s)",
            restored.len(),
            removed_links.len()
        );

        Ok(RevertOutcome::Reverted(RevertReport {
            restored,
            removed_links,
            warnings,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::LinkOptions;
    use crate::test_utils::{TestRuntime, external_module, project_fixture, read};
    use std::fs;

    #[test]
    fn test_plan_without_backups_is_nothing_to_revert() {
        let (_dir, config) = project_fixture();
        let runtime = TestRuntime::new();
        let manager = LinkManager::new(&runtime, config);

        let err = manager.plan_revert().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LinkError>(),
            Some(LinkError::NothingToRevert(_))
        ));
    }

    #[test]
    #[cfg_attr(modlink_skip_cross_windows_tests, ignore)]
    fn test_revert_restores_snapshot_before_last_link() {
        let (dir, config) = project_fixture();
        let first = external_module(dir.path(), "first", false);
        let second = external_module(dir.path(), "second", true);
        let runtime = TestRuntime::new();
        let manager = LinkManager::new(&runtime, config.clone());

        manager.link(&first, LinkOptions::default()).unwrap();
        let after_first: Vec<String> = config.documents()[..2].iter().map(|d| read(d)).collect();
        manager
            .link(
                &second,
                LinkOptions {
                    module: Some("SecondModule".into()),
                    assets: true,
                    ..Default::default()
                },
            )
            .unwrap();

        let plan = manager.plan_revert().unwrap();
        assert_eq!(plan.backups.len(), 5);
        assert_eq!(plan.listing(&runtime).len(), 5);

        let RevertOutcome::Reverted(report) = manager.revert(&plan, false).unwrap() else {
            panic!("expected revert to run");
        };
        assert_eq!(runtime.prompts().len(), 1);
        assert_eq!(report.restored.len(), 3);
        assert!(report.warnings.is_empty());
        assert_eq!(report.removed_links.len(), 2);

        let restored: Vec<String> = config.documents()[..2].iter().map(|d| read(d)).collect();
        assert_eq!(restored, after_first);
        assert!(!config.module_link("first").exists());
        assert!(!config.module_link("second").exists());
        assert!(first.is_dir());
        assert_eq!(read(&config.state_file), "{\n  \"linkedModules\": []\n}\n");
    }

    #[test]
    #[cfg_attr(modlink_skip_cross_windows_tests, ignore)]
    fn test_revert_warns_for_documents_without_backup() {
        let (dir, config) = project_fixture();
        let source = external_module(dir.path(), "foo", false);
        let runtime = TestRuntime::new();
        let manager = LinkManager::new(&runtime, config);

        manager.link(&source, LinkOptions::default()).unwrap();
        let plan = manager.plan_revert().unwrap();
        let RevertOutcome::Reverted(report) = manager.revert(&plan, true).unwrap() else {
            panic!("expected revert to run");
        };

        assert!(runtime.prompts().is_empty());
        assert_eq!(report.restored.len(), 2);
        assert_eq!(report.warnings, vec!["No backup found for environment.ts"]);
    }

    #[test]
    #[cfg_attr(modlink_skip_cross_windows_tests, ignore)]
    fn test_revert_cancelled_changes_nothing() {
        let (dir, config) = project_fixture();
        let source = external_module(dir.path(), "foo", false);
        let runtime = TestRuntime::new().with_confirm(false);
        let manager = LinkManager::new(&runtime, config.clone());

        manager.link(&source, LinkOptions::default()).unwrap();
        let state = read(&config.state_file);
        let plan = manager.plan_revert().unwrap();

        assert!(matches!(
            manager.revert(&plan, false).unwrap(),
            RevertOutcome::Cancelled
        ));
        assert!(fs::symlink_metadata(config.module_link("foo")).is_ok());
        assert_eq!(read(&config.state_file), state);
    }
}
