//! Unlink use case - remove a linked module and everything registered for it.

use anyhow::Result;
use log::{debug, info};
use std::path::PathBuf;

use super::{LinkManager, document_name, validate_module_name};
use crate::document::{BootstrapFile, PathAliasManifest, ProjectManifest};
use crate::domain::model::{LinkedModuleRecord, RemoveLinkResult};
use crate::error::push_warning;
use crate::runtime::Runtime;

/// Result of an unlink operation
#[derive(Debug)]
pub struct UnlinkReport {
    /// The record that was removed, or the defaults used when none matched
    pub record: LinkedModuleRecord,
    /// Whether a record was found in the state
    pub tracked: bool,
    pub link: PathBuf,
    pub link_result: RemoveLinkResult,
    pub backups: Vec<PathBuf>,
    /// Number of asset, style and translation entries removed
    pub removed_assets: usize,
    pub warnings: Vec<String>,
}

impl<'a, R: Runtime> LinkManager<'a, R> {
    /// Unlink module `name`. An unknown name is a warning; removal proceeds
    /// with the default scope and library name.
    #[tracing::instrument(skip(self))]
    pub fn unlink(&self, name: &str) -> Result<UnlinkReport> {
        validate_module_name(name)?;
        let mut warnings = Vec::new();

        let state_store = self.state_store();
        let mut state = state_store.load()?;
        let (record, tracked) = match state.find(name) {
            Some(record) => (record.clone(), true),
            None => {
                push_warning(
                    &mut warnings,
                    format!(
                        "Module '{}' not found in linked modules, removing with defaults",
                        name
                    ),
                );
                let record = LinkedModuleRecord {
                    name: name.to_string(),
                    source: PathBuf::new(),
                    scope: self.config.default_scope.clone(),
                    lib: String::new(),
                    module: String::new(),
                    assets: false,
                };
                (record, false)
            }
        };
        let import_path = record.import_path();
        let link = self.config.module_link(name);
        debug!("Unlinking {} ({})", name, import_path);

        let mut aliases = PathAliasManifest::load(self.runtime, &self.config.path_alias_manifest)?;
        if !aliases.remove_alias(&import_path) {
            debug!("No path alias for {}", import_path);
        }

        let mut projects = ProjectManifest::load(
            self.runtime,
            &self.config.project_manifest,
            &self.config.app_project,
        )?;
        if !projects.remove_project(name) {
            debug!("No project entry for {}", name);
        }
        let removed_assets = if record.assets {
            projects.remove_module_assets(&self.config.asset_base(name))
        } else {
            0
        };

        let bootstrap = match record.module_class() {
            Some(module) if self.runtime.exists(&self.config.bootstrap_file) => {
                let mut bootstrap = BootstrapFile::load(self.runtime, &self.config.bootstrap_file)?;
                let file = document_name(&self.config.bootstrap_file);
                if !bootstrap.remove_import(module, &import_path) {
                    push_warning(
                        &mut warnings,
                        format!("Import for {} not found in {}", module, file),
                    );
                }
                if !bootstrap.remove_module(module) {
                    push_warning(
                        &mut warnings,
                        format!("{} not found in the imports array of {}", module, file),
                    );
                }
                Some(bootstrap)
            }
            Some(_) => {
                push_warning(
                    &mut warnings,
                    format!(
                        "Bootstrap file {:?} does not exist, skipping module removal",
                        self.config.bootstrap_file
                    ),
                );
                None
            }
            None => None,
        };

        let backup_store = self.backup_store();
        let mut backups = Vec::new();
        let mut documents = vec![
            self.config.path_alias_manifest.as_path(),
            self.config.project_manifest.as_path(),
        ];
        if bootstrap.is_some() {
            documents.push(self.config.bootstrap_file.as_path());
        }
        for document in documents {
            if let Some(backup) = backup_store.backup(document)? {
                backups.push(backup);
            }
        }

        let link_result = self.symlinks().remove(&link)?;
        match link_result {
            RemoveLinkResult::Removed => {}
            RemoveLinkResult::NotExists => push_warning(
                &mut warnings,
                format!("Symlink {:?} does not exist", link),
            ),
            RemoveLinkResult::NotSymlink => push_warning(
                &mut warnings,
                format!("{:?} is not a symlink, leaving it in place", link),
            ),
        }

        aliases.save(self.runtime)?;
        projects.save(self.runtime)?;
        if let Some(bootstrap) = &bootstrap {
            bootstrap.save(self.runtime)?;
        }

        state.remove(name);
        state_store.save(&state)?;
        info!("Unlinked module {}", name);

        Ok(UnlinkReport {
            record,
            tracked,
            link,
            link_result,
            backups,
            removed_assets,
            warnings,
        })
    }
}
