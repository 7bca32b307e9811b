//! Link use case - symlink an external module and register it everywhere.

use anyhow::Result;
use log::{debug, info};
use std::path::{Path, PathBuf};

use super::{LinkManager, document_name, validate_module_name};
use crate::document::project_manifest::library_descriptor;
use crate::document::{AssetScan, AssetSummary, BootstrapFile, PathAliasManifest, ProjectManifest};
use crate::domain::model::LinkedModuleRecord;
use crate::error::{LinkError, push_warning};
use crate::runtime::{Runtime, resolve_relative_path};

/// Options for `link`. Unset values fall back to the project configuration.
#[derive(Debug, Clone, Default)]
pub struct LinkOptions {
    pub scope: Option<String>,
    /// Directory name under the module root; defaults to the source basename
    pub name: Option<String>,
    /// Library name used in the import path; defaults to `name`
    pub lib: Option<String>,
    /// Identifier to wire into the bootstrap file
    pub module: Option<String>,
    pub assets: bool,
    pub prefix: Option<String>,
}

/// Result of a link operation
#[derive(Debug)]
pub struct LinkReport {
    pub record: LinkedModuleRecord,
    /// Location of the symlink
    pub link: PathBuf,
    /// Whether a record with the same name was replaced
    pub relinked: bool,
    pub backups: Vec<PathBuf>,
    /// Registered assets; `None` unless assets were requested and found
    pub assets: Option<AssetSummary>,
    pub warnings: Vec<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl<'a, R: Runtime> LinkManager<'a, R> {
    /// Link `source` into the module root.
    ///
    /// All documents are parsed and edited in memory before anything is
    /// written, so a parse error or a path conflict leaves the project untouched.
    #[tracing::instrument(skip(self))]
    pub fn link(&self, source: &Path, options: LinkOptions) -> Result<LinkReport> {
        let source = resolve_relative_path(&self.config.root, source);
        if !self.runtime.is_dir(&source) {
            return Err(LinkError::SourceNotFound(source).into());
        }

        let name = match non_empty(options.name) {
            Some(name) => name,
            None => source
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    LinkError::Usage(format!(
                        "Cannot derive a module name from {:?}; pass --name",
                        source
                    ))
                })?,
        };
        validate_module_name(&name)?;

        let record = LinkedModuleRecord {
            lib: non_empty(options.lib).unwrap_or_else(|| name.clone()),
            scope: non_empty(options.scope).unwrap_or_else(|| self.config.default_scope.clone()),
            module: non_empty(options.module).unwrap_or_default(),
            assets: options.assets,
            source: source.clone(),
            name,
        };
        let prefix =
            non_empty(options.prefix).unwrap_or_else(|| self.config.default_prefix.clone());
        let link = self.config.module_link(&record.name);
        let module_dir = self.config.module_dir(&record.name);
        let import_path = record.import_path();
        debug!("Linking {} as {} from {:?}", record.name, import_path, source);

        let mut warnings = Vec::new();

        // Parse and edit every document before touching the filesystem
        let state_store = self.state_store();
        let mut state = state_store.load()?;
        let previous = state.find(&record.name).cloned();

        let mut aliases = PathAliasManifest::load(self.runtime, &self.config.path_alias_manifest)?;
        if let Some(old) = &previous
            && old.import_path() != import_path
            && aliases.remove_alias(&old.import_path())
        {
            info!("Removed stale path alias {}", old.import_path());
        }
        aliases.set_alias(&import_path, &format!("{}/src", module_dir));

        let mut projects = ProjectManifest::load(
            self.runtime,
            &self.config.project_manifest,
            &self.config.app_project,
        )?;
        projects.upsert_library(&record.name, library_descriptor(&module_dir, &prefix));
        if let Some(old) = &previous
            && old.assets
            && (!record.assets || old.source != record.source)
        {
            let removed = projects.remove_module_assets(&self.config.asset_base(&record.name));
            info!("Removed {} stale asset entries for {}", removed, record.name);
        }

        // The previous registration is dropped when the module or its import path changes
        let stale_module = previous.as_ref().and_then(|old| {
            old.module_class()
                .filter(|m| Some(*m) != record.module_class() || old.import_path() != import_path)
                .map(|m| (m.to_string(), old.import_path()))
        });
        let load_bootstrap = record.module_class().is_some()
            || (stale_module.is_some() && self.runtime.exists(&self.config.bootstrap_file));

        let bootstrap = if load_bootstrap {
            let mut bootstrap = BootstrapFile::load(self.runtime, &self.config.bootstrap_file)?;
            let file = document_name(&self.config.bootstrap_file);
            if let Some((module, old_import)) = &stale_module {
                bootstrap.remove_import(module, old_import);
                bootstrap.remove_module(module);
                info!("Removed stale module {} from {}", module, file);
            }
            if let Some(module) = record.module_class() {
                if !bootstrap.add_import(module, &import_path) {
                    push_warning(
                        &mut warnings,
                        format!("Import for {} already exists in {}, skipping", module, file),
                    );
                }
                if !bootstrap.add_module(module)? {
                    push_warning(
                        &mut warnings,
                        format!("{} is already in the imports array of {}, skipping", module, file),
                    );
                }
            }
            Some(bootstrap)
        } else {
            None
        };

        let assets = if record.assets {
            projects.ensure_build_options()?;
            match AssetScan::scan(self.runtime, &source, &self.config.asset_base(&record.name))? {
                Some(scan) => Some(scan.apply(&mut projects, &mut warnings)?),
                None => {
                    info!("No assets directory found in source module");
                    None
                }
            }
        } else {
            None
        };

        let symlinks = self.symlinks();
        symlinks.ensure_replaceable(&link)?;

        // Snapshot, then mutate
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

        symlinks.replace(&source, &link)?;
        aliases.save(self.runtime)?;
        projects.save(self.runtime)?;
        if let Some(bootstrap) = &bootstrap {
            bootstrap.save(self.runtime)?;
        }

        let relinked = state.upsert(record.clone());
        state_store.save(&state)?;
        info!("Linked module {} ({})", record.name, import_path);

        Ok(LinkReport {
            record,
            link,
            relinked,
            backups,
            assets,
            warnings,
        })
    }
}
