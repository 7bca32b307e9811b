//! Project layout configuration.
//!
//! Precedence: CLI flags (including their environment fallbacks) > the
//! optional `.modlink.json` file in the project root > built-in defaults.

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::LinkError;
use crate::runtime::{Runtime, resolve_relative_path};

/// Name of the optional per-project configuration file.
pub const CONFIG_FILE_NAME: &str = ".modlink.json";

/// Environment variable consulted for the project root when no flag is given.
pub const ROOT_ENV: &str = "MODLINK_ROOT";

pub const DEFAULT_SCOPE: &str = "@tailormap-viewer";
pub const DEFAULT_PREFIX: &str = "tm";
pub const DEFAULT_APP_PROJECT: &str = "app";

/// On-disk shape of `.modlink.json`. Every field is optional; paths are relative to the root.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileConfig {
    pub modules_dir: Option<String>,
    pub path_alias_manifest: Option<PathBuf>,
    pub project_manifest: Option<PathBuf>,
    pub bootstrap_file: Option<PathBuf>,
    pub state_file: Option<PathBuf>,
    pub backup_dir: Option<PathBuf>,
    pub app_project: Option<String>,
    pub default_scope: Option<String>,
    pub default_prefix: Option<String>,
}

/// Values supplied on the command line.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub root: Option<PathBuf>,
}

/// Resolved project layout. All paths are absolute.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub root: PathBuf,
    /// Module root as written into the manifests, e.g. `projects`.
    pub modules_dir: String,
    pub path_alias_manifest: PathBuf,
    pub project_manifest: PathBuf,
    pub bootstrap_file: PathBuf,
    pub state_file: PathBuf,
    pub backup_dir: PathBuf,
    /// Host application project whose assets, styles and translations are edited.
    pub app_project: String,
    pub default_scope: String,
    pub default_prefix: String,
}

impl Config {
    /// Default layout for a project rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            modules_dir: "projects".to_string(),
            path_alias_manifest: root.join("tsconfig.json"),
            project_manifest: root.join("angular.json"),
            bootstrap_file: root.join("projects/app/src/environments/environment.ts"),
            state_file: root.join(".linked-modules.json"),
            backup_dir: root.join(".link-modules-backup"),
            app_project: DEFAULT_APP_PROJECT.to_string(),
            default_scope: DEFAULT_SCOPE.to_string(),
            default_prefix: DEFAULT_PREFIX.to_string(),
            root,
        }
    }

    /// Resolve the root and apply `.modlink.json` when present.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, overrides: ConfigOverrides) -> Result<Self> {
        let cwd = runtime.current_dir()?;
        let root = overrides
            .root
            .or_else(|| runtime.env_var(ROOT_ENV).ok().map(PathBuf::from))
            .map(|root| resolve_relative_path(&cwd, &root))
            .unwrap_or(cwd);
        debug!("Using project root: {:?}", root);

        let mut config = Config::with_root(root);
        let file_path = config.root.join(CONFIG_FILE_NAME);
        if runtime.exists(&file_path) {
            debug!("Loading project configuration from {:?}", file_path);
            let content = runtime
                .read_to_string(&file_path)
                .with_context(|| format!("Failed to read {:?}", file_path))?;
            let file: FileConfig = serde_json::from_str(&content)
                .map_err(|e| LinkError::parse(&file_path, e))?;
            config.apply(file);
        }
        Ok(config)
    }

    fn apply(&mut self, file: FileConfig) {
        let root = self.root.clone();
        let at_root = |p: PathBuf| resolve_relative_path(&root, &p);

        if let Some(dir) = file.modules_dir {
            self.modules_dir = dir.trim_end_matches('/').to_string();
        }
        if let Some(p) = file.path_alias_manifest {
            self.path_alias_manifest = at_root(p);
        }
        if let Some(p) = file.project_manifest {
            self.project_manifest = at_root(p);
        }
        if let Some(p) = file.bootstrap_file {
            self.bootstrap_file = at_root(p);
        }
        if let Some(p) = file.state_file {
            self.state_file = at_root(p);
        }
        if let Some(p) = file.backup_dir {
            self.backup_dir = at_root(p);
        }
        if let Some(app) = file.app_project {
            self.app_project = app;
        }
        if let Some(scope) = file.default_scope {
            self.default_scope = scope;
        }
        if let Some(prefix) = file.default_prefix {
            self.default_prefix = prefix;
        }
    }

    /// Absolute directory holding the module symlinks.
    pub fn modules_root(&self) -> PathBuf {
        self.root.join(&self.modules_dir)
    }

    /// Absolute location of the symlink for module `name`.
    pub fn module_link(&self, name: &str) -> PathBuf {
        self.modules_root().join(name)
    }

    /// Project-relative module directory as written into manifests, e.g. `projects/foo`.
    pub fn module_dir(&self, name: &str) -> String {
        format!("{}/{}", self.modules_dir, name)
    }

    /// Project-relative base path of a module's assets, e.g. `projects/foo/assets`.
    pub fn asset_base(&self, name: &str) -> String {
        format!("{}/assets", self.module_dir(name))
    }

    /// Documents in the fixed order they are backed up and restored.
    pub fn documents(&self) -> [&Path; 3] {
        [
            &self.path_alias_manifest,
            &self.project_manifest,
            &self.bootstrap_file,
        ]
    }
}
