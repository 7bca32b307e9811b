//! The project manifest (`angular.json`).
//!
//! Library projects are registered under `projects.<name>`. Assets, styles
//! and translations are registered on the host application project.

use anyhow::Result;
use log::debug;
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};

use super::{read_json_object, render_json, write_json_object};
use crate::error::LinkError;
use crate::runtime::{Runtime, is_path_under};

/// Outcome of registering one asset, style or translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    Added,
    AlreadyPresent,
    /// The host application does not declare the locale.
    LocaleNotDeclared,
}

#[derive(Debug, Clone)]
pub struct ProjectManifest {
    path: PathBuf,
    root: Map<String, Value>,
    app_project: String,
}

/// Descriptor of a linked library project.
pub fn library_descriptor(module_dir: &str, prefix: &str) -> Value {
    json!({
        "projectType": "library",
        "root": module_dir,
        "sourceRoot": format!("{}/src", module_dir),
        "prefix": prefix,
        "architect": {
            "build": {
                "builder": "@angular/build:ng-packagr",
                "options": {
                    "project": format!("{}/ng-package.json", module_dir),
                    "tsConfig": format!("{}/tsconfig.lib.json", module_dir)
                },
                "configurations": {
                    "production": {
                        "tsConfig": format!("{}/tsconfig.lib.prod.json", module_dir)
                    },
                    "development": {
                        "tsConfig": format!("{}/tsconfig.lib.json", module_dir)
                    }
                },
                "defaultConfiguration": "production"
            },
            "lint": {
                "builder": "@angular-eslint/builder:lint",
                "options": {
                    "lintFilePatterns": [
                        format!("{}/**/*.ts", module_dir),
                        format!("{}/**/*.html", module_dir)
                    ]
                }
            }
        }
    })
}

fn starts_with_base(value: &Value, base: &Path) -> bool {
    value
        .as_str()
        .is_some_and(|s| is_path_under(Path::new(s), base))
}

impl ProjectManifest {
    pub fn load<R: Runtime>(runtime: &R, path: &Path, app_project: &str) -> Result<Self> {
        let root = read_json_object(runtime, path)?;
        if !root.get("projects").is_some_and(Value::is_object) {
            return Err(LinkError::parse(path, "missing \"projects\" object").into());
        }
        Ok(Self {
            path: path.to_path_buf(),
            root,
            app_project: app_project.to_string(),
        })
    }

    fn projects(&self) -> Option<&Map<String, Value>> {
        self.root.get("projects").and_then(Value::as_object)
    }

    fn projects_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.root.get_mut("projects").and_then(Value::as_object_mut)
    }

    pub fn project(&self, name: &str) -> Option<&Value> {
        self.projects().and_then(|p| p.get(name))
    }

    /// Register `name` as a library project, replacing any previous descriptor.
    pub fn upsert_library(&mut self, name: &str, descriptor: Value) {
        debug!("Registering project {}", name);
        if let Some(projects) = self.projects_mut() {
            projects.insert(name.to_string(), descriptor);
        }
    }

    /// Returns true if a project was removed.
    pub fn remove_project(&mut self, name: &str) -> bool {
        self.projects_mut()
            .is_some_and(|p| p.shift_remove(name).is_some())
    }

    fn build_options(&self) -> Option<&Map<String, Value>> {
        self.project(&self.app_project)?
            .get("architect")?
            .get("build")?
            .get("options")?
            .as_object()
    }

    fn build_options_mut(&mut self) -> Result<&mut Map<String, Value>> {
        let app = self.app_project.clone();
        let path = self.path.clone();
        self.root
            .get_mut("projects")
            .and_then(|p| p.get_mut(&app))
            .and_then(|p| p.get_mut("architect"))
            .and_then(|a| a.get_mut("build"))
            .and_then(|b| b.get_mut("options"))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| {
                LinkError::parse(
                    path,
                    format!("missing \"projects.{}.architect.build.options\"", app),
                )
                .into()
            })
    }

    /// `options.<key>` of the host application build, created if absent.
    fn build_list_mut(&mut self, key: &str) -> Result<&mut Vec<Value>> {
        let path = self.path.clone();
        let list = self
            .build_options_mut()?
            .entry(key)
            .or_insert_with(|| json!([]));
        list.as_array_mut().ok_or_else(|| {
            LinkError::parse(path, format!("build option \"{}\" is not a list", key)).into()
        })
    }

    /// Fail early if the host application cannot receive assets.
    /// Lists are only created once an entry is added to them.
    pub fn ensure_build_options(&self) -> Result<()> {
        let Some(options) = self.build_options() else {
            return Err(LinkError::parse(
                &self.path,
                format!(
                    "missing \"projects.{}.architect.build.options\"",
                    self.app_project
                ),
            )
            .into());
        };
        for key in ["assets", "styles"] {
            if options.get(key).is_some_and(|list| !list.is_array()) {
                return Err(LinkError::parse(
                    &self.path,
                    format!("build option \"{}\" is not a list", key),
                )
                .into());
            }
        }
        Ok(())
    }

    pub fn assets(&self) -> &[Value] {
        self.build_options()
            .and_then(|o| o.get("assets"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn styles(&self) -> &[Value] {
        self.build_options()
            .and_then(|o| o.get("styles"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Register an asset folder `{glob: "**/*", input, output}`.
    /// An existing object with the same `input` counts as present.
    pub fn add_asset(&mut self, input: &str, output: &str) -> Result<EntryOutcome> {
        let assets = self.build_list_mut("assets")?;
        let exists = assets
            .iter()
            .any(|a| a.get("input").and_then(Value::as_str) == Some(input));
        if exists {
            return Ok(EntryOutcome::AlreadyPresent);
        }
        assets.push(json!({ "glob": "**/*", "input": input, "output": output }));
        Ok(EntryOutcome::Added)
    }

    pub fn add_style(&mut self, style: &str) -> Result<EntryOutcome> {
        let styles = self.build_list_mut("styles")?;
        if styles.iter().any(|s| s.as_str() == Some(style)) {
            return Ok(EntryOutcome::AlreadyPresent);
        }
        styles.push(json!(style));
        Ok(EntryOutcome::Added)
    }

    /// Add a translation file to a locale declared by the host application.
    pub fn add_translation(&mut self, locale: &str, file: &str) -> Result<EntryOutcome> {
        let app = self.app_project.clone();
        let path = self.path.clone();
        let Some(entry) = self
            .projects_mut()
            .and_then(|p| p.get_mut(&app))
            .and_then(|p| p.get_mut("i18n"))
            .and_then(|i| i.get_mut("locales"))
            .and_then(|l| l.get_mut(locale))
        else {
            return Ok(EntryOutcome::LocaleNotDeclared);
        };

        // A locale may be declared as a bare path or with a single translation path
        if let Some(single) = entry.as_str().map(str::to_string) {
            *entry = json!({ "translation": [single] });
        }
        let Some(locale_config) = entry.as_object_mut() else {
            return Err(
                LinkError::parse(path, format!("locale \"{}\" has an unexpected shape", locale))
                    .into(),
            );
        };
        let translation = locale_config
            .entry("translation")
            .or_insert_with(|| json!([]));
        if let Some(single) = translation.as_str().map(str::to_string) {
            *translation = json!([single]);
        }
        let Some(files) = translation.as_array_mut() else {
            return Err(LinkError::parse(
                path,
                format!("translation list of locale \"{}\" is not a list", locale),
            )
            .into());
        };

        if files.iter().any(|f| f.as_str() == Some(file)) {
            return Ok(EntryOutcome::AlreadyPresent);
        }
        files.push(json!(file));
        Ok(EntryOutcome::Added)
    }

    #[cfg(test)]
    fn translations(&self, locale: &str) -> Vec<&str> {
        self.project(&self.app_project)
            .and_then(|p| p.get("i18n"))
            .and_then(|i| i.get("locales"))
            .and_then(|l| l.get(locale))
            .and_then(|l| l.get("translation"))
            .and_then(Value::as_array)
            .map(|files| files.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Drop every asset object, style and translation under `asset_base`.
    /// Returns how many entries were removed.
    pub fn remove_module_assets(&mut self, asset_base: &str) -> usize {
        let base = Path::new(asset_base);
        let app = self.app_project.clone();
        let mut removed = 0;

        if let Ok(options) = self.build_options_mut() {
            if let Some(assets) = options.get_mut("assets").and_then(Value::as_array_mut) {
                let before = assets.len();
                assets.retain(|a| !a.get("input").is_some_and(|i| starts_with_base(i, base)));
                removed += before - assets.len();
            }
            if let Some(styles) = options.get_mut("styles").and_then(Value::as_array_mut) {
                let before = styles.len();
                styles.retain(|s| !starts_with_base(s, base));
                removed += before - styles.len();
            }
        }

        if let Some(locales) = self
            .projects_mut()
            .and_then(|p| p.get_mut(&app))
            .and_then(|p| p.get_mut("i18n"))
            .and_then(|i| i.get_mut("locales"))
            .and_then(Value::as_object_mut)
        {
            for files in locales
                .values_mut()
                .filter_map(|l| l.get_mut("translation"))
                .filter_map(Value::as_array_mut)
            {
                let before = files.len();
                files.retain(|f| !starts_with_base(f, base));
                removed += before - files.len();
            }
        }

        debug!("Removed {} asset entries under {}", removed, asset_base);
        removed
    }

    pub fn render(&self) -> Result<String> {
        render_json(&self.root)
    }

    pub fn save<R: Runtime>(&self, runtime: &R) -> Result<()> {
        write_json_object(runtime, &self.path, &self.root)
    }
}
