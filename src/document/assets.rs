//! Detection of a linked module's assets, styles and translations.
//!
//! The directory and file names below are the host project's convention for
//! library assets, not a general discovery algorithm.

use anyhow::Result;
use log::{debug, info};
use std::path::{Path, PathBuf};

use super::project_manifest::{EntryOutcome, ProjectManifest};
use crate::error::push_warning;
use crate::runtime::Runtime;

pub const ASSETS_DIR: &str = "assets";
/// Copied to `icons/` in the build output.
pub const ICONS_DIR: &str = "icons";
/// Copied to the root of the build output.
pub const ROOT_DIR: &str = "root";
pub const LOCALE_DIR: &str = "locale";
pub const STYLE_EXTENSIONS: &[&str] = &["css", "scss"];
/// Translation file suffix per locale.
pub const TRANSLATION_SUFFIXES: &[(&str, &str)] = &[("nl", ".nl.xlf"), ("de", ".de.xlf")];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFolder {
    /// Project-relative input, e.g. `projects/foo/assets/icons`.
    pub input: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub locale: String,
    pub file: String,
}

/// What a module's `assets/` directory contributes, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetScan {
    pub folders: Vec<AssetFolder>,
    pub styles: Vec<String>,
    pub translations: Vec<Translation>,
}

/// Names of the entries actually registered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetSummary {
    pub assets: Vec<String>,
    pub styles: Vec<String>,
    pub translations: Vec<String>,
}

impl AssetSummary {
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty() && self.styles.is_empty() && self.translations.is_empty()
    }
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

fn sorted_entries<R: Runtime>(runtime: &R, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = runtime.read_dir(dir)?;
    entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(entries)
}

impl AssetScan {
    /// Scan `<source>/assets`. Returns `None` when the module has no assets directory.
    #[tracing::instrument(skip(runtime))]
    pub fn scan<R: Runtime>(runtime: &R, source: &Path, asset_base: &str) -> Result<Option<Self>> {
        let assets_dir = source.join(ASSETS_DIR);
        if !runtime.is_dir(&assets_dir) {
            info!("No assets directory found in {:?}", source);
            return Ok(None);
        }
        debug!("Detecting assets in {:?}", assets_dir);

        let mut scan = AssetScan::default();
        for (dir, output) in [(ICONS_DIR, ICONS_DIR), (ROOT_DIR, ".")] {
            if runtime.is_dir(&assets_dir.join(dir)) {
                scan.folders.push(AssetFolder {
                    input: format!("{}/{}", asset_base, dir),
                    output: output.to_string(),
                });
            }
        }

        let entries = sorted_entries(runtime, &assets_dir)?;
        for entry in &entries {
            let Some(name) = file_name(entry) else { continue };
            if runtime.is_dir(entry) && ![ICONS_DIR, ROOT_DIR, LOCALE_DIR].contains(&name) {
                scan.folders.push(AssetFolder {
                    input: format!("{}/{}", asset_base, name),
                    output: name.to_string(),
                });
            }
        }
        for entry in &entries {
            let Some(name) = file_name(entry) else { continue };
            let is_style = entry
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| STYLE_EXTENSIONS.contains(&e));
            if is_style && runtime.is_file(entry) {
                scan.styles.push(format!("{}/{}", asset_base, name));
            }
        }

        let locale_dir = assets_dir.join(LOCALE_DIR);
        if runtime.is_dir(&locale_dir) {
            for entry in sorted_entries(runtime, &locale_dir)? {
                let Some(name) = file_name(&entry) else { continue };
                if let Some((locale, _)) = TRANSLATION_SUFFIXES
                    .iter()
                    .find(|(_, suffix)| name.ends_with(*suffix))
                {
                    scan.translations.push(Translation {
                        locale: locale.to_string(),
                        file: format!("{}/{}/{}", asset_base, LOCALE_DIR, name),
                    });
                }
            }
        }

        Ok(Some(scan))
    }

    /// Register the scanned entries with the host application.
    /// Entries that are already present or target an undeclared locale are
    /// skipped and reported in `warnings`.
    pub fn apply(
        &self,
        manifest: &mut ProjectManifest,
        warnings: &mut Vec<String>,
    ) -> Result<AssetSummary> {
        let mut summary = AssetSummary::default();

        for folder in &self.folders {
            match manifest.add_asset(&folder.input, &folder.output)? {
                EntryOutcome::Added => summary.assets.push(folder.output.clone()),
                _ => push_warning(
                    warnings,
                    format!("Asset '{}' already exists, skipping", folder.input),
                ),
            }
        }
        for style in &self.styles {
            match manifest.add_style(style)? {
                EntryOutcome::Added => summary.styles.push(tail(style)),
                _ => push_warning(warnings, format!("Style '{}' already exists, skipping", style)),
            }
        }
        for translation in &self.translations {
            match manifest.add_translation(&translation.locale, &translation.file)? {
                EntryOutcome::Added => summary.translations.push(tail(&translation.file)),
                EntryOutcome::AlreadyPresent => push_warning(
                    warnings,
                    format!("Translation '{}' already exists, skipping", translation.file),
                ),
                EntryOutcome::LocaleNotDeclared => push_warning(
                    warnings,
                    format!(
                        "Locale '{}' is not declared by the application, skipping '{}'",
                        translation.locale, translation.file
                    ),
                ),
            }
        }
        Ok(summary)
    }
}

fn tail(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}
