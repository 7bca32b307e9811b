use anyhow::Result;
use log::debug;
use std::fmt::{self, Write};
use std::path::Path;

use crate::application::{LinkManager, LinkOptions, LinkReport};
use crate::config::{Config, ConfigOverrides};
use crate::runtime::Runtime;

use super::{PROGRAM, print_warnings};

/// Link an external module into the project
#[tracing::instrument(skip(runtime, overrides))]
pub fn link<R: Runtime>(
    runtime: R,
    source: &Path,
    options: LinkOptions,
    overrides: ConfigOverrides,
) -> Result<()> {
    let config = Config::load(&runtime, overrides)?;
    debug!("Using project root: {:?}", config.root);

    let manager = LinkManager::new(&runtime, config);
    let report = manager.link(source, options)?;
    print_warnings(&report.warnings);
    let mut out = String::new();
    write_link_report(&mut out, &report)?;
    print!("{}", out);
    Ok(())
}

fn write_link_report(out: &mut String, report: &LinkReport) -> fmt::Result {
    let record = &report.record;

    writeln!(out, "Linked {} -> {}", record.name, record.source.display())?;
    if report.relinked {
        writeln!(out, "  (replaced the previous link of the same name)")?;
    }
    for backup in &report.backups {
        writeln!(out, "  Backup: {}", backup.display())?;
    }
    writeln!(out)?;
    writeln!(out, "To use this module in your code, import from:")?;
    writeln!(out, "  import {{ ... }} from '{}';", record.import_path())?;
    if let Some(module) = record.module_class() {
        writeln!(out)?;
        writeln!(
            out,
            "The module '{}' has been added to the bootstrap imports.",
            module
        )?;
    }
    if let Some(assets) = &report.assets {
        writeln!(out)?;
        if assets.is_empty() {
            writeln!(out, "No new assets, styles or translations were added.")?;
        }
        if !assets.assets.is_empty() {
            writeln!(out, "Added assets: {}", assets.assets.join(", "))?;
        }
        if !assets.styles.is_empty() {
            writeln!(out, "Added styles: {}", assets.styles.join(", "))?;
        }
        if !assets.translations.is_empty() {
            writeln!(out, "Added translations: {}", assets.translations.join(", "))?;
        }
    }
    writeln!(out)?;
    writeln!(out, "To unlink this module later, run:")?;
    writeln!(out, "  {} unlink {}", PROGRAM, record.name)
}
