use anyhow::Result;
use log::debug;

use crate::application::LinkManager;
use crate::config::{Config, ConfigOverrides};
use crate::runtime::Runtime;

use super::print_warnings;

/// Remove a linked module and its registrations
#[tracing::instrument(skip(runtime, overrides))]
pub fn unlink<R: Runtime>(runtime: R, name: &str, overrides: ConfigOverrides) -> Result<()> {
    let config = Config::load(&runtime, overrides)?;
    debug!("Using project root: {:?}", config.root);

    let manager = LinkManager::new(&runtime, config);
    let report = manager.unlink(name)?;
    print_warnings(&report.warnings);

    println!("Unlinked {} ({})", report.record.name, report.record.import_path());
    if report.removed_assets > 0 {
        println!(
            "  Removed {} asset/style/translation entries",
            report.removed_assets
        );
    }
    for backup in &report.backups {
        println!("  Backup: {}", backup.display());
    }
    Ok(())
}
