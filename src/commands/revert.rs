use anyhow::Result;
use chrono::{DateTime, Utc};
use std::fmt::{self, Write};

use crate::application::{LinkManager, RevertOutcome, RevertPlan};
use crate::config::{Config, ConfigOverrides};
use crate::domain::model::BackupFile;
use crate::runtime::Runtime;

use super::print_warnings;

/// Restore the most recent backups and remove all linked modules
#[tracing::instrument(skip(runtime, overrides))]
pub fn revert<R: Runtime>(runtime: R, yes: bool, overrides: ConfigOverrides) -> Result<()> {
    let config = Config::load(&runtime, overrides)?;
    let tsconfig = config.path_alias_manifest.clone();
    let manager = LinkManager::new(&runtime, config);

    let plan = manager.plan_revert()?;
    let mut listing = String::new();
    write_listing(
        &mut listing,
        &plan,
        &plan.listing(&runtime),
        &tsconfig.display().to_string(),
    )?;
    print!("{}", listing);

    match manager.revert(&plan, yes)? {
        RevertOutcome::Cancelled => println!("Revert cancelled"),
        RevertOutcome::Reverted(report) => {
            print_warnings(&report.warnings);
            for (document, backup) in &report.restored {
                println!("Restored {} from {}", document.display(), backup.name());
            }
            for link in &report.removed_links {
                println!("Removed symlink {}", link.display());
            }
            println!("Revert complete!");
        }
    }
    Ok(())
}

fn write_listing(
    out: &mut String,
    plan: &RevertPlan,
    listing: &[(BackupFile, Option<DateTime<Utc>>)],
    tsconfig: &str,
) -> fmt::Result {
    writeln!(out, "Available backups:")?;
    for (backup, modified) in listing {
        match modified {
            Some(at) => writeln!(out, "  {}  ({})", backup.name(), at.to_rfc3339())?,
            None => writeln!(out, "  {}", backup.name())?,
        }
    }
    if plan.backups.len() > listing.len() {
        writeln!(out, "  ... and {} more", plan.backups.len() - listing.len())?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "To restore a specific backup, copy it back to the original location."
    )?;
    writeln!(out, "For example:")?;
    writeln!(
        out,
        "  cp {}/tsconfig.json.<timestamp>.backup {}",
        plan.backup_dir.display(),
        tsconfig
    )?;
    writeln!(out)
}
