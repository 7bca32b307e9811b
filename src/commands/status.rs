use anyhow::Result;
use std::fmt::{self, Write};

use crate::application::{LinkManager, StatusReport};
use crate::config::{Config, ConfigOverrides};
use crate::domain::model::LinkStatus;
use crate::runtime::Runtime;

/// Show the health of every linked module
#[tracing::instrument(skip(runtime, overrides))]
pub fn status<R: Runtime>(runtime: R, overrides: ConfigOverrides) -> Result<()> {
    let config = Config::load(&runtime, overrides)?;
    let bootstrap = config
        .bootstrap_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let manager = LinkManager::new(&runtime, config);
    let mut out = String::new();
    write_status(&mut out, &manager.status()?, &bootstrap)?;
    print!("{}", out);
    Ok(())
}

fn write_status(out: &mut String, report: &StatusReport, bootstrap: &str) -> fmt::Result {
    writeln!(out, "Link Modules Status")?;
    writeln!(out, "===================")?;
    writeln!(out)?;
    writeln!(
        out,
        "State file: {} ({})",
        report.state_file.display(),
        if report.state_exists { "exists" } else { "not found" }
    )?;
    match report.backup_count {
        Some(count) => writeln!(
            out,
            "Backup directory: {} ({} backups)",
            report.backup_dir.display(),
            count
        )?,
        None => writeln!(
            out,
            "Backup directory: {} (not created yet)",
            report.backup_dir.display()
        )?,
    }
    writeln!(out)?;

    if report.modules.is_empty() {
        return writeln!(out, "No linked modules");
    }

    writeln!(out, "Linked modules:")?;
    for module in &report.modules {
        let name = &module.record.name;
        match &module.status {
            LinkStatus::Ok { target } => {
                writeln!(out, "  \u{2713} {} -> {}", name, target.display())?;
                writeln!(out, "      Import: {}", module.record.import_path())?;
                if let Some(class) = module.record.module_class() {
                    writeln!(out, "      Module: {} (in {})", class, bootstrap)?;
                }
                if module.record.assets {
                    writeln!(out, "      Assets: enabled")?;
                }
            }
            LinkStatus::Broken { target } => writeln!(
                out,
                "  \u{2717} {} -> {} ({})",
                name,
                target.display(),
                module.status.reason()
            )?,
            LinkStatus::Missing | LinkStatus::NotSymlink => {
                writeln!(out, "  \u{2717} {} ({})", name, module.status.reason())?
            }
        }
    }
    Ok(())
}
