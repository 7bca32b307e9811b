use anyhow::Result;
use std::fmt::{self, Write};

use crate::application::LinkManager;
use crate::config::{Config, ConfigOverrides};
use crate::domain::model::LinkedModuleRecord;
use crate::runtime::Runtime;

/// List linked modules
#[tracing::instrument(skip(runtime, overrides))]
pub fn list<R: Runtime>(runtime: R, overrides: ConfigOverrides) -> Result<()> {
    let config = Config::load(&runtime, overrides)?;
    let manager = LinkManager::new(&runtime, config);
    let mut out = String::new();
    write_table(&mut out, &manager.list()?)?;
    print!("{}", out);
    Ok(())
}

fn write_row(out: &mut String, cells: [&str; 5]) -> fmt::Result {
    writeln!(
        out,
        "  {:<15}{:<25}{:<18}{:<7}{}",
        cells[0], cells[1], cells[2], cells[3], cells[4]
    )
}

fn write_table(out: &mut String, records: &[LinkedModuleRecord]) -> fmt::Result {
    writeln!(out, "Linked Modules:")?;
    writeln!(out, "===============")?;
    if records.is_empty() {
        return writeln!(out, "  (none)");
    }

    writeln!(out)?;
    write_row(
        out,
        ["DIRECTORY", "IMPORT PATH", "MODULE CLASS", "ASSETS", "SOURCE"],
    )?;
    write_row(
        out,
        ["---------", "-----------", "------------", "------", "------"],
    )?;
    for record in records {
        let import_path = record.import_path();
        let source = record.source.display().to_string();
        write_row(
            out,
            [
                &record.name,
                &import_path,
                record.module_class().unwrap_or("-"),
                if record.assets { "\u{2713}" } else { "-" },
                &source,
            ],
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn format_table(records: &[LinkedModuleRecord]) -> String {
        let mut out = String::new();
        write_table(&mut out, records).unwrap();
        out
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(
            format_table(&[]),
            "Linked Modules:\n===============\n  (none)\n"
        );
    }

    #[test]
    fn test_table_rows() {
        let records = vec![
            LinkedModuleRecord {
                name: "foo".into(),
                source: PathBuf::from("/ext/foo"),
                scope: "@x".into(),
                lib: "foo-lib".into(),
                module: "FooModule".into(),
                assets: true,
            },
            LinkedModuleRecord {
                name: "bar".into(),
                source: PathBuf::from("/ext/bar"),
                scope: "@x".into(),
                lib: String::new(),
                module: String::new(),
                assets: false,
            },
        ];
        let out = format_table(&records);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 7);
        assert_eq!(
            lines[3],
            "  DIRECTORY      IMPORT PATH              MODULE CLASS      ASSETS SOURCE"
        );
        assert_eq!(
            lines[5],
            "  foo            @x/foo-lib               FooModule         \u{2713}      /ext/foo"
        );
        assert_eq!(
            lines[6],
            "  bar            @x/bar                   -                 -      /ext/bar"
        );
    }
}
