//! Symlink operations (create, read, remove).

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn symlink_dir_impl(&self, original: &Path, link: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::symlink as unix_symlink;
            unix_symlink(original, link).context("Failed to create symlink")?;
        }
        #[cfg(windows)]
        {
            use anyhow::bail;
            use std::os::windows::fs::symlink_dir;

            symlink_dir(original, link).context("Failed to create directory symlink")?;

            if fs::symlink_metadata(link).is_err() {
                bail!(
                    "Symlink creation reported success but link does not exist: link={:?} target={:?}",
                    link,
                    original
                );
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn read_link_impl(&self, path: &Path) -> Result<PathBuf> {
        fs::read_link(path).context("Failed to read symlink")
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn is_symlink_impl(&self, path: &Path) -> bool {
        fs::symlink_metadata(path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn remove_symlink_impl(&self, path: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            fs::remove_file(path).context("Failed to remove symlink")?;
        }
        #[cfg(windows)]
        {
            // Directory symlinks need remove_dir on Windows; fall back to remove_file.
            fs::remove_dir(path)
                .or_else(|_| fs::remove_file(path))
                .context("Failed to remove symlink")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};
    use tempfile::tempdir;

    #[cfg_attr(
        modlink_skip_cross_windows_tests,
        ignore = "cross windows tests disabled; set MODLINK_RUN_CROSS_WINDOWS_TESTS=1 to enable"
    )]
    #[test]
    fn test_real_runtime_symlink_ops() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let target = dir.path().join("target");
        runtime.create_dir_all(&target).unwrap();

        let link = dir.path().join("link");
        runtime.symlink_dir(&target, &link).unwrap();
        assert!(runtime.is_symlink(&link));
        assert!(!runtime.is_symlink(&target));
        assert!(runtime.is_dir(&link));

        assert_eq!(runtime.read_link(&link).unwrap(), target);

        runtime.remove_symlink(&link).unwrap();
        assert!(!runtime.exists(&link));
        assert!(runtime.exists(&target));
    }

    #[cfg_attr(
        modlink_skip_cross_windows_tests,
        ignore = "cross windows tests disabled; set MODLINK_RUN_CROSS_WINDOWS_TESTS=1 to enable"
    )]
    #[test]
    fn test_dangling_symlink_is_symlink_but_does_not_exist() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let target = dir.path().join("target");
        runtime.create_dir_all(&target).unwrap();

        let link = dir.path().join("link");
        runtime.symlink_dir(&target, &link).unwrap();
        std::fs::remove_dir(&target).unwrap();

        // `exists` follows the link, `is_symlink` does not
        assert!(runtime.is_symlink(&link));
        assert!(!runtime.exists(&link));
        assert_eq!(runtime.read_link(&link).unwrap(), target);

        runtime.remove_symlink(&link).unwrap();
        assert!(!runtime.is_symlink(&link));
    }

    #[test]
    fn test_is_symlink_false_for_missing_path() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        assert!(!runtime.is_symlink(&dir.path().join("nothing-here")));
    }

    #[test]
    fn test_remove_symlink_missing_path_errors() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let result = runtime.remove_symlink(&dir.path().join("nothing-here"));
        assert!(result.is_err());
    }
}
