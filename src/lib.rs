pub mod application;
pub mod commands;
pub mod config;
pub mod document;
pub mod domain;
pub mod error;
pub mod runtime;

/// Test utilities: a filesystem-backed runtime and a throwaway project tree.
#[cfg(test)]
pub mod test_utils {
    use crate::config::Config;
    use crate::runtime::{RealRuntime, Runtime};
    use anyhow::Result;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::cell::{Cell, RefCell};
    use std::env::VarError;
    use std::fs;
    use std::path::{Path, PathBuf};

    pub const TSCONFIG_JSON: &str = r#"{
  "compileOnSave": false,
  "compilerOptions": {
    "baseUrl": "./",
    "strict": true,
    "paths": {
      "@tailormap-viewer/core": [
        "projects/core/src"
      ]
    }
  }
}
"#;

    pub const ANGULAR_JSON: &str = r#"{
  "version": 1,
  "projects": {
    "app": {
      "projectType": "application",
      "root": "projects/app",
      "i18n": {
        "sourceLocale": "en",
        "locales": {
          "nl": {
            "translation": [
              "projects/app/src/locale/messages.nl.xlf"
            ]
          }
        }
      },
      "architect": {
        "build": {
          "options": {
            "assets": [
              "projects/app/src/favicon.ico"
            ],
            "styles": [
              "projects/app/src/styles.css"
            ]
          }
        }
      }
    }
  }
}
"#;

    pub const ENVIRONMENT_TS: &str = "import { CoreModule } from '@tailormap-viewer/core';

export const environment = {
  production: false,
  imports: [
    CoreModule,
  ],
};
";

    /// Delegates to [`RealRuntime`] with a deterministic clock and scripted prompts.
    pub struct TestRuntime {
        inner: RealRuntime,
        ticks: Cell<i64>,
        confirm: bool,
        prompts: RefCell<Vec<String>>,
    }

    impl TestRuntime {
        pub fn new() -> Self {
            Self {
                inner: RealRuntime,
                ticks: Cell::new(0),
                confirm: true,
                prompts: RefCell::new(Vec::new()),
            }
        }

        pub fn with_confirm(mut self, confirm: bool) -> Self {
            self.confirm = confirm;
            self
        }

        /// Prompts shown so far.
        pub fn prompts(&self) -> Vec<String> {
            self.prompts.borrow().clone()
        }
    }

    impl Runtime for TestRuntime {
        fn env_var(&self, key: &str) -> Result<String, VarError> {
            self.inner.env_var(key)
        }

        fn current_dir(&self) -> Result<PathBuf> {
            self.inner.current_dir()
        }

        /// Advances one second per call so backup names never collide.
        fn now(&self) -> DateTime<Utc> {
            let tick = self.ticks.get();
            self.ticks.set(tick + 1);
            Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap() + Duration::seconds(tick)
        }

        fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
            self.inner.write(path, contents)
        }

        fn read_to_string(&self, path: &Path) -> Result<String> {
            self.inner.read_to_string(path)
        }

        fn rename(&self, from: &Path, to: &Path) -> Result<()> {
            self.inner.rename(from, to)
        }

        fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
            self.inner.copy(from, to)
        }

        fn create_dir_all(&self, path: &Path) -> Result<()> {
            self.inner.create_dir_all(path)
        }

        fn exists(&self, path: &Path) -> bool {
            self.inner.exists(path)
        }

        fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
            self.inner.read_dir(path)
        }

        fn is_dir(&self, path: &Path) -> bool {
            self.inner.is_dir(path)
        }

        fn is_file(&self, path: &Path) -> bool {
            self.inner.is_file(path)
        }

        fn modified(&self, path: &Path) -> Result<DateTime<Utc>> {
            self.inner.modified(path)
        }

        fn symlink_dir(&self, original: &Path, link: &Path) -> Result<()> {
            self.inner.symlink_dir(original, link)
        }

        fn read_link(&self, path: &Path) -> Result<PathBuf> {
            self.inner.read_link(path)
        }

        fn is_symlink(&self, path: &Path) -> bool {
            self.inner.is_symlink(path)
        }

        fn remove_symlink(&self, path: &Path) -> Result<()> {
            self.inner.remove_symlink(path)
        }

        fn confirm(&self, prompt: &str) -> Result<bool> {
            self.prompts.borrow_mut().push(prompt.to_string());
            Ok(self.confirm)
        }
    }

    /// A temporary project with the default layout and a real `app` project directory.
    pub fn project_fixture() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_root(dir.path());

        fs::write(&config.path_alias_manifest, TSCONFIG_JSON).unwrap();
        fs::write(&config.project_manifest, ANGULAR_JSON).unwrap();
        fs::create_dir_all(config.bootstrap_file.parent().unwrap()).unwrap();
        fs::write(&config.bootstrap_file, ENVIRONMENT_TS).unwrap();

        (dir, config)
    }

    /// Create an external module directory `<root>/ext/<name>`, optionally with assets.
    pub fn external_module(root: &Path, name: &str, with_assets: bool) -> PathBuf {
        let source = root.join("ext").join(name);
        fs::create_dir_all(source.join("src")).unwrap();
        if with_assets {
            let assets = source.join("assets");
            fs::create_dir_all(assets.join("icons")).unwrap();
            fs::write(assets.join("icons/marker.svg"), "<svg/>").unwrap();
            fs::create_dir_all(assets.join("root")).unwrap();
            fs::write(assets.join("root/robots.txt"), "").unwrap();
            fs::write(assets.join("style.css"), "body {}\n").unwrap();
            fs::create_dir_all(assets.join("locale")).unwrap();
            fs::write(
                assets.join("locale").join(format!("messages.{}.nl.xlf", name)),
                "",
            )
            .unwrap();
        }
        source
    }

    pub fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }
}
