use anyhow::Result;
use log::debug;
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};

use super::{read_json_object, render_json, write_json_object};
use crate::error::LinkError;
use crate::runtime::Runtime;

/// The path-alias manifest (`tsconfig.json`): `compilerOptions.paths`.
#[derive(Debug, Clone)]
pub struct PathAliasManifest {
    path: PathBuf,
    root: Map<String, Value>,
}

impl PathAliasManifest {
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let root = read_json_object(runtime, path)?;
        Self::from_root(path, root)
    }

    fn from_root(path: &Path, root: Map<String, Value>) -> Result<Self> {
        match root.get("compilerOptions") {
            Some(Value::Object(_)) => {}
            _ => return Err(LinkError::parse(path, "missing \"compilerOptions\" object").into()),
        }
        if let Some(paths) = root.get("compilerOptions").and_then(|c| c.get("paths"))
            && !paths.is_object()
        {
            return Err(LinkError::parse(path, "\"compilerOptions.paths\" is not an object").into());
        }
        Ok(Self {
            path: path.to_path_buf(),
            root,
        })
    }

    /// `compilerOptions.paths`, created if absent. Shape was validated on load.
    fn paths_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.root
            .get_mut("compilerOptions")?
            .as_object_mut()?
            .entry("paths")
            .or_insert_with(|| json!({}))
            .as_object_mut()
    }

    #[cfg(test)]
    fn alias(&self, import_path: &str) -> Option<&Value> {
        self.root
            .get("compilerOptions")
            .and_then(|c| c.get("paths"))
            .and_then(|p| p.get(import_path))
    }

    /// Map `import_path` to the module source directory, overwriting any previous mapping.
    pub fn set_alias(&mut self, import_path: &str, target: &str) {
        debug!("Setting path alias {} -> {}", import_path, target);
        if let Some(paths) = self.paths_mut() {
            paths.insert(import_path.to_string(), json!([target]));
        }
    }

    /// Returns true if an alias was removed.
    pub fn remove_alias(&mut self, import_path: &str) -> bool {
        self.root
            .get_mut("compilerOptions")
            .and_then(|c| c.get_mut("paths"))
            .and_then(Value::as_object_mut)
            .is_some_and(|paths| paths.shift_remove(import_path).is_some())
    }

    pub fn render(&self) -> Result<String> {
        render_json(&self.root)
    }

    pub fn save<R: Runtime>(&self, runtime: &R) -> Result<()> {
        write_json_object(runtime, &self.path, &self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;

    fn manifest(content: &'static str) -> Result<PathAliasManifest> {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .returning(move |_| Ok(content.to_string()));
        PathAliasManifest::load(&runtime, Path::new("/p/tsconfig.json"))
    }

    #[test]
    fn test_set_alias_creates_paths() {
        let mut tsconfig = manifest(r#"{"compilerOptions": {"baseUrl": "./"}}"#).unwrap();
        tsconfig.set_alias("@x/foo-lib", "projects/foo/src");

        assert_eq!(
            tsconfig.alias("@x/foo-lib"),
            Some(&json!(["projects/foo/src"]))
        );
        assert_eq!(
            tsconfig.render().unwrap(),
            "{\n  \"compilerOptions\": {\n    \"baseUrl\": \"./\",\n    \"paths\": {\n      \"@x/foo-lib\": [\n        \"projects/foo/src\"\n      ]\n    }\n  }\n}\n"
        );
    }

    #[test]
    fn test_set_alias_overwrites() {
        let mut tsconfig =
            manifest(r#"{"compilerOptions": {"paths": {"@x/foo": ["old/src"]}}}"#).unwrap();
        tsconfig.set_alias("@x/foo", "projects/foo/src");
        assert_eq!(tsconfig.alias("@x/foo"), Some(&json!(["projects/foo/src"])));
    }

    #[test]
    fn test_remove_alias_keeps_neighbour_order() {
        let mut tsconfig = manifest(
            r#"{"compilerOptions": {"paths": {"@a/one": ["a"], "@x/foo": ["b"], "@z/two": ["c"]}}}"#,
        )
        .unwrap();

        assert!(tsconfig.remove_alias("@x/foo"));
        assert!(!tsconfig.remove_alias("@x/foo"));
        let rendered = tsconfig.render().unwrap();
        assert!(rendered.find("@a/one").unwrap() < rendered.find("@z/two").unwrap());
    }

    #[test]
    fn test_remove_alias_without_paths_is_noop() {
        let mut tsconfig = manifest(r#"{"compilerOptions": {}}"#).unwrap();
        assert!(!tsconfig.remove_alias("@x/foo"));
        assert_eq!(tsconfig.render().unwrap(), "{\n  \"compilerOptions\": {}\n}\n");
    }

    #[test]
    fn test_removing_last_alias_keeps_empty_paths() {
        let mut tsconfig = manifest(r#"{"compilerOptions": {}}"#).unwrap();
        tsconfig.set_alias("@x/foo", "projects/foo/src");
        assert!(tsconfig.remove_alias("@x/foo"));
        assert_eq!(
            tsconfig.render().unwrap(),
            "{\n  \"compilerOptions\": {\n    \"paths\": {}\n  }\n}\n"
        );
    }

    #[test]
    fn test_missing_compiler_options_is_parse_error() {
        let err = manifest(r#"{"files": []}"#).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LinkError>(),
            Some(LinkError::DocumentParse { .. })
        ));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = manifest("{ \"compilerOptions\": ").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LinkError>(),
            Some(LinkError::DocumentParse { .. })
        ));
    }
}
