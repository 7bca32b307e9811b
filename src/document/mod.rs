//! Typed editors for the host project's configuration documents.

pub mod assets;
pub mod bootstrap;
pub mod path_alias;
pub mod project_manifest;

pub use assets::{AssetScan, AssetSummary};
pub use bootstrap::BootstrapFile;
pub use path_alias::PathAliasManifest;
pub use project_manifest::{EntryOutcome, ProjectManifest};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::LinkError;
use crate::runtime::{Runtime, write_atomic};

/// Read a JSON document whose root must be an object.
pub(crate) fn read_json_object<R: Runtime>(runtime: &R, path: &Path) -> Result<Map<String, Value>> {
    let content = runtime
        .read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(LinkError::parse(path, "root is not a JSON object").into()),
        Err(e) => Err(LinkError::parse(path, e).into()),
    }
}

/// Pretty-print with 2-space indentation and a trailing newline.
pub(crate) fn render_json(root: &Map<String, Value>) -> Result<String> {
    let mut content = serde_json::to_string_pretty(root)?;
    content.push('\n');
    Ok(content)
}

pub(crate) fn write_json_object<R: Runtime>(
    runtime: &R,
    path: &Path,
    root: &Map<String, Value>,
) -> Result<()> {
    let content = render_json(root)?;
    write_atomic(runtime, path, content.as_bytes())
        .with_context(|| format!("Failed to write {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use std::path::PathBuf;

    #[test]
    fn test_read_json_object_rejects_non_objects() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .returning(|_| Ok("[1, 2]".to_string()));

        let err = read_json_object(&runtime, &PathBuf::from("/p/tsconfig.json")).unwrap_err();
        assert!(err.to_string().contains("root is not a JSON object"));
    }

    #[test]
    fn test_render_json_keeps_key_order() {
        let root: Map<String, Value> =
            serde_json::from_str(r#"{"zeta": 1, "alpha": {"b": 2, "a": 3}}"#).unwrap();
        assert_eq!(
            render_json(&root).unwrap(),
            "{\n  \"zeta\": 1,\n  \"alpha\": {\n    \"b\": 2,\n    \"a\": 3\n  }\n}\n"
        );
    }
}
