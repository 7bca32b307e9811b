use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Deserialize a string that may be null as empty string
fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// One externally developed module symlinked into the module root.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LinkedModuleRecord {
    /// Directory name under the module root; unique across the state.
    pub name: String,
    /// Absolute path the symlink points to.
    pub source: PathBuf,
    /// Package scope used in import paths, e.g. `@tailormap-gbi`.
    pub scope: String,
    /// Library name used in import paths. Empty means "same as `name`".
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub lib: String,
    /// Identifier wired into the bootstrap file; empty if none.
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub module: String,
    /// Whether assets, styles and translations were registered.
    #[serde(default)]
    pub assets: bool,
}

impl LinkedModuleRecord {
    /// Library name, falling back to the directory name.
    pub fn lib_name(&self) -> &str {
        if self.lib.is_empty() {
            &self.name
        } else {
            &self.lib
        }
    }

    /// Import path, e.g. `@tailormap-gbi/shared`.
    pub fn import_path(&self) -> String {
        format!("{}/{}", self.scope, self.lib_name())
    }

    pub fn module_class(&self) -> Option<&str> {
        if self.module.is_empty() {
            None
        } else {
            Some(&self.module)
        }
    }
}

/// The persisted state document: `{"linkedModules": [...]}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LinkState {
    #[serde(default)]
    pub linked_modules: Vec<LinkedModuleRecord>,
}

impl LinkState {
    pub fn find(&self, name: &str) -> Option<&LinkedModuleRecord> {
        self.linked_modules.iter().find(|m| m.name == name)
    }

    /// Insert a record, replacing any record with the same name in place.
    /// Returns true if an existing record was replaced.
    pub fn upsert(&mut self, record: LinkedModuleRecord) -> bool {
        match self
            .linked_modules
            .iter_mut()
            .find(|m| m.name == record.name)
        {
            Some(existing) => {
                *existing = record;
                true
            }
            None => {
                self.linked_modules.push(record);
                false
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<LinkedModuleRecord> {
        let index = self.linked_modules.iter().position(|m| m.name == name)?;
        Some(self.linked_modules.remove(index))
    }

    pub fn len(&self) -> usize {
        self.linked_modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.linked_modules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, lib: &str) -> LinkedModuleRecord {
        LinkedModuleRecord {
            name: name.into(),
            source: PathBuf::from(format!("/ext/{}", name)),
            scope: "@x".into(),
            lib: lib.into(),
            module: String::new(),
            assets: false,
        }
    }

    #[test]
    fn test_import_path_falls_back_to_name() {
        assert_eq!(record("foo", "").import_path(), "@x/foo");
        assert_eq!(record("foo", "foo-lib").import_path(), "@x/foo-lib");
    }

    #[test]
    fn test_upsert_keeps_names_unique_and_order_stable() {
        let mut state = LinkState::default();
        assert!(!state.upsert(record("a", "")));
        assert!(!state.upsert(record("b", "")));
        assert!(state.upsert(record("a", "a-lib")));

        assert_eq!(state.len(), 2);
        assert_eq!(state.linked_modules[0].name, "a");
        assert_eq!(state.linked_modules[0].lib, "a-lib");
        assert_eq!(state.linked_modules[1].name, "b");
    }

    #[test]
    fn test_remove() {
        let mut state = LinkState::default();
        state.upsert(record("a", ""));
        assert!(state.remove("missing").is_none());
        assert_eq!(state.remove("a").unwrap().name, "a");
        assert!(state.is_empty());
    }

    #[test]
    fn test_deserialize_tolerates_null_and_missing_fields() {
        let json = r#"{
            "linkedModules": [
                {"name": "gbi", "source": "/ext/gbi", "scope": "@tailormap-gbi", "lib": null},
                {"name": "maps", "source": "/ext/maps", "scope": "@x", "lib": "m", "module": "MapsModule", "assets": true}
            ]
        }"#;
        let state: LinkState = serde_json::from_str(json).unwrap();

        assert_eq!(state.len(), 2);
        let gbi = state.find("gbi").unwrap();
        assert_eq!(gbi.lib_name(), "gbi");
        assert_eq!(gbi.module_class(), None);
        assert!(!gbi.assets);

        let maps = state.find("maps").unwrap();
        assert_eq!(maps.import_path(), "@x/m");
        assert_eq!(maps.module_class(), Some("MapsModule"));
        assert!(maps.assets);
    }

    #[test]
    fn test_serializes_with_camel_case_root_key() {
        let mut state = LinkState::default();
        state.upsert(record("foo", "foo"));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["linkedModules"][0]["name"], "foo");
        assert_eq!(json["linkedModules"][0]["assets"], false);
    }
}
