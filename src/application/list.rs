use anyhow::Result;
use log::debug;

use super::LinkManager;
use crate::domain::model::LinkedModuleRecord;
use crate::runtime::Runtime;

impl<'a, R: Runtime> LinkManager<'a, R> {
    /// Linked modules in state order. Reads only the state document.
    #[tracing::instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<LinkedModuleRecord>> {
        let state = self.state_store().load()?;
        debug!("Found {} linked module(s)", state.len());
        Ok(state.linked_modules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use std::path::PathBuf;

    #[test]
    fn test_list_reads_only_the_state_document() {
        let mut runtime = MockRuntime::new();
        let state_file = PathBuf::from("/p/.linked-modules.json");
        runtime
            .expect_exists()
            .with(eq(state_file.clone()))
            .returning(|_| true);
        runtime
            .expect_read_to_string()
            .with(eq(state_file))
            .returning(|_| {
                Ok(r#"{"linkedModules": [
                    {"name": "b", "source": "/ext/b", "scope": "@x"},
                    {"name": "a", "source": "/ext/a", "scope": "@x", "module": "AModule"}
                ]}"#
                .to_string())
            });
        runtime.expect_is_symlink().never();
        runtime.expect_read_link().never();

        let manager = LinkManager::new(&runtime, Config::with_root("/p"));
        let records = manager.list().unwrap();

        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_list_without_state_file_is_empty() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| false);
        runtime.expect_write().never();

        let manager = LinkManager::new(&runtime, Config::with_root("/p"));
        assert!(manager.list().unwrap().is_empty());
    }
}
