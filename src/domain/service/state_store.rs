//! Persistence of the linked-module state document.

use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};

use crate::domain::model::LinkState;
use crate::error::LinkError;
use crate::runtime::{Runtime, write_atomic};

/// Reads and writes the state document.
pub struct StateStore<'a, R: Runtime> {
    runtime: &'a R,
    path: PathBuf,
}

impl<'a, R: Runtime> StateStore<'a, R> {
    pub fn new(runtime: &'a R, path: PathBuf) -> Self {
        Self { runtime, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.runtime.exists(&self.path)
    }

    /// Load the state. A missing document reads as empty and is not created.
    #[tracing::instrument(skip(self))]
    pub fn load(&self) -> Result<LinkState> {
        if !self.exists() {
            debug!("State file {:?} not found, treating as empty", self.path);
            return Ok(LinkState::default());
        }
        let content = self
            .runtime
            .read_to_string(&self.path)
            .with_context(|| format!("Failed to read state file {:?}", self.path))?;
        let state: LinkState =
            serde_json::from_str(&content).map_err(|e| LinkError::parse(&self.path, e))?;
        debug!("Loaded {} linked module(s)", state.len());
        Ok(state)
    }

    /// Persist the state atomically.
    pub fn save(&self, state: &LinkState) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !self.runtime.exists(parent)
        {
            self.runtime.create_dir_all(parent)?;
        }
        let mut content = serde_json::to_string_pretty(state)?;
        content.push('\n');
        write_atomic(self.runtime, &self.path, content.as_bytes())
            .with_context(|| format!("Failed to save state to {:?}", self.path))
    }
}
