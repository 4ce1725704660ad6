//! File-backed list of topology documents.
//!
//! The whole list lives in one JSON array on disk and is rewritten on every
//! save. Records are opaque JSON values addressed by their list position.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

pub struct TopologyStore {
    path: PathBuf,
}

impl TopologyStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Read every stored topology. A missing file is an empty list.
    pub fn load(&self) -> Result<Vec<Value>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("{} is not a JSON array", self.path.display()))
    }

    /// Append one topology and return its index.
    pub fn append(&self, topology: Value) -> Result<usize> {
        let mut all = self.load()?;
        all.push(topology);
        self.write_all(&all)?;
        let index = all.len() - 1;
        debug!(index, path = %self.path.display(), "topology appended");
        Ok(index)
    }

    pub fn get(&self, index: usize) -> Result<Option<Value>> {
        let mut all = self.load()?;
        if index < all.len() {
            Ok(Some(all.swap_remove(index)))
        } else {
            Ok(None)
        }
    }

    /// Replace the file contents. Writes a sibling temp file and renames it
    /// over the current file so readers never see a half-written array.
    fn write_all(&self, all: &[Value]) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)
                .with_context(|| format!("failed to create {}", tmp.display()))?;
            serde_json::to_writer(&mut file, all).context("failed to encode topologies")?;
            file.flush()?;
        }
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}
