//! File-backed topology source.
//!
//! Re-reads a JSON leader description on every query, so a captured or
//! hand-edited topology can be inspected live while the monitor polls.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use canopy_protocol::{ManagerDescription, NetworkAddress};

use crate::source::TopologySource;
use crate::TopologyError;

/// Reads the leader description from a JSON document on each query.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TopologySource for FileSource {
    async fn query(
        &self,
        _bootstrap: &[NetworkAddress],
    ) -> Result<ManagerDescription, TopologyError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        Ok(ManagerDescription::from_json(&raw)?)
    }
}
