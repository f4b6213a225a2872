//! On-disk cassette format.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CassetteError;

/// A recorded session: every port interaction in call order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    /// Human-readable session name.
    pub name: String,
    /// When recording finished.
    pub recorded_at: DateTime<Utc>,
    /// Git commit the server was built from, or `"unknown"`.
    pub commit: String,
    /// Recorded interactions.
    pub interactions: Vec<Interaction>,
}

/// One call through a port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Position within the cassette.
    pub seq: u64,
    /// Port name, e.g. `structure_generator`.
    pub port: String,
    /// Method name, e.g. `generate`.
    pub method: String,
    /// Serialized call input.
    pub input: serde_json::Value,
    /// Serialized result using the `{"Ok": ..}` / `{"Err": ..}` convention.
    pub output: serde_json::Value,
}

impl Cassette {
    /// An empty cassette stamped with the current time.
    pub fn empty(name: impl Into<String>, commit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            recorded_at: Utc::now(),
            commit: commit.into(),
            interactions: Vec::new(),
        }
    }

    /// Read a cassette from YAML on disk.
    ///
    /// # Errors
    ///
    /// Returns [`CassetteError::Read`] or [`CassetteError::Parse`].
    pub fn open(path: &Path) -> Result<Self, CassetteError> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|source| CassetteError::Read { path: path.to_path_buf(), source })?;
        serde_yaml::from_str(&yaml)
            .map_err(|source| CassetteError::Parse { path: path.to_path_buf(), source })
    }

    /// Write the cassette as YAML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`CassetteError::Encode`] or [`CassetteError::Write`].
    pub fn save(&self, path: &Path) -> Result<(), CassetteError> {
        let yaml = serde_yaml::to_string(self)?;
        let write = |source| CassetteError::Write { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write)?;
        }
        std::fs::write(path, yaml).map_err(write)
    }
}
