//! Record/replay infrastructure for deterministic runs without the network.

pub mod format;
pub mod recorder;
pub mod replayer;

use std::path::PathBuf;

use thiserror::Error;

/// Port name used for structure generator interactions.
pub const STRUCTURE_GENERATOR_PORT: &str = "structure_generator";

/// Method name used for structure generator interactions.
pub const GENERATE_METHOD: &str = "generate";

/// Failures while loading, saving or consuming a cassette.
#[derive(Debug, Error)]
pub enum CassetteError {
    /// The cassette file could not be read.
    #[error("Failed to read cassette file {}: {source}", path.display())]
    Read {
        /// Cassette location.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The cassette file is not valid cassette YAML.
    #[error("Failed to parse cassette file {}: {source}", path.display())]
    Parse {
        /// Cassette location.
        path: PathBuf,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },

    /// The cassette could not be written.
    #[error("Failed to write cassette file {}: {source}", path.display())]
    Write {
        /// Cassette location.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The cassette could not be encoded as YAML.
    #[error("Failed to encode cassette: {0}")]
    Encode(#[from] serde_yaml::Error),

    /// Nothing was ever recorded for this port/method pair.
    #[error(
        "Cassette exhausted: no interactions recorded for {port}::{method}. \
         Recorded pairs: [{available}]"
    )]
    Unrecorded {
        /// Requested port.
        port: String,
        /// Requested method.
        method: String,
        /// Comma-separated `port::method` pairs that do exist.
        available: String,
    },

    /// Every recorded interaction for this pair has been served.
    #[error("Cassette exhausted: all {served} interactions for {port}::{method} have been consumed")]
    Exhausted {
        /// Requested port.
        port: String,
        /// Requested method.
        method: String,
        /// How many interactions were served before running out.
        served: usize,
    },
}
