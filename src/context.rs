//! Service context that bundles all port trait objects.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use reqwest::Client;

use crate::adapters::live::stability::StabilityGenerator;
use crate::adapters::recording::structure_generator::RecordingStructureGenerator;
use crate::adapters::replaying::structure_generator::ReplayingStructureGenerator;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::cassette::STRUCTURE_GENERATOR_PORT;
use crate::config::Config;
use crate::error::ServerError;
use crate::ports::StructureGenerator;

/// Bundles all port trait objects into a single context.
#[derive(Clone)]
pub struct ServiceContext {
    /// Structure generator port.
    pub generator: Arc<dyn StructureGenerator>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Finish the recording and write the cassette file to disk.
    ///
    /// Call after the server has stopped; in-flight requests still holding
    /// the recorder would otherwise lose their interactions.
    ///
    /// # Errors
    ///
    /// Returns an error if the recorder is still shared or the cassette file
    /// cannot be written.
    pub fn finish(self) -> Result<PathBuf, ServerError> {
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| ServerError::RecorderInUse)?
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(recorder.finish()?)
    }
}

impl ServiceContext {
    /// Wrap an existing generator, typically a test double.
    pub fn with_generator(generator: Arc<dyn StructureGenerator>) -> Self {
        Self { generator }
    }

    /// Create a live context calling the configured Stability endpoint.
    ///
    /// A missing API key is not an error here: `/health` reports it and
    /// `/transform` refuses requests until one is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn live(config: &Config) -> Result<Self, ServerError> {
        Ok(Self { generator: Arc::new(live_generator(config)?) })
    }

    /// Create a recording context that wraps a live adapter with a recorder.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn recording(config: &Config) -> Result<(Self, RecordingSession), ServerError> {
        let live = live_generator(config)?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let output_dir = PathBuf::from(".renovision/cassettes").join(&timestamp);

        let commit = get_commit_hash();
        let path = output_dir.join(format!("{STRUCTURE_GENERATOR_PORT}.cassette.yaml"));
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-{STRUCTURE_GENERATOR_PORT}"),
            &commit,
        )));

        let generator = RecordingStructureGenerator::new(Box::new(live), Arc::clone(&recorder));

        let ctx = Self { generator: Arc::new(generator) };
        let session = RecordingSession { recorder };

        Ok((ctx, session))
    }

    /// Create a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, ServerError> {
        let replayer = CassetteReplayer::open(path)?;
        let generator = ReplayingStructureGenerator::new(Arc::new(Mutex::new(replayer)));
        Ok(Self { generator: Arc::new(generator) })
    }
}

fn live_generator(config: &Config) -> Result<StabilityGenerator, ServerError> {
    let client =
        Client::builder().user_agent(concat!("renovision/", env!("CARGO_PKG_VERSION"))).build()?;
    Ok(StabilityGenerator::new(client, &config.upstream, config.api_key().map(str::to_string)))
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
