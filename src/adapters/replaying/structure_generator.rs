//! Replaying adapter for the `StructureGenerator` port.

use std::sync::{Arc, Mutex};

use tracing::warn;

use super::{next_interaction, replay_result, Replayed};
use crate::cassette::replayer::CassetteReplayer;
use crate::cassette::{GENERATE_METHOD, STRUCTURE_GENERATOR_PORT};
use crate::error::TransformError;
use crate::ports::structure_generator::{
    GenerateFuture, StructureGenerator, StructureRequest, StructureResponse,
};

/// Serves recorded generation results from a cassette.
pub struct ReplayingStructureGenerator {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingStructureGenerator {
    /// Create a replaying generator backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl StructureGenerator for ReplayingStructureGenerator {
    fn generate(&self, request: &StructureRequest) -> GenerateFuture<'_> {
        let interaction =
            next_interaction(&self.replayer, STRUCTURE_GENERATOR_PORT, GENERATE_METHOD);
        let prompt = request.prompt.clone();
        Box::pin(async move {
            let interaction =
                interaction.map_err(|e| TransformError::unexpected(e.to_string()))?;

            // Outcomes are served in order regardless of input; drift is only reported.
            if let Some(recorded) = interaction.input.get("prompt").and_then(|p| p.as_str()) {
                if recorded != prompt {
                    warn!(
                        seq = interaction.seq,
                        recorded,
                        replayed = %prompt,
                        "Replayed prompt differs from cassette"
                    );
                }
            }

            match replay_result::<StructureResponse, TransformError>(interaction.output) {
                Replayed::Ok(response) => Ok(response),
                Replayed::Err(e) => Err(e),
                Replayed::Malformed(reason) => Err(TransformError::unexpected(reason)),
            }
        })
    }
}
