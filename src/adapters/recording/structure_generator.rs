//! Recording adapter for the `StructureGenerator` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::{GENERATE_METHOD, STRUCTURE_GENERATOR_PORT};
use crate::ports::structure_generator::{GenerateFuture, StructureGenerator, StructureRequest};

/// Records generation interactions while delegating to an inner implementation.
pub struct RecordingStructureGenerator {
    inner: Box<dyn StructureGenerator>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingStructureGenerator {
    /// Creates a new recording generator wrapping the given implementation.
    pub fn new(
        inner: Box<dyn StructureGenerator>,
        recorder: Arc<Mutex<CassetteRecorder>>,
    ) -> Self {
        Self { inner, recorder }
    }
}

impl StructureGenerator for RecordingStructureGenerator {
    fn generate(&self, request: &StructureRequest) -> GenerateFuture<'_> {
        let fingerprint = request.fingerprint();
        let pending = self.inner.generate(request);

        Box::pin(async move {
            let result = pending.await;
            record_result(
                &self.recorder,
                STRUCTURE_GENERATOR_PORT,
                GENERATE_METHOD,
                &fingerprint,
                &result,
            );
            result
        })
    }
}
