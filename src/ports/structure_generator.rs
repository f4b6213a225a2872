//! Structure generator port for control-guided image generation APIs.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::TransformError;
use crate::params::StructureParams;

/// A request to restyle a control image.
#[derive(Debug, Clone)]
pub struct StructureRequest {
    /// PNG bytes of the normalized control image.
    pub image: Vec<u8>,
    /// The text prompt describing the desired result.
    pub prompt: String,
    /// Structure-control parameters.
    pub params: StructureParams,
}

impl StructureRequest {
    /// Compact, image-free description of this request for cassettes and logs.
    #[must_use]
    pub fn fingerprint(&self) -> RequestFingerprint {
        RequestFingerprint {
            prompt: self.prompt.clone(),
            params: self.params.clone(),
            image_bytes: self.image.len(),
            image_sha256: hex::encode(Sha256::digest(&self.image)),
        }
    }
}

/// What a cassette remembers about a [`StructureRequest`].
///
/// The control image is reduced to its size and SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestFingerprint {
    /// The prompt that was sent.
    pub prompt: String,
    /// Structure-control parameters that were sent.
    pub params: StructureParams,
    /// Length of the PNG control image.
    pub image_bytes: usize,
    /// Lowercase hex SHA-256 of the PNG control image.
    pub image_sha256: String,
}

/// A successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureResponse {
    /// The generated image, base64-encoded, exactly as returned upstream.
    pub image_base64: String,
}

/// Boxed future type returned by [`StructureGenerator::generate`].
pub type GenerateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<StructureResponse, TransformError>> + Send + 'a>>;

/// Submits control-guided generation requests to an external API.
///
/// Implementations make exactly one attempt per call. Failures are reported as
/// [`TransformError::Upstream`], [`TransformError::Timeout`] or
/// [`TransformError::Unexpected`].
pub trait StructureGenerator: Send + Sync {
    /// Generate a restyled image for the given request.
    fn generate(&self, request: &StructureRequest) -> GenerateFuture<'_>;
}
