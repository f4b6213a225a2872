//! The transform relay: one request in, one upstream attempt, one result out.

use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::TransformError;
use crate::normalize::{normalize_image, NormalizedImage};
use crate::params::StructureParams;
use crate::ports::{StructureGenerator, StructureRequest};
use crate::prompt::build_prompt;

/// A restyle request as received from a caller.
#[derive(Debug, Clone)]
pub struct TransformRequest {
    /// Target design style, e.g. `"modern"`.
    pub style: String,
    /// Room type, e.g. `"kitchen"`.
    pub room: String,
    /// Free-text additions to the prompt; may be empty.
    pub description: String,
    /// Uploaded photo bytes.
    pub image: Vec<u8>,
    /// Uploaded file name, for logging.
    pub filename: Option<String>,
}

/// A successful restyle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformSuccess {
    /// The prompt sent upstream.
    pub prompt: String,
    /// The generated image, base64-encoded.
    pub image_base64: String,
}

/// Validate, normalize, prompt, call upstream once, and return the outcome.
///
/// The API key is checked before any image work so that a misconfigured
/// server rejects requests without decoding uploads.
///
/// # Errors
///
/// Returns one of the [`TransformError`] kinds; nothing is retried.
pub async fn handle_transform(
    config: &Config,
    generator: &dyn StructureGenerator,
    request: TransformRequest,
) -> Result<TransformSuccess, TransformError> {
    info!(
        style = %request.style,
        room = %request.room,
        description = %request.description,
        filename = request.filename.as_deref().unwrap_or("-"),
        upload_bytes = request.image.len(),
        "Transformation requested"
    );

    if !config.has_api_key() {
        warn!("STABILITY_API_KEY missing, refusing transformation");
        return Err(TransformError::MissingApiKey);
    }

    let TransformRequest { style, room, description, image, .. } = request;

    let normalized = normalize_off_reactor(image).await?;
    info!(
        original_width = normalized.original_width,
        original_height = normalized.original_height,
        resized = normalized.was_resized(),
        png_bytes = normalized.png.len(),
        "Control image normalized"
    );

    let prompt = build_prompt(&style, &room, &description);
    info!(%prompt, "Sending to Stability");

    let upstream_request =
        StructureRequest { image: normalized.png, prompt, params: StructureParams::default() };

    match generator.generate(&upstream_request).await {
        Ok(response) => {
            info!("Transformation succeeded");
            Ok(TransformSuccess {
                prompt: upstream_request.prompt,
                image_base64: response.image_base64,
            })
        }
        Err(e) => {
            warn!(error = %e, "Transformation failed");
            Err(e)
        }
    }
}

/// Decoding and resizing are CPU-bound; keep them off the async workers.
async fn normalize_off_reactor(image: Vec<u8>) -> Result<NormalizedImage, TransformError> {
    tokio::task::spawn_blocking(move || normalize_image(&image))
        .await
        .map_err(|e| TransformError::unexpected(format!("Image processing task failed: {e}")))?
}
