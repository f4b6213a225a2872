//! Live adapter for the Stability AI structure-control API.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::UpstreamConfig;
use crate::error::TransformError;
use crate::ports::structure_generator::{
    GenerateFuture, StructureGenerator, StructureRequest, StructureResponse,
};

/// File name given to the control image part.
const IMAGE_FILE_NAME: &str = "image.png";

/// Live generator that calls the Stability AI structure-control endpoint.
pub struct StabilityGenerator {
    client: Client,
    endpoint: String,
    timeout: Duration,
    api_key: Option<String>,
}

impl StabilityGenerator {
    /// Create a generator for the configured endpoint.
    ///
    /// Without an API key every call fails with
    /// [`TransformError::MissingApiKey`].
    #[must_use]
    pub fn new(client: Client, upstream: &UpstreamConfig, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: upstream.endpoint.clone(),
            timeout: upstream.timeout(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    fn transport_error(&self, err: &reqwest::Error) -> TransformError {
        if err.is_timeout() {
            warn!(timeout_secs = self.timeout.as_secs(), "Stability request timed out");
            TransformError::Timeout { after_secs: self.timeout.as_secs() }
        } else {
            TransformError::unexpected(err.to_string())
        }
    }
}

impl StructureGenerator for StabilityGenerator {
    fn generate(&self, request: &StructureRequest) -> GenerateFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let api_key = self.api_key.as_deref().ok_or(TransformError::MissingApiKey)?;

            let image = Part::bytes(request.image)
                .file_name(IMAGE_FILE_NAME)
                .mime_str("image/png")
                .map_err(|e| TransformError::unexpected(e.to_string()))?;
            let mut form = Form::new().part("image", image).text("prompt", request.prompt);
            for (name, value) in request.params.form_fields() {
                form = form.text(name, value);
            }

            let response = self
                .client
                .post(&self.endpoint)
                .header("authorization", format!("Bearer {api_key}"))
                .header("accept", "application/json")
                .timeout(self.timeout)
                .multipart(form)
                .send()
                .await
                .map_err(|e| self.transport_error(&e))?;

            let status = response.status();
            let response_text = response.text().await.map_err(|e| self.transport_error(&e))?;
            info!(status = status.as_u16(), bytes = response_text.len(), "Stability response");

            if !status.is_success() {
                return Err(TransformError::Upstream {
                    status: status.as_u16(),
                    body: response_text,
                });
            }

            let parsed: StabilityResponse = serde_json::from_str(&response_text).map_err(|e| {
                TransformError::unexpected(format!("Failed to parse Stability response: {e}"))
            })?;

            match parsed.image {
                Some(image_base64) if !image_base64.is_empty() => {
                    Ok(StructureResponse { image_base64 })
                }
                _ => {
                    let truncated = if response_text.chars().count() > 500 {
                        format!("{}...", response_text.chars().take(500).collect::<String>())
                    } else {
                        response_text
                    };
                    Err(TransformError::unexpected(format!(
                        "No image in Stability response. Body: {truncated}"
                    )))
                }
            }
        })
    }
}

// --- Stability API response types ---

#[derive(Deserialize)]
struct StabilityResponse {
    image: Option<String>,
}
