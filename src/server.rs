//! HTTP surface: `GET /`, `GET /health` and `POST /transform`.

use std::sync::Arc;

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::ErrorBody;
use crate::relay::{handle_transform, TransformRequest};

/// Version string reported by `/` and `/health`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Endpoints advertised by `/health`.
pub const ENDPOINTS: [&str; 3] = ["/", "/health", "/transform"];

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Immutable startup configuration.
    pub config: Arc<Config>,
    /// Upstream ports.
    pub ctx: ServiceContext,
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.max_upload_bytes;
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/transform", post(transform))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct RootResponse {
    message: &'static str,
    version: &'static str,
}

/// `GET /`
async fn root() -> Json<RootResponse> {
    Json(RootResponse { message: "RenoVision AI Backend operational", version: VERSION })
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: &'static str,
    /// Human-readable status line.
    pub message: &'static str,
    /// Server version.
    pub version: &'static str,
    /// `"configured"` or `"missing"`.
    pub stability_api: &'static str,
    /// Advertised endpoints.
    pub endpoints: [&'static str; 3],
    /// Deployment label.
    pub environment: String,
}

/// `GET /health`: reports configuration without touching upstream.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "RenoVision AI Backend is running",
        version: VERSION,
        stability_api: if state.config.has_api_key() { "configured" } else { "missing" },
        endpoints: ENDPOINTS,
        environment: state.config.server.environment.clone(),
    })
}

#[derive(Debug, Serialize)]
struct TransformResponse {
    status: &'static str,
    prompt: String,
    image_base64: String,
}

/// `POST /transform`
async fn transform(State(state): State<AppState>, multipart: Multipart) -> Response {
    let request = match read_transform_form(multipart).await {
        Ok(request) => request,
        Err(rejection) => return rejection.into_response(),
    };

    match handle_transform(&state.config, state.ctx.generator.as_ref(), request).await {
        Ok(success) => Json(TransformResponse {
            status: "ok",
            prompt: success.prompt,
            image_base64: success.image_base64,
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// A multipart body that could not be turned into a [`TransformRequest`].
#[derive(Debug)]
enum FormRejection {
    Malformed(MultipartError),
    MissingField(&'static str),
}

impl IntoResponse for FormRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Malformed(e) => {
                let message = format!("Invalid multipart body: {}", e.body_text());
                (e.status(), Json(ErrorBody::new(message))).into_response()
            }
            Self::MissingField(name) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorBody::new(format!("Missing required field: {name}"))),
            )
                .into_response(),
        }
    }
}

impl From<MultipartError> for FormRejection {
    fn from(e: MultipartError) -> Self {
        Self::Malformed(e)
    }
}

async fn read_transform_form(mut multipart: Multipart) -> Result<TransformRequest, FormRejection> {
    let mut style = None;
    let mut room = None;
    let mut description = None;
    let mut image = None;
    let mut filename = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "style" => style = non_empty(field).await?,
            "room" => room = non_empty(field).await?,
            "description" => description = Some(field.text().await?),
            "image" => {
                filename = field.file_name().map(str::to_string);
                image = Some(field.bytes().await?.to_vec());
            }
            _ => {}
        }
    }

    Ok(TransformRequest {
        style: style.ok_or(FormRejection::MissingField("style"))?,
        room: room.ok_or(FormRejection::MissingField("room"))?,
        description: description.unwrap_or_default(),
        image: image.ok_or(FormRejection::MissingField("image"))?,
        filename,
    })
}

/// Read a text field trimmed, treating a blank value as absent.
async fn non_empty(field: Field<'_>) -> Result<Option<String>, MultipartError> {
    let text = field.text().await?;
    let text = text.trim();
    Ok((!text.is_empty()).then(|| text.to_string()))
}
