//! Cassette replay integration tests; zero network I/O.
//!
//! The router is wired to a replaying context so every upstream outcome comes
//! from `test_fixtures/`.

mod common;

use std::path::PathBuf;

use axum::http::StatusCode;

use common::{app, config, png, post_transform, transform_form};
use renovision::context::ServiceContext;

/// Absolute path to the `test_fixtures` directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_fixtures")
}

fn replaying_app() -> axum::Router {
    let cassette = fixtures_dir().join("kitchen_modern.cassette.yaml");
    let ctx = ServiceContext::replaying(&cassette).unwrap();
    app(config(Some("sk-replay")), ctx)
}

#[tokio::test]
async fn replays_success_failure_and_timeout_in_order() {
    let app = replaying_app();

    let (status, json) = post_transform(app.clone(), transform_form("", &png(320, 240))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["image_base64"].as_str().unwrap().starts_with("iVBORw0KGgo"));

    let (status, json) =
        post_transform(app.clone(), transform_form("neon everywhere", &png(320, 240))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["details"], r#"{"error":"bad prompt"}"#);

    let (status, json) = post_transform(app.clone(), transform_form("", &png(320, 240))).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert!(json["message"].as_str().unwrap().contains("smaller image"));

    // Cassette exhausted: reported as a server error, not a panic.
    let (status, json) = post_transform(app, transform_form("", &png(320, 240))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["message"].as_str().unwrap().contains("Cassette exhausted"));
}

#[tokio::test]
async fn missing_key_does_not_consume_cassette() {
    let cassette = fixtures_dir().join("kitchen_modern.cassette.yaml");
    let ctx = ServiceContext::replaying(&cassette).unwrap();

    let (status, _) =
        post_transform(app(config(None), ctx.clone()), transform_form("", &png(8, 8))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    // First recorded interaction is still the success.
    let (status, json) =
        post_transform(app(config(Some("sk-replay")), ctx), transform_form("", &png(8, 8))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[test]
fn missing_cassette_fails_to_load() {
    let err = ServiceContext::replaying(&fixtures_dir().join("nope.cassette.yaml")).err().unwrap();
    assert!(err.to_string().contains("Failed to read cassette"));
}
