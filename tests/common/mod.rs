//! Helpers shared by the HTTP integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use image::{DynamicImage, ImageFormat};
use tower::ServiceExt;

use renovision::config::{Config, KeysConfig};
use renovision::context::ServiceContext;
use renovision::server::{build_router, AppState};

const BOUNDARY: &str = "renovision-test-boundary";

/// One multipart part: `(name, filename, bytes)`.
pub type Part<'a> = (&'a str, Option<&'a str>, &'a [u8]);

pub fn config(api_key: Option<&str>) -> Config {
    Config { keys: KeysConfig { stability: api_key.map(str::to_string) }, ..Config::default() }
}

pub fn app(config: Config, ctx: ServiceContext) -> axum::Router {
    build_router(AppState { config: Arc::new(config), ctx })
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::new_rgb8(width, height)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(f) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// The usual form: style, room, description and an image part.
pub fn transform_form(description: &str, image: &[u8]) -> Vec<u8> {
    multipart_body(&[
        ("style", None, b"modern".as_slice()),
        ("room", None, b"kitchen".as_slice()),
        ("description", None, description.as_bytes()),
        ("image", Some("room.png"), image),
    ])
}

/// Send a request and return `(status, parsed JSON body)`.
pub async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let resp = app.oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

pub async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_transform(app: axum::Router, body: Vec<u8>) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/transform")
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}
