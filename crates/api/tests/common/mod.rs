#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use filmoteca_api::config::ServerConfig;
use filmoteca_api::router::build_app_router;
use filmoteca_api::state::AppState;
use filmoteca_core::storage::LocalFileStore;

pub const PUBLIC_URL: &str = "http://localhost:3000/files";

/// Build a test `ServerConfig` with safe defaults, storing uploads under
/// `storage_root`.
pub fn test_config(storage_root: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        storage_root: storage_root.to_path_buf(),
        storage_public_url: PUBLIC_URL.to_string(),
        max_upload_bytes: 1024,
    }
}

/// Build the full application router through the same builder `main.rs`
/// uses, backed by the given pool and a local file store rooted at
/// `storage_root`.
pub fn build_test_app(pool: PgPool, storage_root: &Path) -> Router {
    let config = test_config(storage_root);
    let files = LocalFileStore::new(storage_root, PUBLIC_URL);

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        files: Arc::new(files),
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, Body::empty()).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None, Body::empty()).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PATCH, uri, body).await
}

/// PATCH with a raw (possibly empty) body.
pub async fn patch_raw(app: Router, uri: &str, body: &'static str) -> Response<Body> {
    send(
        app,
        Method::PATCH,
        uri,
        Some("application/json-patch+json"),
        Body::from(body),
    )
    .await
}

pub async fn post_form(app: Router, uri: &str, form: MultipartForm) -> Response<Body> {
    send_form(app, Method::POST, uri, form).await
}

pub async fn put_form(app: Router, uri: &str, form: MultipartForm) -> Response<Body> {
    send_form(app, Method::PUT, uri, form).await
}

async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(
        app,
        method,
        uri,
        Some("application/json"),
        Body::from(body.to_string()),
    )
    .await
}

async fn send_form(app: Router, method: Method, uri: &str, form: MultipartForm) -> Response<Body> {
    let content_type = form.content_type();
    send(app, method, uri, Some(content_type.as_str()), Body::from(form.finish())).await
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    content_type: Option<&str>,
    body: Body,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(CONTENT_TYPE, content_type);
    }
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as raw bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

// ---------------------------------------------------------------------------
// Multipart builder
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "filmoteca-test-boundary";

/// Minimal `multipart/form-data` body builder.
#[derive(Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl AsRef<str>) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{}\r\n",
                value.as_ref()
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

pub async fn seed_genre(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO genres (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn seed_actor(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO actors (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Extract the stored file name from a blob reference.
pub fn blob_file_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap()
}
