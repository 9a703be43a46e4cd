#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, Response},
    Router,
};
use pledgeboard_core::extraction::{
    ExtractedFields, ExtractionFailureKind, ExtractionOutcome, FieldConfidence, FormExtractor,
};
use pledgeboard_server::{api::app_router, build_state_with_extractor, config::Config};
use tempfile::TempDir;
use tower::ServiceExt;

/// Reads every form as the same donor, or fails every read.
pub struct StubExtractor {
    reading: Option<(String, String)>,
}

impl StubExtractor {
    pub fn reading(name: &str, amount: &str) -> Self {
        Self {
            reading: Some((name.to_string(), amount.to_string())),
        }
    }

    pub fn unavailable() -> Self {
        Self { reading: None }
    }
}

#[async_trait]
impl FormExtractor for StubExtractor {
    async fn extract(&self, _image_ref: &str) -> ExtractionOutcome {
        match &self.reading {
            Some((name, amount)) => ExtractionOutcome::success(
                ExtractedFields::new(name.as_str(), amount.as_str()),
                FieldConfidence::new(0.95, 0.9),
            ),
            None => ExtractionOutcome::failure(ExtractionFailureKind::Unavailable, "stub offline"),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub dir: TempDir,
}

pub async fn build_test_app(extractor: StubExtractor) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::from_env().unwrap();
    config.db_path = dir.path().join("test.db").to_string_lossy().into_owned();
    config.upload_dir = dir.path().join("uploads");
    config.report_dir = dir.path().join("reports");

    let state = build_state_with_extractor(&config, Arc::new(extractor))
        .await
        .unwrap();
    TestApp {
        router: app_router(state, &config),
        dir,
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Starts an event and returns its id.
pub async fn start_event(app: &Router, goal: serde_json::Value) -> String {
    let response = post_json(app, "/api/v1/events", serde_json::json!({ "goalAmount": goal })).await;
    assert_eq!(response.status(), 201);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

/// Submits a stored image and returns `(draft_id, version)`.
pub async fn submit_by_ref(app: &Router, event_id: &str, image_ref: &str) -> (String, i64) {
    let response = post_json(
        app,
        &format!("/api/v1/events/{event_id}/drafts/by-ref"),
        serde_json::json!({ "imageRef": image_ref }),
    )
    .await;
    assert_eq!(response.status(), 201);
    let draft = body_json(response).await;
    (
        draft["id"].as_str().unwrap().to_string(),
        draft["version"].as_i64().unwrap(),
    )
}
