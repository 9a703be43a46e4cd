mod common;

use std::time::Duration;

use common::{build_test_app, get, post_json, start_event, submit_by_ref, body_text, StubExtractor};
use futures::StreamExt;
use serde_json::json;

#[tokio::test]
async fn stream_opens_with_snapshot_then_pushes_deltas() {
    let app = build_test_app(StubExtractor::reading("Alice", "100")).await;
    let router = &app.router;
    let event_id = start_event(router, json!("2000")).await;
    let (draft_id, version) = submit_by_ref(router, &event_id, "form-1.jpg").await;

    let response = get(router, &format!("/api/v1/events/{event_id}/stream")).await;
    assert_eq!(response.status(), 200);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));
    let mut body = response.into_body().into_data_stream();

    let mut received = String::new();
    while !received.contains("event: snapshot") {
        let chunk = tokio::time::timeout(Duration::from_secs(5), body.next())
            .await
            .expect("snapshot not sent")
            .unwrap()
            .unwrap();
        received.push_str(&String::from_utf8_lossy(&chunk));
    }

    let response = post_json(
        router,
        &format!("/api/v1/drafts/{draft_id}/confirm"),
        json!({ "version": version, "donorName": "Alice", "amount": "100", "editorId": "ed-1" }),
    )
    .await;
    assert_eq!(response.status(), 200);

    while !received.contains("event: DonationConfirmed") {
        let chunk = tokio::time::timeout(Duration::from_secs(5), body.next())
            .await
            .expect("delta not pushed")
            .unwrap()
            .unwrap();
        received.push_str(&String::from_utf8_lossy(&chunk));
    }
    assert!(received.contains("\"seq\":1"));
}

#[tokio::test]
async fn stream_of_stopped_event_ends_after_snapshot() {
    let app = build_test_app(StubExtractor::unavailable()).await;
    let router = &app.router;
    let event_id = start_event(router, json!("100")).await;
    let response = post_json(router, &format!("/api/v1/events/{event_id}/stop"), json!({})).await;
    assert_eq!(response.status(), 200);

    let response = get(router, &format!("/api/v1/events/{event_id}/stream")).await;
    assert_eq!(response.status(), 200);
    let text = tokio::time::timeout(Duration::from_secs(5), body_text(response))
        .await
        .expect("stream did not end");
    assert!(text.contains("event: snapshot"));
    assert!(text.contains("\"eventState\":\"STOPPED\""));
}

#[tokio::test]
async fn stream_of_unknown_event_is_not_found() {
    let app = build_test_app(StubExtractor::unavailable()).await;
    let response = get(&app.router, "/api/v1/events/nope/stream").await;
    assert_eq!(response.status(), 404);
}
