mod common;

use std::str::FromStr;

use axum::{
    body::Body,
    http::{header, Method, Request},
};
use common::{
    body_json, body_text, build_test_app, get, post_json, send, start_event, submit_by_ref,
    StubExtractor,
};
use rust_decimal::Decimal;
use serde_json::json;

fn decimal(value: &serde_json::Value) -> Decimal {
    match value {
        serde_json::Value::String(s) => Decimal::from_str(s).unwrap(),
        other => Decimal::from_str(&other.to_string()).unwrap(),
    }
}

#[tokio::test]
async fn donation_flows_from_form_to_report() {
    let app = build_test_app(StubExtractor::reading("Alice", "100")).await;
    let router = &app.router;
    let event_id = start_event(router, json!("2000")).await;

    let response = post_json(
        router,
        &format!("/api/v1/events/{event_id}/drafts/by-ref"),
        json!({ "imageRef": "form-1.jpg" }),
    )
    .await;
    assert_eq!(response.status(), 201);
    let draft = body_json(response).await;
    assert_eq!(draft["status"], "EXTRACTED");
    assert_eq!(draft["rawAmount"], "100");
    let draft_id = draft["id"].as_str().unwrap().to_string();

    let queue = body_json(get(router, &format!("/api/v1/events/{event_id}/drafts")).await).await;
    assert_eq!(queue.as_array().unwrap().len(), 1);

    let response = post_json(
        router,
        &format!("/api/v1/drafts/{draft_id}/open"),
        json!({ "version": 1, "editorId": "ed-1" }),
    )
    .await;
    assert_eq!(response.status(), 200);
    let opened = body_json(response).await;
    assert_eq!(opened["draft"]["status"], "UNDER_REVIEW");
    let version = opened["draft"]["version"].as_i64().unwrap();

    let confirm = json!({
        "version": version,
        "donorName": "Alice",
        "amount": 100,
        "editorId": "ed-1"
    });
    let response = post_json(router, &format!("/api/v1/drafts/{draft_id}/confirm"), confirm.clone()).await;
    assert_eq!(response.status(), 200);
    let result = body_json(response).await;
    assert_eq!(result["entry"]["seq"], 1);
    assert_eq!(decimal(&result["aggregate"]["totalRaised"]), Decimal::from(100));
    assert_eq!(
        decimal(&result["aggregate"]["progressRatio"]),
        Decimal::from_str("0.05").unwrap()
    );

    // Same draft again: exactly one donation survives.
    let response = post_json(router, &format!("/api/v1/drafts/{draft_id}/confirm"), confirm).await;
    assert_eq!(response.status(), 409);
    assert_eq!(body_json(response).await["error"], "CONFIRMATION_CONFLICT");

    let response = post_json(router, &format!("/api/v1/events/{event_id}/stop"), json!({})).await;
    assert_eq!(response.status(), 200);
    let stopped = body_json(response).await;
    assert_eq!(stopped["event"]["state"], "STOPPED");
    assert_eq!(stopped["aggregate"]["donorCount"], 1);

    let rows = body_json(get(router, &format!("/api/v1/events/{event_id}/export")).await).await;
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["donorName"], "Alice");
    assert_eq!(decimal(&rows[0]["amount"]), Decimal::from(100));

    let response = get(router, &format!("/api/v1/events/{event_id}/export.csv")).await;
    assert_eq!(response.status(), 200);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    let csv = body_text(response).await;
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("No.,Name,Amount,Time"));
    assert!(lines.next().unwrap().starts_with("1,Alice,100"));
}

#[tokio::test]
async fn stopped_event_refuses_intake() {
    let app = build_test_app(StubExtractor::reading("Bob", "25")).await;
    let router = &app.router;
    let event_id = start_event(router, json!(500)).await;
    let (draft_id, version) = submit_by_ref(router, &event_id, "form-2.jpg").await;

    let response = post_json(router, &format!("/api/v1/events/{event_id}/stop"), json!({})).await;
    assert_eq!(response.status(), 200);

    let response = post_json(
        router,
        &format!("/api/v1/events/{event_id}/drafts/by-ref"),
        json!({ "imageRef": "form-3.jpg" }),
    )
    .await;
    assert_eq!(response.status(), 409);
    assert_eq!(body_json(response).await["error"], "EVENT_CLOSED");

    let response = post_json(
        router,
        &format!("/api/v1/drafts/{draft_id}/confirm"),
        json!({ "version": version, "donorName": "Bob", "amount": "25", "editorId": "ed-1" }),
    )
    .await;
    assert_eq!(response.status(), 409);
    assert_eq!(body_json(response).await["error"], "EVENT_CLOSED");

    let response = post_json(router, &format!("/api/v1/events/{event_id}/stop"), json!({})).await;
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn invalid_input_is_unprocessable() {
    let app = build_test_app(StubExtractor::reading("Carol", "abc")).await;
    let router = &app.router;

    let response = post_json(router, "/api/v1/events", json!({ "goalAmount": "0" })).await;
    assert_eq!(response.status(), 422);
    assert_eq!(body_json(response).await["error"], "INVALID_GOAL");

    let event_id = start_event(router, json!("1000")).await;
    let (draft_id, version) = submit_by_ref(router, &event_id, "form-4.jpg").await;

    let response = post_json(
        router,
        &format!("/api/v1/drafts/{draft_id}/confirm"),
        json!({ "version": version, "donorName": "Carol", "amount": "-5", "editorId": "ed-1" }),
    )
    .await;
    assert_eq!(response.status(), 422);
    assert_eq!(body_json(response).await["error"], "INVALID_AMOUNT");

    let response = post_json(
        router,
        &format!("/api/v1/drafts/{draft_id}/confirm"),
        json!({ "version": version, "donorName": "  ", "amount": "5", "editorId": "ed-1" }),
    )
    .await;
    assert_eq!(response.status(), 422);
    assert_eq!(body_json(response).await["error"], "MISSING_NAME");
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let app = build_test_app(StubExtractor::unavailable()).await;
    let router = &app.router;

    assert_eq!(get(router, "/api/v1/drafts/missing").await.status(), 404);
    assert_eq!(get(router, "/api/v1/events/missing").await.status(), 404);
    assert_eq!(get(router, "/api/v1/events/missing/snapshot").await.status(), 404);
}

#[tokio::test]
async fn failed_extraction_needs_manual_entry() {
    let app = build_test_app(StubExtractor::unavailable()).await;
    let router = &app.router;
    let event_id = start_event(router, json!("300")).await;

    let response = post_json(
        router,
        &format!("/api/v1/events/{event_id}/drafts/by-ref"),
        json!({ "imageRef": "smudged.jpg" }),
    )
    .await;
    assert_eq!(response.status(), 201);
    let draft = body_json(response).await;
    assert_eq!(draft["status"], "NEEDS_MANUAL_ENTRY");
    assert_eq!(draft["rawName"], "");
    assert_eq!(draft["rawAmount"], "");
    assert_eq!(draft["extractionError"], "UNAVAILABLE");

    let draft_id = draft["id"].as_str().unwrap();
    let response = post_json(
        router,
        &format!("/api/v1/drafts/{draft_id}/confirm"),
        json!({ "version": 1, "donorName": "Dana", "amount": "$1,200.00", "editorId": "ed-2" }),
    )
    .await;
    assert_eq!(response.status(), 200);
    let result = body_json(response).await;
    assert_eq!(decimal(&result["donation"]["amount"]), Decimal::from(1200));
}

#[tokio::test]
async fn reversal_lowers_total() {
    let app = build_test_app(StubExtractor::reading("Eve", "40")).await;
    let router = &app.router;
    let event_id = start_event(router, json!("400")).await;
    let (draft_id, version) = submit_by_ref(router, &event_id, "form-5.jpg").await;

    let confirmed = body_json(
        post_json(
            router,
            &format!("/api/v1/drafts/{draft_id}/confirm"),
            json!({ "version": version, "donorName": "Eve", "amount": "40", "editorId": "ed-1" }),
        )
        .await,
    )
    .await;
    let donation_id = confirmed["donation"]["id"].as_str().unwrap();

    let response = post_json(
        router,
        &format!("/api/v1/events/{event_id}/donations/{donation_id}/reverse"),
        json!({ "editorId": "ed-1", "reason": "duplicate form" }),
    )
    .await;
    assert_eq!(response.status(), 200);
    let reversal = body_json(response).await;
    assert_eq!(reversal["entry"]["kind"], "REVERSAL");
    assert_eq!(reversal["entry"]["seq"], 2);
    assert_eq!(decimal(&reversal["aggregate"]["totalRaised"]), Decimal::ZERO);

    let entries =
        body_json(get(router, &format!("/api/v1/events/{event_id}/entries?afterSeq=1")).await)
            .await;
    assert_eq!(entries.as_array().unwrap().len(), 1);

    let response = post_json(
        router,
        &format!("/api/v1/events/{event_id}/donations/{donation_id}/reverse"),
        json!({ "editorId": "ed-1" }),
    )
    .await;
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn multipart_upload_stores_image_and_creates_draft() {
    let app = build_test_app(StubExtractor::reading("Frank", "75")).await;
    let router = &app.router;
    let event_id = start_event(router, json!("750")).await;

    let boundary = "pledgeboard-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"form.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"\x89PNG\r\n\x1a\nfake image bytes");
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let response = send(
        router,
        Request::builder()
            .method(Method::POST)
            .uri(format!("/api/v1/events/{event_id}/drafts"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), 201);
    let draft = body_json(response).await;
    let image_ref = draft["sourceImageRef"].as_str().unwrap();
    assert!(image_ref.starts_with(&event_id));
    assert!(image_ref.ends_with(".png"));
    assert!(app.dir.path().join("uploads").join(image_ref).exists());
    assert_eq!(draft["rawName"], "Frank");
}
