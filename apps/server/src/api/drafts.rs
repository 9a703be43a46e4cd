use std::path::Path as StdPath;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use pledgeboard_core::drafts::{DonationDraft, OpenedDraft};
use pledgeboard_core::confirmation::ConfirmationResult;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
    models::{ConfirmDraftBody, OpenDraftBody, RejectDraftBody, SubmitByRefBody},
};

const IMAGE_FIELD: &str = "image";

/// Multipart overhead allowed on top of the image itself.
const MULTIPART_SLACK_BYTES: usize = 64 * 1024;

async fn upload_draft(
    Path(event_id): Path<String>,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<DonationDraft>)> {
    // Refuse before writing anything for unknown or closed events.
    state
        .lifecycle_service
        .get_event(&event_id)?
        .ensure_active()?;

    let mut image: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let extension = image_extension(field.file_name(), field.content_type())?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read image: {}", e)))?;
        image = Some((extension.to_string(), bytes.to_vec()));
        break;
    }

    let (extension, bytes) = image.ok_or_else(|| {
        ApiError::BadRequest(format!("Missing multipart field '{}'", IMAGE_FIELD))
    })?;
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("Uploaded image is empty".to_string()));
    }
    if bytes.len() > state.max_upload_bytes {
        return Err(ApiError::PayloadTooLarge(format!(
            "Image is {} bytes, limit is {}",
            bytes.len(),
            state.max_upload_bytes
        )));
    }

    let image_ref = format!("{}/{}.{}", event_id, Uuid::new_v4(), extension);
    let path = state.upload_dir.join(&image_ref);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to store image: {}", e)))?;
    }
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to store image: {}", e)))?;
    tracing::debug!("Stored {} byte(s) as {}", bytes.len(), image_ref);

    let draft = state
        .intake_service
        .submit_draft(&event_id, &image_ref)
        .await?;
    Ok((StatusCode::CREATED, Json(draft)))
}

async fn submit_by_ref(
    Path(event_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubmitByRefBody>,
) -> ApiResult<(StatusCode, Json<DonationDraft>)> {
    let draft = state
        .intake_service
        .submit_draft(&event_id, &body.image_ref)
        .await?;
    Ok((StatusCode::CREATED, Json(draft)))
}

async fn list_review_queue(
    Path(event_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<DonationDraft>>> {
    let drafts = state.review_queue_service.list_review_queue(&event_id)?;
    Ok(Json(drafts))
}

async fn get_draft(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DonationDraft>> {
    let draft = state.review_queue_service.get_draft(&id)?;
    Ok(Json(draft))
}

async fn open_draft(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<OpenDraftBody>,
) -> ApiResult<Json<OpenedDraft>> {
    let opened = state
        .review_queue_service
        .open_draft(&id, body.version, &body.editor_id)
        .await?;
    Ok(Json(opened))
}

async fn confirm_draft(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<ConfirmDraftBody>,
) -> ApiResult<Json<ConfirmationResult>> {
    let result = state
        .confirmation_service
        .confirm_draft(body.into_request(id))
        .await?;
    Ok(Json(result))
}

async fn reject_draft(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<RejectDraftBody>,
) -> ApiResult<Json<DonationDraft>> {
    let draft = state
        .review_queue_service
        .reject_draft(&id, body.version, &body.editor_id, body.reason)
        .await?;
    Ok(Json(draft))
}

/// File extension for an uploaded form image, from its name or content type.
fn image_extension(file_name: Option<&str>, content_type: Option<&str>) -> ApiResult<&'static str> {
    let from_name = file_name
        .and_then(|name| StdPath::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    let extension = match from_name.as_deref() {
        Some("jpg") | Some("jpeg") => Some("jpg"),
        Some("png") => Some("png"),
        Some("webp") => Some("webp"),
        Some("gif") => Some("gif"),
        _ => match content_type {
            Some("image/jpeg") => Some("jpg"),
            Some("image/png") => Some("png"),
            Some("image/webp") => Some("webp"),
            Some("image/gif") => Some("gif"),
            _ => None,
        },
    };
    extension.ok_or_else(|| {
        ApiError::BadRequest("Form image must be a JPEG, PNG, WebP or GIF file".to_string())
    })
}

pub fn router(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/events/{id}/drafts",
            get(list_review_queue).post(upload_draft).layer(DefaultBodyLimit::max(
                max_upload_bytes.saturating_add(MULTIPART_SLACK_BYTES),
            )),
        )
        .route("/events/{id}/drafts/by-ref", post(submit_by_ref))
        .route("/drafts/{id}", get(get_draft))
        .route("/drafts/{id}/open", post(open_draft))
        .route("/drafts/{id}/confirm", post(confirm_draft))
        .route("/drafts/{id}/reject", post(reject_draft))
}
