use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use pledgeboard_core::lifecycle::{Event, StoppedEvent};

use crate::{error::ApiResult, main_lib::AppState, models::StartEventBody};

async fn start_event(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StartEventBody>,
) -> ApiResult<(StatusCode, Json<Event>)> {
    let event = state.lifecycle_service.start_event(body.into()).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

async fn list_events(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Event>>> {
    let events = state.lifecycle_service.list_events()?;
    Ok(Json(events))
}

async fn get_event(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Event>> {
    let event = state.lifecycle_service.get_event(&id)?;
    Ok(Json(event))
}

async fn stop_event(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<StoppedEvent>> {
    let stopped = state.lifecycle_service.stop_event(&id).await?;
    Ok(Json(stopped))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(list_events).post(start_event))
        .route("/events/{id}", get(get_event))
        .route("/events/{id}/stop", post(stop_event))
}
