use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use pledgeboard_core::confirmation::ReversalResult;
use pledgeboard_core::export::{render_report_csv, ReportRow};
use pledgeboard_core::ledger::{LedgerAggregate, LedgerEntry, LedgerSnapshot};

use crate::{
    error::ApiResult,
    main_lib::AppState,
    models::{EntriesQuery, ReverseDonationBody},
};

async fn reverse_donation(
    Path((event_id, donation_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReverseDonationBody>,
) -> ApiResult<Json<ReversalResult>> {
    let result = state
        .confirmation_service
        .reverse_donation(body.into_request(event_id, donation_id))
        .await?;
    Ok(Json(result))
}

async fn get_snapshot(
    Path(event_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<LedgerSnapshot>> {
    let snapshot = state.ledger_service.snapshot(&event_id)?;
    Ok(Json(snapshot))
}

async fn get_entries(
    Path(event_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<EntriesQuery>,
) -> ApiResult<Json<Vec<LedgerEntry>>> {
    let entries = state
        .ledger_service
        .entries_since(&event_id, query.after_seq.unwrap_or(0))?;
    Ok(Json(entries))
}

async fn get_aggregate(
    Path(event_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<LedgerAggregate>> {
    let aggregate = state.ledger_service.aggregate(&event_id)?;
    Ok(Json(aggregate))
}

async fn export_rows(
    Path(event_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ReportRow>>> {
    let rows = state.ledger_service.export_rows(&event_id)?;
    Ok(Json(rows))
}

async fn export_csv(
    Path(event_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    let rows = state.ledger_service.export_rows(&event_id)?;
    let csv = render_report_csv(&rows)?;
    let disposition = format!("attachment; filename=\"donations_{}.csv\"", event_id);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/events/{id}/donations/{donation_id}/reverse",
            post(reverse_donation),
        )
        .route("/events/{id}/snapshot", get(get_snapshot))
        .route("/events/{id}/entries", get(get_entries))
        .route("/events/{id}/aggregate", get(get_aggregate))
        .route("/events/{id}/export", get(export_rows))
        .route("/events/{id}/export.csv", get(export_csv))
}
