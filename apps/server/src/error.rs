use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pledgeboard_core::errors::{DatabaseError, Error as CoreError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("{0}")]
    Internal(String),
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    error: &'static str,
    message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Core(e) => match e {
                CoreError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, e.code()),
                CoreError::ConfirmationConflict(_) | CoreError::EventClosed(_) => {
                    (StatusCode::CONFLICT, e.code())
                }
                CoreError::LedgerWriteFailure { .. } => (StatusCode::SERVICE_UNAVAILABLE, e.code()),
                CoreError::Database(DatabaseError::NotFound(_)) => {
                    (StatusCode::NOT_FOUND, e.code())
                }
                CoreError::InvalidConfigValue(_) => (StatusCode::BAD_REQUEST, e.code()),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, e.code()),
            },
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            ApiError::Internal(_) | ApiError::Anyhow(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!("Request failed with {}: {}", status, self);
        } else {
            tracing::debug!("Request rejected with {}: {}", status, self);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            error: code,
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pledgeboard_core::errors::ValidationError;

    fn status_of(err: CoreError) -> StatusCode {
        ApiError::from(err).status_and_code().0
    }

    #[test]
    fn test_core_errors_map_to_statuses() {
        assert_eq!(
            status_of(CoreError::Validation(ValidationError::MissingName)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(CoreError::ConfirmationConflict("stale".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(CoreError::EventClosed("evt".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(CoreError::LedgerWriteFailure {
                attempts: 3,
                message: "locked".into()
            }),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(status_of(CoreError::not_found("draft")), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_closed_and_conflict_keep_distinct_codes() {
        let (_, closed) = ApiError::from(CoreError::EventClosed("evt".into())).status_and_code();
        let (_, conflict) =
            ApiError::from(CoreError::ConfirmationConflict("v".into())).status_and_code();
        assert_eq!(closed, "EVENT_CLOSED");
        assert_eq!(conflict, "CONFIRMATION_CONFLICT");
    }
}
