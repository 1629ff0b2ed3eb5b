//! # Error Responses
//!
//! Every failed request answers with a status derived from the
//! [`BookingError`] variant and a body of the form `{"error": "<message>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use padelup_core::errors::BookingError;
use serde_json::json;
use tracing::{error, warn};

/// A [`BookingError`] on its way out of a handler
///
/// # Example
///
/// ```
/// use axum::Json;
/// use padelup_api::middleware::error_handling::AppError;
/// use padelup_core::errors::BookingError;
///
/// async fn handler(court_id: String) -> Result<Json<String>, AppError> {
///     if court_id.is_empty() {
///         return Err(AppError(BookingError::Validation("Court is required".to_string())));
///     }
///     Ok(Json(court_id))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub BookingError);

/// A `409 Conflict` tells the browser to reload the booking grid before
/// offering the slot again.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::Validation(_) => StatusCode::BAD_REQUEST,
            BookingError::Authentication(_) => StatusCode::UNAUTHORIZED,
            BookingError::PastSlot(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BookingError::PolicyViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BookingError::SubmissionConflict(_) => StatusCode::CONFLICT,
            BookingError::SubmissionFailure(_) => StatusCode::BAD_GATEWAY,
            BookingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = self.0.to_string();
        if status.is_server_error() {
            error!(%status, %message, "Request failed");
        } else {
            warn!(%status, %message, "Request rejected");
        }

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError(err)
    }
}

/// Upstream failures reported through eyre surface as `SubmissionFailure`
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(BookingError::SubmissionFailure(err))
    }
}

/// The response a handler returning `err` would produce
pub fn map_error(err: BookingError) -> Response {
    AppError(err).into_response()
}
