use actix_web::{error::JsonPayloadError, error::QueryPayloadError, HttpRequest};

use crate::core::AppError;

/// Malformed JSON bodies become `InvalidArgument` so they share the
/// application error body
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(path = %req.path(), error = %err, "Rejected JSON payload");
    AppError::invalid_argument(err.to_string()).into()
}

pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(path = %req.path(), error = %err, "Rejected query string");
    AppError::invalid_argument(err.to_string()).into()
}
