use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Malformed request or missing required field
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unknown payment, status, route, account, ...
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation rejected because the entity is already in a terminal marker
    #[error("Failed precondition: {0}")]
    FailedPrecondition(String),

    /// No route matches the payment's partition, mode and type
    #[error("Routing failed for payment {0}")]
    RoutingFailed(String),

    /// Publishing to an external address failed
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal invariants violated
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_message = self.to_string();

        HttpResponse::build(status_code).json(serde_json::json!({
            "error": {
                "message": error_message,
                "code": status_code.as_u16(),
            }
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::FailedPrecondition(_) => StatusCode::CONFLICT,
            AppError::RoutingFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::TransportFailure(_) => StatusCode::BAD_GATEWAY,
            AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Helper functions for common error scenarios
impl AppError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        AppError::InvalidArgument(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn failed_precondition(msg: impl Into<String>) -> Self {
        AppError::FailedPrecondition(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        AppError::TransportFailure(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Whether redelivering the event that produced this error may succeed.
    ///
    /// Storage and transport hiccups are worth another attempt; everything
    /// else is a property of the request itself.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Database(sqlx::Error::RowNotFound) => false,
            AppError::Database(_) => true,
            AppError::TransportFailure(_) => true,
            AppError::HttpClient(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().map_or(true, |s| s.is_server_error())
            }
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_) | AppError::Database(sqlx::Error::RowNotFound))
    }
}
