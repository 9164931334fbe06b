use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Classified failure kinds shared by every layer of the service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    /// Rejected input: validation failures, malformed payloads, duplicate keys.
    #[error("{0}")]
    InvalidArgument(String),

    /// The requested user (by id, status or credentials) does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Store or infrastructure failure. The message is always generic.
    #[error("{0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// JSON body rendered for every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestError {
    pub message: String,
    pub status: u16,
    pub error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidArgument(_) => "bad_request",
            AppError::NotFound(_) => "not_found",
            AppError::Internal(_) => "internal_server_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::InvalidArgument(m) | AppError::NotFound(m) | AppError::Internal(m) => m,
        }
    }

    pub fn to_rest(&self) -> RestError {
        RestError {
            message: self.message().to_string(),
            status: self.status().as_u16(),
            error: self.code().to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_rest())).into_response()
    }
}
