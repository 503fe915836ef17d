use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Config(_) | Self::Io(_) | Self::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_errors_map_to_client_statuses() {
        assert_eq!(AppError::bad_request("nope").status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::not_found("trip x").status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn infrastructure_errors_map_to_500() {
        let io = AppError::from(std::io::Error::other("disk full"));
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(io.to_string(), "disk full");
        assert_eq!(
            AppError::Config("bad port".into()).to_string(),
            "config error: bad port"
        );
    }

    #[test]
    fn response_carries_status() {
        let response = AppError::not_found("trip abc not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
