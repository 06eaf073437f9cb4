//! Error types for the media download server

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // User-facing messages stay generic; internal detail (paths, SQL)
        // goes to the log only.
        let (status, message) = match &self {
            AppError::Forbidden(msg) => {
                tracing::warn!("Request rejected: {}", msg);
                (StatusCode::FORBIDDEN, "The link you followed has expired.")
            }
            AppError::NotFound(msg) => {
                tracing::warn!("Resource not found: {}", msg);
                (StatusCode::NOT_FOUND, "File not found")
            }
            AppError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, "Invalid request")
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "An internal error occurred")
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "An internal error occurred")
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "An internal error occurred")
            }
        };

        (status, error_page(message)).into_response()
    }
}

/// Minimal HTML error page shown for every terminal failure
fn error_page(message: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Error</title></head>\n\
         <body><p>{}</p></body></html>\n",
        message
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_maps_to_403() {
        let response = AppError::Forbidden("bad nonce".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn not_found_body_does_not_leak_detail() {
        let response =
            AppError::NotFound("/srv/media/secret/file.bin is missing".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        // body holds the generic page only, never the internal path
        let page = error_page("File not found").0;
        assert!(!page.contains("/srv/media"));
    }
}
