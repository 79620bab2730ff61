use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

use crate::types::escape_html;

/// Unified service error type used across all modules.
///
/// Each variant maps to an HTTP status code and a rendered HTML error page.
/// Expected user mistakes (bad credentials, duplicate names) never travel
/// through this type — handlers recover them locally as flash messages.
/// What reaches here is either a missing resource or a genuine fault.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Resource does not exist. HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate key / resource already exists. HTTP 409.
    #[error("{0}")]
    Conflict(String),

    /// Input data is invalid. HTTP 400.
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid authentication. HTTP 401.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed. HTTP 403.
    #[error("{0}")]
    Forbidden(String),

    /// Storage backend failure. HTTP 500.
    #[error("{0}")]
    Storage(String),

    /// Unexpected internal error. HTTP 500.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown on the rendered error page.
    ///
    /// Server-side faults get a generic line; the real cause stays in the
    /// logs and never reaches the client.
    fn public_message(&self) -> String {
        match self {
            ServiceError::Storage(_) | ServiceError::Internal(_) => {
                "Something went wrong. Please try again later.".to_string()
            }
            other => escape_html(&other.to_string()),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = error_page(status, &self.public_message());
        (status, Html(body)).into_response()
    }
}

/// Render a minimal standalone error page.
fn error_page(status: StatusCode, message: &str) -> String {
    let title = status
        .canonical_reason()
        .unwrap_or("Error");
    format!(
        "<!doctype html>\n<html>\n<head><title>{status} {title}</title></head>\n\
         <body>\n<h1>{title}</h1>\n<p>{message}</p>\n<p><a href=\"/\">Home</a></p>\n\
         </body>\n</html>\n",
        status = status.as_u16(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_mapping() {
        assert_eq!(ServiceError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ServiceError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(ServiceError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::Unauthorized("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ServiceError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ServiceError::Storage("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ServiceError::Internal("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn server_faults_render_generic_message() {
        let msg = ServiceError::Storage("disk exploded: /var/lib/secret".into()).public_message();
        assert!(!msg.contains("disk"));
        assert!(msg.contains("Something went wrong"));
    }

    #[test]
    fn client_errors_render_escaped_message() {
        let msg = ServiceError::NotFound("users/<script>".into()).public_message();
        assert_eq!(msg, "users/&lt;script&gt;");
    }

    #[test]
    fn response_status_matches() {
        let resp = ServiceError::NotFound("Page Not Found".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
