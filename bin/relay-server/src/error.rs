//! Unified server error type.
//!
//! Every HTTP handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`]. Failures are reported as plain text:
//! client errors carry the validation message, server errors carry the
//! underlying error message and are logged with full detail.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::handlers::TemplateError;

#[derive(Debug, Error)]
pub enum ServerError {
    /// The body could not be read or was not JSON; keeps axum's status
    /// (400, 413, 415, 422).
    #[error("rejected request body: {0}")]
    Rejected(#[from] JsonRejection),

    /// Propagated from the template store.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::Rejected(rejection) => {
                warn!(status = %rejection.status(), error = %rejection, "request body rejected");
                (rejection.status(), rejection.body_text())
            }
            ServerError::Template(e) if e.is_client_error() => {
                warn!(error = %e, "template rejected");
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ServerError::Template(e) => {
                error!(error = %e, "template store error");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, m.clone())
            }
        };
        (status, message).into_response()
    }
}
