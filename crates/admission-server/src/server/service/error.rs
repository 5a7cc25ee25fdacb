//! HTTP error mapping.
//!
//! Library errors become JSON bodies of the form
//! `{"success": false, "error": "..."}` with a status chosen by kind:
//!
//! - `NotFound` → 404
//! - `InvalidRegistration`, `InvalidSin` → 400
//! - `SinConflict` → 409
//! - `Exhausted` → 503
//! - anything else → 500
//!
//! A missing or wrong admin token is a 401 with `{"error": "Unauthorized
//! access"}`.

use admission_sin::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tokio::task::JoinError;

#[derive(Debug)]
pub enum ApiError {
    /// A failure reported by the registration or SIN layer.
    Sin(Error),
    /// The request was malformed before reaching the library.
    BadRequest(String),
    /// Admin credentials were missing or wrong.
    Unauthorized,
    /// A server-side failure unrelated to the request.
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

#[derive(Serialize)]
struct UnauthorizedBody {
    error: &'static str,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self::Sin(err)
    }
}

impl From<JoinError> for ApiError {
    fn from(err: JoinError) -> Self {
        Self::Internal(format!("blocking task failed: {err}"))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Sin(err) => match err {
                Error::NotFound { .. } => StatusCode::NOT_FOUND,
                Error::InvalidRegistration { .. } | Error::InvalidSin { .. } => {
                    StatusCode::BAD_REQUEST
                }
                Error::SinConflict { .. } => StatusCode::CONFLICT,
                Error::Exhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            Self::Unauthorized => {
                return (
                    status,
                    Json(UnauthorizedBody {
                        error: "Unauthorized access",
                    }),
                )
                    .into_response();
            }
            Self::Sin(err) => err.to_string(),
            Self::BadRequest(reason) | Self::Internal(reason) => reason,
        };

        if status.is_server_error() {
            tracing::error!(%status, %error, "request failed");
        } else {
            tracing::debug!(%status, %error, "request rejected");
        }

        (
            status,
            Json(ErrorBody {
                success: false,
                error,
            }),
        )
            .into_response()
    }
}
