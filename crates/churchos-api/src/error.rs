//! HTTP error type and [`axum::response::IntoResponse`] implementation.
//!
//! 401 responses carry a `WWW-Authenticate` challenge and a hint to sign in
//! again. 403 responses name both the required and the caller's role. 500
//! responses never include store or query details; those go to the log.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use churchos_auth::{AdmissionMode, AuthError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Auth(#[from] AuthError),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),
}

fn body(status: StatusCode, error: impl Into<String>, message: &str) -> Response {
  let payload = json!({
    "error":       error.into(),
    "status_code": status.as_u16(),
    "message":     message,
  });
  (status, Json(payload)).into_response()
}

/// The 403 detail, worded by admission mode.
pub fn forbidden_detail(
  required: impl std::fmt::Display,
  actual: impl std::fmt::Display,
  mode: AdmissionMode,
) -> String {
  let label = match mode {
    AdmissionMode::ExactOrHigher => "Required role",
    AdmissionMode::Minimum => "Minimum required role",
  };
  format!("Insufficient permissions. {label}: {required}. Your role: {actual}")
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Auth(AuthError::Unauthenticated(reason)) => {
        let mut res = body(
          StatusCode::UNAUTHORIZED,
          reason.detail(),
          "Sign in again to obtain a fresh token",
        );
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Bearer realm=\"churchos\""),
        );
        res
      }
      ApiError::Auth(AuthError::Forbidden { required, actual, mode }) => {
        let payload = json!({
          "error":         forbidden_detail(required, actual, mode),
          "status_code":   StatusCode::FORBIDDEN.as_u16(),
          "message":       "Request a higher role to access this resource",
          "required_role": required,
          "actual_role":   actual,
          "required_rank": required.rank(),
          "actual_rank":   actual.rank(),
        });
        (StatusCode::FORBIDDEN, Json(payload)).into_response()
      }
      ApiError::Auth(AuthError::Unassignable(role)) => {
        let payload = json!({
          "error":       format!("Insufficient permissions. No role can assign or modify {role}"),
          "status_code": StatusCode::FORBIDDEN.as_u16(),
          "message":     "This role is managed outside the API",
          "role":        role,
        });
        (StatusCode::FORBIDDEN, Json(payload)).into_response()
      }
      ApiError::Auth(AuthError::NotFound(id)) => body(
        StatusCode::NOT_FOUND,
        format!("user {id} not found"),
        "Not found",
      ),
      ApiError::Auth(e @ AuthError::UserResolutionFailed { .. }) => {
        tracing::error!(error = %e, source = ?std::error::Error::source(&e), "user resolution failed");
        body(
          StatusCode::INTERNAL_SERVER_ERROR,
          "Failed to retrieve user data",
          "Internal server error",
        )
      }
      ApiError::Auth(e @ AuthError::Internal(_)) => {
        tracing::error!(error = %e, "internal error");
        body(
          StatusCode::INTERNAL_SERVER_ERROR,
          "Internal server error",
          "Internal server error",
        )
      }
      ApiError::NotFound(m) => body(StatusCode::NOT_FOUND, m, "Not found"),
      ApiError::BadRequest(m) => body(StatusCode::BAD_REQUEST, m, "Bad request"),
    }
  }
}
