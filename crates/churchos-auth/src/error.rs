//! The auth error taxonomy.
//!
//! Authentication and authorization failures are terminal: the caller has to
//! re-authenticate or obtain a higher role out of band. Resolution failures
//! are server-side and never carry store details to the client.

use std::fmt;

use churchos_core::role::Role;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::guard::AdmissionMode;

/// Why a credential was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnauthenticatedReason {
  Expired,
  Revoked,
  Malformed,
  MissingSubject,
  ProviderError,
}

impl UnauthenticatedReason {
  /// Client-facing description.
  pub fn detail(self) -> &'static str {
    match self {
      Self::Expired => "Token expired",
      Self::Revoked => "Token revoked",
      Self::Malformed => "Invalid token",
      Self::MissingSubject => "Invalid token: missing user ID",
      Self::ProviderError => "Authentication failed",
    }
  }
}

impl fmt::Display for UnauthenticatedReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::Expired => "expired",
      Self::Revoked => "revoked",
      Self::Malformed => "malformed",
      Self::MissingSubject => "missing_subject",
      Self::ProviderError => "provider_error",
    };
    f.write_str(s)
  }
}

/// Why a verified credential could not be mapped to a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionFailure {
  /// The store could not be read or written.
  StoreUnavailable,
  /// A first-login insert collided, and the re-resolve after it did too.
  WriteConflict,
}

impl fmt::Display for ResolutionFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::StoreUnavailable => f.write_str("store unavailable"),
      Self::WriteConflict => f.write_str("write conflict"),
    }
  }
}

#[derive(Debug, Error)]
pub enum AuthError {
  #[error("unauthenticated: {0}")]
  Unauthenticated(UnauthenticatedReason),

  #[error("user resolution failed: {kind}")]
  UserResolutionFailed {
    kind:   ResolutionFailure,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
  },

  #[error("forbidden: requires {required} ({mode}), caller is {actual}")]
  Forbidden {
    required: Role,
    actual:   Role,
    mode:     AdmissionMode,
  },

  /// Granting or changing this role needs a higher rank than exists.
  #[error("no role can assign or modify {0}")]
  Unassignable(Role),

  #[error("principal not found: {0}")]
  NotFound(Uuid),

  #[error("internal error: {0}")]
  Internal(String),
}

impl AuthError {
  pub(crate) fn store<E>(kind: ResolutionFailure, source: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::UserResolutionFailed { kind, source: Some(Box::new(source)) }
  }

  pub fn required_rank(&self) -> Option<u8> {
    match self {
      Self::Forbidden { required, .. } => Some(required.rank()),
      _ => None,
    }
  }

  pub fn actual_rank(&self) -> Option<u8> {
    match self {
      Self::Forbidden { actual, .. } => Some(actual.rank()),
      _ => None,
    }
  }
}

pub type Result<T, E = AuthError> = std::result::Result<T, E>;
