//! The identity-provider boundary.
//!
//! Signature, expiry and revocation checks belong to the provider; the core
//! treats it as a trusted black box that either yields claims or one of the
//! [`ProviderError`] categories.

use std::future::Future;

use thiserror::Error;

use crate::credential::DecodedCredential;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
  #[error("token expired")]
  Expired,

  #[error("token revoked")]
  Revoked,

  #[error("malformed token")]
  Malformed,

  #[error("token signature invalid")]
  SignatureInvalid,

  #[error("identity provider error: {0}")]
  Other(String),
}

/// Client for an external identity provider.
///
/// Implementations are constructed explicitly at startup and shared by
/// reference; they must not rely on process-wide state.
pub trait IdentityProvider: Send + Sync {
  /// Verify `raw` and return its claims.
  fn verify_id_token<'a>(
    &'a self,
    raw: &'a str,
  ) -> impl Future<Output = Result<DecodedCredential, ProviderError>> + Send + 'a;
}
