//! Bearer-token extractors.
//!
//! [`CurrentPrincipal`] authenticates the request. [`Authorized<R>`] also
//! applies the role requirement `R`, so a handler's signature states who may
//! call it.

use std::marker::PhantomData;

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use churchos_auth::{AdmissionMode, AuthError, UnauthenticatedReason, guard};
use churchos_core::{
  identity::IdentityProvider, principal::Principal, role::Role,
  store::PrincipalStore,
};

use crate::{AppState, error::ApiError};

/// Pull the credential out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
  let malformed = || AuthError::Unauthenticated(UnauthenticatedReason::Malformed);

  let value = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or_else(malformed)?;

  let (scheme, token) = value.split_once(' ').ok_or_else(malformed)?;
  if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
    return Err(malformed());
  }
  Ok(token.trim())
}

// ─── Authentication ──────────────────────────────────────────────────────────

/// The authenticated caller, provisioned on first sight.
pub struct CurrentPrincipal(pub Principal);

impl<P, S> FromRequestParts<AppState<P, S>> for CurrentPrincipal
where
  P: IdentityProvider + 'static,
  S: PrincipalStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<P, S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers)?;
    let principal = state.guard.authenticate(token).await?;
    Ok(CurrentPrincipal(principal))
  }
}

// ─── Authorization ───────────────────────────────────────────────────────────

/// A role requirement checked by [`Authorized`].
pub trait RoleRequirement: Send + Sync + 'static {
  const ROLE: Role;
  const MODE: AdmissionMode;
}

pub struct AtLeastApostle;
/// The top rank; no one is above it.
pub struct NationSeerOnly;

impl RoleRequirement for AtLeastApostle {
  const ROLE: Role = Role::Apostle;
  const MODE: AdmissionMode = AdmissionMode::Minimum;
}

impl RoleRequirement for NationSeerOnly {
  const ROLE: Role = Role::NationSeer;
  const MODE: AdmissionMode = AdmissionMode::ExactOrHigher;
}

/// An authenticated caller whose role satisfies `R`.
pub struct Authorized<R> {
  pub principal: Principal,
  _requirement:  PhantomData<fn() -> R>,
}

impl<P, S, R> FromRequestParts<AppState<P, S>> for Authorized<R>
where
  P: IdentityProvider + 'static,
  S: PrincipalStore + 'static,
  R: RoleRequirement,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<P, S>,
  ) -> Result<Self, Self::Rejection> {
    let CurrentPrincipal(principal) =
      CurrentPrincipal::from_request_parts(parts, state).await?;
    let principal = guard::authorize(principal, R::ROLE, R::MODE)?;
    Ok(Authorized { principal, _requirement: PhantomData })
  }
}
