//! Handlers for `/api/auth`: who the caller is and what they may do.

use std::collections::BTreeSet;

use axum::{Json, extract::State};
use churchos_auth::Admission;
use churchos_core::{
  identity::IdentityProvider, role::Role, store::PrincipalStore,
};
use serde::Serialize;

use crate::{AppState, extract::CurrentPrincipal};

/// `GET /api/auth/me`: the caller's record plus permissions. The first call
/// with a new identity provisions it.
pub async fn me<P, S>(
  State(state): State<AppState<P, S>>,
  CurrentPrincipal(principal): CurrentPrincipal,
) -> Json<Admission>
where
  P: IdentityProvider + 'static,
  S: PrincipalStore + 'static,
{
  let permissions = state.guard.permissions_of(&principal);
  Json(Admission { principal, permissions })
}

#[derive(Debug, Serialize)]
pub struct PermissionsResponse {
  pub role:        Role,
  pub rank:        u8,
  pub permissions: BTreeSet<&'static str>,
}

/// `GET /api/auth/permissions`
pub async fn permissions<P, S>(
  State(state): State<AppState<P, S>>,
  CurrentPrincipal(principal): CurrentPrincipal,
) -> Json<PermissionsResponse>
where
  P: IdentityProvider + 'static,
  S: PrincipalStore + 'static,
{
  Json(PermissionsResponse {
    role:        principal.role,
    rank:        principal.role.rank(),
    permissions: state.guard.permissions_of(&principal),
  })
}
