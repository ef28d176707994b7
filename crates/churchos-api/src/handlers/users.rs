//! Handlers for `/api/users`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/users` | Oldest first |
//! | `GET`  | `/api/users/{id}` | 404 if not found |
//! | `PUT`  | `/api/users/{id}/role` | Body: `{"role":"Elder"}` |

use axum::{
  Json,
  extract::{
    Path, State,
    rejection::{JsonRejection, PathRejection},
  },
};
use churchos_core::{
  identity::IdentityProvider, principal::Principal, role::Role,
  store::PrincipalStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  extract::{AtLeastApostle, Authorized},
};

fn user_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
  path
    .map(|Path(id)| id)
    .map_err(|e| ApiError::BadRequest(format!("invalid user id: {}", e.body_text())))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /api/users`
pub async fn list<P, S>(
  State(state): State<AppState<P, S>>,
  _caller: Authorized<AtLeastApostle>,
) -> Result<Json<Vec<Principal>>, ApiError>
where
  P: IdentityProvider + 'static,
  S: PrincipalStore + 'static,
{
  let users = state.guard.directory().list().await?;
  Ok(Json(users))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /api/users/{id}`
pub async fn get_one<P, S>(
  State(state): State<AppState<P, S>>,
  _caller: Authorized<AtLeastApostle>,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Principal>, ApiError>
where
  P: IdentityProvider + 'static,
  S: PrincipalStore + 'static,
{
  let id = user_id(id)?;
  let user = state
    .guard
    .directory()
    .get(id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;
  Ok(Json(user))
}

// ─── Assign role ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AssignRoleBody {
  pub role: Role,
}

/// `PUT /api/users/{id}/role`: the caller must outrank both the granted role
/// and the target's current role.
pub async fn assign_role<P, S>(
  State(state): State<AppState<P, S>>,
  caller: Authorized<AtLeastApostle>,
  id: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<AssignRoleBody>, JsonRejection>,
) -> Result<Json<Principal>, ApiError>
where
  P: IdentityProvider + 'static,
  S: PrincipalStore + 'static,
{
  let id = user_id(id)?;
  let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let updated = state
    .guard
    .directory()
    .assign_role(&caller.principal, id, body.role)
    .await?;
  Ok(Json(updated))
}
