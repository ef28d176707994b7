//! User Directory. Maps identity-provider subjects to principals.
//!
//! A principal is provisioned the first time its subject is seen. Later logins
//! resolve to the same record and only ever refresh the email. Concurrent
//! first logins for one subject are serialised by the store's uniqueness
//! constraint; the loser re-resolves once and picks up the winner's row.

use churchos_core::{
  credential::DecodedCredential,
  principal::{NewPrincipal, Principal},
  role::{self, Role},
  store::{PrincipalStore, StoreError},
};
use uuid::Uuid;

use crate::{
  error::{AuthError, ResolutionFailure, Result},
  guard::AdmissionMode,
};

/// Lookups after a lost insert race before giving up.
const CONFLICT_RETRIES: usize = 1;

pub struct UserDirectory<S> {
  store: S,
}

impl<S: PrincipalStore> UserDirectory<S> {
  pub fn new(store: S) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  /// Resolve `credential` to its principal, creating or refreshing it as
  /// needed. Never changes `id`, `external_subject` or `role`.
  pub async fn resolve(&self, credential: &DecodedCredential) -> Result<Principal> {
    let subject = credential.subject.as_str();
    let mut attempt = 0;

    loop {
      if let Some(existing) = self
        .store
        .find_by_subject(subject)
        .await
        .map_err(unavailable)?
      {
        return self.sync_email(existing, credential).await;
      }

      let input = NewPrincipal::provisioned(
        subject,
        credential.email.as_deref(),
        credential.display_name.as_deref(),
      );

      match self.store.insert_principal(input).await {
        Ok(created) => {
          tracing::info!(
            user_id = %created.id,
            %subject,
            name = %created.display_name,
            "provisioned new user"
          );
          return Ok(created);
        }
        Err(e) if e.is_unique_violation() && attempt < CONFLICT_RETRIES => {
          tracing::debug!(%subject, "lost first-login race, resolving again");
          attempt += 1;
        }
        Err(e) if e.is_unique_violation() => {
          tracing::error!(%subject, error = %e, "first-login conflict persisted");
          return Err(AuthError::store(ResolutionFailure::WriteConflict, e));
        }
        Err(e) => return Err(unavailable(e)),
      }
    }
  }

  async fn sync_email(
    &self,
    existing: Principal,
    credential: &DecodedCredential,
  ) -> Result<Principal> {
    let email = credential.email_or_empty();
    if existing.email == email {
      return Ok(existing);
    }

    let id = existing.id;
    let updated = self
      .store
      .update_email(id, email.to_owned())
      .await
      .map_err(unavailable)?
      .ok_or_else(|| {
        tracing::error!(user_id = %id, "user vanished during email sync");
        AuthError::Internal(format!("user {id} vanished during email sync"))
      })?;

    tracing::info!(user_id = %id, name = %updated.display_name, "updated user email");
    Ok(updated)
  }

  pub async fn get(&self, id: Uuid) -> Result<Option<Principal>> {
    self.store.get_principal(id).await.map_err(unavailable)
  }

  pub async fn list(&self) -> Result<Vec<Principal>> {
    self.store.list_principals().await.map_err(unavailable)
  }

  /// Give the principal `target_id` the role `role` on behalf of `assigner`.
  ///
  /// The assigner must outrank both the role being granted and the target's
  /// current role.
  pub async fn assign_role(
    &self,
    assigner: &Principal,
    target_id: Uuid,
    role: Role,
  ) -> Result<Principal> {
    if !role::can_assign(assigner.role, role) {
      tracing::warn!(
        assigner = %assigner.id,
        assigner_role = %assigner.role,
        requested = %role,
        "role assignment above assigner's rank refused"
      );
      return Err(outranking(role, assigner.role));
    }

    let target = self.get(target_id).await?.ok_or(AuthError::NotFound(target_id))?;

    if !role::can_assign(assigner.role, target.role) {
      tracing::warn!(
        assigner = %assigner.id,
        target = %target.id,
        target_role = %target.role,
        "role change on peer or senior refused"
      );
      return Err(outranking(target.role, assigner.role));
    }

    if target.role == role {
      return Ok(target);
    }

    let updated = self
      .store
      .update_role(target_id, role)
      .await
      .map_err(unavailable)?
      .ok_or(AuthError::NotFound(target_id))?;

    tracing::info!(
      assigner = %assigner.id,
      target = %updated.id,
      from = %target.role,
      to = %updated.role,
      "role assigned"
    );
    Ok(updated)
  }
}

/// The refusal for an assigner who does not outrank `role`: names the lowest
/// role that would, or reports that none exists.
fn outranking(role: Role, actual: Role) -> AuthError {
  match Role::from_rank(role.rank() + 1) {
    Ok(required) => AuthError::Forbidden {
      required,
      actual,
      mode: AdmissionMode::Minimum,
    },
    Err(_) => AuthError::Unassignable(role),
  }
}

fn unavailable<E: StoreError>(e: E) -> AuthError {
  tracing::error!(error = %e, "user store failure");
  AuthError::store(ResolutionFailure::StoreUnavailable, e)
}
