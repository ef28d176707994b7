//! Access Guard: the per-request gate.
//!
//! ```text
//! Unauthenticated ─verify─▶ TokenValid ─resolve─▶ PrincipalResolved ─rank─▶ Authorized
//!                                                                      └───▶ Forbidden
//! ```
//!
//! Authentication always completes before authorization is considered, so an
//! authentication failure never touches the store, and a forbidden request has
//! still been provisioned or email-synced.

use std::{collections::BTreeSet, fmt};

use churchos_core::{
  identity::IdentityProvider,
  principal::Principal,
  role::{self, Role},
  store::PrincipalStore,
};
use serde::Serialize;

use crate::{
  directory::UserDirectory,
  error::{AuthError, Result},
  verifier::TokenVerifier,
};

/// How a required role is compared against the caller's role.
///
/// Both modes admit any role at or above the requirement; they differ only in
/// how a rejection is worded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionMode {
  ExactOrHigher,
  Minimum,
}

impl AdmissionMode {
  pub fn admits(self, actual: Role, required: Role) -> bool {
    match self {
      Self::ExactOrHigher => role::satisfies_exact_or_higher(actual, required),
      Self::Minimum => role::satisfies_minimum(actual, required),
    }
  }
}

impl fmt::Display for AdmissionMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::ExactOrHigher => f.write_str("exact or higher"),
      Self::Minimum => f.write_str("minimum"),
    }
  }
}

/// A principal that passed the whole pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct Admission {
  pub principal:   Principal,
  pub permissions: BTreeSet<&'static str>,
}

/// Composes [`TokenVerifier`], [`UserDirectory`] and the role hierarchy.
pub struct AccessGuard<P, S> {
  verifier:  TokenVerifier<P>,
  directory: UserDirectory<S>,
}

impl<P, S> AccessGuard<P, S>
where
  P: IdentityProvider,
  S: PrincipalStore,
{
  pub fn new(provider: P, store: S) -> Self {
    Self {
      verifier:  TokenVerifier::new(provider),
      directory: UserDirectory::new(store),
    }
  }

  pub fn verifier(&self) -> &TokenVerifier<P> { &self.verifier }

  pub fn directory(&self) -> &UserDirectory<S> { &self.directory }

  /// Verify `raw` and resolve it to a principal.
  pub async fn authenticate(&self, raw: &str) -> Result<Principal> {
    let credential = self.verifier.verify(raw).await?;
    self.directory.resolve(&credential).await
  }

  /// Admit `principal` if its role satisfies `required` under `mode`.
  pub fn authorize(
    &self,
    principal: Principal,
    required: Role,
    mode: AdmissionMode,
  ) -> Result<Principal> {
    authorize(principal, required, mode)
  }

  pub fn permissions_of(&self, principal: &Principal) -> BTreeSet<&'static str> {
    role::permissions_for(principal.role)
  }

  /// Run the full pipeline for one request.
  pub async fn admit(
    &self,
    raw: &str,
    required: Role,
    mode: AdmissionMode,
  ) -> Result<Admission> {
    let principal = self.authenticate(raw).await?;
    let principal = authorize(principal, required, mode)?;
    let permissions = self.permissions_of(&principal);
    Ok(Admission { principal, permissions })
  }
}

/// The rank check on its own; pure.
pub fn authorize(
  principal: Principal,
  required: Role,
  mode: AdmissionMode,
) -> Result<Principal> {
  let admitted = mode.admits(principal.role, required);
  tracing::debug!(
    user_id = %principal.id,
    role = %principal.role,
    %required,
    %mode,
    admitted,
    "role check"
  );

  if admitted {
    Ok(principal)
  } else {
    tracing::warn!(
      user_id = %principal.id,
      name = %principal.display_name,
      role = %principal.role,
      %required,
      "access denied"
    );
    Err(AuthError::Forbidden {
      required,
      actual: principal.role,
      mode,
    })
  }
}

#[cfg(test)]
mod tests {
  use churchos_core::{credential::DecodedCredential, identity::ProviderError};

  use super::*;
  use crate::{
    error::UnauthenticatedReason,
    testing::{MemoryStore, ScriptedProvider},
  };

  fn guard(provider: ScriptedProvider) -> AccessGuard<ScriptedProvider, MemoryStore> {
    AccessGuard::new(provider, MemoryStore::default())
  }

  #[tokio::test]
  async fn end_to_end_provision_sync_and_forbid() {
    let provider = ScriptedProvider::new()
      .accept("first", DecodedCredential::new("uid-123").with_email("a@b.com"))
      .accept("second", DecodedCredential::new("uid-123").with_email("c@d.com"));
    let g = guard(provider);

    let p = g.authenticate("first").await.unwrap();
    assert_eq!(p.role, Role::Deacon);
    assert_eq!(p.display_name, "Unknown User");

    let again = g.authenticate("second").await.unwrap();
    assert_eq!(again.id, p.id);
    assert_eq!(again.email, "c@d.com");

    let err = g
      .authorize(again, Role::NationSeer, AdmissionMode::Minimum)
      .unwrap_err();
    assert_eq!(err.required_rank(), Some(4));
    assert_eq!(err.actual_rank(), Some(1));
  }

  #[tokio::test]
  async fn unauthenticated_short_circuits_before_store() {
    let provider =
      ScriptedProvider::new().reject("bad", ProviderError::SignatureInvalid);
    let g = guard(provider);

    let err = g
      .admit("bad", Role::Deacon, AdmissionMode::Minimum)
      .await
      .unwrap_err();
    assert!(matches!(
      err,
      AuthError::Unauthenticated(UnauthenticatedReason::Malformed)
    ));
    assert_eq!(g.directory().store().reads(), 0);
    assert_eq!(g.directory().store().writes(), 0);
  }

  #[tokio::test]
  async fn forbidden_caller_is_still_provisioned() {
    let provider =
      ScriptedProvider::new().accept("tok", DecodedCredential::new("uid-9"));
    let g = guard(provider);

    let err = g
      .admit("tok", Role::NationSeer, AdmissionMode::ExactOrHigher)
      .await
      .unwrap_err();
    assert!(matches!(
      err,
      AuthError::Forbidden {
        required: Role::NationSeer,
        actual: Role::Deacon,
        mode: AdmissionMode::ExactOrHigher,
      }
    ));
    assert_eq!(g.directory().store().count_subject("uid-9"), 1);
  }

  #[tokio::test]
  async fn admission_carries_permissions() {
    let provider =
      ScriptedProvider::new().accept("tok", DecodedCredential::new("uid-1"));
    let g = guard(provider);

    let admission = g
      .admit("tok", Role::Deacon, AdmissionMode::Minimum)
      .await
      .unwrap();
    assert_eq!(admission.principal.role, Role::Deacon);
    assert_eq!(admission.permissions, role::permissions_for(Role::Deacon));
  }

  #[tokio::test]
  async fn both_modes_admit_higher_roles() {
    let provider =
      ScriptedProvider::new().accept("tok", DecodedCredential::new("uid-1"));
    let g = guard(provider);
    let p = g.authenticate("tok").await.unwrap();
    g.directory().store().force_role(p.id, Role::Apostle);
    let p = g.authenticate("tok").await.unwrap();

    for mode in [AdmissionMode::ExactOrHigher, AdmissionMode::Minimum] {
      for required in Role::ALL {
        let result = g.authorize(p.clone(), required, mode);
        assert_eq!(result.is_ok(), required <= Role::Apostle, "{required} {mode}");
      }
    }
  }
}
