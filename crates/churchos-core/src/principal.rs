//! Principal: the internal user record resolved from an external identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::Role;

/// Display name stored when the identity provider supplies none.
pub const FALLBACK_DISPLAY_NAME: &str = "Unknown User";

/// A persisted user.
///
/// `id` and `external_subject` never change after creation. `role` changes
/// only through explicit role assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
  pub id:               Uuid,
  /// Subject identifier issued by the identity provider; unique.
  pub external_subject: String,
  /// May be empty.
  pub email:            String,
  pub display_name:     String,
  pub role:             Role,
  pub active:           bool,
  pub created_at:       DateTime<Utc>,
  pub updated_at:       DateTime<Utc>,
}

/// Input to [`crate::store::PrincipalStore::insert_principal`].
/// `id`, `active` and the timestamps are set by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrincipal {
  pub external_subject: String,
  pub email:            String,
  pub display_name:     String,
  pub role:             Role,
}

impl NewPrincipal {
  /// A first-login record with the lowest role.
  pub fn provisioned(
    external_subject: impl Into<String>,
    email: Option<&str>,
    display_name: Option<&str>,
  ) -> Self {
    Self {
      external_subject: external_subject.into(),
      email:            email.unwrap_or_default().to_owned(),
      display_name:     display_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(FALLBACK_DISPLAY_NAME)
        .to_owned(),
      role:             Role::LOWEST,
    }
  }
}
