//! Test doubles for the identity provider and the principal store.

use std::{
  collections::HashMap,
  sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
  },
};

use chrono::Utc;
use churchos_core::{
  credential::DecodedCredential,
  identity::{IdentityProvider, ProviderError},
  principal::{NewPrincipal, Principal},
  role::Role,
  store::{PrincipalStore, StoreError},
};
use thiserror::Error;
use tokio::sync::Barrier;
use uuid::Uuid;

// ─── Provider ────────────────────────────────────────────────────────────────

/// Answers from a fixed token table; unknown tokens are malformed.
#[derive(Default)]
pub struct ScriptedProvider {
  answers: HashMap<String, Result<DecodedCredential, ProviderError>>,
  calls:   AtomicUsize,
}

impl ScriptedProvider {
  pub fn new() -> Self { Self::default() }

  pub fn accept(mut self, token: &str, claims: DecodedCredential) -> Self {
    self.answers.insert(token.to_owned(), Ok(claims));
    self
  }

  pub fn reject(mut self, token: &str, err: ProviderError) -> Self {
    self.answers.insert(token.to_owned(), Err(err));
    self
  }

  pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

impl IdentityProvider for ScriptedProvider {
  async fn verify_id_token(
    &self,
    raw: &str,
  ) -> Result<DecodedCredential, ProviderError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    self
      .answers
      .get(raw)
      .cloned()
      .unwrap_or(Err(ProviderError::Malformed))
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum MemoryError {
  #[error("duplicate subject: {0}")]
  Duplicate(String),

  #[error("store offline")]
  Offline,
}

impl StoreError for MemoryError {
  fn is_unique_violation(&self) -> bool { matches!(self, Self::Duplicate(_)) }
}

/// A principal store in a `Vec`, with knobs for the failure modes the
/// directory has to survive.
#[derive(Default)]
pub struct MemoryStore {
  rows:            Mutex<Vec<Principal>>,
  /// Holds the first `n` lookups until all of them have arrived, so that
  /// concurrent first logins all see "absent".
  race:            Option<(Arc<Barrier>, AtomicUsize)>,
  always_conflict: bool,
  offline:         bool,
  /// Updates report the row as gone.
  vanishing:       bool,
  reads:           AtomicUsize,
  writes:          AtomicUsize,
  conflicts:       AtomicUsize,
}

impl MemoryStore {
  pub fn racing(mut self, callers: usize) -> Self {
    self.race = Some((Arc::new(Barrier::new(callers)), AtomicUsize::new(callers)));
    self
  }

  pub fn always_conflict(mut self) -> Self {
    self.always_conflict = true;
    self
  }

  pub fn offline(mut self) -> Self {
    self.offline = true;
    self
  }

  pub fn vanishing(mut self) -> Self {
    self.vanishing = true;
    self
  }

  pub fn reads(&self) -> usize { self.reads.load(Ordering::SeqCst) }

  pub fn writes(&self) -> usize { self.writes.load(Ordering::SeqCst) }

  pub fn conflicts(&self) -> usize { self.conflicts.load(Ordering::SeqCst) }

  pub fn count_subject(&self, subject: &str) -> usize {
    self
      .rows
      .lock()
      .unwrap()
      .iter()
      .filter(|p| p.external_subject == subject)
      .count()
  }

  /// Set a role directly, bypassing the directory.
  pub fn force_role(&self, id: Uuid, role: Role) {
    if let Some(p) = self.rows.lock().unwrap().iter_mut().find(|p| p.id == id) {
      p.role = role;
    }
  }

  fn check_online(&self) -> Result<(), MemoryError> {
    if self.offline { Err(MemoryError::Offline) } else { Ok(()) }
  }

  async fn wait_for_racers(&self) {
    if let Some((barrier, remaining)) = &self.race {
      let claimed = remaining
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
      if claimed {
        barrier.wait().await;
      }
    }
  }

  fn find(&self, pred: impl Fn(&Principal) -> bool) -> Option<Principal> {
    self.rows.lock().unwrap().iter().find(|p| pred(p)).cloned()
  }

  fn modify(&self, id: Uuid, f: impl FnOnce(&mut Principal)) -> Option<Principal> {
    if self.vanishing {
      return None;
    }
    let mut rows = self.rows.lock().unwrap();
    let row = rows.iter_mut().find(|p| p.id == id)?;
    f(row);
    row.updated_at = Utc::now();
    self.writes.fetch_add(1, Ordering::SeqCst);
    Some(row.clone())
  }
}

impl PrincipalStore for MemoryStore {
  type Error = MemoryError;

  async fn find_by_subject(
    &self,
    subject: &str,
  ) -> Result<Option<Principal>, MemoryError> {
    self.check_online()?;
    self.reads.fetch_add(1, Ordering::SeqCst);
    // Snapshot first: the last racer through the barrier runs on without
    // yielding, and its insert must not be visible to the others.
    let found = self.find(|p| p.external_subject == subject);
    self.wait_for_racers().await;
    Ok(found)
  }

  async fn get_principal(&self, id: Uuid) -> Result<Option<Principal>, MemoryError> {
    self.check_online()?;
    self.reads.fetch_add(1, Ordering::SeqCst);
    Ok(self.find(|p| p.id == id))
  }

  async fn list_principals(&self) -> Result<Vec<Principal>, MemoryError> {
    self.check_online()?;
    Ok(self.rows.lock().unwrap().clone())
  }

  async fn insert_principal(
    &self,
    input: NewPrincipal,
  ) -> Result<Principal, MemoryError> {
    self.check_online()?;
    if self.always_conflict {
      self.conflicts.fetch_add(1, Ordering::SeqCst);
      return Err(MemoryError::Duplicate(input.external_subject));
    }

    let mut rows = self.rows.lock().unwrap();
    if rows.iter().any(|p| p.external_subject == input.external_subject) {
      self.conflicts.fetch_add(1, Ordering::SeqCst);
      return Err(MemoryError::Duplicate(input.external_subject));
    }

    let now = Utc::now();
    let principal = Principal {
      id:               Uuid::new_v4(),
      external_subject: input.external_subject,
      email:            input.email,
      display_name:     input.display_name,
      role:             input.role,
      active:           true,
      created_at:       now,
      updated_at:       now,
    };
    rows.push(principal.clone());
    self.writes.fetch_add(1, Ordering::SeqCst);
    Ok(principal)
  }

  async fn update_email(
    &self,
    id: Uuid,
    email: String,
  ) -> Result<Option<Principal>, MemoryError> {
    self.check_online()?;
    Ok(self.modify(id, |p| p.email = email))
  }

  async fn update_role(
    &self,
    id: Uuid,
    role: Role,
  ) -> Result<Option<Principal>, MemoryError> {
    self.check_online()?;
    Ok(self.modify(id, |p| p.role = role))
  }
}
