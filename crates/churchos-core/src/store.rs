//! The `PrincipalStore` trait.
//!
//! Implemented by storage backends (e.g. `churchos-store-sqlite`). The user
//! directory and the HTTP layer depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  principal::{NewPrincipal, Principal},
  role::Role,
};

/// Errors produced by a [`PrincipalStore`].
///
/// The directory needs to tell a lost first-login race apart from every other
/// failure, so backends must classify uniqueness violations.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// `true` if the write collided with an existing `external_subject`.
  fn is_unique_violation(&self) -> bool;
}

impl StoreError for std::convert::Infallible {
  fn is_unique_violation(&self) -> bool { match *self {} }
}

/// Abstraction over a principal store backend.
///
/// Each method is a single unit of work, committed atomically by the backend.
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait PrincipalStore: Send + Sync {
  type Error: StoreError;

  /// Look up a principal by its identity-provider subject.
  fn find_by_subject<'a>(
    &'a self,
    subject: &'a str,
  ) -> impl Future<Output = Result<Option<Principal>, Self::Error>> + Send + 'a;

  /// Retrieve a principal by internal id. Returns `None` if not found.
  fn get_principal(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Principal>, Self::Error>> + Send + '_;

  /// All principals, oldest first.
  fn list_principals(
    &self,
  ) -> impl Future<Output = Result<Vec<Principal>, Self::Error>> + Send + '_;

  /// Persist a new principal. The store assigns `id`, `active` and both
  /// timestamps.
  ///
  /// Fails with an error whose [`StoreError::is_unique_violation`] is `true`
  /// if `external_subject` is already taken.
  fn insert_principal(
    &self,
    input: NewPrincipal,
  ) -> impl Future<Output = Result<Principal, Self::Error>> + Send + '_;

  /// Replace the stored email and refresh `updated_at`.
  /// Returns `None` if `id` is unknown.
  fn update_email(
    &self,
    id: Uuid,
    email: String,
  ) -> impl Future<Output = Result<Option<Principal>, Self::Error>> + Send + '_;

  /// Replace the stored role and refresh `updated_at`.
  /// Returns `None` if `id` is unknown.
  fn update_role(
    &self,
    id: Uuid,
    role: Role,
  ) -> impl Future<Output = Result<Option<Principal>, Self::Error>> + Send + '_;
}
