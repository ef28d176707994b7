//! Error type for `churchos-store-sqlite`.

use churchos_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] churchos_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Another principal already holds this identity-provider subject.
  #[error("subject already provisioned: {0}")]
  DuplicateSubject(String),
}

impl StoreError for Error {
  fn is_unique_violation(&self) -> bool {
    matches!(self, Self::DuplicateSubject(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
