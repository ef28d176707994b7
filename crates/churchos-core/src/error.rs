//! Error types for `churchos-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown role: {0:?}")]
  UnknownRole(String),

  #[error("role rank out of range: {0}")]
  UnknownRank(u8),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
