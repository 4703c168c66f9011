//! Error types for `roost-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("tweet record has an empty id")]
  EmptyId,

  #[error("tweet {0} has no account handle")]
  MissingAccount(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
