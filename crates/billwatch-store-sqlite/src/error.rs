//! Error type for `billwatch-store-sqlite`.

use billwatch_core::{
  reference::{BillId, PersonId, UserId},
  store::{Failure, StoreError},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] billwatch_core::Error),

  /// Caller input failed domain validation before touching the database.
  #[error("invalid input: {0}")]
  Invalid(billwatch_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A column held a value no domain type accepts.
  #[error("cannot decode column {column}: {value:?}")]
  Decode { column: &'static str, value: String },

  #[error("user not found: {0}")]
  UserNotFound(UserId),

  #[error("user already registered: {0}")]
  UserExists(UserId),

  #[error("subscription not found: {0}")]
  SubscriptionNotFound(uuid::Uuid),

  #[error("bill not found: {0}")]
  BillNotFound(BillId),

  #[error("person not found: {0}")]
  PersonNotFound(PersonId),
}

impl StoreError for Error {
  fn failure(&self) -> Failure {
    match self {
      Self::UserNotFound(_)
      | Self::SubscriptionNotFound(_)
      | Self::BillNotFound(_)
      | Self::PersonNotFound(_) => Failure::NotFound,
      Self::UserExists(_) => Failure::Conflict,
      Self::Invalid(_) => Failure::Invalid,
      Self::Database(tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _)))
        if e.code == rusqlite::ErrorCode::ConstraintViolation =>
      {
        Failure::Invalid
      }
      _ => Failure::Internal,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
