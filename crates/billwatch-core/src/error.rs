//! Error types for `billwatch-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A stored subscription has none of bill, query or sponsor populated.
  /// Carries a debug rendering of the offending record.
  #[error("invalid subscription: {0}")]
  InvalidSubscription(String),

  #[error("invalid search url {url:?}: {reason}")]
  InvalidSearchUrl { url: String, reason: String },

  #[error("invalid notification id: {0:?}")]
  InvalidNotificationId(String),

  #[error("unknown digest frequency: {0:?}")]
  UnknownFrequency(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
