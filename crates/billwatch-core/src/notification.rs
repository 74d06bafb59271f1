//! Sent-digest audit records.
//!
//! A notification is written once when a digest goes out and never changes.
//! The recipient address is a snapshot: accounts and addresses may change or
//! disappear later without touching the history.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, services::IdSource};

const BASE62: &[u8; 62] =
  b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Longest base-62 rendering of a `u128`.
pub const MAX_ID_LEN: usize = 22;

fn encode_base62(mut n: u128) -> String {
  if n == 0 {
    return "0".to_owned();
  }
  let mut digits = Vec::with_capacity(MAX_ID_LEN);
  while n > 0 {
    digits.push(BASE62[(n % 62) as usize]);
    n /= 62;
  }
  digits.reverse();
  // Every byte comes from the ASCII alphabet above.
  digits.into_iter().map(char::from).collect()
}

fn decode_base62(s: &str) -> Option<u128> {
  if s.is_empty() || s.len() > MAX_ID_LEN {
    return None;
  }
  s.bytes().try_fold(0u128, |acc, b| {
    let digit = match b {
      b'0'..=b'9' => b - b'0',
      b'A'..=b'Z' => b - b'A' + 10,
      b'a'..=b'z' => b - b'a' + 36,
      _ => return None,
    };
    acc.checked_mul(62)?.checked_add(u128::from(digit))
  })
}

/// Compact, URL-safe primary key of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NotificationId(String);

impl NotificationId {
  /// Draw a fresh id from 128 random bits.
  pub fn generate(ids: &dyn IdSource) -> Self { Self::from_u128(ids.next_u128()) }

  pub fn from_u128(n: u128) -> Self { Self(encode_base62(n)) }

  /// Accept only strings that are the canonical encoding of some `u128`.
  pub fn parse(s: &str) -> Result<Self> {
    match decode_base62(s) {
      Some(n) if encode_base62(n) == s => Ok(Self(s.to_owned())),
      _ => Err(Error::InvalidNotificationId(s.to_owned())),
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn to_u128(&self) -> u128 {
    // Construction guarantees a valid encoding.
    decode_base62(&self.0).unwrap_or_default()
  }
}

impl TryFrom<String> for NotificationId {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { Self::parse(&s) }
}

impl From<NotificationId> for String {
  fn from(id: NotificationId) -> Self { id.0 }
}

impl fmt::Display for NotificationId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// One digest email sent to one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
  pub id:                NotificationId,
  pub email:             String,
  pub sent:              DateTime<Utc>,
  pub num_query_updates: u32,
  pub num_bill_updates:  u32,
}

/// Input to [`crate::store::SubscriptionStore::record_notification`]; the id
/// is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
  pub email:             String,
  pub sent:              DateTime<Utc>,
  pub num_query_updates: u32,
  pub num_bill_updates:  u32,
}

impl NewNotification {
  pub fn with_id(self, id: NotificationId) -> Notification {
    Notification {
      id,
      email: self.email,
      sent: self.sent,
      num_query_updates: self.num_query_updates,
      num_bill_updates: self.num_bill_updates,
    }
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use super::*;
  use crate::services::RandomIds;

  #[test]
  fn known_encodings() {
    assert_eq!(NotificationId::from_u128(0).as_str(), "0");
    assert_eq!(NotificationId::from_u128(61).as_str(), "z");
    assert_eq!(NotificationId::from_u128(62).as_str(), "10");
    assert_eq!(
      NotificationId::from_u128(u128::MAX).as_str(),
      "7n42DGM5Tflk9n8mt7Fhc7"
    );
  }

  #[test]
  fn generated_ids_are_distinct_and_compact() {
    let ids: HashSet<NotificationId> =
      (0..1000).map(|_| NotificationId::generate(&RandomIds)).collect();
    assert_eq!(ids.len(), 1000);
    for id in &ids {
      assert!(id.as_str().len() <= MAX_ID_LEN);
      assert!(id.as_str().bytes().all(|b| b.is_ascii_alphanumeric()));
      assert_eq!(NotificationId::from_u128(id.to_u128()), *id);
    }
  }

  #[test]
  fn parse_rejects_non_canonical() {
    assert!(NotificationId::parse("abc-def").is_err());
    assert!(NotificationId::parse("").is_err());
    // Leading zeros never come out of the encoder.
    assert!(NotificationId::parse("0z").is_err());
    // One past u128::MAX.
    assert!(NotificationId::parse("7n42DGM5Tflk9n8mt7Fhc8").is_err());
    assert!(NotificationId::parse("7n42DGM5Tflk9n8mt7Fhc7").is_ok());
  }

  #[test]
  fn serde_validates() {
    let ok: NotificationId = serde_json::from_str("\"4fR\"").unwrap();
    assert_eq!(ok.as_str(), "4fR");
    assert!(serde_json::from_str::<NotificationId>("\"no/slash\"").is_err());
  }
}
