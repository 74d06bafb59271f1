//! Read-only references to legislative entities owned by another system.
//!
//! Bills and people are looked up by id and only carry what the presenters
//! need: a display string and enough context for a [`PrettyUrl`] resolver.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a user in the external identity store.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

/// Opaque bill identifier, e.g. `ocd-bill/8a3b…`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillId(pub String);

/// Opaque person identifier, e.g. `ocd-person/52c1…`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub String);

impl BillId {
  pub fn as_str(&self) -> &str { &self.0 }
}

impl PersonId {
  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for BillId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl fmt::Display for PersonId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for BillId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<&str> for PersonId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

/// A bill as seen from the subscription model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillRef {
  pub id:         BillId,
  /// Chamber-local identifier, e.g. `"HB 22"`.
  pub identifier: String,
  /// Legislative session identifier, e.g. `"2023"`.
  pub session:    String,
  /// Two-letter state code of the owning jurisdiction.
  pub state:      String,
  pub title:      String,
}

impl fmt::Display for BillRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} in {}", self.identifier, self.session)
  }
}

/// A legislator, referenced as a bill sponsor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
  pub id:   PersonId,
  pub name: String,
}

impl fmt::Display for PersonRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.name) }
}

/// Canonical human-facing links for reference entities.
///
/// Implemented by whatever layer routes the public site; the subscription
/// presenters only delegate to it.
pub trait PrettyUrl {
  fn bill_url(&self, bill: &BillRef) -> String;
  fn person_url(&self, person: &PersonRef) -> String;
}
