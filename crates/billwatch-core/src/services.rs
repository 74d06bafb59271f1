//! Process-wide sources of time and randomness, injectable for tests.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Current-time source.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Random identifier source.
pub trait IdSource: Send + Sync {
  fn next_uuid(&self) -> Uuid;

  /// A fresh random 128-bit value; defaults to the bits of a v4 UUID.
  fn next_u128(&self) -> u128 { self.next_uuid().as_u128() }
}

/// Wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// Random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
  fn next_uuid(&self) -> Uuid { Uuid::new_v4() }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> { self.0 }
}

/// Deterministic ids counting up from a seed; every call yields a new value.
#[derive(Debug, Default)]
pub struct SequentialIds {
  next: AtomicU64,
}

impl SequentialIds {
  pub fn starting_at(seed: u64) -> Self {
    Self { next: AtomicU64::new(seed) }
  }
}

impl IdSource for SequentialIds {
  fn next_uuid(&self) -> Uuid {
    let n = self.next.fetch_add(1, Ordering::Relaxed);
    Uuid::from_u128(u128::from(n))
  }
}
