//! The `SubscriptionStore` trait.
//!
//! Implemented by storage backends (e.g. `billwatch-store-sqlite`). The HTTP
//! layer depends on this abstraction only.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  notification::{NewNotification, Notification, NotificationId},
  profile::{Profile, ProfileUpdate},
  reference::{BillId, BillRef, PersonId, PersonRef, UserId},
  subscription::{Subscription, SubscriptionSpec},
};

/// Coarse category of a backend failure, for callers that map errors to
/// responses without knowing the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
  /// A referenced user, subscription, bill, person or notification is absent.
  NotFound,
  /// The write collides with existing state (e.g. a second registration).
  Conflict,
  /// The input was rejected by validation or a schema constraint.
  Invalid,
  Internal,
}

/// Error type of a [`SubscriptionStore`] backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn failure(&self) -> Failure;
}

/// Abstraction over a subscription store backend.
///
/// Cascading deletes (user → profile and subscriptions, bill or person →
/// subscriptions) are the backend's job and must be atomic.
pub trait SubscriptionStore: Send + Sync {
  type Error: StoreError;

  // ── Users & profiles ──────────────────────────────────────────────────

  /// Register a user from the identity system and create its default
  /// profile in the same transaction. Fails if the user already exists.
  fn register_user(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  /// Remove a user together with its profile and subscriptions.
  /// Notifications are kept.
  fn delete_user(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_profile(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Apply a preference edit and return the stored result.
  fn update_profile(
    &self,
    user_id: UserId,
    update: ProfileUpdate,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  /// Record that a digest check for this user ran at `at`.
  fn mark_checked(
    &self,
    user_id: UserId,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Reference data ────────────────────────────────────────────────────

  /// Insert or refresh a mirrored bill.
  fn put_bill(
    &self,
    bill: BillRef,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Insert or refresh a mirrored person.
  fn put_person(
    &self,
    person: PersonRef,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove a bill and every subscription to it.
  fn delete_bill(
    &self,
    id: BillId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove a person and every subscription that references them.
  fn delete_person(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Subscriptions ─────────────────────────────────────────────────────

  /// Persist a new active subscription. Referenced bills and people must
  /// already be mirrored.
  fn subscribe(
    &self,
    user_id: UserId,
    spec: SubscriptionSpec,
  ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send + '_;

  fn get_subscription(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Subscription>, Self::Error>> + Send + '_;

  /// All of a user's subscriptions, oldest first.
  fn list_subscriptions(
    &self,
    user_id: UserId,
    active_only: bool,
  ) -> impl Future<Output = Result<Vec<Subscription>, Self::Error>> + Send + '_;

  /// Toggle the `active` flag and return the updated subscription.
  fn set_active(
    &self,
    id: Uuid,
    active: bool,
  ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send + '_;

  // ── Notifications ─────────────────────────────────────────────────────

  /// Append a sent-digest record; the store assigns its id.
  fn record_notification(
    &self,
    input: NewNotification,
  ) -> impl Future<Output = Result<Notification, Self::Error>> + Send + '_;

  fn get_notification(
    &self,
    id: NotificationId,
  ) -> impl Future<Output = Result<Option<Notification>, Self::Error>> + Send + '_;

  /// Digest history for an address, most recent first.
  fn list_notifications<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + 'a;
}
