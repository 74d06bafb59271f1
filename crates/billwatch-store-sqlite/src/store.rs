//! [`SqliteStore`], the SQLite implementation of [`SubscriptionStore`].

use std::{path::Path, sync::Arc};

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use billwatch_core::{
  notification::{NewNotification, Notification, NotificationId},
  profile::{Profile, ProfileUpdate},
  reference::{BillId, BillRef, PersonId, PersonRef, UserId},
  services::{Clock, IdSource, RandomIds, SystemClock},
  store::SubscriptionStore,
  subscription::{Subscription, SubscriptionSpec},
};

use crate::{
  Error, Result,
  encode::{
    RawNotification, RawProfile, RawSubscription, SUBSCRIPTION_SELECT, encode_dt,
    encode_list, encode_user, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A subscription store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:  tokio_rusqlite::Connection,
  clock: Arc<dyn Clock>,
  ids:   Arc<dyn IdSource>,
}

/// Column values for one `subscriptions` insert.
struct NewRow {
  query:          String,
  state:          String,
  chamber:        String,
  session:        String,
  classification: String,
  subjects:       String,
  status:         String,
  sponsor_id:     Option<String>,
  bill_id:        Option<String>,
}

impl NewRow {
  fn from_spec(spec: SubscriptionSpec) -> Result<Self> {
    let empty = encode_list(&[])?;
    Ok(match spec {
      SubscriptionSpec::Bill { bill_id } => Self {
        query:          String::new(),
        state:          String::new(),
        chamber:        String::new(),
        session:        String::new(),
        classification: String::new(),
        subjects:       empty.clone(),
        status:         empty,
        sponsor_id:     None,
        bill_id:        Some(bill_id.0),
      },
      SubscriptionSpec::Sponsor { sponsor_id } => Self {
        query:          String::new(),
        state:          String::new(),
        chamber:        String::new(),
        session:        String::new(),
        classification: String::new(),
        subjects:       empty.clone(),
        status:         empty,
        sponsor_id:     Some(sponsor_id.0),
        bill_id:        None,
      },
      SubscriptionSpec::Query(params) => Self {
        subjects:       encode_list(&params.subjects)?,
        status:         encode_list(&params.status)?,
        query:          params.query,
        state:          params.state.unwrap_or_default(),
        chamber:        params.chamber.unwrap_or_default(),
        session:        params.session.unwrap_or_default(),
        classification: params.classification.unwrap_or_default(),
        sponsor_id:     params.sponsor_id.map(|id| id.0),
        bill_id:        None,
      },
    })
  }
}

/// Why an insert into `subscriptions` did not happen.
enum Missing {
  User,
  Bill(String),
  Person(String),
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self {
      conn,
      clock: Arc::new(SystemClock),
      ids: Arc::new(RandomIds),
    })
  }

  /// Replace the time source used for creation and check timestamps.
  pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
    self.clock = Arc::new(clock);
    self
  }

  /// Replace the randomness used for subscription and notification ids.
  pub fn with_ids(mut self, ids: impl IdSource + 'static) -> Self {
    self.ids = Arc::new(ids);
    self
  }

  /// Raw connection, for tests that write rows the public API refuses to.
  #[cfg(test)]
  pub(crate) fn conn(&self) -> &tokio_rusqlite::Connection { &self.conn }

  async fn fetch_subscription(&self, id: Uuid) -> Result<Option<Subscription>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSubscription> = self
      .conn
      .call(move |conn| {
        let sql = format!("{SUBSCRIPTION_SELECT} WHERE s.subscription_id = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawSubscription::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubscription::into_subscription).transpose()
  }
}

// ─── SubscriptionStore impl ──────────────────────────────────────────────────

impl SubscriptionStore for SqliteStore {
  type Error = Error;

  // ── Users & profiles ──────────────────────────────────────────────────────

  async fn register_user(&self, user_id: UserId) -> Result<Profile> {
    let profile = Profile::new(user_id, self.clock.now());

    let id_str      = encode_user(user_id);
    let checked_str = encode_dt(profile.subscription_last_checked);
    let freq        = profile.subscription_frequency.code();
    let html        = profile.subscription_emails_html;
    let feature     = profile.feature_subscriptions;

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let inserted = tx.execute(
          "INSERT OR IGNORE INTO users (user_id) VALUES (?1)",
          rusqlite::params![id_str],
        )? == 1;
        if inserted {
          tx.execute(
            "INSERT INTO profiles (
               user_id, feature_subscriptions, subscription_emails_html,
               subscription_frequency, subscription_last_checked
             ) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![id_str, feature, html, freq, checked_str],
          )?;
        }
        tx.commit()?;
        Ok(inserted)
      })
      .await?;

    if !inserted {
      return Err(Error::UserExists(user_id));
    }
    tracing::info!(%user_id, "registered user");
    Ok(profile)
  }

  async fn delete_user(&self, user_id: UserId) -> Result<()> {
    let id_str = encode_user(user_id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM users WHERE user_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::UserNotFound(user_id));
    }
    tracing::info!(%user_id, "deleted user");
    Ok(())
  }

  async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>> {
    let id_str = encode_user(user_id);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, organization_name, about, feature_subscriptions,
                      subscription_emails_html, subscription_frequency,
                      subscription_last_checked
               FROM profiles WHERE user_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawProfile {
                  user_id:                   row.get(0)?,
                  organization_name:         row.get(1)?,
                  about:                     row.get(2)?,
                  feature_subscriptions:     row.get(3)?,
                  subscription_emails_html:  row.get(4)?,
                  subscription_frequency:    row.get(5)?,
                  subscription_last_checked: row.get(6)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn update_profile(&self, user_id: UserId, update: ProfileUpdate) -> Result<Profile> {
    let id_str = encode_user(user_id);
    let freq   = update.subscription_frequency.map(|f| f.code());

    // NULL parameters keep the stored value.
    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE profiles SET
             organization_name        = COALESCE(?2, organization_name),
             about                    = COALESCE(?3, about),
             feature_subscriptions    = COALESCE(?4, feature_subscriptions),
             subscription_emails_html = COALESCE(?5, subscription_emails_html),
             subscription_frequency   = COALESCE(?6, subscription_frequency)
           WHERE user_id = ?1",
          rusqlite::params![
            id_str,
            update.organization_name,
            update.about,
            update.feature_subscriptions,
            update.subscription_emails_html,
            freq,
          ],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::UserNotFound(user_id));
    }
    self.get_profile(user_id).await?.ok_or(Error::UserNotFound(user_id))
  }

  async fn mark_checked(&self, user_id: UserId, at: DateTime<Utc>) -> Result<()> {
    let id_str = encode_user(user_id);
    let at_str = encode_dt(at);

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE profiles SET subscription_last_checked = ?2 WHERE user_id = ?1",
          rusqlite::params![id_str, at_str],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::UserNotFound(user_id));
    }
    Ok(())
  }

  // ── Reference data ────────────────────────────────────────────────────────

  async fn put_bill(&self, bill: BillRef) -> Result<()> {
    // Upsert rather than INSERT OR REPLACE: a replace deletes the old row
    // first and would cascade into its subscriptions.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO bills (bill_id, identifier, session, state, title)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (bill_id) DO UPDATE SET
             identifier = excluded.identifier,
             session    = excluded.session,
             state      = excluded.state,
             title      = excluded.title",
          rusqlite::params![bill.id.0, bill.identifier, bill.session, bill.state, bill.title],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn put_person(&self, person: PersonRef) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO people (person_id, name) VALUES (?1, ?2)
           ON CONFLICT (person_id) DO UPDATE SET name = excluded.name",
          rusqlite::params![person.id.0, person.name],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_bill(&self, id: BillId) -> Result<()> {
    let id_str = id.0.clone();

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM bills WHERE bill_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::BillNotFound(id));
    }
    tracing::info!(bill_id = %id, "deleted bill and its subscriptions");
    Ok(())
  }

  async fn delete_person(&self, id: PersonId) -> Result<()> {
    let id_str = id.0.clone();

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM people WHERE person_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::PersonNotFound(id));
    }
    tracing::info!(person_id = %id, "deleted person and their subscriptions");
    Ok(())
  }

  // ── Subscriptions ─────────────────────────────────────────────────────────

  async fn subscribe(&self, user_id: UserId, spec: SubscriptionSpec) -> Result<Subscription> {
    let spec = spec.validate().map_err(Error::Invalid)?;
    let kind = spec.kind();
    let row  = NewRow::from_spec(spec)?;

    let subscription_id = self.ids.next_uuid();
    let sub_id_str      = encode_uuid(subscription_id);
    let user_id_str     = encode_user(user_id);
    let created_str     = encode_dt(self.clock.now());

    let missing: Option<Missing> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let exists = |sql: &str, key: &str| -> rusqlite::Result<bool> {
          Ok(
            tx.query_row(sql, rusqlite::params![key], |_| Ok(()))
              .optional()?
              .is_some(),
          )
        };

        if !exists("SELECT 1 FROM users WHERE user_id = ?1", &user_id_str)? {
          return Ok(Some(Missing::User));
        }
        if let Some(bill_id) = &row.bill_id
          && !exists("SELECT 1 FROM bills WHERE bill_id = ?1", bill_id)?
        {
          return Ok(Some(Missing::Bill(bill_id.clone())));
        }
        if let Some(sponsor_id) = &row.sponsor_id
          && !exists("SELECT 1 FROM people WHERE person_id = ?1", sponsor_id)?
        {
          return Ok(Some(Missing::Person(sponsor_id.clone())));
        }

        tx.execute(
          "INSERT INTO subscriptions (
             subscription_id, user_id, active, created_at,
             query, state, chamber, session, classification,
             subjects, status, sponsor_id, bill_id
           ) VALUES (?1, ?2, 1, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          rusqlite::params![
            sub_id_str,
            user_id_str,
            created_str,
            row.query,
            row.state,
            row.chamber,
            row.session,
            row.classification,
            row.subjects,
            row.status,
            row.sponsor_id,
            row.bill_id,
          ],
        )?;
        tx.commit()?;
        Ok(None)
      })
      .await?;

    match missing {
      Some(Missing::User) => return Err(Error::UserNotFound(user_id)),
      Some(Missing::Bill(id)) => return Err(Error::BillNotFound(BillId(id))),
      Some(Missing::Person(id)) => return Err(Error::PersonNotFound(PersonId(id))),
      None => {}
    }

    tracing::info!(%user_id, %subscription_id, %kind, "created subscription");
    self
      .fetch_subscription(subscription_id)
      .await?
      .ok_or(Error::SubscriptionNotFound(subscription_id))
  }

  async fn get_subscription(&self, id: Uuid) -> Result<Option<Subscription>> {
    self.fetch_subscription(id).await
  }

  async fn list_subscriptions(
    &self,
    user_id:     UserId,
    active_only: bool,
  ) -> Result<Vec<Subscription>> {
    let id_str = encode_user(user_id);

    let raws: Vec<RawSubscription> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "{SUBSCRIPTION_SELECT}
           WHERE s.user_id = ?1 AND (?2 = 0 OR s.active = 1)
           ORDER BY s.created_at, s.rowid"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id_str, active_only], RawSubscription::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubscription::into_subscription).collect()
  }

  async fn set_active(&self, id: Uuid, active: bool) -> Result<Subscription> {
    let id_str = encode_uuid(id);

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE subscriptions SET active = ?2 WHERE subscription_id = ?1",
          rusqlite::params![id_str, active],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::SubscriptionNotFound(id));
    }
    tracing::debug!(subscription_id = %id, active, "toggled subscription");
    self.fetch_subscription(id).await?.ok_or(Error::SubscriptionNotFound(id))
  }

  // ── Notifications ─────────────────────────────────────────────────────────

  async fn record_notification(&self, input: NewNotification) -> Result<Notification> {
    let notification = input.with_id(NotificationId::generate(self.ids.as_ref()));

    let id_str    = notification.id.as_str().to_owned();
    let email     = notification.email.clone();
    let sent_str  = encode_dt(notification.sent);
    let n_query   = i64::from(notification.num_query_updates);
    let n_bill    = i64::from(notification.num_bill_updates);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO notifications (
             notification_id, email, sent, num_query_updates, num_bill_updates
           ) VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, email, sent_str, n_query, n_bill],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(notification_id = %notification.id, "recorded notification");
    Ok(notification)
  }

  async fn get_notification(&self, id: NotificationId) -> Result<Option<Notification>> {
    let id_str = id.as_str().to_owned();

    let raw: Option<RawNotification> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT notification_id, email, sent, num_query_updates, num_bill_updates
               FROM notifications WHERE notification_id = ?1",
              rusqlite::params![id_str],
              RawNotification::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawNotification::into_notification).transpose()
  }

  async fn list_notifications<'a>(&'a self, email: &'a str) -> Result<Vec<Notification>> {
    let email = email.to_owned();

    let raws: Vec<RawNotification> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT notification_id, email, sent, num_query_updates, num_bill_updates
           FROM notifications WHERE email = ?1
           ORDER BY sent DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![email], RawNotification::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNotification::into_notification).collect()
  }
}
