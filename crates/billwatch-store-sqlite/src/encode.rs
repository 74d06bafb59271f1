//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs hyphenated lowercase strings, and
//! string sets compact JSON arrays. Blank optional text is an empty string.

use billwatch_core::{
  notification::{Notification, NotificationId},
  profile::{DigestFrequency, Profile},
  reference::{BillId, BillRef, PersonId, PersonRef, UserId},
  subscription::{Subscription, SubscriptionRecord},
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_user(id: UserId) -> String { encode_uuid(id.0) }

pub fn decode_user(s: &str) -> Result<UserId> { decode_uuid(s).map(UserId) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_list(items: &[String]) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

pub fn decode_list(s: &str) -> Result<Vec<String>> { Ok(serde_json::from_str(s)?) }

fn decode_count(column: &'static str, n: i64) -> Result<u32> {
  u32::try_from(n).map_err(|_| Error::Decode { column, value: n.to_string() })
}

// ─── Profiles ────────────────────────────────────────────────────────────────

/// Raw values read directly from a `profiles` row.
pub struct RawProfile {
  pub user_id:                   String,
  pub organization_name:         String,
  pub about:                     String,
  pub feature_subscriptions:     bool,
  pub subscription_emails_html:  bool,
  pub subscription_frequency:    String,
  pub subscription_last_checked: String,
}

impl RawProfile {
  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      user_id:                   decode_user(&self.user_id)?,
      organization_name:         Some(self.organization_name).filter(|o| !o.is_empty()),
      about:                     self.about,
      feature_subscriptions:     self.feature_subscriptions,
      subscription_emails_html:  self.subscription_emails_html,
      subscription_frequency:    DigestFrequency::from_code(&self.subscription_frequency)?,
      subscription_last_checked: decode_dt(&self.subscription_last_checked)?,
    })
  }
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

/// Column list shared by every subscription read; pair with
/// [`RawSubscription::from_row`].
pub const SUBSCRIPTION_SELECT: &str = "
SELECT
  s.subscription_id, s.user_id, s.active, s.created_at,
  s.query, s.state, s.chamber, s.session, s.classification,
  s.subjects, s.status,
  s.sponsor_id, p.name,
  s.bill_id, b.identifier, b.session, b.state, b.title
FROM subscriptions s
LEFT JOIN people p ON p.person_id = s.sponsor_id
LEFT JOIN bills  b ON b.bill_id   = s.bill_id
";

/// Raw values from a `subscriptions` row joined with its references.
pub struct RawSubscription {
  pub subscription_id: String,
  pub user_id:         String,
  pub active:          bool,
  pub created_at:      String,
  pub query:           String,
  pub state:           String,
  pub chamber:         String,
  pub session:         String,
  pub classification:  String,
  pub subjects:        String,
  pub status:          String,
  // people join
  pub sponsor_id:      Option<String>,
  pub sponsor_name:    Option<String>,
  // bills join
  pub bill_id:         Option<String>,
  pub bill_identifier: Option<String>,
  pub bill_session:    Option<String>,
  pub bill_state:      Option<String>,
  pub bill_title:      Option<String>,
}

impl RawSubscription {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      subscription_id: row.get(0)?,
      user_id:         row.get(1)?,
      active:          row.get(2)?,
      created_at:      row.get(3)?,
      query:           row.get(4)?,
      state:           row.get(5)?,
      chamber:         row.get(6)?,
      session:         row.get(7)?,
      classification:  row.get(8)?,
      subjects:        row.get(9)?,
      status:          row.get(10)?,
      sponsor_id:      row.get(11)?,
      sponsor_name:    row.get(12)?,
      bill_id:         row.get(13)?,
      bill_identifier: row.get(14)?,
      bill_session:    row.get(15)?,
      bill_state:      row.get(16)?,
      bill_title:      row.get(17)?,
    })
  }

  /// Decode and classify. A row that classifies as nothing is a data
  /// integrity bug; it is logged here and returned to the caller.
  pub fn into_subscription(self) -> Result<Subscription> {
    let subscription_id = decode_uuid(&self.subscription_id)?;

    let sponsor = match (self.sponsor_id, self.sponsor_name) {
      (Some(id), Some(name)) => Some(PersonRef { id: PersonId(id), name }),
      (Some(id), None) => return Err(Error::Decode { column: "sponsor_id", value: id }),
      (None, _) => None,
    };

    let bill = match self.bill_id {
      Some(id) => match (
        self.bill_identifier,
        self.bill_session,
        self.bill_state,
        self.bill_title,
      ) {
        (Some(identifier), Some(session), Some(state), Some(title)) => Some(BillRef {
          id: BillId(id),
          identifier,
          session,
          state,
          title,
        }),
        _ => return Err(Error::Decode { column: "bill_id", value: id }),
      },
      None => None,
    };

    let record = SubscriptionRecord {
      bill,
      sponsor,
      query: self.query,
      state: self.state,
      chamber: self.chamber,
      session: self.session,
      classification: self.classification,
      subjects: decode_list(&self.subjects)?,
      status: decode_list(&self.status)?,
    };

    let target = record.into_target().inspect_err(|e| {
      tracing::error!(%subscription_id, error = %e, "stored subscription failed classification");
    })?;

    Ok(Subscription {
      subscription_id,
      user_id: decode_user(&self.user_id)?,
      active: self.active,
      created_at: decode_dt(&self.created_at)?,
      target,
    })
  }
}

// ─── Notifications ───────────────────────────────────────────────────────────

/// Raw values from a `notifications` row.
pub struct RawNotification {
  pub notification_id:   String,
  pub email:             String,
  pub sent:              String,
  pub num_query_updates: i64,
  pub num_bill_updates:  i64,
}

impl RawNotification {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      notification_id:   row.get(0)?,
      email:             row.get(1)?,
      sent:              row.get(2)?,
      num_query_updates: row.get(3)?,
      num_bill_updates:  row.get(4)?,
    })
  }

  pub fn into_notification(self) -> Result<Notification> {
    Ok(Notification {
      id:                NotificationId::parse(&self.notification_id)?,
      email:             self.email,
      sent:              decode_dt(&self.sent)?,
      num_query_updates: decode_count("num_query_updates", self.num_query_updates)?,
      num_bill_updates:  decode_count("num_bill_updates", self.num_bill_updates)?,
    })
  }
}
