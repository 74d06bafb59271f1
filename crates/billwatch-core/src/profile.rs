//! Per-user notification preferences.
//!
//! Exactly one profile exists per user. It is created when the user
//! registers and goes away with the user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, reference::UserId};

/// How often a user receives a digest email.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DigestFrequency {
  Daily,
  #[default]
  Weekly,
}

impl DigestFrequency {
  /// Single-character code kept in the `subscription_frequency` column.
  pub fn code(self) -> &'static str {
    match self {
      Self::Daily => "d",
      Self::Weekly => "w",
    }
  }

  pub fn from_code(code: &str) -> Result<Self> {
    match code {
      "d" => Ok(Self::Daily),
      "w" => Ok(Self::Weekly),
      other => Err(Error::UnknownFrequency(other.to_owned())),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  pub user_id:                   UserId,
  pub organization_name:         Option<String>,
  pub about:                     String,
  /// Gates access to the subscriptions feature.
  pub feature_subscriptions:     bool,
  /// HTML digests when `true`, plain text otherwise.
  pub subscription_emails_html:  bool,
  pub subscription_frequency:    DigestFrequency,
  pub subscription_last_checked: DateTime<Utc>,
}

impl Profile {
  /// A freshly registered user's profile; `created_at` seeds the
  /// last-checked timestamp.
  pub fn new(user_id: UserId, created_at: DateTime<Utc>) -> Self {
    Self {
      user_id,
      organization_name: None,
      about: String::new(),
      feature_subscriptions: false,
      subscription_emails_html: true,
      subscription_frequency: DigestFrequency::default(),
      subscription_last_checked: created_at,
    }
  }

  /// Apply a preference edit in place.
  pub fn apply(&mut self, update: ProfileUpdate) {
    if let Some(org) = update.organization_name {
      self.organization_name = Some(org).filter(|o| !o.is_empty());
    }
    if let Some(about) = update.about {
      self.about = about;
    }
    if let Some(flag) = update.feature_subscriptions {
      self.feature_subscriptions = flag;
    }
    if let Some(html) = update.subscription_emails_html {
      self.subscription_emails_html = html;
    }
    if let Some(freq) = update.subscription_frequency {
      self.subscription_frequency = freq;
    }
  }
}

/// A partial edit of a [`Profile`]. Absent fields are left untouched; an
/// empty `organization_name` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
  pub organization_name:        Option<String>,
  pub about:                    Option<String>,
  pub feature_subscriptions:    Option<bool>,
  pub subscription_emails_html: Option<bool>,
  pub subscription_frequency:   Option<DigestFrequency>,
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use uuid::Uuid;

  use super::*;

  fn profile() -> Profile {
    let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    Profile::new(UserId(Uuid::nil()), at)
  }

  #[test]
  fn defaults() {
    let p = profile();
    assert_eq!(p.subscription_frequency, DigestFrequency::Weekly);
    assert!(p.subscription_emails_html);
    assert!(!p.feature_subscriptions);
    assert_eq!(p.organization_name, None);
    assert_eq!(
      p.subscription_last_checked,
      Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    );
  }

  #[test]
  fn apply_only_touches_present_fields() {
    let mut p = profile();
    p.apply(ProfileUpdate {
      organization_name: Some("League of Voters".into()),
      subscription_frequency: Some(DigestFrequency::Daily),
      ..Default::default()
    });
    assert_eq!(p.organization_name.as_deref(), Some("League of Voters"));
    assert_eq!(p.subscription_frequency, DigestFrequency::Daily);
    assert!(p.subscription_emails_html);

    p.apply(ProfileUpdate {
      organization_name: Some(String::new()),
      ..Default::default()
    });
    assert_eq!(p.organization_name, None);
    assert_eq!(p.subscription_frequency, DigestFrequency::Daily);
  }

  #[test]
  fn frequency_codes() {
    assert_eq!(DigestFrequency::from_code("d").unwrap(), DigestFrequency::Daily);
    assert_eq!(DigestFrequency::Weekly.code(), "w");
    assert_eq!(DigestFrequency::Daily.to_string(), "daily");
    assert!(matches!(
      DigestFrequency::from_code("m"),
      Err(Error::UnknownFrequency(_))
    ));
  }
}
