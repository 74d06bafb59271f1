//! Subscriptions: saved criteria a user wants digest updates for.
//!
//! Storage keeps a subscription as a flat row of nullable columns
//! ([`SubscriptionRecord`]). Exactly one of bill, sponsor or a non-empty query
//! is expected to be populated; the classifier resolves which one, and the
//! domain type [`SubscriptionTarget`] carries only the resolved variant.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  reference::{BillId, BillRef, PersonId, PersonRef, PrettyUrl, UserId},
  search::{SearchParams, non_empty},
};

// ─── Kind ────────────────────────────────────────────────────────────────────

/// The three mutually exclusive kinds of subscription.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::AsRefStr,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubscriptionKind {
  Bill,
  Sponsor,
  Query,
}

// ─── Query payload ───────────────────────────────────────────────────────────

/// A saved search. `sponsor` is an optional extra filter, distinct from a
/// sponsor subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilter {
  pub query:          String,
  pub state:          Option<String>,
  pub chamber:        Option<String>,
  pub session:        Option<String>,
  pub classification: Option<String>,
  pub subjects:       Vec<String>,
  pub status:         Vec<String>,
  pub sponsor:        Option<PersonRef>,
}

impl QueryFilter {
  /// The id-only parameters encoded into the search link.
  pub fn search_params(&self) -> SearchParams {
    SearchParams {
      query:          self.query.clone(),
      state:          self.state.clone(),
      chamber:        self.chamber.clone(),
      session:        self.session.clone(),
      classification: self.classification.clone(),
      subjects:       self.subjects.clone(),
      status:         self.status.clone(),
      sponsor_id:     self.sponsor.as_ref().map(|p| p.id.clone()),
    }
    .normalize()
  }

  pub fn pretty(&self) -> String {
    let state = non_empty(&self.state)
      .map(str::to_uppercase)
      .unwrap_or_else(|| "all states".to_owned());
    let mut out = format!("Bills matching '{}' from {state}", self.query);

    if let Some(chamber @ ("upper" | "lower")) = self.chamber.as_deref() {
      out.push_str(&format!(", {chamber} chamber"));
    }
    if let Some(session) = non_empty(&self.session) {
      out.push_str(&format!(", {session}"));
    }
    if let Some(classification) = non_empty(&self.classification) {
      out.push_str(&format!(", classified as {classification}"));
    }
    if !self.subjects.is_empty() {
      out.push_str(&format!(", including subjects '{}'", self.subjects.join(", ")));
    }
    if !self.status.is_empty() {
      out.push_str(&format!(", status includes '{}'", self.status.join(", ")));
    }
    if let Some(sponsor) = &self.sponsor {
      out.push_str(&format!(", sponsored by {sponsor}"));
    }
    out
  }
}

// ─── Target ──────────────────────────────────────────────────────────────────

/// What a subscription watches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "lowercase")]
pub enum SubscriptionTarget {
  Bill(BillRef),
  Sponsor(PersonRef),
  Query(QueryFilter),
}

impl SubscriptionTarget {
  pub fn kind(&self) -> SubscriptionKind {
    match self {
      Self::Bill(_) => SubscriptionKind::Bill,
      Self::Sponsor(_) => SubscriptionKind::Sponsor,
      Self::Query(_) => SubscriptionKind::Query,
    }
  }

  /// One-sentence human description.
  pub fn pretty(&self) -> String {
    match self {
      Self::Bill(bill) => format!("Updates on {bill}"),
      Self::Sponsor(sponsor) => format!("Bills sponsored by {sponsor}"),
      Self::Query(filter) => filter.pretty(),
    }
  }

  /// Link to the watched entity, or to the live search for a query.
  pub fn site_url(&self, urls: &dyn PrettyUrl) -> String {
    match self {
      Self::Bill(bill) => urls.bill_url(bill),
      Self::Sponsor(sponsor) => urls.person_url(sponsor),
      Self::Query(filter) => filter.search_params().to_site_url(),
    }
  }

  /// Flatten into storage columns.
  pub fn to_record(&self) -> SubscriptionRecord {
    match self {
      Self::Bill(bill) => SubscriptionRecord {
        bill: Some(bill.clone()),
        ..Default::default()
      },
      Self::Sponsor(sponsor) => SubscriptionRecord {
        sponsor: Some(sponsor.clone()),
        ..Default::default()
      },
      Self::Query(filter) => SubscriptionRecord {
        bill:           None,
        sponsor:        filter.sponsor.clone(),
        query:          filter.query.clone(),
        state:          filter.state.clone().unwrap_or_default(),
        chamber:        filter.chamber.clone().unwrap_or_default(),
        session:        filter.session.clone().unwrap_or_default(),
        classification: filter.classification.clone().unwrap_or_default(),
        subjects:       filter.subjects.clone(),
        status:         filter.status.clone(),
      },
    }
  }
}

// ─── Storage shape ───────────────────────────────────────────────────────────

/// A subscription payload as stored: every field optional, blanks as empty
/// strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionRecord {
  pub bill:           Option<BillRef>,
  pub sponsor:        Option<PersonRef>,
  pub query:          String,
  pub state:          String,
  pub chamber:        String,
  pub session:        String,
  pub classification: String,
  pub subjects:       Vec<String>,
  pub status:         Vec<String>,
}

fn blank_to_none(s: String) -> Option<String> { Some(s).filter(|s| !s.is_empty()) }

impl SubscriptionRecord {
  /// Classify by precedence: bill, then non-empty query, then sponsor.
  pub fn subscription_type(&self) -> Result<SubscriptionKind> {
    if self.bill.is_some() {
      Ok(SubscriptionKind::Bill)
    } else if !self.query.is_empty() {
      Ok(SubscriptionKind::Query)
    } else if self.sponsor.is_some() {
      Ok(SubscriptionKind::Sponsor)
    } else {
      Err(Error::InvalidSubscription(format!("{self:?}")))
    }
  }

  /// Resolve into the tagged form. Fields that do not belong to the
  /// resolved kind are dropped.
  pub fn into_target(self) -> Result<SubscriptionTarget> {
    match self.subscription_type()? {
      SubscriptionKind::Bill => {
        self.bill.map(SubscriptionTarget::Bill).ok_or_else(|| unreachable_kind("bill"))
      }
      SubscriptionKind::Sponsor => self
        .sponsor
        .map(SubscriptionTarget::Sponsor)
        .ok_or_else(|| unreachable_kind("sponsor")),
      SubscriptionKind::Query => Ok(SubscriptionTarget::Query(QueryFilter {
        query:          self.query,
        state:          blank_to_none(self.state).map(|s| s.to_lowercase()),
        chamber:        blank_to_none(self.chamber),
        session:        blank_to_none(self.session),
        classification: blank_to_none(self.classification),
        subjects:       self.subjects,
        status:         self.status,
        sponsor:        self.sponsor,
      })),
    }
  }
}

fn unreachable_kind(kind: &str) -> Error {
  Error::InvalidSubscription(format!("classified as {kind} without a {kind}"))
}

// ─── Subscription ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
  pub subscription_id: Uuid,
  pub user_id:         UserId,
  pub active:          bool,
  /// Set once at creation.
  pub created_at:      DateTime<Utc>,
  pub target:          SubscriptionTarget,
}

impl Subscription {
  pub fn kind(&self) -> SubscriptionKind { self.target.kind() }

  pub fn pretty(&self) -> String { self.target.pretty() }

  pub fn site_url(&self, urls: &dyn PrettyUrl) -> String { self.target.site_url(urls) }
}

impl fmt::Display for Subscription {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.user_id, self.pretty())
  }
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// What a user asks to subscribe to, by id. The store resolves the ids into
/// references when it persists the subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SubscriptionSpec {
  Bill { bill_id: BillId },
  Sponsor { sponsor_id: PersonId },
  Query(SearchParams),
}

impl SubscriptionSpec {
  /// Normalise query parameters and reject a blank query.
  pub fn validate(self) -> Result<Self> {
    match self {
      Self::Query(params) => {
        let params = params.normalize();
        if params.query.trim().is_empty() {
          return Err(Error::InvalidSubscription(
            "query subscription requires a non-empty query".to_owned(),
          ));
        }
        Ok(Self::Query(params))
      }
      other => Ok(other),
    }
  }

  pub fn kind(&self) -> SubscriptionKind {
    match self {
      Self::Bill { .. } => SubscriptionKind::Bill,
      Self::Sponsor { .. } => SubscriptionKind::Sponsor,
      Self::Query(_) => SubscriptionKind::Query,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Urls;

  impl PrettyUrl for Urls {
    fn bill_url(&self, bill: &BillRef) -> String {
      format!("/bill/{}/", bill.id)
    }

    fn person_url(&self, person: &PersonRef) -> String {
      format!("/person/{}/", person.id)
    }
  }

  fn bill() -> BillRef {
    BillRef {
      id:         BillId::from("ocd-bill/1"),
      identifier: "HB 22".into(),
      session:    "2023".into(),
      state:      "ca".into(),
      title:      "An act relating to schools".into(),
    }
  }

  fn sponsor() -> PersonRef {
    PersonRef { id: PersonId::from("ocd-person/9"), name: "Ada Lovelace".into() }
  }

  fn query_record(query: &str) -> SubscriptionRecord {
    SubscriptionRecord { query: query.into(), ..Default::default() }
  }

  fn query_filter(state: &str, query: &str) -> QueryFilter {
    QueryFilter {
      query: query.into(),
      state: Some(state.into()).filter(|s: &String| !s.is_empty()),
      ..Default::default()
    }
  }

  // ── Classifier ──────────────────────────────────────────────────────────

  #[test]
  fn bill_wins_over_everything() {
    let record = SubscriptionRecord {
      bill: Some(bill()),
      sponsor: Some(sponsor()),
      query: "education".into(),
      ..Default::default()
    };
    assert_eq!(record.subscription_type().unwrap(), SubscriptionKind::Bill);
    assert_eq!(record.into_target().unwrap(), SubscriptionTarget::Bill(bill()));
  }

  #[test]
  fn query_wins_over_sponsor() {
    let record = SubscriptionRecord { sponsor: Some(sponsor()), ..query_record("tax") };
    assert_eq!(record.subscription_type().unwrap(), SubscriptionKind::Query);

    let SubscriptionTarget::Query(filter) = record.into_target().unwrap() else {
      panic!("expected a query target");
    };
    assert_eq!(filter.sponsor, Some(sponsor()));
  }

  #[test]
  fn sponsor_only() {
    let record = SubscriptionRecord { sponsor: Some(sponsor()), ..Default::default() };
    assert_eq!(record.subscription_type().unwrap(), SubscriptionKind::Sponsor);
  }

  #[test]
  fn empty_record_is_invalid_and_names_its_fields() {
    let record = SubscriptionRecord { state: "wa".into(), ..Default::default() };
    let err = record.subscription_type().unwrap_err();
    let Error::InvalidSubscription(detail) = &err else {
      panic!("unexpected error: {err}");
    };
    assert!(detail.contains("state: \"wa\""), "{detail}");
    assert!(record.into_target().is_err());
  }

  #[test]
  fn target_record_round_trip() {
    let target = SubscriptionTarget::Query(QueryFilter {
      chamber: Some("lower".into()),
      subjects: vec!["Health".into()],
      sponsor: Some(sponsor()),
      ..query_filter("ca", "clinics")
    });
    assert_eq!(target.to_record().into_target().unwrap(), target);
  }

  // ── pretty ──────────────────────────────────────────────────────────────

  #[test]
  fn pretty_bill_and_sponsor() {
    assert_eq!(SubscriptionTarget::Bill(bill()).pretty(), "Updates on HB 22 in 2023");
    assert_eq!(
      SubscriptionTarget::Sponsor(sponsor()).pretty(),
      "Bills sponsored by Ada Lovelace"
    );
  }

  #[test]
  fn pretty_query_minimal() {
    assert_eq!(
      query_filter("ca", "education").pretty(),
      "Bills matching 'education' from CA"
    );
    assert_eq!(
      query_filter("", "education").pretty(),
      "Bills matching 'education' from all states"
    );
  }

  #[test]
  fn pretty_query_chamber_and_session() {
    let filter = QueryFilter {
      chamber: Some("upper".into()),
      session: Some("2023".into()),
      ..query_filter("ca", "education")
    };
    assert_eq!(filter.pretty(), "Bills matching 'education' from CA, upper chamber, 2023");
  }

  #[test]
  fn pretty_query_skips_unknown_chamber() {
    let filter = QueryFilter {
      chamber: Some("legislature".into()),
      ..query_filter("ne", "roads")
    };
    assert_eq!(filter.pretty(), "Bills matching 'roads' from NE");
  }

  #[test]
  fn pretty_query_every_clause() {
    let filter = QueryFilter {
      query:          "water".into(),
      state:          Some("az".into()),
      chamber:        Some("lower".into()),
      session:        Some("56th-2nd-regular".into()),
      classification: Some("bill".into()),
      subjects:       vec!["Environment".into(), "Agriculture".into()],
      status:         vec!["passed_lower".into(), "signed".into()],
      sponsor:        Some(sponsor()),
    };
    assert_eq!(
      filter.pretty(),
      "Bills matching 'water' from AZ, lower chamber, 56th-2nd-regular, \
       classified as bill, including subjects 'Environment, Agriculture', \
       status includes 'passed_lower, signed', sponsored by Ada Lovelace"
    );
  }

  // ── site_url ────────────────────────────────────────────────────────────

  #[test]
  fn site_url_delegates_for_entities() {
    assert_eq!(SubscriptionTarget::Bill(bill()).site_url(&Urls), "/bill/ocd-bill/1/");
    assert_eq!(
      SubscriptionTarget::Sponsor(sponsor()).site_url(&Urls),
      "/person/ocd-person/9/"
    );
  }

  #[test]
  fn site_url_for_queries() {
    let no_state = SubscriptionTarget::Query(query_filter("", "tax"));
    let url = no_state.site_url(&Urls);
    assert!(url.starts_with("/search/?"));
    assert!(url.contains("query=tax"));

    let ny = SubscriptionTarget::Query(query_filter("ny", "tax"));
    assert!(ny.site_url(&Urls).starts_with("/ny/bills/?"));
  }

  #[test]
  fn site_url_round_trips_through_the_parser() {
    let filter = QueryFilter {
      classification: Some("resolution".into()),
      session: Some("2021".into()),
      chamber: Some("upper".into()),
      subjects: vec!["Taxation".into()],
      status: vec!["introduced".into()],
      sponsor: Some(sponsor()),
      ..query_filter("mn", "property tax")
    };
    let url = SubscriptionTarget::Query(filter.clone()).site_url(&Urls);
    let parsed = SearchParams::from_site_url(&url).unwrap();
    assert_eq!(parsed, filter.search_params());
    assert_eq!(parsed.sponsor_id, Some(PersonId::from("ocd-person/9")));
  }

  // ── Spec ────────────────────────────────────────────────────────────────

  #[test]
  fn blank_query_spec_is_rejected() {
    let err = SubscriptionSpec::Query(SearchParams::new("   ")).validate();
    assert!(matches!(err, Err(Error::InvalidSubscription(_))));
  }

  #[test]
  fn spec_json_shape() {
    let spec: SubscriptionSpec = serde_json::from_value(serde_json::json!({
      "kind": "query",
      "query": "guns",
      "state": "TX",
      "subjects": ["Public Safety"],
    }))
    .unwrap();
    let SubscriptionSpec::Query(params) = spec.validate().unwrap() else {
      panic!("expected query spec");
    };
    assert_eq!(params.state.as_deref(), Some("tx"));
    assert_eq!(params.subjects, ["Public Safety"]);

    let spec: SubscriptionSpec =
      serde_json::from_value(serde_json::json!({ "kind": "bill", "bill_id": "ocd-bill/1" }))
        .unwrap();
    assert_eq!(spec.kind(), SubscriptionKind::Bill);
  }
}
