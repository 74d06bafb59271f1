//! The flat, id-only form of a query subscription and its URL encoding.
//!
//! A query subscription links back to a live search on the public site. The
//! link is a path plus a form-urlencoded query string:
//!
//! ```text
//! /{state}/bills/?query=...&subjects=...&status=...[&classification=...&session=...&chamber=...&sponsor_id=...]
//! /search/?query=...                                  (no state)
//! ```
//!
//! Array-valued parameters repeat their key. Parsing a path produced by
//! [`SearchParams::to_site_url`] yields the same parameters back.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::{Error, Result, reference::PersonId};

/// Search filters as they appear on the wire and in API request bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
  pub query:          String,
  /// Two-letter state code; lower-cased by [`SearchParams::normalize`].
  pub state:          Option<String>,
  pub chamber:        Option<String>,
  pub session:        Option<String>,
  pub classification: Option<String>,
  #[serde(default)]
  pub subjects:       Vec<String>,
  #[serde(default)]
  pub status:         Vec<String>,
  pub sponsor_id:     Option<PersonId>,
}

/// Treat empty strings the same as absent ones.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
  value.as_deref().filter(|v| !v.is_empty())
}

impl SearchParams {
  pub fn new(query: impl Into<String>) -> Self {
    Self { query: query.into(), ..Default::default() }
  }

  /// Drop empty optional values and lower-case the state code.
  pub fn normalize(mut self) -> Self {
    self.state = non_empty(&self.state).map(str::to_lowercase);
    self.chamber = non_empty(&self.chamber).map(str::to_owned);
    self.session = non_empty(&self.session).map(str::to_owned);
    self.classification = non_empty(&self.classification).map(str::to_owned);
    self.sponsor_id = self.sponsor_id.filter(|id| !id.0.is_empty());
    self
  }

  /// Encode as the query-string part only (no leading `?`).
  pub fn to_query_string(&self) -> String {
    let mut qs = form_urlencoded::Serializer::new(String::new());
    qs.append_pair("query", &self.query);
    for subject in &self.subjects {
      qs.append_pair("subjects", subject);
    }
    for status in &self.status {
      qs.append_pair("status", status);
    }
    if let Some(classification) = non_empty(&self.classification) {
      qs.append_pair("classification", classification);
    }
    if let Some(session) = non_empty(&self.session) {
      qs.append_pair("session", session);
    }
    if let Some(chamber) = non_empty(&self.chamber) {
      qs.append_pair("chamber", chamber);
    }
    if let Some(sponsor) = self.sponsor_id.as_ref().filter(|id| !id.0.is_empty()) {
      qs.append_pair("sponsor_id", sponsor.as_str());
    }
    qs.finish()
  }

  /// The site path that re-runs this search.
  pub fn to_site_url(&self) -> String {
    let query = self.to_query_string();
    match non_empty(&self.state) {
      Some(state) => format!("/{state}/bills/?{query}"),
      None => format!("/search/?{query}"),
    }
  }

  /// Parse a path produced by [`Self::to_site_url`]. Unknown query keys are
  /// ignored so links carrying extra parameters (paging, sorting) still
  /// resolve.
  pub fn from_site_url(url: &str) -> Result<Self> {
    let invalid = |reason: &str| Error::InvalidSearchUrl {
      url:    url.to_owned(),
      reason: reason.to_owned(),
    };

    let (path, query) =
      url.split_once('?').ok_or_else(|| invalid("missing query string"))?;

    let state = match path.trim_matches('/').split('/').collect::<Vec<_>>()[..] {
      ["search"] => None,
      [state, "bills"] if !state.is_empty() => Some(state.to_owned()),
      _ => return Err(invalid("unrecognised path")),
    };

    let mut params = SearchParams { state, ..Default::default() };
    let mut saw_query = false;

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
      match key.as_ref() {
        "query" => {
          params.query = value.into_owned();
          saw_query = true;
        }
        "subjects" => params.subjects.push(value.into_owned()),
        "status" => params.status.push(value.into_owned()),
        "classification" => params.classification = Some(value.into_owned()),
        "session" => params.session = Some(value.into_owned()),
        "chamber" => params.chamber = Some(value.into_owned()),
        "sponsor_id" => params.sponsor_id = Some(PersonId(value.into_owned())),
        _ => {}
      }
    }

    if !saw_query {
      return Err(invalid("missing `query` parameter"));
    }

    Ok(params.normalize())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn full() -> SearchParams {
    SearchParams {
      query:          "school lunch".into(),
      state:          Some("ny".into()),
      chamber:        Some("upper".into()),
      session:        Some("2023".into()),
      classification: Some("resolution".into()),
      subjects:       vec!["Education".into(), "Health & Welfare".into()],
      status:         vec!["passed_lower".into(), "signed".into()],
      sponsor_id:     Some(PersonId("ocd-person/1234".into())),
    }
  }

  #[test]
  fn state_path_and_key_order() {
    assert_eq!(
      full().to_site_url(),
      "/ny/bills/?query=school+lunch&subjects=Education\
       &subjects=Health+%26+Welfare&status=passed_lower&status=signed\
       &classification=resolution&session=2023&chamber=upper\
       &sponsor_id=ocd-person%2F1234"
    );
  }

  #[test]
  fn no_state_uses_search_path() {
    let url = SearchParams::new("tax").to_site_url();
    assert!(url.starts_with("/search/?"));
    assert!(url.contains("query=tax"));
    assert_eq!(url, "/search/?query=tax");
  }

  #[test]
  fn empty_state_is_treated_as_absent() {
    let params = SearchParams { state: Some(String::new()), ..SearchParams::new("tax") };
    assert!(params.to_site_url().starts_with("/search/?"));
  }

  #[test]
  fn round_trip_preserves_every_filter() {
    let params = full();
    let parsed = SearchParams::from_site_url(&params.to_site_url()).unwrap();
    assert_eq!(parsed, params);
  }

  #[test]
  fn round_trip_minimal() {
    let params = SearchParams::new("wildfire");
    let parsed = SearchParams::from_site_url(&params.to_site_url()).unwrap();
    assert_eq!(parsed, params);
  }

  #[test]
  fn normalize_lowercases_state_and_drops_blanks() {
    let params = SearchParams {
      state: Some("CA".into()),
      chamber: Some(String::new()),
      sponsor_id: Some(PersonId(String::new())),
      ..SearchParams::new("water")
    }
    .normalize();
    assert_eq!(params.state.as_deref(), Some("ca"));
    assert_eq!(params.chamber, None);
    assert_eq!(params.sponsor_id, None);
  }

  #[test]
  fn unknown_keys_are_ignored() {
    let parsed =
      SearchParams::from_site_url("/tx/bills/?query=oil&page=3").unwrap();
    assert_eq!(parsed.state.as_deref(), Some("tx"));
    assert_eq!(parsed.query, "oil");
  }

  #[test]
  fn rejects_foreign_paths() {
    for url in ["/search/", "/people/?query=x", "/ca/votes/?query=x", "/search/?page=2"] {
      assert!(
        matches!(SearchParams::from_site_url(url), Err(Error::InvalidSearchUrl { .. })),
        "accepted {url}"
      );
    }
  }
}
