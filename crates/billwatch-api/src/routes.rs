//! Default public-site link scheme.

use billwatch_core::reference::{BillRef, PersonRef, PrettyUrl};

/// Links into the public site, relative to its root.
///
/// Bills live at `/{state}/bills/{session}/{identifier}/` with spaces removed
/// from the identifier; people at `/person/{name-slug}-{id}/`, where `{id}` is
/// the last `/`-separated segment of the person id.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiteRoutes;

impl PrettyUrl for SiteRoutes {
  fn bill_url(&self, bill: &BillRef) -> String {
    let identifier: String = bill.identifier.split_whitespace().collect();
    format!("/{}/bills/{}/{identifier}/", bill.state.to_lowercase(), bill.session)
  }

  fn person_url(&self, person: &PersonRef) -> String {
    let id = person.id.as_str();
    let suffix = id.rsplit('/').next().unwrap_or(id);
    format!("/person/{}-{suffix}/", slugify(&person.name))
  }
}

/// Lowercase ASCII alphanumerics, with every other run of characters
/// collapsed into a single `-`.
fn slugify(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    if c.is_ascii_alphanumeric() {
      out.push(c.to_ascii_lowercase());
    } else if !out.is_empty() && !out.ends_with('-') {
      out.push('-');
    }
  }
  while out.ends_with('-') {
    out.pop();
  }
  out
}
