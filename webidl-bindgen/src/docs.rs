use ahash::AHashMap;
use serde::Deserialize;

/// Source of hand-written documentation comments.
pub trait DocSource {
  /// Comment lines for an interface, or for one of its members. Missing entries are an empty list.
  fn comments(&self, library: Option<&str>, interface: &str, member: Option<&str>) -> Vec<String>;
}

#[derive(Debug, Default, Deserialize)]
struct InterfaceDocs {
  #[serde(default)]
  comment: Vec<String>,
  #[serde(default)]
  members: AHashMap<String, Vec<String>>,
}

/// Documentation keyed by library, then interface, then member:
///
/// ```json
/// { "html": { "Node": { "comment": ["/// A node."], "members": { "append": ["/// ..."] } } } }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct DocStore {
  libraries: AHashMap<String, AHashMap<String, InterfaceDocs>>,
}

impl DocStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_json(source: &str) -> serde_json::Result<Self> {
    serde_json::from_str(source)
  }
}

impl DocSource for DocStore {
  fn comments(&self, library: Option<&str>, interface: &str, member: Option<&str>) -> Vec<String> {
    let Some(docs) = library
      .and_then(|l| self.libraries.get(l))
      .and_then(|l| l.get(interface))
    else {
      return Vec::new();
    };
    match member {
      Some(member) => docs.members.get(member).cloned().unwrap_or_default(),
      None => docs.comment.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_entries_are_empty() {
    let store = DocStore::from_json(
      r#"{"html": {"Node": {"comment": ["/// A node."], "members": {"append": ["/// Appends."]}}}}"#,
    )
    .unwrap();
    assert_eq!(store.comments(Some("html"), "Node", None), vec!["/// A node."]);
    assert_eq!(
      store.comments(Some("html"), "Node", Some("append")),
      vec!["/// Appends."]
    );
    assert!(store.comments(Some("html"), "Node", Some("remove")).is_empty());
    assert!(store.comments(Some("svg"), "Node", None).is_empty());
    assert!(store.comments(None, "Node", None).is_empty());
  }
}
