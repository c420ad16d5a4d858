//! Interface database model.
//!
//! These are the already-parsed declarations the engine consumes. Producing them from IDL source
//! text is the job of an external parser; [`MemoryDatabase::from_json`] accepts a JSON rendition
//! so drivers and tests can feed declarations directly.

use ahash::AHashMap;
use ahash::AHashSet;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// The value of an extended attribute, e.g. `DartName=foo` or `NamedConstructor=Audio(...)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtAttrValue {
  Ident(String),
  Function {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Vec<Argument>,
  },
}

/// Extended attributes of a declaration. Presence and value are distinct: `[Optional]` is present
/// without a value, `[Optional=DefaultIsUndefined]` is present with one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtAttrs(BTreeMap<String, Option<ExtAttrValue>>);

impl ExtAttrs {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, name: impl Into<String>, value: Option<ExtAttrValue>) {
    self.0.insert(name.into(), value);
  }

  pub fn contains(&self, name: &str) -> bool {
    self.0.contains_key(name)
  }

  /// Present without a value.
  pub fn is_bare(&self, name: &str) -> bool {
    matches!(self.0.get(name), Some(None))
  }

  pub fn value(&self, name: &str) -> Option<&ExtAttrValue> {
    self.0.get(name).and_then(|v| v.as_ref())
  }

  pub fn ident(&self, name: &str) -> Option<&str> {
    match self.value(name) {
      Some(ExtAttrValue::Ident(v)) => Some(v.as_str()),
      _ => None,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
  pub name: String,
  #[serde(rename = "type")]
  pub type_name: String,
  #[serde(default)]
  pub ext_attrs: ExtAttrs,
}

impl Argument {
  pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      type_name: type_name.into(),
      ext_attrs: ExtAttrs::new(),
    }
  }

  pub fn with_ext_attr(mut self, name: &str, value: Option<&str>) -> Self {
    self
      .ext_attrs
      .insert(name, value.map(|v| ExtAttrValue::Ident(v.to_string())));
    self
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
  pub name: String,
  #[serde(rename = "type")]
  pub return_type: String,
  #[serde(default)]
  pub arguments: Vec<Argument>,
  #[serde(default)]
  pub is_static: bool,
  #[serde(default)]
  pub ext_attrs: ExtAttrs,
}

impl Operation {
  pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      return_type: return_type.into(),
      arguments: Vec::new(),
      is_static: false,
      ext_attrs: ExtAttrs::new(),
    }
  }

  pub fn arg(mut self, argument: Argument) -> Self {
    self.arguments.push(argument);
    self
  }

  pub fn with_static(mut self, is_static: bool) -> Self {
    self.is_static = is_static;
    self
  }

  pub fn with_ext_attr(mut self, name: &str, value: Option<&str>) -> Self {
    self
      .ext_attrs
      .insert(name, value.map(|v| ExtAttrValue::Ident(v.to_string())));
    self
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
  pub name: String,
  #[serde(rename = "type")]
  pub type_name: String,
  #[serde(default)]
  pub read_only: bool,
  #[serde(default)]
  pub is_static: bool,
  #[serde(default)]
  pub ext_attrs: ExtAttrs,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
  pub name: String,
  #[serde(default)]
  pub parents: Vec<String>,
  #[serde(default)]
  pub ext_attrs: ExtAttrs,
  #[serde(default)]
  pub operations: Vec<Operation>,
  #[serde(default)]
  pub attributes: Vec<Attribute>,
}

impl Interface {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      parents: Vec::new(),
      ext_attrs: ExtAttrs::new(),
      operations: Vec::new(),
      attributes: Vec::new(),
    }
  }

  pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
    self.parents.push(parent.into());
    self
  }

  pub fn with_ext_attr(mut self, name: &str, value: Option<ExtAttrValue>) -> Self {
    self.ext_attrs.insert(name, value);
    self
  }

  pub fn with_operation(mut self, operation: Operation) -> Self {
    self.operations.push(operation);
    self
  }

  pub fn is_callback(&self) -> bool {
    self.ext_attrs.contains("Callback")
  }

  /// Operations grouped by name, in order of first declaration.
  pub fn operation_groups(&self) -> Vec<(&str, Vec<&Operation>)> {
    let mut groups: Vec<(&str, Vec<&Operation>)> = Vec::new();
    for op in self.operations.iter() {
      match groups.iter_mut().find(|(name, _)| *name == op.name) {
        Some((_, ops)) => ops.push(op),
        None => groups.push((op.name.as_str(), vec![op])),
      }
    }
    groups
  }

  pub fn find_attribute(&self, name: &str) -> Option<&Attribute> {
    self.attributes.iter().find(|a| a.name == name)
  }
}

/// Read-only access to the loaded interface declarations.
pub trait InterfaceDatabase {
  fn has_interface(&self, name: &str) -> bool;

  fn get_interface(&self, name: &str) -> Option<&Interface>;

  /// `interface` followed by its transitive parents, breadth first. Undeclared parents are skipped
  /// and each interface appears once, so inheritance cycles terminate.
  fn hierarchy<'a>(&'a self, interface: &'a Interface) -> Vec<&'a Interface> {
    let mut seen = AHashSet::new();
    seen.insert(interface.name.as_str());
    let mut out = vec![interface];
    let mut next = 0;
    while next < out.len() {
      let current = out[next];
      next += 1;
      for parent in current.parents.iter() {
        if !seen.insert(parent.as_str()) {
          continue;
        }
        if let Some(decl) = self.get_interface(parent) {
          out.push(decl);
        }
      }
    }
    out
  }
}

#[derive(Debug, Default)]
pub struct MemoryDatabase {
  interfaces: AHashMap<String, Interface>,
}

impl MemoryDatabase {
  pub fn new() -> Self {
    Self::default()
  }

  /// Loads a JSON array of interface declarations.
  pub fn from_json(source: &str) -> serde_json::Result<Self> {
    let decls: Vec<Interface> = serde_json::from_str(source)?;
    let mut db = Self::new();
    for decl in decls {
      db.insert(decl);
    }
    Ok(db)
  }

  pub fn insert(&mut self, interface: Interface) {
    self.interfaces.insert(interface.name.clone(), interface);
  }

  /// All declarations sorted by name.
  pub fn interfaces(&self) -> Vec<&Interface> {
    let mut all: Vec<&Interface> = self.interfaces.values().collect();
    all.sort_by(|a, b| a.name.cmp(&b.name));
    all
  }
}

impl InterfaceDatabase for MemoryDatabase {
  fn has_interface(&self, name: &str) -> bool {
    self.interfaces.contains_key(name)
  }

  fn get_interface(&self, name: &str) -> Option<&Interface> {
    self.interfaces.get(name)
  }
}
