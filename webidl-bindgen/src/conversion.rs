//! Value marshaling conversions.
//!
//! Rules are keyed, from most to least specific, by:
//!
//! 1. `"TYPE DIRECTION INTERFACE.MEMBER"`
//! 2. `"* DIRECTION INTERFACE.MEMBER"`
//! 3. `"TYPE DIRECTION INTERFACE.*"`
//! 4. `"TYPE DIRECTION"`
//!
//! `DIRECTION` is `get` for getters and return values and `set` for setters and arguments. The
//! first matching key wins, including a key that maps to the identity rule.

use crate::idl::Operation;
use ahash::AHashMap;
use serde::Serialize;
use std::fmt;
use tracing::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  Get,
  Set,
}

impl Direction {
  pub fn as_str(self) -> &'static str {
    match self {
      Direction::Get => "get",
      Direction::Set => "set",
    }
  }
}

impl fmt::Display for Direction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A conversion function and the target types it accepts and produces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Conversion {
  pub function_name: String,
  pub input_type: String,
  pub output_type: String,
}

impl Conversion {
  pub fn new(
    function_name: impl Into<String>,
    input_type: impl Into<String>,
    output_type: impl Into<String>,
  ) -> Self {
    Self {
      function_name: function_name.into(),
      input_type: input_type.into(),
      output_type: output_type.into(),
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversionRule<'t> {
  Convert(&'t Conversion),
  /// The member is known to need no marshaling, even though a less specific rule would apply.
  Identity,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionMatch<'t> {
  pub key: String,
  pub rule: ConversionRule<'t>,
}

#[derive(Clone, Debug, Default)]
pub struct ConversionTables {
  /// `None` is the identity rule.
  pub rules: AHashMap<String, Option<Conversion>>,
}

impl ConversionTables {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, key: impl Into<String>, conversion: Conversion) -> &mut Self {
    self.rules.insert(key.into(), Some(conversion));
    self
  }

  pub fn insert_identity(&mut self, key: impl Into<String>) -> &mut Self {
    self.rules.insert(key.into(), None);
    self
  }

  pub fn builtin() -> Self {
    let serialize_ssv = Conversion::new(
      "convertDartToNative_SerializedScriptValue",
      "dynamic",
      "dynamic",
    );
    let deserialize_ssv = Conversion::new(
      "convertNativeToDart_SerializedScriptValue",
      "dynamic",
      "dynamic",
    );
    let idb_any = Conversion::new("_convertNativeToDart_IDBAny", "dynamic", "dynamic");

    let mut tables = Self::new();
    tables
      .insert(
        "DOMWindow get",
        Conversion::new("_convertNativeToDart_Window", "dynamic", "WindowBase"),
      )
      .insert(
        "EventTarget get",
        Conversion::new("_convertNativeToDart_EventTarget", "dynamic", "EventTarget"),
      )
      .insert(
        "EventTarget set",
        Conversion::new("_convertDartToNative_EventTarget", "EventTarget", "dynamic"),
      )
      .insert(
        "IDBKey get",
        Conversion::new("_convertNativeToDart_IDBKey", "dynamic", "dynamic"),
      )
      .insert(
        "IDBKey set",
        Conversion::new("_convertDartToNative_IDBKey", "dynamic", "dynamic"),
      )
      .insert(
        "ImageData get",
        Conversion::new("_convertNativeToDart_ImageData", "dynamic", "ImageData"),
      )
      .insert(
        "ImageData set",
        Conversion::new("_convertDartToNative_ImageData", "ImageData", "dynamic"),
      )
      .insert(
        "Dictionary get",
        Conversion::new("convertNativeToDart_Dictionary", "dynamic", "Map"),
      )
      .insert(
        "Dictionary set",
        Conversion::new("convertDartToNative_Dictionary", "Map", "dynamic"),
      )
      .insert(
        "DOMString[] set",
        Conversion::new("convertDartToNative_StringArray", "List<String>", "List"),
      );
    for key in [
      "any set IDBObjectStore.add",
      "any set IDBObjectStore.put",
      "any set IDBCursor.update",
      "any set DedicatedWorkerContext.postMessage",
      "any set MessagePort.postMessage",
      "SerializedScriptValue set DOMWindow.postMessage",
      "SerializedScriptValue set Worker.postMessage",
    ] {
      tables.insert(key, serialize_ssv.clone());
    }
    tables
      .insert("* get MessageEvent.data", deserialize_ssv.clone())
      .insert(
        "* get History.state",
        Conversion::new(
          "_convertNativeToDart_SerializedScriptValue",
          "dynamic",
          "dynamic",
        ),
      )
      .insert("* get PopStateEvent.state", deserialize_ssv)
      .insert("IDBAny get IDBCursorWithValue.value", idb_any.clone())
      .insert("IDBAny get IDBRequest.result", idb_any)
      // The cursor's source is an object store or index, and a key path is a string or list.
      .insert_identity("IDBAny get IDBCursor.source")
      .insert_identity("IDBAny get IDBObjectStore.keyPath");
    tables
  }
}

pub struct ConversionResolver<'t> {
  tables: &'t ConversionTables,
}

impl<'t> ConversionResolver<'t> {
  pub fn new(tables: &'t ConversionTables) -> Self {
    Self { tables }
  }

  /// The most specific rule for the value, with the key it was found under. `None` when no key
  /// matches.
  pub fn lookup(
    &self,
    idl_type: &str,
    direction: Direction,
    interface: &str,
    member: &str,
  ) -> Option<ConversionMatch<'t>> {
    let keys = [
      format!("{idl_type} {direction} {interface}.{member}"),
      format!("* {direction} {interface}.{member}"),
      format!("{idl_type} {direction} {interface}.*"),
      format!("{idl_type} {direction}"),
    ];
    let tables = self.tables;
    keys.into_iter().find_map(|key| {
      let rule = tables.rules.get(&key)?;
      trace!(key = key.as_str(), identity = rule.is_none(), "conversion rule matched");
      Some(ConversionMatch {
        rule: match rule {
          Some(conversion) => ConversionRule::Convert(conversion),
          None => ConversionRule::Identity,
        },
        key,
      })
    })
  }

  /// The conversion to apply, if any. Identity rules and unmatched values both yield `None`.
  pub fn resolve(
    &self,
    idl_type: &str,
    direction: Direction,
    interface: &str,
    member: &str,
  ) -> Option<&'t Conversion> {
    match self.lookup(idl_type, direction, interface, member)?.rule {
      ConversionRule::Convert(conversion) => Some(conversion),
      ConversionRule::Identity => None,
    }
  }

  /// Conversion applied to arguments and assigned values.
  pub fn input_conversion(&self, idl_type: &str, interface: &str, member: &str) -> Option<&'t Conversion> {
    self.resolve(idl_type, Direction::Set, interface, member)
  }

  /// Conversion applied to return values and read values.
  pub fn output_conversion(&self, idl_type: &str, interface: &str, member: &str) -> Option<&'t Conversion> {
    self.resolve(idl_type, Direction::Get, interface, member)
  }

  /// Whether the return value or any argument of `operation` needs marshaling.
  pub fn operation_requires_conversions(&self, interface: &str, operation: &Operation) -> bool {
    self
      .output_conversion(&operation.return_type, interface, &operation.name)
      .is_some()
      || operation
        .arguments
        .iter()
        .any(|a| self.input_conversion(&a.type_name, interface, &operation.name).is_some())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn direction_is_part_of_the_key() {
    let tables = ConversionTables::builtin();
    let resolver = ConversionResolver::new(&tables);
    assert_eq!(
      resolver
        .output_conversion("DOMWindow", "Node", "ownerWindow")
        .map(|c| c.output_type.as_str()),
      Some("WindowBase")
    );
    assert!(resolver.input_conversion("DOMWindow", "Node", "ownerWindow").is_none());
  }
}
