mod fixture;

use webidl_bindgen::Conversion;
use webidl_bindgen::ConversionResolver;
use webidl_bindgen::ConversionRule;
use webidl_bindgen::ConversionTables;
use webidl_bindgen::Direction;
use webidl_bindgen::BUILTIN_TABLES;

const LEVELS: [&str; 4] = [
  "T get I.m",
  "* get I.m",
  "T get I.*",
  "T get",
];

fn tables_from(levels: &[&str]) -> ConversionTables {
  let mut tables = ConversionTables::new();
  for key in levels {
    tables.insert(*key, Conversion::new(format!("convert[{key}]"), "dynamic", "dynamic"));
  }
  tables
}

#[test]
fn most_specific_rule_wins() {
  for start in 0..LEVELS.len() {
    let tables = tables_from(&LEVELS[start..]);
    let resolver = ConversionResolver::new(&tables);
    let found = resolver.lookup("T", Direction::Get, "I", "m").unwrap();
    assert_eq!(found.key, LEVELS[start]);
    assert_eq!(
      resolver
        .resolve("T", Direction::Get, "I", "m")
        .map(|c| c.function_name.as_str()),
      Some(format!("convert[{}]", LEVELS[start]).as_str())
    );
  }
}

#[test]
fn wildcard_levels_only_match_their_scope() {
  let tables = tables_from(&LEVELS[1..3]);
  let resolver = ConversionResolver::new(&tables);
  assert_eq!(
    resolver.lookup("U", Direction::Get, "I", "m").unwrap().key,
    "* get I.m"
  );
  assert_eq!(
    resolver.lookup("T", Direction::Get, "I", "n").unwrap().key,
    "T get I.*"
  );
  assert!(resolver.lookup("T", Direction::Get, "J", "m").is_none());
  assert!(resolver.lookup("T", Direction::Set, "I", "m").is_none());
}

#[test]
fn identity_rule_is_distinct_from_no_match() {
  let resolver = ConversionResolver::new(&BUILTIN_TABLES.conversions);

  let identity = resolver
    .lookup("IDBAny", Direction::Get, "IDBCursor", "source")
    .unwrap();
  assert_eq!(identity.key, "IDBAny get IDBCursor.source");
  assert_eq!(identity.rule, ConversionRule::Identity);
  assert!(resolver
    .resolve("IDBAny", Direction::Get, "IDBCursor", "source")
    .is_none());

  assert!(resolver
    .lookup("IDBAny", Direction::Get, "IDBCursor", "direction")
    .is_none());
  assert!(resolver
    .resolve("IDBAny", Direction::Get, "IDBCursor", "direction")
    .is_none());

  let converted = resolver
    .lookup("IDBAny", Direction::Get, "IDBRequest", "result")
    .unwrap();
  match converted.rule {
    ConversionRule::Convert(conversion) => {
      assert_eq!(conversion.function_name, "_convertNativeToDart_IDBAny")
    }
    ConversionRule::Identity => panic!("expected a conversion"),
  }
}

#[test]
fn identity_rule_stops_the_search() {
  let mut tables = ConversionTables::new();
  tables
    .insert(
      "IDBAny get IDBObjectStore.*",
      Conversion::new("_convertNativeToDart_IDBAny", "dynamic", "dynamic"),
    )
    .insert_identity("IDBAny get IDBObjectStore.keyPath");
  let resolver = ConversionResolver::new(&tables);
  assert!(resolver
    .output_conversion("IDBAny", "IDBObjectStore", "keyPath")
    .is_none());
  assert!(resolver
    .output_conversion("IDBAny", "IDBObjectStore", "name")
    .is_some());
}

#[test]
fn builtin_rules() {
  let resolver = ConversionResolver::new(&BUILTIN_TABLES.conversions);

  let window = resolver
    .output_conversion("DOMWindow", "Document", "defaultView")
    .unwrap();
  assert_eq!(window.function_name, "_convertNativeToDart_Window");
  assert_eq!(window.output_type, "WindowBase");

  let strings = resolver
    .input_conversion("DOMString[]", "IDBDatabase", "transaction")
    .unwrap();
  assert_eq!(strings.input_type, "List<String>");

  // Type-agnostic member rule.
  for idl_type in ["any", "SerializedScriptValue", "DOMString"] {
    assert_eq!(
      resolver
        .output_conversion(idl_type, "MessageEvent", "data")
        .map(|c| c.function_name.as_str()),
      Some("convertNativeToDart_SerializedScriptValue")
    );
  }
  assert_eq!(
    resolver
      .output_conversion("any", "History", "state")
      .map(|c| c.function_name.as_str()),
    Some("_convertNativeToDart_SerializedScriptValue")
  );
  assert!(resolver.input_conversion("any", "MessageEvent", "data").is_none());
}

#[test]
fn operations_needing_conversions() {
  let db = fixture::database();
  let resolver = ConversionResolver::new(&BUILTIN_TABLES.conversions);

  let port = fixture::interface(&db, "MessagePort");
  assert!(resolver.operation_requires_conversions(&port.name, &port.operations[0]));

  let window = fixture::interface(&db, "DOMWindow");
  assert!(resolver.operation_requires_conversions(&window.name, &window.operations[0]));

  let node = fixture::interface(&db, "Node");
  assert!(!resolver.operation_requires_conversions(&node.name, &node.operations[0]));
}
