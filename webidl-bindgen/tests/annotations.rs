use webidl_bindgen::format_annotations;
use webidl_bindgen::AnnotationResolver;
use webidl_bindgen::AnnotationTables;
use webidl_bindgen::DocStore;
use webidl_bindgen::BUILTIN_TABLES;

fn builtin() -> AnnotationResolver<'static> {
  AnnotationResolver::new(&BUILTIN_TABLES.annotations)
}

#[test]
fn missing_entries_yield_the_canonical_baseline() {
  let resolver = builtin();
  assert_eq!(resolver.resolve("Node", None), vec!["@DomName('Node')"]);
  assert_eq!(
    resolver.resolve("Node", Some("appendChild")),
    vec!["@DomName('Node.appendChild')", "@DocsEditable"]
  );
}

#[test]
fn common_entries_follow_the_canonical_markers() {
  let resolver = builtin();
  assert_eq!(
    resolver.resolve("WebSocket", None),
    vec![
      "@DomName('WebSocket')",
      "@SupportedBrowser(SupportedBrowser.CHROME)",
      "@SupportedBrowser(SupportedBrowser.FIREFOX)",
      "@SupportedBrowser(SupportedBrowser.IE, '10')",
      "@SupportedBrowser(SupportedBrowser.SAFARI)",
    ]
  );
  assert_eq!(
    resolver.resolve("Element", Some("webkitMatchesSelector")),
    vec![
      "@DomName('Element.webkitMatchesSelector')",
      "@DocsEditable",
      "@Experimental",
    ]
  );
}

#[test]
fn native_layers_concatenate_in_order() {
  let mut tables = AnnotationTables::new();
  tables
    .insert_native("+Request", &["@Qualified"])
    .insert_native("-Request", &["@Unowned"])
    .insert_native("Request", &["@Always"])
    .insert_native("Store.open", &["@Own"]);
  let resolver = AnnotationResolver::new(&tables);

  assert_eq!(
    resolver.resolve_native("Request", "Store", "open"),
    vec![
      "@DomName('Store.open')",
      "@DocsEditable",
      "@Qualified",
      "@Always",
      "@Own",
    ]
  );
  assert_eq!(
    resolver.native_annotations("Request", "Store", "close"),
    vec!["@Unowned", "@Always"]
  );
}

#[test]
fn empty_member_entries_count_as_absent() {
  let mut tables = AnnotationTables::new();
  tables
    .insert_native("+Request", &["@Qualified"])
    .insert_native("-Request", &["@Unowned"])
    .insert_native("Store.close", &[]);
  let resolver = AnnotationResolver::new(&tables);

  assert_eq!(
    resolver.native_annotations("Request", "Store", "close"),
    vec!["@Unowned"]
  );
}

#[test]
fn builtin_request_annotations() {
  let resolver = builtin();
  assert_eq!(
    resolver.native_annotations("IDBRequest", "IDBFactory", "open"),
    vec![
      "@Returns('Request')",
      "@Creates('Request')",
      "@Creates('Database')",
    ]
  );
  // `+IDBRequest` needs a member entry of its own.
  assert!(resolver
    .native_annotations("IDBRequest", "IDBFactory", "deleteDatabase")
    .is_empty());
}

#[test]
fn window_annotations_apply_to_every_member() {
  let resolver = builtin();
  let annotations = resolver.resolve_native("DOMWindow", "MessageEvent", "source");
  assert_eq!(
    &annotations[2..],
    &["@Creates('Window|=Object')", "@Returns('Window|=Object')"]
  );
}

#[test]
fn conversion_annotations_are_detected() {
  let resolver = builtin();
  assert!(resolver.has_conversion_annotations("EventTarget", "Node", "parentTarget"));
  assert!(resolver.has_conversion_annotations("void", "DOMWindow", "openDatabase"));
  assert!(resolver.has_conversion_annotations("any", "MessageEvent", "data"));
  assert!(!resolver.has_conversion_annotations("long", "Node", "nodeType"));
}

#[test]
fn comments_precede_annotations() {
  let docs = DocStore::from_json(
    r#"{"html": {"Node": {"comment": ["/// A DOM node."], "members": {"appendChild": ["/// Appends."]}}}}"#,
  )
  .unwrap();
  let resolver = builtin();
  assert_eq!(
    resolver.resolve_with_comments(&docs, Some("html"), "Node", None),
    vec!["/// A DOM node.", "@DomName('Node')"]
  );
  assert_eq!(
    resolver.resolve_native_with_comments(&docs, Some("html"), "Node", "Node", "appendChild"),
    vec![
      "/// Appends.",
      "@DomName('Node.appendChild')",
      "@DocsEditable",
    ]
  );
  assert_eq!(
    resolver.resolve_with_comments(&docs, Some("svg"), "Node", None),
    vec!["@DomName('Node')"]
  );
}

#[test]
fn formatting_indents_every_following_line() {
  let resolver = builtin();
  let annotations = resolver.resolve("Node", Some("appendChild"));
  assert_eq!(
    format_annotations(&annotations, "  "),
    "@DomName('Node.appendChild')\n  @DocsEditable\n  "
  );
  assert_eq!(format_annotations(&[], "  "), "");
}
