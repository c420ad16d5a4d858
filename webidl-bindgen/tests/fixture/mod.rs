#![allow(dead_code)]

use webidl_bindgen::HtmlRenamer;
use webidl_bindgen::Interface;
use webidl_bindgen::InterfaceDatabase;
use webidl_bindgen::MemoryDatabase;
use webidl_bindgen::OperationAnalyzer;
use webidl_bindgen::TypeRegistry;
use webidl_bindgen::BUILTIN_TABLES;

/// A small slice of the DOM, enough to exercise every type class and both constructor forms.
pub const DATABASE: &str = r#"[
  {"name": "EventTarget"},
  {"name": "Node", "parents": ["EventTarget"], "operations": [
    {"name": "appendChild", "type": "Node", "arguments": [{"name": "newChild", "type": "Node"}]}
  ]},
  {"name": "Element", "parents": ["Node"]},
  {"name": "Document", "parents": ["Node"]},
  {"name": "HTMLDocument", "parents": ["Document"]},
  {"name": "HTMLElement", "parents": ["Element"]},
  {"name": "HTMLMediaElement", "parents": ["HTMLElement"]},
  {"name": "HTMLAudioElement", "parents": ["HTMLMediaElement"], "ext_attrs": {
    "NamedConstructor": {"name": "Audio", "arguments": [
      {"name": "src", "type": "DOMString", "ext_attrs": {"Optional": "DefaultIsUndefined"}}
    ]}
  }},
  {"name": "DOMWindow", "parents": ["EventTarget"], "operations": [
    {"name": "open", "type": "DOMWindow", "arguments": [{"name": "url", "type": "DOMString"}]}
  ]},
  {"name": "VoidCallback", "ext_attrs": {"Callback": null}},
  {"name": "XMLHttpRequest", "parents": ["EventTarget"], "ext_attrs": {"Constructor": null}},
  {"name": "WebSocket", "parents": ["EventTarget"], "ext_attrs": {
    "Constructor": {"arguments": [
      {"name": "url", "type": "DOMString"},
      {"name": "protocol", "type": "DOMString", "ext_attrs": {"Optional": null}}
    ]}
  }},
  {"name": "Float32Array", "ext_attrs": {
    "Constructor": {"arguments": [{"name": "length", "type": "unsigned long"}]}
  }},
  {"name": "MessagePort", "parents": ["EventTarget"], "operations": [
    {"name": "postMessage", "type": "void", "arguments": [
      {"name": "message", "type": "any"},
      {"name": "messagePorts", "type": "sequence<MessagePort>", "ext_attrs": {"Optional": null}}
    ]}
  ]},
  {"name": "DataView", "operations": [
    {"name": "getInt16", "type": "short", "arguments": [
      {"name": "byteOffset", "type": "unsigned long"},
      {"name": "littleEndian", "type": "boolean", "ext_attrs": {"Optional": null}}
    ]}
  ]},
  {"name": "SVGLength"},
  {"name": "SVGLengthList"},
  {"name": "SVGAnimatedLength"}
]"#;

pub fn database() -> MemoryDatabase {
  MemoryDatabase::from_json(DATABASE).unwrap()
}

pub fn interface<'d>(db: &'d MemoryDatabase, name: &str) -> &'d Interface {
  db.get_interface(name)
    .unwrap_or_else(|| panic!("{name} is not in the fixture database"))
}

/// Runs `f` with an analyzer over `db` and the built-in tables.
pub fn with_analyzer<R>(db: &MemoryDatabase, f: impl FnOnce(&OperationAnalyzer<'_, '_>) -> R) -> R {
  let renamer = HtmlRenamer::new(db);
  let registry = TypeRegistry::new(db, &renamer, &BUILTIN_TABLES.types);
  let analyzer = OperationAnalyzer::new(&registry, &BUILTIN_TABLES.operations);
  f(&analyzer)
}
