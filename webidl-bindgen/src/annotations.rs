//! Annotations placed on generated declarations.
//!
//! Two tables feed the resolver. The common table is keyed by `Interface` or `Interface.member` and
//! applies to every generated declaration. The native table is consulted only for members backed
//! directly by a native field or method, and additionally accepts type-keyed entries:
//!
//! - `Interface.member`: annotations for the member.
//! - `+Type`: added when the member has its own entry.
//! - `-Type`: added when the member has no entry of its own.
//! - `Type`: always added.

use crate::docs::DocSource;
use ahash::AHashMap;
use tracing::trace;

pub const DOM_NAME: &str = "@DomName";
pub const DOCS_EDITABLE: &str = "@DocsEditable";

#[derive(Clone, Debug, Default)]
pub struct AnnotationTables {
  pub common: AHashMap<String, Vec<String>>,
  pub native: AHashMap<String, Vec<String>>,
}

fn owned(annotations: &[&str]) -> Vec<String> {
  annotations.iter().map(|a| a.to_string()).collect()
}

const INDEXED_DB: &[&str] = &[
  "@SupportedBrowser(SupportedBrowser.CHROME)",
  "@SupportedBrowser(SupportedBrowser.FIREFOX, '15')",
  "@SupportedBrowser(SupportedBrowser.IE, '10')",
  "@Experimental",
];

const FILE_SYSTEM: &[&str] = &["@SupportedBrowser(SupportedBrowser.CHROME)", "@Experimental"];

const ALL_BUT_IE9: &[&str] = &[
  "@SupportedBrowser(SupportedBrowser.CHROME)",
  "@SupportedBrowser(SupportedBrowser.FIREFOX)",
  "@SupportedBrowser(SupportedBrowser.IE, '10')",
  "@SupportedBrowser(SupportedBrowser.SAFARI)",
];

const WEBKIT_EXPERIMENTAL: &[&str] = &[
  "@SupportedBrowser(SupportedBrowser.CHROME)",
  "@SupportedBrowser(SupportedBrowser.SAFARI)",
  "@Experimental",
];

const HISTORY: &[&str] = ALL_BUT_IE9;

const PERFORMANCE: &[&str] = &[
  "@SupportedBrowser(SupportedBrowser.CHROME)",
  "@SupportedBrowser(SupportedBrowser.FIREFOX)",
  "@SupportedBrowser(SupportedBrowser.IE)",
];

const SPEECH_RECOGNITION: &[&str] = &[
  "@SupportedBrowser(SupportedBrowser.CHROME, '25')",
  "@Experimental",
];

const WEB_SQL: &[&str] = &[
  "@SupportedBrowser(SupportedBrowser.CHROME)",
  "@SupportedBrowser(SupportedBrowser.SAFARI)",
  "@Experimental",
];

const CHROME_25_EXPERIMENTAL: &[&str] = SPEECH_RECOGNITION;

const CHROME_FIREFOX_SAFARI: &[&str] = &[
  "@SupportedBrowser(SupportedBrowser.CHROME)",
  "@SupportedBrowser(SupportedBrowser.FIREFOX)",
  "@SupportedBrowser(SupportedBrowser.SAFARI)",
];

const CREATES_IMAGE_DATA: &[&str] = &["@Creates('ImageData|=Object')"];
const CANVAS_STYLE: &[&str] = &[
  "@Creates('String|CanvasGradient|CanvasPattern')",
  "@Returns('String|CanvasGradient|CanvasPattern')",
];
const IDB_REQUEST: &[&str] = &["@Returns('Request')", "@Creates('Request')"];
const SERIALIZED_SCRIPT_VALUE: &[&str] = &[
  "@annotation_Creates_SerializedScriptValue",
  "@annotation_Returns_SerializedScriptValue",
];

impl AnnotationTables {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert_common(&mut self, key: impl Into<String>, annotations: &[&str]) -> &mut Self {
    self.common.insert(key.into(), owned(annotations));
    self
  }

  pub fn insert_native(&mut self, key: impl Into<String>, annotations: &[&str]) -> &mut Self {
    self.native.insert(key.into(), owned(annotations));
    self
  }

  pub fn builtin() -> Self {
    let mut tables = Self::new();
    for (key, annotations) in [
      ("ArrayBuffer", ALL_BUT_IE9),
      ("ArrayBufferView", ALL_BUT_IE9),
      ("Database", WEB_SQL),
      ("DatabaseSync", WEB_SQL),
      (
        "DOMApplicationCache",
        &[
          "@SupportedBrowser(SupportedBrowser.CHROME)",
          "@SupportedBrowser(SupportedBrowser.FIREFOX)",
          "@SupportedBrowser(SupportedBrowser.IE, '10')",
          "@SupportedBrowser(SupportedBrowser.OPERA)",
          "@SupportedBrowser(SupportedBrowser.SAFARI)",
        ][..],
      ),
      ("DOMWindow.convertPointFromNodeToPage", WEBKIT_EXPERIMENTAL),
      ("DOMWindow.convertPointFromPageToNode", WEBKIT_EXPERIMENTAL),
      ("DOMWindow.indexedDB", INDEXED_DB),
      ("DOMWindow.openDatabase", WEB_SQL),
      ("DOMWindow.performance", PERFORMANCE),
      ("DOMWindow.webkitNotifications", WEBKIT_EXPERIMENTAL),
      ("DOMWindow.webkitRequestFileSystem", FILE_SYSTEM),
      ("DOMWindow.webkitResolveLocalFileSystemURL", FILE_SYSTEM),
      ("Element.webkitCreateShadowRoot", CHROME_25_EXPERIMENTAL),
      ("Element.webkitMatchesSelector", &["@Experimental"][..]),
      ("FileSystem", FILE_SYSTEM),
      ("FileSystemSync", FILE_SYSTEM),
      ("HashChangeEvent", CHROME_FIREFOX_SAFARI),
      ("History.pushState", HISTORY),
      ("History.replaceState", HISTORY),
      ("HTMLContentElement", CHROME_25_EXPERIMENTAL),
      ("HTMLDataListElement", ALL_BUT_IE9),
      ("HTMLDetailsElement", WEBKIT_EXPERIMENTAL),
      (
        "HTMLEmbedElement",
        &[
          "@SupportedBrowser(SupportedBrowser.CHROME)",
          "@SupportedBrowser(SupportedBrowser.IE)",
          "@SupportedBrowser(SupportedBrowser.SAFARI)",
        ][..],
      ),
      ("HTMLKeygenElement", WEBKIT_EXPERIMENTAL),
      ("HTMLMeterElement", CHROME_FIREFOX_SAFARI),
      ("HTMLObjectElement", CHROME_FIREFOX_SAFARI),
      ("HTMLOutputElement", CHROME_FIREFOX_SAFARI),
      ("HTMLProgressElement", ALL_BUT_IE9),
      ("HTMLShadowElement", CHROME_25_EXPERIMENTAL),
      (
        "HTMLTrackElement",
        &[
          "@SupportedBrowser(SupportedBrowser.CHROME)",
          "@SupportedBrowser(SupportedBrowser.IE, '10')",
          "@SupportedBrowser(SupportedBrowser.SAFARI)",
        ][..],
      ),
      ("IDBFactory", INDEXED_DB),
      ("IDBDatabase", INDEXED_DB),
      (
        "MutationObserver",
        &[
          "@SupportedBrowser(SupportedBrowser.CHROME)",
          "@SupportedBrowser(SupportedBrowser.FIREFOX)",
          "@SupportedBrowser(SupportedBrowser.SAFARI)",
          "@Experimental",
        ][..],
      ),
      ("NotificationCenter", WEBKIT_EXPERIMENTAL),
      ("Performance", PERFORMANCE),
      ("PopStateEvent", HISTORY),
      ("ShadowRoot", CHROME_25_EXPERIMENTAL),
      ("SpeechRecognition", SPEECH_RECOGNITION),
      ("SpeechRecognitionAlternative", SPEECH_RECOGNITION),
      ("SpeechRecognitionError", SPEECH_RECOGNITION),
      ("SpeechRecognitionEvent", SPEECH_RECOGNITION),
      ("SpeechRecognitionResult", SPEECH_RECOGNITION),
      ("SQLTransaction", WEB_SQL),
      ("SQLTransactionSync", WEB_SQL),
      ("WebKitCSSMatrix", WEBKIT_EXPERIMENTAL),
      ("WebKitPoint", WEBKIT_EXPERIMENTAL),
      ("WebSocket", ALL_BUT_IE9),
      ("WorkerContext.indexedDB", INDEXED_DB),
      ("WorkerContext.openDatabase", WEB_SQL),
      ("WorkerContext.openDatabaseSync", WEB_SQL),
      ("WorkerContext.webkitRequestFileSystem", FILE_SYSTEM),
      ("WorkerContext.webkitRequestFileSystemSync", FILE_SYSTEM),
      ("WorkerContext.webkitResolveLocalFileSystemSyncURL", FILE_SYSTEM),
      ("WorkerContext.webkitResolveLocalFileSystemURL", FILE_SYSTEM),
      ("XMLHttpRequestProgressEvent", WEBKIT_EXPERIMENTAL),
      ("XSLTProcessor", CHROME_FIREFOX_SAFARI),
    ] {
      tables.insert_common(key, annotations);
    }

    for (key, annotations) in [
      ("CanvasRenderingContext2D.createImageData", CREATES_IMAGE_DATA),
      ("CanvasRenderingContext2D.getImageData", CREATES_IMAGE_DATA),
      ("CanvasRenderingContext2D.webkitGetImageDataHD", CREATES_IMAGE_DATA),
      ("CanvasRenderingContext2D.fillStyle", CANVAS_STYLE),
      ("CanvasRenderingContext2D.strokeStyle", CANVAS_STYLE),
      (
        "DOMWindow",
        &["@Creates('Window|=Object')", "@Returns('Window|=Object')"][..],
      ),
      (
        "DOMWindow.openDatabase",
        &["@Creates('Database')", "@Creates('DatabaseSync')"][..],
      ),
      (
        "-EventTarget",
        &["@Creates('EventTarget|=Object')", "@Returns('EventTarget|=Object')"][..],
      ),
      (
        "Event.currentTarget",
        &["@Creates('Null')", "@Returns('EventTarget|=Object')"][..],
      ),
      (
        "Event.target",
        &["@Creates('Node')", "@Returns('EventTarget|=Object')"][..],
      ),
      (
        "MouseEvent.relatedTarget",
        &["@Creates('Node')", "@Returns('EventTarget|=Object')"][..],
      ),
      (
        "Touch.target",
        &["@Creates('Element|Document')", "@Returns('Element|Document')"][..],
      ),
      ("FileReader.result", &["@Creates('String|ArrayBuffer|Null')"][..]),
      ("IDBRequest.result", &["@Creates('Null')"][..]),
      ("IDBRequest.source", &["@Creates('Null')"][..]),
      ("IDBFactory.open", &["@Creates('Database')"][..]),
      ("IDBObjectStore.put", &["@_annotation_Creates_IDBKey"][..]),
      ("IDBObjectStore.add", &["@_annotation_Creates_IDBKey"][..]),
      (
        "IDBObjectStore.get",
        &["@annotation_Creates_SerializedScriptValue"][..],
      ),
      ("IDBObjectStore.openCursor", &["@Creates('Cursor')"][..]),
      ("IDBIndex.get", &["@annotation_Creates_SerializedScriptValue"][..]),
      (
        "IDBIndex.getKey",
        &[
          "@annotation_Creates_SerializedScriptValue",
          "@Creates('ObjectStore')",
        ][..],
      ),
      ("IDBIndex.openCursor", &["@Creates('Cursor')"][..]),
      ("IDBIndex.openKeyCursor", &["@Creates('Cursor')"][..]),
      ("IDBCursorWithValue.value", SERIALIZED_SCRIPT_VALUE),
      (
        "IDBCursor.key",
        &["@_annotation_Creates_IDBKey", "@_annotation_Returns_IDBKey"][..],
      ),
      ("+IDBRequest", IDB_REQUEST),
      ("+IDBOpenDBRequest", IDB_REQUEST),
      ("+IDBVersionChangeRequest", IDB_REQUEST),
      ("MessageEvent.ports", &["@Creates('=List')"][..]),
      ("MessageEvent.data", SERIALIZED_SCRIPT_VALUE),
      ("PopStateEvent.state", SERIALIZED_SCRIPT_VALUE),
      ("SerializedScriptValue", SERIALIZED_SCRIPT_VALUE),
      ("SQLResultSetRowList.item", &["@Creates('=Object')"][..]),
      (
        "XMLHttpRequest.response",
        &["@Creates('ArrayBuffer|Blob|Document|=Object|=List|String|num')"][..],
      ),
    ] {
      tables.insert_native(key, annotations);
    }
    tables
  }
}

fn member_key(interface: &str, member: Option<&str>) -> String {
  match member {
    Some(member) => format!("{interface}.{member}"),
    None => interface.to_string(),
  }
}

/// Layered annotation lookup over [`AnnotationTables`]. Layers are concatenated, never
/// short-circuited.
pub struct AnnotationResolver<'t> {
  tables: &'t AnnotationTables,
}

impl<'t> AnnotationResolver<'t> {
  pub fn new(tables: &'t AnnotationTables) -> Self {
    Self { tables }
  }

  /// Annotations for a generated interface (`member` is `None`) or member.
  ///
  /// The result always starts with the canonical `@DomName` marker, so it is never empty.
  pub fn resolve(&self, interface: &str, member: Option<&str>) -> Vec<String> {
    let key = member_key(interface, member);
    let mut annotations = vec![format!("{DOM_NAME}('{key}')")];
    if member.is_some() {
      annotations.push(DOCS_EDITABLE.to_string());
    }
    if let Some(common) = self.tables.common.get(&key) {
      annotations.extend(common.iter().cloned());
    }
    trace!(key = key.as_str(), count = annotations.len(), "resolved annotations");
    annotations
  }

  /// [`resolve`](Self::resolve) followed by the native-member layer for a member of type
  /// `idl_type`.
  pub fn resolve_native(&self, idl_type: &str, interface: &str, member: &str) -> Vec<String> {
    let mut annotations = self.resolve(interface, Some(member));
    annotations.extend(self.native_annotations(idl_type, interface, member));
    annotations
  }

  /// Documentation comments for the declaration, then its annotations.
  pub fn resolve_with_comments(
    &self,
    docs: &dyn DocSource,
    library: Option<&str>,
    interface: &str,
    member: Option<&str>,
  ) -> Vec<String> {
    let mut annotations = docs.comments(library, interface, member);
    annotations.extend(self.resolve(interface, member));
    annotations
  }

  /// Documentation comments, then [`resolve_native`](Self::resolve_native).
  pub fn resolve_native_with_comments(
    &self,
    docs: &dyn DocSource,
    library: Option<&str>,
    idl_type: &str,
    interface: &str,
    member: &str,
  ) -> Vec<String> {
    let mut annotations = docs.comments(library, interface, Some(member));
    annotations.extend(self.resolve_native(idl_type, interface, member));
    annotations
  }

  /// The native-member layer alone: `+Type` or `-Type`, then `Type`, then the member's own entry.
  pub fn native_annotations(&self, idl_type: &str, interface: &str, member: &str) -> Vec<String> {
    let native = &self.tables.native;
    let own = native
      .get(&format!("{interface}.{member}"))
      .filter(|annotations| !annotations.is_empty());
    let qualified = match own {
      Some(_) => native.get(&format!("+{idl_type}")),
      None => native.get(&format!("-{idl_type}")),
    };
    qualified
      .into_iter()
      .chain(native.get(idl_type))
      .chain(own)
      .flat_map(|layer| layer.iter().cloned())
      .collect()
  }

  /// Whether the member has annotations beyond the canonical markers, which forces it to be
  /// generated as a native member.
  pub fn has_conversion_annotations(&self, idl_type: &str, interface: &str, member: &str) -> bool {
    let common = self
      .tables
      .common
      .get(&format!("{interface}.{member}"))
      .is_some_and(|a| !a.is_empty());
    common || !self.native_annotations(idl_type, interface, member).is_empty()
  }
}

/// One annotation per line, each line break followed by `indentation` so the next declaration
/// starts indented. Empty input renders as the empty string.
pub fn format_annotations(annotations: &[String], indentation: &str) -> String {
  if annotations.is_empty() {
    return String::new();
  }
  let newline = format!("\n{indentation}");
  let mut out = annotations.join(&newline);
  out.push_str(&newline);
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn negative_wildcard_applies_only_without_member_entry() {
    let tables = AnnotationTables::builtin();
    let resolver = AnnotationResolver::new(&tables);
    assert_eq!(
      resolver.native_annotations("EventTarget", "Node", "parentTarget"),
      vec![
        "@Creates('EventTarget|=Object')",
        "@Returns('EventTarget|=Object')"
      ]
    );
    assert_eq!(
      resolver.native_annotations("EventTarget", "Event", "target"),
      vec!["@Creates('Node')", "@Returns('EventTarget|=Object')"]
    );
  }

  #[test]
  fn formatting() {
    assert_eq!(format_annotations(&[], "  "), "");
    let annotations = vec!["@A".to_string(), "@B".to_string()];
    assert_eq!(format_annotations(&annotations, "  "), "@A\n  @B\n  ");
  }
}
