use crate::idl::Attribute;
use crate::idl::Interface;
use crate::idl::InterfaceDatabase;
use ahash::AHashMap;
use once_cell::sync::Lazy;

/// Maps IDL interface names to generated (Dart) class names.
pub trait Renamer {
  /// Canonical generated name of a declared interface.
  fn rename_interface(&self, interface: &Interface) -> String;

  /// Mechanical fallback for names that are not declared separately.
  fn dartify_type_name(&self, type_name: &str) -> String;
}

/// Interfaces whose generated names cannot be derived mechanically.
pub static INTERFACE_RENAMES: Lazy<AHashMap<&'static str, &'static str>> = Lazy::new(|| {
  let mut map = AHashMap::new();
  for (idl, dart) in [
    ("CDATASection", "CDataSection"),
    ("DOMApplicationCache", "ApplicationCache"),
    ("DOMCoreException", "DomException"),
    ("DOMFileSystem", "FileSystem"),
    ("DOMFileSystemSync", "FileSystemSync"),
    ("DOMFormData", "FormData"),
    ("DOMURL", "Url"),
    ("DOMWindow", "Window"),
    ("HTMLAppletElement", "_AppletElement"),
    ("HTMLBaseFontElement", "_BaseFontElement"),
    ("HTMLDirectoryElement", "_DirectoryElement"),
    ("HTMLDocument", "HtmlDocument"),
    ("HTMLFontElement", "_FontElement"),
    ("HTMLFrameElement", "_FrameElement"),
    ("HTMLFrameSetElement", "_FrameSetElement"),
    ("HTMLMarqueeElement", "_MarqueeElement"),
    ("IDBAny", "_Any"),
    ("IDBFactory", "IdbFactory"),
    ("NavigatorUserMediaErrorCallback", "_NavigatorUserMediaErrorCallback"),
    ("NavigatorUserMediaSuccessCallback", "_NavigatorUserMediaSuccessCallback"),
    ("SVGDocument", "SvgDocument"),
    ("SVGElement", "SvgElement"),
    ("SVGException", "SvgException"),
    ("SVGSVGElement", "SvgSvgElement"),
    ("WebGLVertexArrayObjectOES", "WebGLVertexArrayObject"),
    ("WebKitAnimationEvent", "AnimationEvent"),
    ("WebKitCSSKeyframeRule", "CssKeyframeRule"),
    ("WebKitCSSKeyframesRule", "CssKeyframesRule"),
    ("WebKitCSSMatrix", "CssMatrix"),
    ("WebKitCSSTransformValue", "CssTransformValue"),
    ("WebKitPoint", "DomPoint"),
    ("WebKitTransitionEvent", "TransitionEvent"),
    ("XMLHttpRequest", "HttpRequest"),
    ("XMLHttpRequestException", "HttpRequestException"),
    ("XMLHttpRequestProgressEvent", "HttpRequestProgressEvent"),
    ("XMLHttpRequestUpload", "HttpRequestUpload"),
  ] {
    map.insert(idl, dart);
  }
  map
});

/// Attribute names that are reserved words in the target language.
static ATTRIBUTE_RENAMES: Lazy<AHashMap<&'static str, &'static str>> = Lazy::new(|| {
  let mut map = AHashMap::new();
  map.insert("default", "defaultValue");
  map.insert("final", "finalValue");
  map
});

/// The renamer used for the `dart:html` family of libraries.
pub struct HtmlRenamer<'db> {
  db: &'db dyn InterfaceDatabase,
}

impl<'db> HtmlRenamer<'db> {
  pub fn new(db: &'db dyn InterfaceDatabase) -> Self {
    Self { db }
  }

  pub fn dartify_member_name(&self, member_name: &str) -> String {
    camel_case_name(member_name.strip_suffix("OES").unwrap_or(member_name))
  }
}

impl<'db> Renamer for HtmlRenamer<'db> {
  fn rename_interface(&self, interface: &Interface) -> String {
    if let Some(renamed) = INTERFACE_RENAMES.get(interface.name.as_str()) {
      return renamed.to_string();
    }
    if let Some(stripped) = interface.name.strip_prefix("HTML") {
      let is_element_or_document = self
        .db
        .hierarchy(interface)
        .iter()
        .any(|i| i.name == "Element" || i.name == "Document");
      if is_element_or_document {
        return stripped.to_string();
      }
    }
    self.dartify_type_name(&interface.name)
  }

  fn dartify_type_name(&self, type_name: &str) -> String {
    if let Some(renamed) = INTERFACE_RENAMES.get(type_name) {
      return renamed.to_string();
    }
    let name = type_name.strip_prefix("SVG").unwrap_or(type_name);
    let name = name.strip_prefix("IDB").unwrap_or(name);
    camel_case_name(name)
  }
}

/// The generated name of an attribute: `DartName` wins, then the reserved-word renames.
pub fn attribute_dom_name(attr: &Attribute) -> String {
  if let Some(name) = attr.ext_attrs.ident("DartName") {
    return name.to_string();
  }
  ATTRIBUTE_RENAMES
    .get(attr.name.as_str())
    .map(|n| n.to_string())
    .unwrap_or_else(|| attr.name.clone())
}

/// Lowercases the inner letters of upper-case runs: the first capital of a run is kept, and so is
/// the last one when it starts the next word.
///
/// `WebKitCSSFilterValue` becomes `WebKitCssFilterValue`; `XPathNSResolver` and `IFrameElement` are
/// unchanged because their runs are too short.
pub fn camel_case_name(name: &str) -> String {
  let chars: Vec<char> = name.chars().collect();
  let mut out = String::with_capacity(name.len());
  let mut i = 0;
  while i < chars.len() {
    if !chars[i].is_ascii_uppercase() {
      out.push(chars[i]);
      i += 1;
      continue;
    }
    let mut end = i;
    while end < chars.len() && chars[end].is_ascii_uppercase() {
      end += 1;
    }
    let run = end - i;
    let at_end = end == chars.len();
    // Number of trailing capitals kept as-is.
    let keep_last = if at_end { 0 } else { 1 };
    if run >= 3 + keep_last {
      out.push(chars[i]);
      for c in &chars[i + 1..end - keep_last] {
        out.push(c.to_ascii_lowercase());
      }
      if keep_last == 1 {
        out.push(chars[end - 1]);
      }
    } else {
      out.extend(&chars[i..end]);
    }
    i = end;
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::idl::MemoryDatabase;

  #[test]
  fn camel_case_runs() {
    assert_eq!(camel_case_name("WebKitCSSFilterValue"), "WebKitCssFilterValue");
    assert_eq!(camel_case_name("XPathNSResolver"), "XPathNSResolver");
    assert_eq!(camel_case_name("IFrameElement"), "IFrameElement");
    assert_eq!(camel_case_name("CSSRule"), "CssRule");
    assert_eq!(camel_case_name("DOMURL"), "Domurl");
    assert_eq!(camel_case_name("WebGL"), "WebGL");
    assert_eq!(camel_case_name("Canvas2D"), "Canvas2D");
  }

  #[test]
  fn dartify_strips_prefixes_and_uses_renames() {
    let db = MemoryDatabase::new();
    let renamer = HtmlRenamer::new(&db);
    assert_eq!(renamer.dartify_type_name("SVGAngle"), "Angle");
    assert_eq!(renamer.dartify_type_name("IDBKeyRange"), "KeyRange");
    assert_eq!(renamer.dartify_type_name("DOMWindow"), "Window");
    assert_eq!(renamer.dartify_type_name("SVGElement"), "SvgElement");
    assert_eq!(renamer.dartify_member_name("bindVertexArrayOES"), "bindVertexArray");
  }

  #[test]
  fn html_elements_drop_prefix() {
    let mut db = MemoryDatabase::new();
    db.insert(Interface::new("Element"));
    db.insert(Interface::new("HTMLElement").with_parent("Element"));
    db.insert(Interface::new("HTMLDivElement").with_parent("HTMLElement"));
    db.insert(Interface::new("HTMLOptionsCollection"));
    let renamer = HtmlRenamer::new(&db);
    let div = db.get_interface("HTMLDivElement").unwrap();
    assert_eq!(renamer.rename_interface(div), "DivElement");
    let options = db.get_interface("HTMLOptionsCollection").unwrap();
    assert_eq!(renamer.rename_interface(options), "HtmlOptionsCollection");
  }

  #[test]
  fn attribute_names_avoid_reserved_words() {
    let db = MemoryDatabase::from_json(
      r#"[{"name": "HTMLInputElement", "attributes": [
        {"name": "default", "type": "boolean"},
        {"name": "value", "type": "DOMString"},
        {"name": "type", "type": "DOMString", "ext_attrs": {"DartName": "inputType"}}
      ]}]"#,
    )
    .unwrap();
    let input = db.get_interface("HTMLInputElement").unwrap();
    let name_of = |attr: &str| attribute_dom_name(input.find_attribute(attr).unwrap());
    assert_eq!(name_of("default"), "defaultValue");
    assert_eq!(name_of("value"), "value");
    assert_eq!(name_of("type"), "inputType");
  }
}
