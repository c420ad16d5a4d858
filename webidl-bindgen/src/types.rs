//! Resolved type descriptors and the static type table they are built from.

use ahash::AHashMap;
use ahash::AHashSet;
use serde::Serialize;
use std::rc::Rc;

/// The closed set of type classes. Each class resolves and converts values differently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TypeClass {
  Primitive,
  Interface,
  Sequence,
  Callback,
  TypedArray,
  TearOff,
}

/// Element kind of a typed array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ElementKind {
  Float,
  Integer,
}

/// Records that one interface's members are emitted as part of another interface.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum MergeLink {
  /// This interface's members are folded into the named interface; it has no class of its own.
  Into(String),
  /// The named interface's members are folded into this one.
  From(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CustomConversion {
  /// Hand-written code converts native values into the target representation.
  pub to_target: bool,
  /// Hand-written code converts target values into the native representation.
  pub to_native: bool,
}

#[derive(Debug, Serialize)]
pub struct PrimitiveType {
  pub getter_name: String,
  pub setter_name: String,
}

#[derive(Debug, Serialize)]
pub struct InterfaceType {
  pub interface_name: String,
  pub item: Option<Rc<TypeDescriptor>>,
  /// Pure interfaces have no implementation class; references keep the IDL name.
  pub pure: bool,
}

#[derive(Debug, Serialize)]
pub struct SequenceType {
  pub item: Rc<TypeDescriptor>,
  /// `DOMString[]`: backed by the platform's `DOMStringList` instead of a vector.
  pub string_list: bool,
}

#[derive(Debug, Serialize)]
pub struct CallbackType {
  pub interface_name: String,
}

#[derive(Debug, Serialize)]
pub struct TypedArrayType {
  pub interface_name: String,
  pub element: ElementKind,
  pub item: Rc<TypeDescriptor>,
  pub factory_provider: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TearOffType {
  pub interface_name: String,
  pub item: Option<Rc<TypeDescriptor>>,
}

/// Per-class data of a descriptor.
#[derive(Debug, Serialize)]
pub enum TypeVariant {
  Primitive(PrimitiveType),
  Interface(InterfaceType),
  Sequence(SequenceType),
  Callback(CallbackType),
  TypedArray(TypedArrayType),
  TearOff(TearOffType),
}

/// One resolved type reference.
///
/// Descriptors are created by [`crate::TypeRegistry`] and shared through `Rc`; within one registry
/// the same name always resolves to the same allocation.
#[derive(Debug, Serialize)]
pub struct TypeDescriptor {
  pub(crate) idl_name: String,
  pub(crate) target_type: String,
  /// The table entry named the target type explicitly.
  pub(crate) target_override: bool,
  pub(crate) native_type: String,
  pub(crate) merge: Option<MergeLink>,
  pub(crate) suppress_generated_type: bool,
  pub(crate) custom_conversion: CustomConversion,
  pub(crate) conversion_includes: Vec<String>,
  pub(crate) variant: TypeVariant,
}

impl TypeDescriptor {
  pub fn idl_name(&self) -> &str {
    &self.idl_name
  }

  pub fn type_class(&self) -> TypeClass {
    match self.variant {
      TypeVariant::Primitive(_) => TypeClass::Primitive,
      TypeVariant::Interface(_) => TypeClass::Interface,
      TypeVariant::Sequence(_) => TypeClass::Sequence,
      TypeVariant::Callback(_) => TypeClass::Callback,
      TypeVariant::TypedArray(_) => TypeClass::TypedArray,
      TypeVariant::TearOff(_) => TypeClass::TearOff,
    }
  }

  pub fn variant(&self) -> &TypeVariant {
    &self.variant
  }

  /// Name used for this type in generated signatures.
  pub fn target_type(&self) -> &str {
    &self.target_type
  }

  /// Name of the underlying runtime representation.
  pub fn native_type(&self) -> &str {
    &self.native_type
  }

  pub fn item_type(&self) -> Option<&Rc<TypeDescriptor>> {
    match &self.variant {
      TypeVariant::Interface(i) => i.item.as_ref(),
      TypeVariant::Sequence(s) => Some(&s.item),
      TypeVariant::TypedArray(t) => Some(&t.item),
      TypeVariant::TearOff(t) => t.item.as_ref(),
      TypeVariant::Primitive(_) | TypeVariant::Callback(_) => None,
    }
  }

  /// The interface this one is merged into, if any.
  pub fn merge_target(&self) -> Option<&str> {
    match &self.merge {
      Some(MergeLink::Into(name)) => Some(name),
      _ => None,
    }
  }

  /// The interface merged into this one, if any.
  pub fn merge_source(&self) -> Option<&str> {
    match &self.merge {
      Some(MergeLink::From(name)) => Some(name),
      _ => None,
    }
  }

  pub fn suppress_generated_type(&self) -> bool {
    self.suppress_generated_type
  }

  pub fn custom_conversion(&self) -> CustomConversion {
    self.custom_conversion
  }

  pub fn is_typed_array(&self) -> bool {
    matches!(self.variant, TypeVariant::TypedArray(_))
  }

  pub fn factory_provider(&self) -> Option<&str> {
    match &self.variant {
      TypeVariant::TypedArray(t) => t.factory_provider.as_deref(),
      _ => None,
    }
  }
}

/// One entry of the static type table.
#[derive(Clone, Debug)]
pub struct TypeData {
  pub class: TypeClass,
  pub target_type: Option<&'static str>,
  pub native_type: Option<&'static str>,
  /// Interface whose members are folded into this one.
  pub merged_interface: Option<&'static str>,
  /// Interface this one is folded into.
  pub merged_into: Option<&'static str>,
  pub custom_to_target: bool,
  pub custom_to_native: bool,
  pub conversion_includes: &'static [&'static str],
  pub getter_name: &'static str,
  pub setter_name: &'static str,
  pub item_type: Option<&'static str>,
  pub suppress_interface: bool,
}

impl TypeData {
  pub fn new(class: TypeClass) -> Self {
    Self {
      class,
      target_type: None,
      native_type: None,
      merged_interface: None,
      merged_into: None,
      custom_to_target: false,
      custom_to_native: false,
      conversion_includes: &[],
      getter_name: "getAttribute",
      setter_name: "setAttribute",
      item_type: None,
      suppress_interface: false,
    }
  }

  pub fn primitive(target_type: &'static str) -> Self {
    Self::new(TypeClass::Primitive).target(target_type)
  }

  pub fn interface() -> Self {
    Self::new(TypeClass::Interface)
  }

  pub fn tear_off() -> Self {
    Self::new(TypeClass::TearOff)
  }

  pub fn typed_array(item_type: &'static str) -> Self {
    Self::new(TypeClass::TypedArray).item(item_type)
  }

  pub fn target(mut self, target_type: &'static str) -> Self {
    self.target_type = Some(target_type);
    self
  }

  pub fn native(mut self, native_type: &'static str) -> Self {
    self.native_type = Some(native_type);
    self
  }

  pub fn item(mut self, item_type: &'static str) -> Self {
    self.item_type = Some(item_type);
    self
  }

  pub fn suppressed(mut self) -> Self {
    self.suppress_interface = true;
    self
  }

  pub fn merges(mut self, merged_interface: &'static str) -> Self {
    self.merged_interface = Some(merged_interface);
    self
  }

  pub fn merged_into(mut self, target: &'static str) -> Self {
    self.merged_into = Some(target);
    self
  }

  pub fn custom_to_target(mut self) -> Self {
    self.custom_to_target = true;
    self
  }

  pub fn custom_to_native(mut self) -> Self {
    self.custom_to_native = true;
    self
  }

  pub fn includes(mut self, conversion_includes: &'static [&'static str]) -> Self {
    self.conversion_includes = conversion_includes;
    self
  }

  pub fn accessors(mut self, getter_name: &'static str, setter_name: &'static str) -> Self {
    self.getter_name = getter_name;
    self.setter_name = setter_name;
    self
  }
}

/// The static type configuration of one generation run.
#[derive(Clone, Debug, Default)]
pub struct TypeTables {
  pub types: AHashMap<&'static str, TypeData>,
  pub pure_interfaces: AHashSet<&'static str>,
  /// Typed array name to the factory class that constructs it.
  pub typed_array_factories: AHashMap<&'static str, &'static str>,
}

impl TypeTables {
  pub fn insert(&mut self, idl_name: &'static str, data: TypeData) -> &mut Self {
    self.types.insert(idl_name, data);
    self
  }

  pub fn get(&self, idl_name: &str) -> Option<&TypeData> {
    self.types.get(idl_name)
  }

  pub fn is_pure_interface(&self, idl_name: &str) -> bool {
    self.pure_interfaces.contains(idl_name)
  }

  /// The built-in WebCore/`dart:html` tables.
  pub fn builtin() -> Self {
    let mut tables = TypeTables::default();
    for (name, data) in builtin_type_entries() {
      tables.types.insert(name, data);
    }
    tables.pure_interfaces.extend([
      "DOMStringMap",
      "ElementTimeControl",
      "ElementTraversal",
      "EventListener",
      "MediaQueryListListener",
      "MutationCallback",
      "NodeSelector",
      "SVGExternalResourcesRequired",
      "SVGFilterPrimitiveStandardAttributes",
      "SVGFitToViewBox",
      "SVGLangSpace",
      "SVGLocatable",
      "SVGStylable",
      "SVGTests",
      "SVGTransformable",
      "SVGURIReference",
      "SVGZoomAndPan",
      "TimeoutHandler",
    ]);
    for name in [
      "Float32Array",
      "Float64Array",
      "Int8Array",
      "Int16Array",
      "Int32Array",
      "Uint8Array",
      "Uint8ClampedArray",
      "Uint16Array",
      "Uint32Array",
    ] {
      tables
        .typed_array_factories
        .insert(name, "_TypedArrayFactoryProvider");
    }
    tables
  }
}

fn builtin_type_entries() -> Vec<(&'static str, TypeData)> {
  use TypeData as T;
  vec![
    (
      "boolean",
      T::primitive("bool")
        .native("bool")
        .accessors("hasAttribute", "setBooleanAttribute"),
    ),
    ("byte", T::primitive("int").native("int")),
    ("octet", T::primitive("int").native("int")),
    ("short", T::primitive("int").native("int")),
    ("unsigned short", T::primitive("int").native("int")),
    ("int", T::primitive("int")),
    ("unsigned int", T::primitive("int").native("unsigned")),
    (
      "long",
      T::primitive("int")
        .native("int")
        .accessors("getIntegralAttribute", "setIntegralAttribute"),
    ),
    (
      "unsigned long",
      T::primitive("int")
        .native("unsigned")
        .accessors("getUnsignedIntegralAttribute", "setUnsignedIntegralAttribute"),
    ),
    ("long long", T::primitive("int")),
    ("unsigned long long", T::primitive("int")),
    ("float", T::primitive("num").native("double")),
    ("double", T::primitive("num")),
    ("any", T::primitive("Object").native("ScriptValue")),
    ("Array", T::primitive("List")),
    ("custom", T::primitive("dynamic")),
    ("Date", T::primitive("Date").native("double")),
    ("DOMObject", T::primitive("Object").native("ScriptValue")),
    ("DOMString", T::primitive("String").native("String")),
    ("Dictionary", T::primitive("Map")),
    ("Flags", T::primitive("Object")),
    ("DOMTimeStamp", T::primitive("int").native("unsigned long long")),
    ("object", T::primitive("Object").native("ScriptValue")),
    ("ObjectArray", T::primitive("List")),
    ("PositionOptions", T::primitive("Object")),
    ("SerializedScriptValue", T::primitive("dynamic")),
    ("WebKitFlags", T::primitive("Object")),
    ("sequence", T::primitive("List")),
    ("void", T::primitive("void")),
    ("CSSRule", T::interface().includes(&["CSSImportRule"])),
    ("DOMException", T::interface().native("DOMCoreException")),
    ("DOMStringMap", T::interface().target("Map<String, String>")),
    ("DOMWindow", T::interface().custom_to_target()),
    (
      "Element",
      T::interface().merges("HTMLElement").custom_to_target(),
    ),
    ("EventListener", T::interface().custom_to_native()),
    ("EventTarget", T::interface().custom_to_native()),
    (
      "HTMLElement",
      T::interface().merged_into("Element").custom_to_target(),
    ),
    ("IDBAny", T::interface().target("dynamic").custom_to_native()),
    ("IDBKey", T::interface().target("dynamic").custom_to_native()),
    (
      "MutationRecordArray",
      T::interface()
        .native("MutationRecordArray")
        .target("List<MutationRecord>"),
    ),
    ("StyleSheet", T::interface().includes(&["CSSStyleSheet"])),
    ("SVGElement", T::interface().custom_to_target()),
    ("ClientRectList", T::interface().item("ClientRect").suppressed()),
    ("CSSRuleList", T::interface().item("CSSRule").suppressed()),
    ("CSSValueList", T::interface().item("CSSValue").suppressed()),
    ("DOMMimeTypeArray", T::interface().item("DOMMimeType")),
    ("DOMPluginArray", T::interface().item("DOMPlugin")),
    (
      "DOMStringList",
      T::interface()
        .item("DOMString")
        .target("List<String>")
        .custom_to_native(),
    ),
    ("EntryArray", T::interface().item("Entry").suppressed()),
    ("EntryArraySync", T::interface().item("EntrySync").suppressed()),
    ("FileList", T::interface().item("File").target("List<File>")),
    ("GamepadList", T::interface().item("Gamepad").suppressed()),
    ("HTMLAllCollection", T::interface().item("Node")),
    ("HTMLCollection", T::interface().item("Node")),
    ("MediaStreamList", T::interface().item("MediaStream").suppressed()),
    ("NamedNodeMap", T::interface().item("Node")),
    ("NodeList", T::interface().item("Node").target("List<Node>")),
    (
      "SVGElementInstanceList",
      T::interface().item("SVGElementInstance").suppressed(),
    ),
    ("SourceBufferList", T::interface().item("SourceBuffer")),
    ("SpeechGrammarList", T::interface().item("SpeechGrammar")),
    (
      "SpeechInputResultList",
      T::interface().item("SpeechInputResult").suppressed(),
    ),
    (
      "SpeechRecognitionResultList",
      T::interface().item("SpeechRecognitionResult").suppressed(),
    ),
    ("SQLResultSetRowList", T::interface().item("Dictionary")),
    ("StyleSheetList", T::interface().item("StyleSheet").suppressed()),
    ("TextTrackCueList", T::interface().item("TextTrackCue")),
    ("TextTrackList", T::interface().item("TextTrack")),
    ("TouchList", T::interface().item("Touch")),
    (
      "WebKitAnimationList",
      T::interface().item("WebKitAnimation").suppressed(),
    ),
    ("Float32Array", T::typed_array("double")),
    ("Float64Array", T::typed_array("double")),
    ("Int8Array", T::typed_array("int")),
    ("Int16Array", T::typed_array("int")),
    ("Int32Array", T::typed_array("int")),
    ("Uint8Array", T::typed_array("int")),
    ("Uint8ClampedArray", T::typed_array("int")),
    ("Uint16Array", T::typed_array("int")),
    ("Uint32Array", T::typed_array("int")),
    ("SVGAngle", T::tear_off()),
    ("SVGLength", T::tear_off()),
    ("SVGLengthList", T::tear_off().item("SVGLength")),
    ("SVGMatrix", T::tear_off()),
    (
      "SVGNumber",
      T::tear_off().native("SVGPropertyTearOff<float>"),
    ),
    ("SVGNumberList", T::tear_off().item("SVGNumber")),
    (
      "SVGPathSegList",
      T::tear_off()
        .item("SVGPathSeg")
        .native("SVGPathSegListPropertyTearOff"),
    ),
    (
      "SVGPoint",
      T::tear_off().native("SVGPropertyTearOff<FloatPoint>"),
    ),
    ("SVGPointList", T::tear_off()),
    ("SVGPreserveAspectRatio", T::tear_off()),
    (
      "SVGRect",
      T::tear_off().native("SVGPropertyTearOff<FloatRect>"),
    ),
    (
      "SVGStringList",
      T::tear_off()
        .item("DOMString")
        .native("SVGStaticListPropertyTearOff<SVGStringList>"),
    ),
    ("SVGTransform", T::tear_off()),
    (
      "SVGTransformList",
      T::tear_off()
        .item("SVGTransform")
        .native("SVGTransformListPropertyTearOff"),
    ),
  ]
}
