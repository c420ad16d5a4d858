//! Per-class behavior of resolved types.
//!
//! Every function here is a pure function of a descriptor (and, for member-dependent shapes, the
//! name of the interface declaring the member). Dispatch is a `match` on [`TypeVariant`].

use crate::error::BindgenError;
use crate::error::BindgenResult;
use crate::idl::ExtAttrs;
use crate::types::CallbackType;
use crate::types::CustomConversion;
use crate::types::ElementKind;
use crate::types::InterfaceType;
use crate::types::MergeLink;
use crate::types::PrimitiveType;
use crate::types::SequenceType;
use crate::types::TearOffType;
use crate::types::TypeData;
use crate::types::TypeDescriptor;
use crate::types::TypeVariant;
use crate::types::TypedArrayType;
use std::rc::Rc;

/// Tear-off types whose values are created fresh from the underlying property.
const SVG_PRIMITIVE_TEAR_OFFS: &[&str] = &[
  "SVGAngle",
  "SVGLength",
  "SVGMatrix",
  "SVGNumber",
  "SVGPoint",
  "SVGRect",
  "SVGTransform",
];

/// Headers needed by every SVG type besides its own.
const SVG_SUPPLEMENTAL_INCLUDES: &[&str] = &[
  "\"SVGAnimatedPropertyTearOff.h\"",
  "\"SVGAnimatedListPropertyTearOff.h\"",
  "\"SVGStaticListPropertyTearOff.h\"",
  "\"SVGAnimatedListPropertyTearOff.h\"",
  "\"SVGTransformListPropertyTearOff.h\"",
  "\"SVGPathSegListPropertyTearOff.h\"",
];

/// Array types that live in WTF rather than WebCore.
const WTF_TYPES: &[&str] = &[
  "ArrayBuffer",
  "ArrayBufferView",
  "Float32Array",
  "Float64Array",
  "Int8Array",
  "Int16Array",
  "Int32Array",
  "Uint8Array",
  "Uint8ClampedArray",
  "Uint16Array",
  "Uint32Array",
];

/// Shape of the expression passed to the native implementation for a converted argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgumentExpression {
  /// The converted value itself.
  Value,
  /// `value.get()`, unwrapping a `RefPtr`.
  Get,
  /// `value->propertyReference()`, reaching through a scalar tear-off.
  PropertyReference,
}

impl ArgumentExpression {
  pub fn apply(self, value: &str) -> String {
    match self {
      ArgumentExpression::Value => value.to_string(),
      ArgumentExpression::Get => format!("{value}.get()"),
      ArgumentExpression::PropertyReference => format!("{value}->propertyReference()"),
    }
  }
}

/// How a target value is converted into its native representation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeConversion {
  pub argument: ArgumentExpression,
  pub native_type: String,
  pub class: String,
  pub function: String,
}

fn merge_link(data: &TypeData) -> Option<MergeLink> {
  if let Some(target) = data.merged_into {
    return Some(MergeLink::Into(target.to_string()));
  }
  data
    .merged_interface
    .map(|source| MergeLink::From(source.to_string()))
}

fn custom_conversion(data: &TypeData) -> CustomConversion {
  CustomConversion {
    to_target: data.custom_to_target,
    to_native: data.custom_to_native,
  }
}

fn extra_includes(data: &TypeData) -> Vec<String> {
  data
    .conversion_includes
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Collection interfaces without a generated class of their own surface as plain lists.
fn interface_target_type(
  data: &TypeData,
  interface_name: &str,
  item: Option<&Rc<TypeDescriptor>>,
) -> String {
  match item {
    Some(item) if data.suppress_interface => format!("List<{}>", item.target_type()),
    _ => data.target_type.unwrap_or(interface_name).to_string(),
  }
}

pub(crate) fn build_primitive(idl_name: &str, data: &TypeData) -> TypeDescriptor {
  TypeDescriptor {
    idl_name: idl_name.to_string(),
    target_type: data.target_type.unwrap_or(idl_name).to_string(),
    target_override: data.target_type.is_some(),
    native_type: data.native_type.unwrap_or(idl_name).to_string(),
    merge: merge_link(data),
    suppress_generated_type: data.suppress_interface,
    custom_conversion: custom_conversion(data),
    conversion_includes: extra_includes(data),
    variant: TypeVariant::Primitive(PrimitiveType {
      getter_name: data.getter_name.to_string(),
      setter_name: data.setter_name.to_string(),
    }),
  }
}

pub(crate) fn build_interface(
  idl_name: &str,
  data: &TypeData,
  interface_name: String,
  item: Option<Rc<TypeDescriptor>>,
  pure: bool,
) -> TypeDescriptor {
  TypeDescriptor {
    idl_name: idl_name.to_string(),
    target_type: interface_target_type(data, &interface_name, item.as_ref()),
    target_override: data.target_type.is_some(),
    native_type: data.native_type.unwrap_or(idl_name).to_string(),
    merge: merge_link(data),
    suppress_generated_type: data.suppress_interface,
    custom_conversion: custom_conversion(data),
    conversion_includes: extra_includes(data),
    variant: TypeVariant::Interface(InterfaceType {
      interface_name,
      item,
      pure,
    }),
  }
}

pub(crate) fn build_sequence(idl_name: &str, item: Rc<TypeDescriptor>, string_list: bool) -> TypeDescriptor {
  TypeDescriptor {
    idl_name: idl_name.to_string(),
    target_type: format!("List<{}>", item.target_type()),
    target_override: false,
    native_type: if string_list {
      "DOMStringList".to_string()
    } else {
      idl_name.to_string()
    },
    merge: None,
    // Sequences are expressed as built-in lists.
    suppress_generated_type: true,
    custom_conversion: CustomConversion::default(),
    conversion_includes: Vec::new(),
    variant: TypeVariant::Sequence(SequenceType { item, string_list }),
  }
}

pub(crate) fn build_callback(idl_name: &str, interface_name: String) -> TypeDescriptor {
  TypeDescriptor {
    idl_name: idl_name.to_string(),
    target_type: interface_name.clone(),
    target_override: false,
    native_type: idl_name.to_string(),
    merge: None,
    suppress_generated_type: false,
    custom_conversion: CustomConversion::default(),
    conversion_includes: Vec::new(),
    variant: TypeVariant::Callback(CallbackType { interface_name }),
  }
}

pub(crate) fn build_typed_array(
  idl_name: &str,
  data: &TypeData,
  interface_name: String,
  item: Rc<TypeDescriptor>,
  factory_provider: Option<&str>,
) -> TypeDescriptor {
  let element = match item.idl_name() {
    "double" | "float" => ElementKind::Float,
    _ => ElementKind::Integer,
  };
  TypeDescriptor {
    idl_name: idl_name.to_string(),
    target_type: interface_target_type(data, &interface_name, Some(&item)),
    target_override: data.target_type.is_some(),
    native_type: data.native_type.unwrap_or(idl_name).to_string(),
    merge: merge_link(data),
    suppress_generated_type: data.suppress_interface,
    custom_conversion: custom_conversion(data),
    conversion_includes: extra_includes(data),
    variant: TypeVariant::TypedArray(TypedArrayType {
      interface_name,
      element,
      item,
      factory_provider: factory_provider.map(|f| f.to_string()),
    }),
  }
}

pub(crate) fn build_tear_off(
  idl_name: &str,
  data: &TypeData,
  interface_name: String,
  item: Option<Rc<TypeDescriptor>>,
) -> TypeDescriptor {
  let native_type = match data.native_type {
    Some(native) => native.to_string(),
    None if idl_name.ends_with("List") => format!("SVGListPropertyTearOff<{idl_name}>"),
    None => format!("SVGPropertyTearOff<{idl_name}>"),
  };
  TypeDescriptor {
    idl_name: idl_name.to_string(),
    target_type: interface_target_type(data, &interface_name, item.as_ref()),
    target_override: data.target_type.is_some(),
    native_type,
    merge: merge_link(data),
    suppress_generated_type: data.suppress_interface,
    custom_conversion: custom_conversion(data),
    conversion_includes: extra_includes(data),
    variant: TypeVariant::TearOff(TearOffType {
      interface_name,
      item,
    }),
  }
}

/// `unsigned long long` becomes `UnsignedLongLong`: lower-case letters at the start or after a
/// space are capitalized and the space dropped.
fn capitalized(native_type: &str) -> String {
  let mut out = String::with_capacity(native_type.len());
  let mut chars = native_type.chars().peekable();
  let mut at_start = true;
  while let Some(c) = chars.next() {
    if at_start && c.is_ascii_lowercase() {
      out.push(c.to_ascii_uppercase());
      at_start = false;
      continue;
    }
    at_start = false;
    if c == ' ' {
      if let Some(&next) = chars.peek() {
        if next.is_ascii_lowercase() {
          chars.next();
          out.push(next.to_ascii_uppercase());
          continue;
        }
      }
    }
    out.push(c);
  }
  out
}

fn lower_first(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
    None => String::new(),
  }
}

impl TypeDescriptor {
  /// Implementation type used where the precise class matters, e.g. casts.
  pub fn narrow_target_type(&self) -> String {
    let (interface_name, has_item, pure) = match &self.variant {
      TypeVariant::Interface(i) => (&i.interface_name, i.item.is_some(), i.pure),
      TypeVariant::TypedArray(t) => (&t.interface_name, true, false),
      TypeVariant::TearOff(t) => (&t.interface_name, t.item.is_some(), false),
      TypeVariant::Primitive(_) | TypeVariant::Sequence(_) | TypeVariant::Callback(_) => {
        return self.target_type.clone();
      }
    };
    if has_item {
      return self
        .implementation_name()
        .unwrap_or_else(|| interface_name.clone());
    }
    if self.target_override {
      return self.target_type.clone();
    }
    if pure {
      return self.idl_name.clone();
    }
    interface_name.clone()
  }

  /// Renamed interface name. Primitives have none; a sequence is named by its list type.
  pub fn interface_name(&self) -> Option<&str> {
    match &self.variant {
      TypeVariant::Interface(i) => Some(&i.interface_name),
      TypeVariant::TypedArray(t) => Some(&t.interface_name),
      TypeVariant::TearOff(t) => Some(&t.interface_name),
      TypeVariant::Callback(c) => Some(&c.interface_name),
      TypeVariant::Sequence(_) => Some(&self.target_type),
      TypeVariant::Primitive(_) => None,
    }
  }

  /// Name of the generated implementation class: `_X_Merged` for interfaces merged into another,
  /// `_X` when no public type is generated.
  pub fn implementation_name(&self) -> Option<String> {
    let interface_name = match &self.variant {
      TypeVariant::Interface(i) => &i.interface_name,
      TypeVariant::TypedArray(t) => &t.interface_name,
      TypeVariant::TearOff(t) => &t.interface_name,
      TypeVariant::Sequence(_) => return Some(self.target_type.clone()),
      TypeVariant::Primitive(_) | TypeVariant::Callback(_) => return None,
    };
    let mut name = interface_name.clone();
    if self.merge_target().is_some() {
      name = format!("_{name}_Merged");
    }
    if !self.has_generated_interface() {
      name = format!("_{name}");
    }
    Some(name)
  }

  pub fn has_generated_interface(&self) -> bool {
    !self.suppress_generated_type
  }

  /// The binding class wrapping values of this type, e.g. `DartNode`.
  pub fn bindings_class(&self) -> String {
    format!("Dart{}", self.idl_name)
  }

  /// Element parameter used when this type is the item of a native vector.
  pub fn vector_template_parameter(&self) -> BindgenResult<String> {
    match &self.variant {
      // IDL floats are doubles natively, except inside vectors.
      TypeVariant::Primitive(_) if self.idl_name == "float" => Ok("float".to_string()),
      TypeVariant::Primitive(_) => Ok(self.native_type.clone()),
      TypeVariant::Sequence(_) => Err(BindgenError::nested_sequence(&self.idl_name)),
      _ => Ok(self.bindings_class()),
    }
  }

  /// Conversion of a target value into the native representation, for a member of
  /// `interface_name` whose declaration carries `node_ext_attrs`.
  pub fn to_native_info(
    &self,
    node_ext_attrs: &ExtAttrs,
    interface_name: &str,
  ) -> BindgenResult<NativeConversion> {
    match &self.variant {
      TypeVariant::Primitive(_) => {
        let native_type = match self.native_type.as_str() {
          "SerializedScriptValue" => "RefPtr<SerializedScriptValue>".to_string(),
          "String" => "DartStringAdapter".to_string(),
          other => other.to_string(),
        };
        Ok(NativeConversion {
          argument: ArgumentExpression::Value,
          native_type,
          class: "DartUtilities".to_string(),
          function: format!("dartTo{}", capitalized(&self.native_type)),
        })
      }
      TypeVariant::Sequence(SequenceType {
        string_list: true, ..
      }) => Ok(NativeConversion {
        argument: ArgumentExpression::Value,
        native_type: "RefPtr<DOMStringList>".to_string(),
        class: "DartDOMStringList".to_string(),
        function: "toNative".to_string(),
      }),
      TypeVariant::Sequence(SequenceType { item, .. }) => {
        let param = item.vector_template_parameter()?;
        Ok(NativeConversion {
          argument: ArgumentExpression::Value,
          native_type: format!("Vector<{param}>"),
          class: "DartUtilities".to_string(),
          function: format!("toNativeVector<{param}>"),
        })
      }
      _ => {
        let class = self.bindings_class();
        if node_ext_attrs.contains("Callback") {
          return Ok(NativeConversion {
            argument: ArgumentExpression::Value,
            native_type: format!("RefPtr<{}>", self.native_type),
            class,
            function: "create".to_string(),
          });
        }
        if self.custom_conversion.to_native {
          return Ok(NativeConversion {
            argument: ArgumentExpression::Get,
            native_type: format!("RefPtr<{}>", self.native_type),
            class,
            function: "toNative".to_string(),
          });
        }
        let argument = match self.variant {
          TypeVariant::TearOff(_) if !interface_name.ends_with("List") => {
            ArgumentExpression::PropertyReference
          }
          _ => ArgumentExpression::Value,
        };
        Ok(NativeConversion {
          argument,
          native_type: format!("{}*", self.native_type),
          class,
          function: "toNative".to_string(),
        })
      }
    }
  }

  pub fn pass_native_by_ref(&self) -> bool {
    matches!(
      self.variant,
      TypeVariant::Sequence(SequenceType {
        string_list: false,
        ..
      })
    )
  }

  /// Native parameter type of setters and operation arguments.
  pub fn parameter_type(&self) -> String {
    match &self.variant {
      TypeVariant::Primitive(_) if self.native_type == "String" => "const String&".to_string(),
      TypeVariant::Primitive(_) => self.native_type.clone(),
      _ => format!("{}*", self.native_type),
    }
  }

  /// Native headers declaring this type.
  pub fn native_includes(&self) -> Vec<String> {
    match &self.variant {
      TypeVariant::Primitive(_) => return Vec::new(),
      TypeVariant::Sequence(s) => return s.item.native_includes(),
      _ => {}
    }
    let idl = self.idl_name.as_str();
    if WTF_TYPES.contains(&idl) {
      return vec![format!("<wtf/{}.h>", self.native_type)];
    }
    if !idl.starts_with("SVG") {
      return vec![format!("\"{}.h\"", self.native_type)];
    }
    if idl == "SVGNumber" || idl == "SVGPoint" {
      return vec!["\"SVGPropertyTearOff.h\"".to_string()];
    }
    let include = if idl.starts_with("SVGPathSeg") {
      idl.replace("Abs", "").replace("Rel", "")
    } else {
      idl.to_string()
    };
    let mut out = vec![format!("\"{include}.h\"")];
    out.extend(SVG_SUPPLEMENTAL_INCLUDES.iter().map(|s| s.to_string()));
    out
  }

  /// Binding headers needed to convert values of this type.
  pub fn conversion_includes(&self) -> Vec<String> {
    match &self.variant {
      TypeVariant::Primitive(_) => Vec::new(),
      TypeVariant::Sequence(s) => s.item.conversion_includes(),
      _ => std::iter::once(self.idl_name.as_str())
        .chain(self.conversion_includes.iter().map(|s| s.as_str()))
        .map(|include| format!("\"Dart{include}.h\""))
        .collect(),
    }
  }

  /// Expression prefix reaching the underlying native value from a binding receiver.
  pub fn receiver(&self) -> &'static str {
    match self.variant {
      TypeVariant::TearOff(_) if !self.idl_name.ends_with("List") => "receiver->propertyReference().",
      _ => "receiver->",
    }
  }

  /// Expression passing argument `name` to a member of `interface_name`.
  pub fn argument_expression(&self, name: &str, interface_name: &str) -> String {
    match self.variant {
      TypeVariant::TearOff(_) if !interface_name.ends_with("List") => {
        ArgumentExpression::PropertyReference.apply(name)
      }
      _ => name.to_string(),
    }
  }

  /// Expression converting native `value` into the target representation, for a member of
  /// `interface_name` with extended attributes `member_ext_attrs`.
  pub fn to_target_conversion(
    &self,
    value: &str,
    interface_name: &str,
    member_ext_attrs: Option<&ExtAttrs>,
  ) -> BindgenResult<String> {
    match &self.variant {
      TypeVariant::Primitive(_) => {
        let mut function = format!(
          "DartUtilities::{}ToDart",
          lower_first(&capitalized(&self.native_type))
        );
        if member_ext_attrs.is_some_and(|attrs| attrs.contains("TreatReturnedNullStringAs")) {
          function.push_str("WithNullCheck");
        }
        Ok(format!("{function}({value})"))
      }
      TypeVariant::Sequence(s) => Ok(format!(
        "DartDOMWrapper::vectorToDart<{}>({value})",
        s.item.vector_template_parameter()?
      )),
      TypeVariant::TearOff(_) => {
        let native = &self.native_type;
        let cast = if interface_name.starts_with("SVGAnimated") {
          format!("static_cast<{native}*>({value})")
        } else if self.idl_name == "SVGStringList" {
          format!("{native}::create(receiver, {value})")
        } else if interface_name.ends_with("List") {
          format!("static_cast<{native}*>({value}.get())")
        } else if SVG_PRIMITIVE_TEAR_OFFS.contains(&self.idl_name.as_str()) {
          format!("{native}::create({value})")
        } else {
          format!("static_cast<{native}*>({value})")
        };
        Ok(format!("Dart{}::toDart({cast})", self.idl_name))
      }
      _ => Ok(format!("Dart{}::toDart({value})", self.idl_name)),
    }
  }

  /// Reflected-attribute getter name on the native element, for primitives.
  pub fn getter_name(&self) -> Option<&str> {
    match &self.variant {
      TypeVariant::Primitive(p) => Some(&p.getter_name),
      _ => None,
    }
  }

  pub fn setter_name(&self) -> Option<&str> {
    match &self.variant {
      TypeVariant::Primitive(p) => Some(&p.setter_name),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn capitalizes_native_names() {
    assert_eq!(capitalized("unsigned long long"), "UnsignedLongLong");
    assert_eq!(capitalized("bool"), "Bool");
    assert_eq!(capitalized("String"), "String");
    assert_eq!(lower_first("ScriptValue"), "scriptValue");
  }

  #[test]
  fn tear_off_container_follows_name() {
    let list = build_tear_off("SVGLengthList", &TypeData::tear_off(), "LengthList".into(), None);
    assert_eq!(list.native_type(), "SVGListPropertyTearOff<SVGLengthList>");
    assert_eq!(list.receiver(), "receiver->");
    let scalar = build_tear_off("SVGAngle", &TypeData::tear_off(), "Angle".into(), None);
    assert_eq!(scalar.native_type(), "SVGPropertyTearOff<SVGAngle>");
    assert_eq!(scalar.receiver(), "receiver->propertyReference().");
  }

  #[test]
  fn argument_expressions() {
    assert_eq!(ArgumentExpression::Value.apply("x"), "x");
    assert_eq!(ArgumentExpression::Get.apply("x"), "x.get()");
    assert_eq!(
      ArgumentExpression::PropertyReference.apply("x"),
      "x->propertyReference()"
    );
  }
}
