//! Overload merging.
//!
//! Generated bindings expose one method per operation name. The overloads declared under that name
//! are merged into a single parameter list: positions absent from some overload become optional,
//! differing names are joined, and differing types widen to `dynamic`.

use crate::error::BindgenError;
use crate::error::BindgenResult;
use crate::idl::Argument;
use crate::idl::ExtAttrValue;
use crate::idl::Interface;
use crate::idl::Operation;
use crate::registry::TypeRegistry;
use crate::types::TypeDescriptor;
use ahash::AHashSet;
use serde::Serialize;
use std::collections::BTreeSet;
use std::rc::Rc;
use tracing::debug;
use tracing::debug_span;

/// Separator between the names of differently-named arguments merged into one parameter.
pub const MERGED_NAME_SEPARATOR: &str = "_OR_";

/// One merged formal parameter.
#[derive(Clone, Debug, Serialize)]
pub struct ParamInfo {
  pub name: String,
  /// `None` when the overloads disagree; the parameter is then untyped.
  pub type_ref: Option<Rc<TypeDescriptor>>,
  pub is_optional: bool,
}

impl ParamInfo {
  /// Declared target type, `dynamic` when untyped.
  pub fn target_type(&self) -> &str {
    self
      .type_ref
      .as_ref()
      .map(|t| t.target_type())
      .unwrap_or("dynamic")
  }
}

/// One merged operation (or constructor).
#[derive(Clone, Debug, Serialize)]
pub struct OperationInfo {
  pub interface: String,
  /// Generated name; honours `DartName`.
  pub name: String,
  pub declared_name: String,
  /// Name of the member on the native object.
  pub native_name: String,
  /// Set for named constructors, e.g. `Audio` for `[NamedConstructor=Audio(...)]`.
  pub constructor_name: Option<String>,
  pub return_type: Rc<TypeDescriptor>,
  pub parameters: Vec<ParamInfo>,
  pub is_static: bool,
  pub overload_count: usize,
  /// Arity of each call shape after optional-argument expansion.
  pub call_shapes: Vec<usize>,
  /// Optional parameters are rendered as named (`{}`) rather than positional (`[]`).
  pub requires_named_arguments: bool,
  pub factory_provider: Option<String>,
}

impl OperationInfo {
  /// Renders the formal parameter list, e.g. `int x, [String y]`.
  pub fn parameters_declaration(&self, force_optional: bool) -> BindgenResult<String> {
    let mut required = Vec::new();
    let mut optional = Vec::new();
    for param in self.parameters.iter() {
      if param.is_optional {
        optional.push(format_param(param));
      } else {
        if !optional.is_empty() {
          return Err(BindgenError::OptionalBeforeRequired {
            interface: self.interface.clone(),
            operation: self.declared_name.clone(),
            parameter: param.name.clone(),
          });
        }
        required.push(format_param(param));
      }
    }
    if !optional.is_empty() {
      let (open, close) = if self.requires_named_arguments && !force_optional {
        ('{', '}')
      } else {
        ('[', ']')
      };
      required.push(format!("{open}{}{close}", optional.join(", ")));
    }
    Ok(required.join(", "))
  }

  /// Names of the first `count` parameters (all when `None`) as a call argument list.
  pub fn parameters_as_argument_list(&self, count: Option<usize>) -> String {
    let count = count.unwrap_or(self.parameters.len());
    self
      .parameters
      .iter()
      .take(count)
      .map(|p| p.name.as_str())
      .collect::<Vec<_>>()
      .join(", ")
  }
}

/// `T name`, or just `name` for untyped parameters. Types that are `dynamic` in the target language
/// keep their IDL name as a comment.
fn format_param(param: &ParamInfo) -> String {
  match &param.type_ref {
    None => param.name.clone(),
    Some(t) if t.target_type() == "dynamic" => format!("/*{}*/ {}", t.idl_name(), param.name),
    Some(t) => format!("{} {}", t.target_type(), param.name),
  }
}

/// Static configuration of the analyzer.
#[derive(Clone, Debug, Default)]
pub struct OperationTables {
  /// `Interface.operation` keys whose optional parameters are named.
  pub methods_with_named_formals: AHashSet<&'static str>,
}

impl OperationTables {
  pub fn builtin() -> Self {
    let mut tables = Self::default();
    tables.methods_with_named_formals.extend([
      "DataView.getFloat32",
      "DataView.getFloat64",
      "DataView.getInt16",
      "DataView.getInt32",
      "DataView.getInt8",
      "DataView.getUint16",
      "DataView.getUint32",
      "DataView.getUint8",
      "DataView.setFloat32",
      "DataView.setFloat64",
      "DataView.setInt16",
      "DataView.setInt32",
      "DataView.setInt8",
      "DataView.setUint16",
      "DataView.setUint32",
      "DataView.setUint8",
      "DirectoryEntry.getDirectory",
      "DirectoryEntry.getFile",
    ]);
    tables
  }
}

/// `[Optional]` without a value: the overload may be called without this argument and the ones
/// after it.
fn splits_at(argument: &Argument) -> bool {
  argument.ext_attrs.is_bare("Optional")
}

/// Callback arguments are optional when marked `Optional`, with or without a value.
fn is_optional_callback_argument(argument: &Argument) -> bool {
  argument.ext_attrs.contains("Callback") && argument.ext_attrs.contains("Optional")
}

/// Constructor arguments are optional when marked `Optional`, e.g. `Optional=DefaultIsUndefined`.
fn is_optional_constructor_argument(argument: &Argument) -> bool {
  argument.ext_attrs.contains("Optional")
}

fn is_individually_optional(argument: &Argument, constructor: bool) -> bool {
  if argument.ext_attrs.contains("Callback") {
    return is_optional_callback_argument(argument);
  }
  constructor && is_optional_constructor_argument(argument)
}

/// One call shape per valid arity: each overload, preceded by its truncations before every
/// splitting `[Optional]` argument.
pub fn expand_overloads<'o>(overloads: &[&'o [Argument]]) -> Vec<&'o [Argument]> {
  let mut shapes = Vec::new();
  for &arguments in overloads {
    for (i, argument) in arguments.iter().enumerate() {
      if splits_at(argument) {
        shapes.push(&arguments[..i]);
      }
    }
    shapes.push(arguments);
  }
  shapes
}

pub struct OperationAnalyzer<'r, 'a> {
  registry: &'r TypeRegistry<'a>,
  tables: &'r OperationTables,
}

impl<'r, 'a> OperationAnalyzer<'r, 'a> {
  pub fn new(registry: &'r TypeRegistry<'a>, tables: &'r OperationTables) -> Self {
    Self { registry, tables }
  }

  /// Merges the overloads of one operation name declared on `interface`.
  pub fn analyze_operation(
    &self,
    interface: &Interface,
    overloads: &[&Operation],
  ) -> BindgenResult<OperationInfo> {
    let Some(first) = overloads.first() else {
      return Err(BindgenError::NoOverloads {
        interface: interface.name.clone(),
      });
    };
    let declared_name = first.name.clone();
    let _span = debug_span!(
      "webidl_bindgen.merge",
      interface = interface.name.as_str(),
      operation = declared_name.as_str(),
      overloads = overloads.len()
    )
    .entered();

    if overloads.iter().any(|o| o.is_static != first.is_static) {
      return Err(BindgenError::MixedStaticOverloads {
        interface: interface.name.clone(),
        operation: declared_name,
      });
    }

    let argument_lists: Vec<&[Argument]> = overloads.iter().map(|o| o.arguments.as_slice()).collect();
    let shapes = expand_overloads(&argument_lists);
    let parameters = self.merge(&interface.name, &declared_name, &shapes, false)?;
    let return_type = self
      .registry
      .resolve(&first.return_type)
      .map_err(|e| e.in_member(&interface.name, &declared_name))?;
    let full_name = format!("{}.{}", interface.name, declared_name);
    debug!(
      parameters = parameters.len(),
      shapes = shapes.len(),
      "merged overloads"
    );

    Ok(OperationInfo {
      interface: interface.name.clone(),
      name: first
        .ext_attrs
        .ident("DartName")
        .map(|n| n.to_string())
        .unwrap_or_else(|| declared_name.clone()),
      native_name: declared_name.clone(),
      declared_name,
      constructor_name: None,
      return_type,
      parameters,
      is_static: first.is_static,
      overload_count: overloads.len(),
      call_shapes: shapes.iter().map(|s| s.len()).collect(),
      requires_named_arguments: self
        .tables
        .methods_with_named_formals
        .contains(full_name.as_str()),
      factory_provider: None,
    })
  }

  /// Every operation of `interface`, one merged entry per name in declaration order.
  pub fn analyze_interface(&self, interface: &Interface) -> BindgenResult<Vec<OperationInfo>> {
    interface
      .operation_groups()
      .into_iter()
      .map(|(_, overloads)| self.analyze_operation(interface, &overloads))
      .collect()
  }

  /// The constructor selected by `[Constructor]` or `[NamedConstructor=Name(...)]`, if any.
  ///
  /// Only the primary constructor expands its `[Optional]` arguments into call shapes; a named
  /// constructor's arguments are merged as declared.
  pub fn analyze_constructor(&self, interface: &Interface) -> BindgenResult<Option<OperationInfo>> {
    let (constructor_name, arguments, expand): (Option<String>, &[Argument], bool) =
      if interface.ext_attrs.contains("Constructor") {
        let arguments = match interface.ext_attrs.value("Constructor") {
          Some(ExtAttrValue::Function { arguments, .. }) => arguments.as_slice(),
          _ => &[][..],
        };
        (None, arguments, true)
      } else {
        match interface.ext_attrs.value("NamedConstructor") {
          Some(ExtAttrValue::Function { name, arguments }) => {
            (name.clone(), arguments.as_slice(), false)
          }
          Some(ExtAttrValue::Ident(name)) => (Some(name.clone()), &[][..], false),
          None => return Ok(None),
        }
      };

    let declared_name = constructor_name
      .clone()
      .unwrap_or_else(|| interface.name.clone());
    let _span = debug_span!(
      "webidl_bindgen.constructor",
      interface = interface.name.as_str(),
      named = constructor_name.is_some()
    )
    .entered();

    let shapes = if expand {
      expand_overloads(&[arguments])
    } else {
      vec![arguments]
    };
    let parameters = self.merge(&interface.name, &declared_name, &shapes, true)?;
    let return_type = self
      .registry
      .resolve(&interface.name)
      .map_err(|e| e.in_member(&interface.name, &declared_name))?;

    Ok(Some(OperationInfo {
      interface: interface.name.clone(),
      name: declared_name.clone(),
      native_name: declared_name.clone(),
      declared_name,
      constructor_name,
      return_type,
      parameters,
      is_static: false,
      overload_count: 1,
      call_shapes: shapes.iter().map(|s| s.len()).collect(),
      requires_named_arguments: false,
      factory_provider: self
        .registry
        .tables()
        .typed_array_factories
        .get(interface.name.as_str())
        .map(|f| f.to_string()),
    }))
  }

  /// Zips `shapes` by position and merges each position into one parameter.
  fn merge(
    &self,
    interface: &str,
    operation: &str,
    shapes: &[&[Argument]],
    constructor: bool,
  ) -> BindgenResult<Vec<ParamInfo>> {
    let arity = shapes.iter().map(|s| s.len()).max().unwrap_or(0);
    let mut parameters = Vec::with_capacity(arity);
    for position in 0..arity {
      let contributing: Vec<&Argument> = shapes.iter().filter_map(|s| s.get(position)).collect();
      let is_optional = contributing.len() < shapes.len()
        || contributing
          .iter()
          .any(|a| is_individually_optional(a, constructor));

      let names: BTreeSet<&str> = contributing.iter().map(|a| a.name.as_str()).collect();
      let name = names.into_iter().collect::<Vec<_>>().join(MERGED_NAME_SEPARATOR);

      let type_names: BTreeSet<&str> = contributing.iter().map(|a| a.type_name.as_str()).collect();
      let mut targets = BTreeSet::new();
      for type_name in type_names.iter() {
        let target = self
          .registry
          .target_type(type_name)
          .map_err(|e| e.in_member(interface, operation))?;
        targets.insert(target);
      }
      let type_ref = match (targets.len(), type_names.first()) {
        (1, Some(first)) => Some(
          self
            .registry
            .resolve(first)
            .map_err(|e| e.in_member(interface, operation))?,
        ),
        _ => None,
      };

      parameters.push(ParamInfo {
        name,
        type_ref,
        is_optional,
      });
    }

    let mut seen_optional = false;
    for param in parameters.iter() {
      if param.is_optional {
        seen_optional = true;
      } else if seen_optional {
        return Err(BindgenError::OptionalBeforeRequired {
          interface: interface.to_string(),
          operation: operation.to_string(),
          parameter: param.name.clone(),
        });
      }
    }
    Ok(parameters)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn expansion_yields_one_shape_per_arity() {
    let arguments = vec![
      Argument::new("a", "long"),
      Argument::new("b", "long").with_ext_attr("Optional", None),
      Argument::new("c", "long").with_ext_attr("Optional", None),
    ];
    let shapes = expand_overloads(&[arguments.as_slice()]);
    let arities: Vec<usize> = shapes.iter().map(|s| s.len()).collect();
    assert_eq!(arities, vec![1, 2, 3]);
  }

  #[test]
  fn valued_optional_marker_does_not_split() {
    let arguments = vec![Argument::new("a", "long").with_ext_attr("Optional", Some("DefaultIsUndefined"))];
    assert_eq!(expand_overloads(&[arguments.as_slice()]).len(), 1);
  }

  #[test]
  fn optionality_rules_differ_for_callbacks_and_constructors() {
    let callback = Argument::new("cb", "VoidCallback")
      .with_ext_attr("Callback", None)
      .with_ext_attr("Optional", Some("DefaultIsUndefined"));
    assert!(is_individually_optional(&callback, false));
    assert!(is_individually_optional(&callback, true));

    let plain = Argument::new("x", "long").with_ext_attr("Optional", Some("DefaultIsUndefined"));
    assert!(!is_individually_optional(&plain, false));
    assert!(is_individually_optional(&plain, true));

    let required_callback = Argument::new("cb", "VoidCallback").with_ext_attr("Callback", None);
    assert!(!is_individually_optional(&required_callback, true));
  }
}
