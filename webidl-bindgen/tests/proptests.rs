mod fixture;

use fixture::with_analyzer;
use proptest::prelude::*;
use std::rc::Rc;
use webidl_bindgen::Argument;
use webidl_bindgen::HtmlRenamer;
use webidl_bindgen::Interface;
use webidl_bindgen::Operation;
use webidl_bindgen::TypeRegistry;
use webidl_bindgen::BUILTIN_TABLES;

const NAMES: [&str; 3] = ["a", "b", "c"];
const TYPES: [&str; 6] = ["long", "int", "DOMString", "boolean", "double", "Node"];

fn arb_argument() -> impl Strategy<Value = Argument> {
  (0..NAMES.len(), 0..TYPES.len(), any::<bool>()).prop_map(|(name, ty, optional)| {
    let argument = Argument::new(NAMES[name], TYPES[ty]);
    if optional {
      argument.with_ext_attr("Optional", None)
    } else {
      argument
    }
  })
}

fn arb_interface() -> impl Strategy<Value = Interface> {
  prop::collection::vec(prop::collection::vec(arb_argument(), 0..5), 1..4).prop_map(|overloads| {
    overloads
      .into_iter()
      .fold(Interface::new("Shape"), |iface, arguments| {
        let op = arguments
          .into_iter()
          .fold(Operation::new("apply", "void"), |op, arg| op.arg(arg));
        iface.with_operation(op)
      })
  })
}

fn arb_type_name() -> impl Strategy<Value = String> {
  (0..TYPES.len(), 0..3usize).prop_map(|(ty, wrap)| match wrap {
    0 => TYPES[ty].to_string(),
    1 => format!("sequence<{}>", TYPES[ty]),
    _ => format!("{}[]", TYPES[ty]),
  })
}

proptest! {
  #[test]
  fn optionality_is_a_suffix_starting_at_the_shortest_shape(iface in arb_interface()) {
    let db = fixture::database();
    let overloads: Vec<&Operation> = iface.operations.iter().collect();
    let info = with_analyzer(&db, |a| a.analyze_operation(&iface, &overloads)).unwrap();

    let bare_optionals = iface
      .operations
      .iter()
      .flat_map(|o| o.arguments.iter())
      .filter(|a| a.ext_attrs.is_bare("Optional"))
      .count();
    prop_assert_eq!(info.call_shapes.len(), overloads.len() + bare_optionals);

    let shortest = info.call_shapes.iter().copied().min().unwrap_or(0);
    let longest = info.call_shapes.iter().copied().max().unwrap_or(0);
    prop_assert_eq!(info.parameters.len(), longest);
    for (i, param) in info.parameters.iter().enumerate() {
      prop_assert_eq!(param.is_optional, i >= shortest);
    }
    prop_assert!(info.parameters_declaration(false).is_ok());
  }

  #[test]
  fn merged_names_are_sorted_and_distinct(iface in arb_interface()) {
    let db = fixture::database();
    let overloads: Vec<&Operation> = iface.operations.iter().collect();
    let info = with_analyzer(&db, |a| a.analyze_operation(&iface, &overloads)).unwrap();
    for param in info.parameters.iter() {
      let parts: Vec<&str> = param.name.split("_OR_").collect();
      let mut sorted = parts.clone();
      sorted.sort();
      sorted.dedup();
      prop_assert_eq!(parts, sorted);
    }
  }

  #[test]
  fn merging_is_deterministic(iface in arb_interface()) {
    let db = fixture::database();
    let overloads: Vec<&Operation> = iface.operations.iter().collect();
    let render = || {
      with_analyzer(&db, |a| {
        let info = a.analyze_operation(&iface, &overloads).unwrap();
        info
          .parameters
          .iter()
          .map(|p| format!("{}:{}:{}", p.name, p.target_type(), p.is_optional))
          .collect::<Vec<_>>()
      })
    };
    prop_assert_eq!(render(), render());
  }

  #[test]
  fn resolution_is_stable(names in prop::collection::vec(arb_type_name(), 1..8)) {
    let db = fixture::database();
    let renamer = HtmlRenamer::new(&db);
    let registry = TypeRegistry::new(&db, &renamer, &BUILTIN_TABLES.types);
    let first: Vec<_> = names.iter().map(|n| registry.resolve(n).unwrap()).collect();
    for (name, descriptor) in names.iter().zip(first.iter()) {
      let again = registry.resolve(name).unwrap();
      prop_assert!(Rc::ptr_eq(descriptor, &again));
      prop_assert_eq!(descriptor.idl_name(), name.as_str());
    }
  }
}
