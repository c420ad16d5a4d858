use crate::behavior;
use crate::error::BindgenError;
use crate::error::BindgenResult;
use crate::idl::InterfaceDatabase;
use crate::rename::Renamer;
use crate::types::TypeClass;
use crate::types::TypeData;
use crate::types::TypeDescriptor;
use crate::types::TypeTables;
use ahash::AHashMap;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug_span;
use tracing::field;
use tracing::trace;
use tracing::warn;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegistryOptions {
  /// Fail instead of deriving a mechanical name when a built-in interface entry of the type table
  /// is not declared in the database.
  pub strict_builtin_names: bool,
}

/// Splits `sequence<T>` and `T[]` into `T`.
pub fn collection_item_name(type_name: &str) -> Option<&str> {
  if let Some(inner) = type_name
    .strip_prefix("sequence<")
    .and_then(|rest| rest.strip_suffix('>'))
  {
    return Some(inner.trim());
  }
  type_name.strip_suffix("[]")
}

/// Resolves type names to shared descriptors.
///
/// Resolution is memoized for the lifetime of the registry: the same name always yields the same
/// `Rc`. The cache is the registry's only mutable state.
pub struct TypeRegistry<'a> {
  db: &'a dyn InterfaceDatabase,
  renamer: &'a dyn Renamer,
  tables: &'a TypeTables,
  options: RegistryOptions,
  cache: RefCell<AHashMap<String, Rc<TypeDescriptor>>>,
}

impl<'a> TypeRegistry<'a> {
  pub fn new(db: &'a dyn InterfaceDatabase, renamer: &'a dyn Renamer, tables: &'a TypeTables) -> Self {
    Self {
      db,
      renamer,
      tables,
      options: RegistryOptions::default(),
      cache: RefCell::new(AHashMap::new()),
    }
  }

  pub fn with_options(mut self, options: RegistryOptions) -> Self {
    self.options = options;
    self
  }

  pub fn tables(&self) -> &'a TypeTables {
    self.tables
  }

  pub fn resolve(&self, type_name: &str) -> BindgenResult<Rc<TypeDescriptor>> {
    let span = debug_span!(
      "webidl_bindgen.resolve",
      type_name,
      cache_hit = field::Empty
    );
    let _enter = span.enter();
    if let Some(hit) = self.cache.borrow().get(type_name) {
      span.record("cache_hit", true);
      trace!(type_name, "type cache hit");
      return Ok(hit.clone());
    }
    span.record("cache_hit", false);
    let descriptor = Rc::new(self.build(type_name)?);
    let mut cache = self.cache.borrow_mut();
    Ok(
      cache
        .entry(type_name.to_string())
        .or_insert(descriptor)
        .clone(),
    )
  }

  /// Target representation of `type_name`.
  pub fn target_type(&self, type_name: &str) -> BindgenResult<String> {
    Ok(self.resolve(type_name)?.target_type().to_string())
  }

  /// Number of memoized descriptors.
  pub fn len(&self) -> usize {
    self.cache.borrow().len()
  }

  pub fn is_empty(&self) -> bool {
    self.cache.borrow().is_empty()
  }

  /// Drops every memoized descriptor; later resolutions build fresh ones.
  pub fn clear(&mut self) {
    self.cache.get_mut().clear();
  }

  fn build(&self, type_name: &str) -> BindgenResult<TypeDescriptor> {
    if let Some(item_name) = collection_item_name(type_name) {
      return self.build_sequence(type_name, item_name);
    }

    let Some(data) = self.tables.get(type_name) else {
      return self.build_declared(type_name);
    };

    Ok(match data.class {
      TypeClass::Primitive => behavior::build_primitive(type_name, data),
      TypeClass::Interface => behavior::build_interface(
        type_name,
        data,
        self.builtin_interface_name(type_name)?,
        self.resolve_item(data)?,
        self.tables.is_pure_interface(type_name),
      ),
      TypeClass::TypedArray => {
        let item = self.resolve(data.item_type.unwrap_or("int"))?;
        behavior::build_typed_array(
          type_name,
          data,
          self.builtin_interface_name(type_name)?,
          item,
          self.tables.typed_array_factories.get(type_name).copied(),
        )
      }
      TypeClass::TearOff => behavior::build_tear_off(
        type_name,
        data,
        self.builtin_interface_name(type_name)?,
        self.resolve_item(data)?,
      ),
      TypeClass::Callback => {
        behavior::build_callback(type_name, self.renamer.dartify_type_name(type_name))
      }
      TypeClass::Sequence => match data.item_type {
        Some(item_name) => return self.build_sequence(type_name, item_name),
        None => {
          return Err(BindgenError::UnknownType {
            type_name: type_name.to_string(),
          })
        }
      },
    })
  }

  fn build_sequence(&self, type_name: &str, item_name: &str) -> BindgenResult<TypeDescriptor> {
    if collection_item_name(item_name).is_some() {
      return Err(BindgenError::nested_sequence(type_name));
    }
    let item = self.resolve(item_name)?;
    if item.type_class() == TypeClass::Sequence {
      return Err(BindgenError::nested_sequence(type_name));
    }
    Ok(behavior::build_sequence(
      type_name,
      item,
      type_name == "DOMString[]",
    ))
  }

  /// Names outside the type table must be declared in the database.
  fn build_declared(&self, type_name: &str) -> BindgenResult<TypeDescriptor> {
    let Some(decl) = self.db.get_interface(type_name) else {
      return Err(BindgenError::UnknownType {
        type_name: type_name.to_string(),
      });
    };
    if decl.is_callback() {
      return Ok(behavior::build_callback(
        type_name,
        self.renamer.dartify_type_name(type_name),
      ));
    }
    Ok(behavior::build_interface(
      type_name,
      &TypeData::interface(),
      self.renamer.rename_interface(decl),
      None,
      self.tables.is_pure_interface(type_name),
    ))
  }

  fn builtin_interface_name(&self, type_name: &str) -> BindgenResult<String> {
    if let Some(decl) = self.db.get_interface(type_name) {
      return Ok(self.renamer.rename_interface(decl));
    }
    if self.options.strict_builtin_names {
      return Err(BindgenError::UndeclaredBuiltin {
        type_name: type_name.to_string(),
      });
    }
    warn!(
      type_name,
      "built-in interface is not declared in the database; deriving its name mechanically"
    );
    Ok(self.renamer.dartify_type_name(type_name))
  }

  fn resolve_item(&self, data: &TypeData) -> BindgenResult<Option<Rc<TypeDescriptor>>> {
    data.item_type.map(|item| self.resolve(item)).transpose()
  }
}
