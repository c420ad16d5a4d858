//! Type resolution and overload merging for WebIDL bindings generators.
//!
//! A generator feeds interface declarations from an [`InterfaceDatabase`] through four engines:
//!
//! - [`TypeRegistry`] classifies every referenced type name into a [`TypeDescriptor`], memoized
//!   per registry.
//! - [`OperationAnalyzer`] collapses the overloads of each operation (and the constructor) into
//!   one parameter list.
//! - [`AnnotationResolver`] attaches annotations to generated declarations.
//! - [`ConversionResolver`] picks the marshaling function for a value crossing the native boundary.
//!
//! All engines are pure functions of the database and a [`BindgenTables`] value; the registry's
//! cache is the only mutable state.
//!
//! ```
//! use webidl_bindgen::{HtmlRenamer, MemoryDatabase, TypeRegistry, BUILTIN_TABLES};
//!
//! let db = MemoryDatabase::from_json(r#"[{"name": "Node"}]"#).unwrap();
//! let renamer = HtmlRenamer::new(&db);
//! let registry = TypeRegistry::new(&db, &renamer, &BUILTIN_TABLES.types);
//! assert_eq!(registry.target_type("sequence<Node>").unwrap(), "List<Node>");
//! ```

pub mod annotations;
pub mod behavior;
pub mod conversion;
pub mod docs;
pub mod error;
pub mod idl;
pub mod operation;
pub mod registry;
pub mod rename;
pub mod tables;
pub mod types;

pub use annotations::format_annotations;
pub use annotations::AnnotationResolver;
pub use annotations::AnnotationTables;
pub use behavior::ArgumentExpression;
pub use behavior::NativeConversion;
pub use conversion::Conversion;
pub use conversion::ConversionMatch;
pub use conversion::ConversionResolver;
pub use conversion::ConversionRule;
pub use conversion::ConversionTables;
pub use conversion::Direction;
pub use docs::DocSource;
pub use docs::DocStore;
pub use error::BindgenError;
pub use error::BindgenResult;
pub use idl::Argument;
pub use idl::Attribute;
pub use idl::ExtAttrValue;
pub use idl::ExtAttrs;
pub use idl::Interface;
pub use idl::InterfaceDatabase;
pub use idl::MemoryDatabase;
pub use idl::Operation;
pub use operation::OperationAnalyzer;
pub use operation::OperationInfo;
pub use operation::OperationTables;
pub use operation::ParamInfo;
pub use registry::RegistryOptions;
pub use registry::TypeRegistry;
pub use rename::HtmlRenamer;
pub use rename::Renamer;
pub use tables::BindgenTables;
pub use tables::BUILTIN_TABLES;
pub use types::TypeClass;
pub use types::TypeData;
pub use types::TypeDescriptor;
pub use types::TypeTables;
pub use types::TypeVariant;
