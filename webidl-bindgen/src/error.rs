use std::error::Error;
use std::fmt;

/// Fatal conditions that abort a generation run.
///
/// Every variant carries the identifiers needed to find the offending
/// declaration in the interface description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindgenError {
  /// `sequence<sequence<T>>`, `T[][]`, or a sequence used as a vector item.
  NestedSequence { type_name: String },
  /// The name is neither in the static type table nor declared in the database.
  UnknownType { type_name: String },
  /// A built-in interface entry is not declared in the database and strict naming is on.
  UndeclaredBuiltin { type_name: String },
  /// A merged parameter list has a required parameter after an optional one.
  OptionalBeforeRequired {
    interface: String,
    operation: String,
    parameter: String,
  },
  /// Static and instance overloads share one operation name.
  MixedStaticOverloads { interface: String, operation: String },
  /// An operation was analyzed with no overloads, so it has no name to report.
  NoOverloads { interface: String },
  /// An error raised while analyzing a specific member.
  InMember {
    interface: String,
    member: String,
    source: Box<BindgenError>,
  },
}

impl BindgenError {
  pub(crate) fn nested_sequence(type_name: impl Into<String>) -> Self {
    Self::NestedSequence {
      type_name: type_name.into(),
    }
  }

  /// Attaches the interface/member being analyzed. Errors that already carry
  /// member context are returned unchanged.
  pub fn in_member(self, interface: &str, member: &str) -> Self {
    match self {
      e @ (BindgenError::InMember { .. }
      | BindgenError::OptionalBeforeRequired { .. }
      | BindgenError::MixedStaticOverloads { .. }
      | BindgenError::NoOverloads { .. }) => e,
      e => BindgenError::InMember {
        interface: interface.to_string(),
        member: member.to_string(),
        source: Box::new(e),
      },
    }
  }

  /// The innermost error, skipping member context wrappers.
  pub fn root(&self) -> &BindgenError {
    match self {
      BindgenError::InMember { source, .. } => source.root(),
      e => e,
    }
  }
}

impl fmt::Display for BindgenError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BindgenError::NestedSequence { type_name } => {
        write!(f, "sequences of sequences are not supported: {type_name}")
      }
      BindgenError::UnknownType { type_name } => write!(f, "unknown type '{type_name}'"),
      BindgenError::UndeclaredBuiltin { type_name } => write!(
        f,
        "built-in interface '{type_name}' is not declared in the interface database"
      ),
      BindgenError::OptionalBeforeRequired {
        interface,
        operation,
        parameter,
      } => write!(
        f,
        "{interface}.{operation}: required parameter '{parameter}' follows an optional one"
      ),
      BindgenError::MixedStaticOverloads {
        interface,
        operation,
      } => write!(
        f,
        "{interface}.{operation}: static and instance overloads share one name"
      ),
      BindgenError::NoOverloads { interface } => write!(f, "{interface}: empty overload set"),
      BindgenError::InMember {
        interface,
        member,
        source,
      } => write!(f, "{interface}.{member}: {source}"),
    }
  }
}

impl Error for BindgenError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      BindgenError::InMember { source, .. } => Some(&**source),
      _ => None,
    }
  }
}

pub type BindgenResult<T> = Result<T, BindgenError>;
