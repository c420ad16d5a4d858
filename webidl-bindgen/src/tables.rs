use crate::annotations::AnnotationTables;
use crate::conversion::ConversionTables;
use crate::operation::OperationTables;
use crate::types::TypeTables;
use once_cell::sync::Lazy;

/// All static configuration of a generation run. Built once and shared by reference; the engines
/// never mutate it.
#[derive(Clone, Debug, Default)]
pub struct BindgenTables {
  pub types: TypeTables,
  pub operations: OperationTables,
  pub annotations: AnnotationTables,
  pub conversions: ConversionTables,
}

impl BindgenTables {
  pub fn builtin() -> Self {
    Self {
      types: TypeTables::builtin(),
      operations: OperationTables::builtin(),
      annotations: AnnotationTables::builtin(),
      conversions: ConversionTables::builtin(),
    }
  }
}

pub static BUILTIN_TABLES: Lazy<BindgenTables> = Lazy::new(BindgenTables::builtin);
