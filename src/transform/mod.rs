//! Transformer building blocks and ready-made transformers
//!
//! This module provides the reusable base strategy (field mapping and
//! validation) and concrete transformers built on it.

mod base;
mod fn_transformer;
mod header_row;
mod mapping_transformer;
mod skip_first;
pub mod validators;

pub use base::{FieldMapping, Predicate, RecordConfigurator, ValidatorChain};
pub use fn_transformer::FnTransformer;
pub use header_row::HeaderRow;
pub use mapping_transformer::{MappingTransformer, ValidationStats};
pub use skip_first::SkipFirst;
