//! Resources the pipeline reads records from
//!
//! - [`ArrayData`] wraps records already in memory
//! - [`FileData`] decodes a file with a [`FormatReader`](crate::storage::FormatReader)

mod array;
mod file;

pub use array::ArrayData;
pub use file::FileData;
