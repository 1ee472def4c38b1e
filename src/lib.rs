//! Record Pipeline
//!
//! Read records from memory or from CSV, JSON and XML files, run each one
//! through a transformer, and serialize the result as JSON, XML or CSV.
//!
//! ```
//! use record_pipeline::etl::Pipeline;
//! use record_pipeline::resource::ArrayData;
//! use record_pipeline::storage::CsvFormatter;
//! use record_pipeline::transform::HeaderRow;
//! use serde_json::json;
//!
//! let rows = vec![json!(["name", "age"]), json!(["John", "30"])];
//! let mut pipeline = Pipeline::new()
//!     .with_resource(ArrayData::new(rows))
//!     .with_transformer(HeaderRow::new())
//!     .with_formatter(CsvFormatter::new());
//!
//! assert_eq!(pipeline.run().unwrap(), "name,age\nJohn,30\n");
//! ```

pub mod error;
pub mod etl;
pub mod record;
pub mod resource;
pub mod storage;
pub mod transform;

// Re-exports for convenience
pub use error::{ErrorKind, EtlError, Result, Stage};
pub use etl::{IdentityTransformer, OutputFormatter, Pipeline, Resource, Transformer};
pub use record::{Outcome, Record, RecordKey, RecordSequence};
pub use resource::{ArrayData, FileData};
pub use storage::{
    CsvFormatter, CsvReader, FormatReader, JsonFormatter, JsonReader, XmlFormatter, XmlReader,
};
