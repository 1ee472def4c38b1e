//! Core pipeline abstractions
//!
//! This module provides the capability traits for reading records from a
//! resource, transforming them one at a time, and serializing the result,
//! plus the [`Pipeline`] that runs them in order.

mod extract;
mod load;
mod pipeline;
mod transform;

pub use extract::Resource;
pub use load::OutputFormatter;
pub use pipeline::Pipeline;
pub use transform::{IdentityTransformer, RecordSink, Transformer};
