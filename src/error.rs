//! Error types for the record pipeline.

use std::fmt;
use thiserror::Error;

/// Boxed error kept as the cause of a resource or output failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EtlError>;

/// The broad category of an [`EtlError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required collaborator was never supplied
    Configuration,
    /// The source could not be opened, read, or decoded
    Resource,
    /// The output could not be produced from the records
    Output,
    /// Wrapper raised by [`Pipeline::run`](crate::etl::Pipeline::run)
    Pipeline,
}

/// Pipeline stage that raised a wrapped error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Serialize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Extract => write!(f, "extract"),
            Stage::Serialize => write!(f, "serialize"),
        }
    }
}

/// Main error type for pipeline operations.
#[derive(Error, Debug)]
pub enum EtlError {
    /// A resource, transformer or formatter was not set
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Opening, reading or decoding the source failed
    #[error("Resource error: {message}")]
    Resource {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Serializing the records failed
    #[error("Output error: {message}")]
    Output {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// A stage of [`Pipeline::run`](crate::etl::Pipeline::run) failed
    #[error("Pipeline failed during {stage}")]
    Pipeline {
        stage: Stage,
        #[source]
        source: Box<EtlError>,
    },
}

impl EtlError {
    /// Create a Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        EtlError::Configuration(message.into())
    }

    /// Create a Resource error with no underlying cause
    pub fn resource(message: impl Into<String>) -> Self {
        EtlError::Resource {
            message: message.into(),
            source: None,
        }
    }

    /// Create a Resource error that keeps the underlying cause
    pub fn resource_with(
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        EtlError::Resource {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create an Output error with no underlying cause
    pub fn output(message: impl Into<String>) -> Self {
        EtlError::Output {
            message: message.into(),
            source: None,
        }
    }

    /// Create an Output error that keeps the underlying cause
    pub fn output_with(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        EtlError::Output {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Wrap an error raised by a pipeline stage
    pub fn pipeline(stage: Stage, source: EtlError) -> Self {
        EtlError::Pipeline {
            stage,
            source: Box::new(source),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EtlError::Configuration(_) => ErrorKind::Configuration,
            EtlError::Resource { .. } => ErrorKind::Resource,
            EtlError::Output { .. } => ErrorKind::Output,
            EtlError::Pipeline { .. } => ErrorKind::Pipeline,
        }
    }

    /// Kind of the innermost error, looking through `Pipeline` wrappers
    pub fn root_kind(&self) -> ErrorKind {
        match self {
            EtlError::Pipeline { source, .. } => source.root_kind(),
            other => other.kind(),
        }
    }

    /// The wrapped error if this is a `Pipeline` error
    pub fn wrapped(&self) -> Option<&EtlError> {
        match self {
            EtlError::Pipeline { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_pipeline_error_keeps_cause() {
        let inner = EtlError::resource("Failed to parse JSON");
        let err = EtlError::pipeline(Stage::Extract, inner);

        assert_eq!(err.kind(), ErrorKind::Pipeline);
        assert_eq!(err.root_kind(), ErrorKind::Resource);
        assert_eq!(err.to_string(), "Pipeline failed during extract");

        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "Resource error: Failed to parse JSON");
        assert_eq!(err.wrapped().unwrap().kind(), ErrorKind::Resource);
    }

    #[test]
    fn test_resource_error_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = EtlError::resource_with("Failed to open data.csv", io);

        assert_eq!(err.kind(), ErrorKind::Resource);
        assert_eq!(err.source().unwrap().to_string(), "missing");
        assert!(err.wrapped().is_none());
    }
}
