//! Pipeline orchestration for read, transform and serialize

use super::{OutputFormatter, Resource, Transformer};
use crate::error::{EtlError, Result, Stage};
use crate::record::RecordSequence;
use std::io::Write;

/// Pipeline that runs a resource through a transformer and a formatter
///
/// All three collaborators are required for [`run`](Pipeline::run);
/// [`items`](Pipeline::items) needs only the resource and the transformer.
/// A missing collaborator is reported as a configuration error when the
/// operation that needs it is called, not when the pipeline is built.
///
/// # Example
/// ```
/// use record_pipeline::etl::{IdentityTransformer, Pipeline};
/// use record_pipeline::resource::ArrayData;
/// use record_pipeline::storage::JsonFormatter;
/// use serde_json::json;
///
/// let mut pipeline = Pipeline::new()
///     .with_resource(ArrayData::new(vec![json!({"id": 1})]))
///     .with_transformer(IdentityTransformer)
///     .with_formatter(JsonFormatter::new());
///
/// let output = pipeline.run().unwrap();
/// assert_eq!(output, r#"[{"id":1}]"#);
/// ```
#[derive(Default)]
pub struct Pipeline {
    resource: Option<Box<dyn Resource>>,
    transformer: Option<Box<dyn Transformer>>,
    formatter: Option<Box<dyn OutputFormatter>>,
}

impl Pipeline {
    /// Create a pipeline with no collaborators set
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(mut self, resource: impl Resource + 'static) -> Self {
        self.set_resource(resource);
        self
    }

    pub fn with_transformer(mut self, transformer: impl Transformer + 'static) -> Self {
        self.set_transformer(transformer);
        self
    }

    pub fn with_formatter(mut self, formatter: impl OutputFormatter + 'static) -> Self {
        self.set_formatter(formatter);
        self
    }

    pub fn set_resource(&mut self, resource: impl Resource + 'static) {
        self.resource = Some(Box::new(resource));
    }

    pub fn set_transformer(&mut self, transformer: impl Transformer + 'static) {
        self.transformer = Some(Box::new(transformer));
    }

    pub fn set_formatter(&mut self, formatter: impl OutputFormatter + 'static) {
        self.formatter = Some(Box::new(formatter));
    }

    /// The resource, if one is set
    pub fn resource(&self) -> Option<&dyn Resource> {
        self.resource.as_deref()
    }

    /// Run the complete pipeline and return the serialized output
    ///
    /// Steps:
    /// 1. Apply the transformer to the resource
    /// 2. Serialize the resulting records
    ///
    /// # Errors
    /// Returns a configuration error if any collaborator is unset. A
    /// failure inside a stage is wrapped in a pipeline error whose source
    /// is the original error.
    pub fn run(&mut self) -> Result<String> {
        self.check_configured()?;
        log::info!("Starting pipeline");

        let items = self.extract()?;

        log::debug!("Serializing {} items...", items.len());
        let formatter = self.formatter()?;
        let output = formatter
            .serialize(&items)
            .map_err(|e| EtlError::pipeline(Stage::Serialize, e))?;
        log::info!("Serialized {} items ({} bytes)", items.len(), output.len());

        Ok(output)
    }

    /// Run the complete pipeline, writing the output to `writer`
    ///
    /// Returns the number of bytes written. Errors follow [`run`](Pipeline::run).
    pub fn run_to(&mut self, writer: &mut dyn Write) -> Result<usize> {
        self.check_configured()?;
        log::info!("Starting pipeline");

        let items = self.extract()?;

        let formatter = self.formatter()?;
        let written = formatter
            .write_to(&items, writer)
            .map_err(|e| EtlError::pipeline(Stage::Serialize, e))?;
        log::info!("Wrote {} items ({} bytes)", items.len(), written);

        Ok(written)
    }

    /// Run the resource stage only
    ///
    /// # Errors
    /// Returns a configuration error if the resource or transformer is
    /// unset, or the resource's own error unchanged.
    pub fn items(&mut self) -> Result<RecordSequence> {
        let (resource, transformer) = self.extract_parts()?;
        resource.apply(&mut **transformer)
    }

    /// Number of records [`items`](Pipeline::items) produces
    pub fn total_items(&mut self) -> Result<usize> {
        Ok(self.items()?.len())
    }

    fn extract(&mut self) -> Result<RecordSequence> {
        log::debug!("Extracting from resource...");
        let items = self
            .items()
            .map_err(|e| EtlError::pipeline(Stage::Extract, e))?;
        log::info!("Extracted {} items", items.len());

        if items.is_empty() {
            log::warn!("No items extracted, serializing an empty sequence");
        }
        Ok(items)
    }

    fn check_configured(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("resource", self.resource.is_none()),
            ("transformer", self.transformer.is_none()),
            ("output formatter", self.formatter.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, unset)| unset.then_some(name))
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(EtlError::configuration(format!(
                "no {} set on the pipeline",
                missing.join(", ")
            )))
        }
    }

    fn extract_parts(&mut self) -> Result<(&mut Box<dyn Resource>, &mut Box<dyn Transformer>)> {
        let resource = self
            .resource
            .as_mut()
            .ok_or_else(|| EtlError::configuration("no resource set on the pipeline"))?;
        let transformer = self
            .transformer
            .as_mut()
            .ok_or_else(|| EtlError::configuration("no transformer set on the pipeline"))?;
        Ok((resource, transformer))
    }

    fn formatter(&self) -> Result<&dyn OutputFormatter> {
        self.formatter
            .as_deref()
            .ok_or_else(|| EtlError::configuration("no output formatter set on the pipeline"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::etl::IdentityTransformer;
    use crate::record::{Outcome, Record};
    use crate::resource::ArrayData;
    use serde_json::json;

    struct FailingResource;

    impl Resource for FailingResource {
        fn apply(&mut self, _transformer: &mut dyn Transformer) -> Result<RecordSequence> {
            Err(EtlError::resource("source unavailable"))
        }

        fn data(&self) -> &[Record] {
            &[]
        }
    }

    struct FailingFormatter;

    impl OutputFormatter for FailingFormatter {
        fn serialize(&self, _records: &[Record]) -> Result<String> {
            Err(EtlError::output("cannot encode"))
        }
    }

    struct LineFormatter;

    impl OutputFormatter for LineFormatter {
        fn serialize(&self, records: &[Record]) -> Result<String> {
            Ok(records
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join("\n"))
        }
    }

    struct Doubler;

    impl Transformer for Doubler {
        fn configure_item(&mut self, record: Record) -> Outcome {
            Outcome::Keep(json!(record.as_i64().unwrap_or(0) * 2))
        }

        fn configure_first_item(&mut self, _record: Record) -> Outcome {
            Outcome::Drop
        }
    }

    #[test]
    fn test_pipeline() {
        let mut pipeline = Pipeline::new()
            .with_resource(ArrayData::new(vec![json!(0), json!(1), json!(2), json!(3)]))
            .with_transformer(Doubler)
            .with_formatter(LineFormatter);

        assert_eq!(pipeline.run().unwrap(), "2\n4\n6");
        assert_eq!(pipeline.total_items().unwrap(), 3);
        assert_eq!(pipeline.resource().unwrap().data().len(), 3);
    }

    #[test]
    fn test_empty_pipeline() {
        let mut pipeline = Pipeline::new()
            .with_resource(ArrayData::new(vec![]))
            .with_transformer(IdentityTransformer)
            .with_formatter(LineFormatter);

        assert_eq!(pipeline.run().unwrap(), "");
        assert_eq!(pipeline.total_items().unwrap(), 0);
    }

    #[test]
    fn test_missing_formatter() {
        let mut pipeline = Pipeline::new()
            .with_resource(ArrayData::new(vec![json!(1), json!(2)]))
            .with_transformer(IdentityTransformer);

        let err = pipeline.run().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("output formatter"));

        assert_eq!(pipeline.items().unwrap(), vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_missing_everything() {
        let mut pipeline = Pipeline::new();
        let err = pipeline.run().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: no resource, transformer, output formatter set on the pipeline"
        );
        assert_eq!(pipeline.items().unwrap_err().kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_missing_transformer_for_items() {
        let mut pipeline = Pipeline::new().with_resource(ArrayData::new(vec![json!(1)]));
        let err = pipeline.total_items().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("transformer"));
    }

    #[test]
    fn test_resource_failure_is_wrapped() {
        let mut pipeline = Pipeline::new()
            .with_resource(FailingResource)
            .with_transformer(IdentityTransformer)
            .with_formatter(LineFormatter);

        let err = pipeline.run().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Pipeline);
        assert_eq!(err.root_kind(), ErrorKind::Resource);

        // items() surfaces the resource error directly
        assert_eq!(pipeline.items().unwrap_err().kind(), ErrorKind::Resource);
    }

    #[test]
    fn test_formatter_failure_is_wrapped() {
        let mut pipeline = Pipeline::new()
            .with_resource(ArrayData::new(vec![json!(1)]))
            .with_transformer(IdentityTransformer)
            .with_formatter(FailingFormatter);

        let err = pipeline.run().unwrap_err();
        assert!(matches!(
            err,
            EtlError::Pipeline {
                stage: Stage::Serialize,
                ..
            }
        ));
        assert_eq!(err.wrapped().unwrap().kind(), ErrorKind::Output);
    }

    #[test]
    fn test_run_to_writer() {
        let mut pipeline = Pipeline::new()
            .with_resource(ArrayData::new(vec![json!(1), json!(2)]))
            .with_transformer(IdentityTransformer)
            .with_formatter(LineFormatter);

        let mut buffer = Vec::new();
        let written = pipeline.run_to(&mut buffer).unwrap();
        assert_eq!(written, 3);
        assert_eq!(String::from_utf8(buffer).unwrap(), "1\n2");
    }
}
