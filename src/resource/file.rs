//! File-backed resource

use crate::error::{EtlError, Result};
use crate::etl::{Resource, Transformer};
use crate::record::{Record, RecordSequence};
use crate::storage::FormatReader;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Resource that decodes a file with a [`FormatReader`]
///
/// Each `apply` opens the file, takes a shared lock on it so cooperating
/// writers wait until the decode finishes, and hands the stream to the
/// reader. The handle and the lock are released when `apply` returns,
/// whether decoding succeeded or not.
///
/// # Example
/// ```no_run
/// use record_pipeline::etl::{IdentityTransformer, Resource};
/// use record_pipeline::resource::FileData;
/// use record_pipeline::storage::CsvReader;
///
/// let mut resource = FileData::new("people.csv", CsvReader::new());
/// let rows = resource.apply(&mut IdentityTransformer)?;
/// # Ok::<(), record_pipeline::EtlError>(())
/// ```
pub struct FileData {
    path: PathBuf,
    reader: Box<dyn FormatReader>,
    data: RecordSequence,
}

impl FileData {
    pub fn new(path: impl AsRef<Path>, reader: impl FormatReader + 'static) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            reader: Box::new(reader),
            data: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Resource for FileData {
    fn apply(&mut self, transformer: &mut dyn Transformer) -> Result<RecordSequence> {
        log::debug!("Reading records from {}", self.path.display());

        let file = File::open(&self.path).map_err(|e| {
            EtlError::resource_with(format!("Failed to open {}", self.path.display()), e)
        })?;
        file.lock_shared().map_err(|e| {
            EtlError::resource_with(format!("Failed to lock {}", self.path.display()), e)
        })?;

        let mut input = BufReader::new(&file);
        let items = self.reader.read(&mut input, transformer).map_err(|e| match e {
            EtlError::Resource { message, source } => EtlError::Resource {
                message: format!("{}: {}", self.path.display(), message),
                source,
            },
            other => other,
        })?;

        log::debug!(
            "Read {} items from {}",
            items.len(),
            self.path.display()
        );
        self.data = items.clone();
        Ok(items)
    }

    fn data(&self) -> &[Record] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::etl::IdentityTransformer;
    use crate::storage::{CsvReader, JsonReader};
    use serde_json::json;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_apply_reads_file() {
        let mut temp = NamedTempFile::new().unwrap();
        write!(temp, "name,age\nJohn,30\n").unwrap();

        let mut resource = FileData::new(temp.path(), CsvReader::new());
        let items = resource.apply(&mut IdentityTransformer).unwrap();

        assert_eq!(items, vec![json!(["name", "age"]), json!(["John", "30"])]);
        assert_eq!(resource.data(), items.as_slice());
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut resource = FileData::new(dir.path().join("nope.json"), JsonReader::new());

        let err = resource.apply(&mut IdentityTransformer).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resource);
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn test_directory_is_not_readable() {
        let dir = TempDir::new().unwrap();
        let mut resource = FileData::new(dir.path(), JsonReader::new());
        assert_eq!(
            resource.apply(&mut IdentityTransformer).unwrap_err().kind(),
            ErrorKind::Resource
        );
    }

    #[test]
    fn test_decode_failure_keeps_previous_data() {
        let mut temp = NamedTempFile::new().unwrap();
        write!(temp, r#"[{{"a": 1}}]"#).unwrap();

        let mut resource = FileData::new(temp.path(), JsonReader::new());
        resource.apply(&mut IdentityTransformer).unwrap();

        std::fs::write(temp.path(), "{invalid").unwrap();
        let err = resource.apply(&mut IdentityTransformer).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Resource);
        assert!(err.to_string().contains("Failed to parse JSON"));
        assert_eq!(resource.data(), &[json!({"a": 1})]);
    }

    #[test]
    fn test_file_is_released_after_apply() {
        let mut temp = NamedTempFile::new().unwrap();
        write!(temp, "[]").unwrap();

        let mut resource = FileData::new(temp.path(), JsonReader::new());
        resource.apply(&mut IdentityTransformer).unwrap();

        let file = File::options().write(true).open(temp.path()).unwrap();
        assert!(file.try_lock().is_ok());
    }

    #[test]
    fn test_file_is_released_after_failed_decode() {
        let mut temp = NamedTempFile::new().unwrap();
        write!(temp, "{{invalid").unwrap();

        let mut resource = FileData::new(temp.path(), JsonReader::new());
        let err = resource.apply(&mut IdentityTransformer).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resource);

        let file = File::options().write(true).open(temp.path()).unwrap();
        assert!(file.try_lock().is_ok());
    }
}
