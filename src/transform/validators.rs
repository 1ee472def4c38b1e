//! Common predicates for a [`ValidatorChain`](super::ValidatorChain)
//!
//! Each function returns a closure over one field of the record.

use crate::error::{EtlError, Result};
use crate::record::{Record, RecordKey, scalar_text};
use regex::Regex;
use serde_json::Value;

/// The field is present and not `null`
pub fn required(key: impl Into<RecordKey>) -> impl Fn(&Record) -> bool {
    let key = key.into();
    move |record: &Record| key.get(record).is_some_and(|v| !v.is_null())
}

/// The field is present and its text is not blank
pub fn not_empty(key: impl Into<RecordKey>) -> impl Fn(&Record) -> bool {
    let key = key.into();
    move |record: &Record| {
        key.get(record)
            .is_some_and(|v| !scalar_text(v).trim().is_empty())
    }
}

/// The field's text matches a regular expression
///
/// # Errors
/// Returns a configuration error if the pattern does not compile.
pub fn matches<K: Into<RecordKey>>(
    key: K,
    pattern: &str,
) -> Result<impl Fn(&Record) -> bool + use<K>> {
    let regex = Regex::new(pattern).map_err(|e| {
        EtlError::configuration(format!("Invalid validator pattern {:?}: {}", pattern, e))
    })?;
    let key = key.into();
    Ok(move |record: &Record| {
        key.get(record)
            .is_some_and(|v| regex.is_match(&scalar_text(v)))
    })
}

/// The field's text is one of the allowed values
pub fn one_of<S: AsRef<str>>(
    key: impl Into<RecordKey>,
    allowed: impl IntoIterator<Item = S>,
) -> impl Fn(&Record) -> bool {
    let key = key.into();
    let allowed: Vec<String> = allowed.into_iter().map(|s| s.as_ref().to_string()).collect();
    move |record: &Record| {
        key.get(record)
            .is_some_and(|v| allowed.contains(&scalar_text(v)))
    }
}

/// The field is a number, or a string that parses as one
pub fn numeric(key: impl Into<RecordKey>) -> impl Fn(&Record) -> bool {
    let key = key.into();
    move |record: &Record| match key.get(record) {
        Some(Value::Number(_)) => true,
        Some(Value::String(s)) => s.trim().parse::<f64>().is_ok_and(f64::is_finite),
        _ => false,
    }
}
