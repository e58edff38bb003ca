//! Response envelope normalization.
//!
//! The backend answers list endpoints in more than one shape. This adapter is
//! the single place that knows them; everything downstream sees a plain
//! `Vec<Value>`.

use crate::record::json_type_name;
use crate::{error::Result, Error};
use serde_json::Value;

/// Envelope shapes accepted by [`unwrap_records`], in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// `[ ... ]`
    Bare,
    /// `{ "data": [ ... ] }`
    Data,
    /// `{ "data": { "data": [ ... ] } }`
    NestedData,
}

/// Extract the record array from a response body.
///
/// Fails with [`Error::MalformedResponse`] when no known shape matches.
pub fn unwrap_records(body: Value) -> Result<Vec<Value>> {
    unwrap_with_envelope(body).map(|(records, _)| records)
}

/// Like [`unwrap_records`], also reporting which envelope matched.
pub fn unwrap_with_envelope(body: Value) -> Result<(Vec<Value>, Envelope)> {
    match body {
        Value::Array(records) => Ok((records, Envelope::Bare)),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(records)) => Ok((records, Envelope::Data)),
            Some(Value::Object(mut inner)) => match inner.remove("data") {
                Some(Value::Array(records)) => Ok((records, Envelope::NestedData)),
                Some(other) => Err(Error::MalformedResponse(format!(
                    "expected array at data.data, got {}",
                    json_type_name(&other)
                ))),
                None => Err(Error::MalformedResponse(
                    "object at data has no data array".into(),
                )),
            },
            Some(other) => Err(Error::MalformedResponse(format!(
                "expected array at data, got {}",
                json_type_name(&other)
            ))),
            None => Err(Error::MalformedResponse(
                "object response has no data field".into(),
            )),
        },
        other => Err(Error::MalformedResponse(format!(
            "expected array or object, got {}",
            json_type_name(&other)
        ))),
    }
}
