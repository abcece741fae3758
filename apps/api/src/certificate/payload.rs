//! Certificate content payload — opaque to the engine, shape-checked at the boundary.
//!
//! The payload is a JSON object. Keys the calibration templates rely on are checked
//! for shape when present; anything else passes through untouched. Business meaning
//! (is the due date after the calibration date, is the serial real) is not checked.
//!
//! # Known keys
//! - `certificateNo`: string
//! - `customer`, `instrument`, `conditions`: objects of strings
//! - `dates`: object of strings, each empty or `YYYY-MM-DD`
//! - `referenceInstruments`: array of objects with a unique integer `id`,
//!   string fields, and an optional `due` date

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::EditError;

const DATE_FORMAT: &str = "%Y-%m-%d";

const STRING_OBJECT_KEYS: &[&str] = &["customer", "instrument", "conditions"];

/// Validated certificate payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct CertificateData(Map<String, Value>);

impl CertificateData {
    pub fn new(value: Value) -> Result<Self, EditError> {
        match value {
            Value::Object(map) => {
                validate_shape(&map)?;
                Ok(Self(map))
            }
            other => Err(EditError::InvalidPayload(format!(
                "certificate data must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Applies an RFC 7396 merge patch and validates the result.
    pub fn merged(&self, patch: &Value) -> Result<Self, EditError> {
        let mut value = Value::Object(self.0.clone());
        merge_patch(&mut value, patch);
        Self::new(value)
    }
}

impl TryFrom<Value> for CertificateData {
    type Error = EditError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CertificateData> for Value {
    fn from(data: CertificateData) -> Self {
        Value::Object(data.0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Merge patch
// ────────────────────────────────────────────────────────────────────────────

/// RFC 7396: objects merge key by key, `null` deletes, anything else replaces.
pub fn merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch_map) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(target_map) = target {
        for (key, value) in patch_map {
            if value.is_null() {
                target_map.remove(key);
            } else {
                merge_patch(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shape checks
// ────────────────────────────────────────────────────────────────────────────

fn validate_shape(map: &Map<String, Value>) -> Result<(), EditError> {
    if let Some(value) = map.get("certificateNo") {
        expect_string("certificateNo", value)?;
    }
    for &key in STRING_OBJECT_KEYS {
        if let Some(value) = map.get(key) {
            expect_string_object(key, value)?;
        }
    }
    if let Some(value) = map.get("dates") {
        let dates = expect_string_object("dates", value)?;
        for (name, date) in dates {
            expect_date(&format!("dates.{name}"), date)?;
        }
    }
    if let Some(value) = map.get("referenceInstruments") {
        validate_reference_instruments(value)?;
    }
    Ok(())
}

fn validate_reference_instruments(value: &Value) -> Result<(), EditError> {
    let Value::Array(items) = value else {
        return Err(shape_error("referenceInstruments", "an array", value));
    };
    let mut seen = HashSet::new();
    for (i, item) in items.iter().enumerate() {
        let path = format!("referenceInstruments[{i}]");
        let Value::Object(fields) = item else {
            return Err(shape_error(&path, "an object", item));
        };
        let id = fields
            .get("id")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                EditError::InvalidPayload(format!("`{path}.id` must be a non-negative integer"))
            })?;
        if !seen.insert(id) {
            return Err(EditError::InvalidPayload(format!(
                "duplicate reference instrument id {id}"
            )));
        }
        for (name, field) in fields.iter().filter(|(k, _)| k.as_str() != "id") {
            let field_path = format!("{path}.{name}");
            if name == "due" {
                expect_date(&field_path, field)?;
            } else {
                expect_string(&field_path, field)?;
            }
        }
    }
    Ok(())
}

fn expect_string<'a>(path: &str, value: &'a Value) -> Result<&'a str, EditError> {
    value
        .as_str()
        .ok_or_else(|| shape_error(path, "a string", value))
}

fn expect_string_object<'a>(
    path: &str,
    value: &'a Value,
) -> Result<&'a Map<String, Value>, EditError> {
    let Value::Object(map) = value else {
        return Err(shape_error(path, "an object", value));
    };
    for (key, field) in map {
        expect_string(&format!("{path}.{key}"), field)?;
    }
    Ok(map)
}

/// Empty strings are allowed: the date has not been filled in yet.
fn expect_date(path: &str, value: &Value) -> Result<(), EditError> {
    let text = expect_string(path, value)?;
    if text.is_empty() {
        return Ok(());
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| {
            EditError::InvalidPayload(format!(
                "`{path}` must be an ISO date (YYYY-MM-DD), got '{text}'"
            ))
        })
}

fn shape_error(path: &str, expected: &str, got: &Value) -> EditError {
    EditError::InvalidPayload(format!(
        "`{path}` must be {expected}, got {}",
        json_kind(got)
    ))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> CertificateData {
        CertificateData::new(json!({
            "certificateNo": "UAL/000087/25",
            "customer": { "name": "Metquay Inc", "address": "" },
            "dates": { "issue": "2025-06-16", "due": "" },
            "referenceInstruments": [
                { "id": 1, "equipment": "Leak Standard", "due": "2025-06-30" }
            ],
            "notes": [1, 2, 3]
        }))
        .unwrap()
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(matches!(
            CertificateData::new(json!([1, 2])),
            Err(EditError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_unknown_keys_pass_through() {
        assert_eq!(sample().get("notes"), Some(&json!([1, 2, 3])));
    }

    #[test]
    fn test_bad_date_rejected() {
        let err = CertificateData::new(json!({ "dates": { "issue": "16/06/2025" } })).unwrap_err();
        assert!(err.to_string().contains("dates.issue"));
    }

    #[test]
    fn test_customer_fields_must_be_strings() {
        let err = CertificateData::new(json!({ "customer": { "name": 7 } })).unwrap_err();
        assert!(err.to_string().contains("customer.name"));
    }

    #[test]
    fn test_reference_instruments_need_unique_ids() {
        let payload = json!({
            "referenceInstruments": [
                { "id": 1, "serial": "A" },
                { "id": 1, "serial": "B" }
            ]
        });
        assert!(CertificateData::new(payload).is_err());

        let missing = json!({ "referenceInstruments": [{ "serial": "A" }] });
        assert!(CertificateData::new(missing).is_err());
    }

    #[test]
    fn test_merge_patch_updates_and_deletes() {
        let data = sample()
            .merged(&json!({
                "customer": { "address": "1 Main St" },
                "dates": { "due": "2026-06-16" },
                "notes": null
            }))
            .unwrap();
        assert_eq!(data.get("customer").unwrap()["name"], "Metquay Inc");
        assert_eq!(data.get("customer").unwrap()["address"], "1 Main St");
        assert_eq!(data.get("dates").unwrap()["due"], "2026-06-16");
        assert!(data.get("notes").is_none());
    }

    #[test]
    fn test_merge_patch_that_breaks_shape_is_rejected() {
        let data = sample();
        assert!(data.merged(&json!({ "dates": { "issue": "soon" } })).is_err());
        assert!(data.merged(&json!("replace everything")).is_err());
    }

    #[test]
    fn test_merge_patch_replaces_arrays_whole() {
        let mut target = json!({ "a": [1, 2], "b": { "c": 1 } });
        merge_patch(&mut target, &json!({ "a": [3], "b": { "d": 2 } }));
        assert_eq!(target, json!({ "a": [3], "b": { "c": 1, "d": 2 } }));
    }

    #[test]
    fn test_deserialize_validates() {
        let bad = json!({ "certificateNo": 12 });
        assert!(serde_json::from_value::<CertificateData>(bad).is_err());
    }
}
