//! Value converters
//!
//! A [`ConverterRegistry`] maps each [`FieldKind`] to a [`Converter`] that
//! turns raw JSON into a [`FieldValue`] and back. The registry is built at
//! configuration time and handed to the mapper; there is no process-wide
//! converter state. Replace an entry to change, say, the date format.

use super::types::{Attachment, FieldKind, FieldValue, Thumbnails};
use crate::error::{Error, Result};
use crate::types::JsonValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

/// Wire format of date-time values
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Wire format of date-only values
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Bidirectional coercion for one field kind
pub trait Converter: Send + Sync {
    /// JSON to field value; never called with `null`
    fn decode(&self, value: &JsonValue) -> Result<FieldValue>;

    /// Field value to JSON; never called with [`FieldValue::Null`]
    fn encode(&self, value: &FieldValue) -> Result<JsonValue>;
}

fn unexpected_json(kind: &str, value: &JsonValue) -> Error {
    Error::mapping(format!("cannot convert {value} to {kind}"))
}

fn unexpected_value(kind: &str, value: &FieldValue) -> Error {
    Error::mapping(format!("cannot encode {value:?} as {kind}"))
}

// ============================================================================
// Scalar Converters
// ============================================================================

/// Strings; numbers and booleans are stringified
#[derive(Debug, Clone, Copy, Default)]
pub struct TextConverter;

impl Converter for TextConverter {
    fn decode(&self, value: &JsonValue) -> Result<FieldValue> {
        match value {
            JsonValue::String(s) => Ok(FieldValue::Text(s.clone())),
            JsonValue::Number(n) => Ok(FieldValue::Text(n.to_string())),
            JsonValue::Bool(b) => Ok(FieldValue::Text(b.to_string())),
            other => Err(unexpected_json("text", other)),
        }
    }

    fn encode(&self, value: &FieldValue) -> Result<JsonValue> {
        match value {
            FieldValue::Text(s) => Ok(JsonValue::String(s.clone())),
            other => Err(unexpected_value("text", other)),
        }
    }
}

/// Floating point numbers; numeric strings are parsed
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberConverter;

impl Converter for NumberConverter {
    fn decode(&self, value: &JsonValue) -> Result<FieldValue> {
        let number = match value {
            JsonValue::Number(n) => n.as_f64(),
            JsonValue::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        number
            .map(FieldValue::Number)
            .ok_or_else(|| unexpected_json("number", value))
    }

    fn encode(&self, value: &FieldValue) -> Result<JsonValue> {
        match value {
            FieldValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(JsonValue::Number)
                .ok_or_else(|| Error::mapping(format!("{n} is not a finite number"))),
            other => Err(unexpected_value("number", other)),
        }
    }
}

/// Whole numbers; integral floats and numeric strings are accepted
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerConverter;

impl Converter for IntegerConverter {
    fn decode(&self, value: &JsonValue) -> Result<FieldValue> {
        let integer = match value {
            JsonValue::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            JsonValue::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        integer
            .map(FieldValue::Integer)
            .ok_or_else(|| unexpected_json("integer", value))
    }

    fn encode(&self, value: &FieldValue) -> Result<JsonValue> {
        match value {
            FieldValue::Integer(i) => Ok(JsonValue::from(*i)),
            other => Err(unexpected_value("integer", other)),
        }
    }
}

/// Checkbox values
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanConverter;

impl Converter for BooleanConverter {
    fn decode(&self, value: &JsonValue) -> Result<FieldValue> {
        match value {
            JsonValue::Bool(b) => Ok(FieldValue::Boolean(*b)),
            JsonValue::String(s) if s.eq_ignore_ascii_case("true") => {
                Ok(FieldValue::Boolean(true))
            }
            JsonValue::String(s) if s.eq_ignore_ascii_case("false") => {
                Ok(FieldValue::Boolean(false))
            }
            other => Err(unexpected_json("boolean", other)),
        }
    }

    fn encode(&self, value: &FieldValue) -> Result<JsonValue> {
        match value {
            FieldValue::Boolean(b) => Ok(JsonValue::Bool(*b)),
            other => Err(unexpected_value("boolean", other)),
        }
    }
}

// ============================================================================
// Date Converters
// ============================================================================

/// UTC timestamps in a `chrono` format
///
/// Decoding falls back to RFC 3339 and to bare dates (midnight UTC).
#[derive(Debug, Clone)]
pub struct DateTimeConverter {
    format: String,
}

impl DateTimeConverter {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }

    fn parse(&self, s: &str) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(s, &self.format)
            .map(|naive| naive.and_utc())
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc))
            })
            .or_else(|| {
                NaiveDate::parse_from_str(s, DATE_FORMAT)
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .map(|naive| naive.and_utc())
            })
    }
}

impl Default for DateTimeConverter {
    fn default() -> Self {
        Self::new(DATE_TIME_FORMAT)
    }
}

impl Converter for DateTimeConverter {
    fn decode(&self, value: &JsonValue) -> Result<FieldValue> {
        value
            .as_str()
            .and_then(|s| self.parse(s.trim()))
            .map(FieldValue::DateTime)
            .ok_or_else(|| unexpected_json("date-time", value))
    }

    fn encode(&self, value: &FieldValue) -> Result<JsonValue> {
        match value {
            FieldValue::DateTime(dt) => Ok(JsonValue::String(dt.format(&self.format).to_string())),
            other => Err(unexpected_value("date-time", other)),
        }
    }
}

/// Calendar dates in a `chrono` format
#[derive(Debug, Clone)]
pub struct DateConverter {
    format: String,
}

impl DateConverter {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}

impl Default for DateConverter {
    fn default() -> Self {
        Self::new(DATE_FORMAT)
    }
}

impl Converter for DateConverter {
    fn decode(&self, value: &JsonValue) -> Result<FieldValue> {
        let parsed = value.as_str().and_then(|s| {
            let s = s.trim();
            NaiveDate::parse_from_str(s, &self.format).ok().or_else(|| {
                DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc).date_naive())
            })
        });
        parsed
            .map(FieldValue::Date)
            .ok_or_else(|| unexpected_json("date", value))
    }

    fn encode(&self, value: &FieldValue) -> Result<JsonValue> {
        match value {
            FieldValue::Date(date) => Ok(JsonValue::String(date.format(&self.format).to_string())),
            other => Err(unexpected_value("date", other)),
        }
    }
}

// ============================================================================
// Structured Converters
// ============================================================================

/// JSON arrays of attachment objects
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachmentsConverter;

impl Converter for AttachmentsConverter {
    fn decode(&self, value: &JsonValue) -> Result<FieldValue> {
        if !value.is_array() {
            return Err(unexpected_json("attachments", value));
        }
        serde_json::from_value::<Vec<Attachment>>(value.clone())
            .map(FieldValue::Attachments)
            .map_err(|e| Error::mapping_with("invalid attachment list", e))
    }

    fn encode(&self, value: &FieldValue) -> Result<JsonValue> {
        match value {
            FieldValue::Attachments(list) => serde_json::to_value(list)
                .map_err(|e| Error::mapping_with("cannot serialize attachments", e)),
            other => Err(unexpected_value("attachments", other)),
        }
    }
}

/// Nested thumbnail objects
#[derive(Debug, Clone, Copy, Default)]
pub struct ThumbnailsConverter;

impl Converter for ThumbnailsConverter {
    fn decode(&self, value: &JsonValue) -> Result<FieldValue> {
        if !value.is_object() {
            return Err(unexpected_json("thumbnails", value));
        }
        serde_json::from_value::<Thumbnails>(value.clone())
            .map(FieldValue::Thumbnails)
            .map_err(|e| Error::mapping_with("invalid thumbnails", e))
    }

    fn encode(&self, value: &FieldValue) -> Result<JsonValue> {
        match value {
            FieldValue::Thumbnails(thumbnails) => serde_json::to_value(thumbnails)
                .map_err(|e| Error::mapping_with("cannot serialize thumbnails", e)),
            other => Err(unexpected_value("thumbnails", other)),
        }
    }
}

/// Raw JSON, unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonConverter;

impl Converter for JsonConverter {
    fn decode(&self, value: &JsonValue) -> Result<FieldValue> {
        Ok(FieldValue::Json(value.clone()))
    }

    fn encode(&self, value: &FieldValue) -> Result<JsonValue> {
        match value {
            FieldValue::Json(v) => Ok(v.clone()),
            other => Err(unexpected_value("json", other)),
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Converters keyed by field kind
#[derive(Clone)]
pub struct ConverterRegistry {
    converters: HashMap<FieldKind, Arc<dyn Converter>>,
}

impl ConverterRegistry {
    /// Registry with the default converter for every kind
    pub fn new() -> Self {
        Self::empty()
            .with(FieldKind::Text, TextConverter)
            .with(FieldKind::Number, NumberConverter)
            .with(FieldKind::Integer, IntegerConverter)
            .with(FieldKind::Boolean, BooleanConverter)
            .with(FieldKind::DateTime, DateTimeConverter::default())
            .with(FieldKind::Date, DateConverter::default())
            .with(FieldKind::Attachments, AttachmentsConverter)
            .with(FieldKind::Thumbnails, ThumbnailsConverter)
            .with(FieldKind::Json, JsonConverter)
    }

    /// Registry without any converter
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// Register or replace the converter for a kind
    pub fn register(&mut self, kind: FieldKind, converter: impl Converter + 'static) {
        self.converters.insert(kind, Arc::new(converter));
    }

    /// Builder-style [`register`](Self::register)
    #[must_use]
    pub fn with(mut self, kind: FieldKind, converter: impl Converter + 'static) -> Self {
        self.register(kind, converter);
        self
    }

    pub fn contains(&self, kind: FieldKind) -> bool {
        self.converters.contains_key(&kind)
    }

    fn converter(&self, kind: FieldKind) -> Result<&dyn Converter> {
        self.converters
            .get(&kind)
            .map(|c| &**c)
            .ok_or_else(|| Error::mapping(format!("no converter registered for {kind:?}")))
    }

    /// Decode raw JSON for a kind; `null` is always [`FieldValue::Null`]
    pub fn decode(&self, kind: FieldKind, value: &JsonValue) -> Result<FieldValue> {
        if value.is_null() {
            return Ok(FieldValue::Null);
        }
        self.converter(kind)?.decode(value)
    }

    /// Encode a value for a kind; [`FieldValue::Null`] is always `null`
    pub fn encode(&self, kind: FieldKind, value: &FieldValue) -> Result<JsonValue> {
        if value.is_null() {
            return Ok(JsonValue::Null);
        }
        self.converter(kind)?.encode(value)
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<String> = self.converters.keys().map(|k| format!("{k:?}")).collect();
        kinds.sort();
        f.debug_struct("ConverterRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}
