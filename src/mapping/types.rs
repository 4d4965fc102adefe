//! Wire shapes and intermediate field values
//!
//! These types describe what the service sends and receives: attachment
//! objects, the list/delete envelopes and the weakly typed [`RecordItem`].

use super::schema::{Entity, Schema};
use crate::types::JsonObject;
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Key under which user fields are nested
pub const FIELDS_KEY: &str = "fields";

/// Property holding the record id
pub const ID_PROPERTY: &str = "id";

/// Property holding the creation timestamp
pub const CREATED_TIME_PROPERTY: &str = "createdTime";

// ============================================================================
// Field Kinds and Values
// ============================================================================

/// Coercion category of a property; selects the converter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Number,
    Integer,
    Boolean,
    DateTime,
    Date,
    Attachments,
    Thumbnails,
    Json,
}

/// A decoded property value, between JSON and the typed property
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Number(f64),
    Integer(i64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
    Attachments(Vec<Attachment>),
    Thumbnails(Thumbnails),
    Json(serde_json::Value),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

/// How a write payload is shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Protected fields must be unset; nulls are omitted
    Create,
    /// Protected fields are dropped; nulls clear the remote cell
    Update,
}

// ============================================================================
// Attachments
// ============================================================================

/// A file attached to a record
///
/// `id`, `size`, `type` and `filename` are assigned by the service and must
/// stay empty when creating a record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// MIME type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnails: Option<Thumbnails>,
}

impl Attachment {
    /// Attachment to upload from a public URL
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Names of server-assigned properties that are set
    pub fn server_assigned(&self) -> Vec<&'static str> {
        let mut set = Vec::new();
        if self.id.is_some() {
            set.push("id");
        }
        if self.size.is_some() {
            set.push("size");
        }
        if self.mime_type.is_some() {
            set.push("type");
        }
        if self.filename.is_some() {
            set.push("filename");
        }
        set
    }
}

/// Thumbnail variants of an image attachment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thumbnails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small: Option<Thumbnail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large: Option<Thumbnail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full: Option<Thumbnail>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

// ============================================================================
// Envelopes
// ============================================================================

/// List endpoint response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordList {
    #[serde(default)]
    pub records: Vec<JsonObject>,
    /// Cursor for the next page
    #[serde(default)]
    pub offset: Option<String>,
}

/// Delete endpoint response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Deleted {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}

// ============================================================================
// Weakly Typed Record
// ============================================================================

/// A record whose fields stay as raw JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub fields: JsonObject,
}

impl RecordItem {
    /// New record with the given fields
    pub fn with_fields(fields: JsonObject) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }
}

impl Entity for RecordItem {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: Lazy<Schema<RecordItem>> = Lazy::new(|| {
            Schema::builder()
                .id(|r: &RecordItem| &r.id, |r, v| r.id = v)
                .created_time(|r: &RecordItem| &r.created_time, |r, v| r.created_time = v)
                .extras(|r: &RecordItem| &r.fields, |r| &mut r.fields)
                .build()
        });
        &SCHEMA
    }
}
