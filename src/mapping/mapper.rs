//! Record-to-object mapping
//!
//! [`FieldMapper`] converts raw records into [`Entity`] values and builds
//! the `{"fields": {...}}` payloads for writes. Unknown keys never fail a
//! conversion; they are logged and skipped (or kept, for schemas with an
//! extras sink).

use super::convert::ConverterRegistry;
use super::schema::{Entity, Schema};
use super::types::{FieldKind, FieldValue, WriteMode, FIELDS_KEY};
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use std::any::type_name;
use tracing::{debug, warn};

/// Bidirectional converter between wire records and typed values
#[derive(Debug, Clone, Default)]
pub struct FieldMapper {
    converters: ConverterRegistry,
}

impl FieldMapper {
    /// Create a mapper using the given converters
    pub fn new(converters: ConverterRegistry) -> Self {
        Self { converters }
    }

    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    /// Convert a raw record into a fresh `T`
    ///
    /// Top-level keys (`id`, `createdTime`) are assigned directly; the
    /// nested `fields` map is walked key by key.
    pub fn to_object<T: Entity>(&self, record: &JsonObject) -> Result<T> {
        let schema = T::schema();
        let mut target = T::default();

        for (key, value) in record {
            if key == FIELDS_KEY {
                match value {
                    JsonValue::Object(fields) => {
                        for (field, field_value) in fields {
                            self.assign(schema, &mut target, field, field_value, true)?;
                        }
                    }
                    JsonValue::Null => {}
                    other => {
                        return Err(Error::mapping(format!(
                            "expected an object under '{FIELDS_KEY}', got {other}"
                        )))
                    }
                }
            } else {
                self.assign(schema, &mut target, key, value, false)?;
            }
        }

        Ok(target)
    }

    fn assign<T: Entity>(
        &self,
        schema: &Schema<T>,
        target: &mut T,
        key: &str,
        value: &JsonValue,
        in_fields: bool,
    ) -> Result<()> {
        let property = schema.resolve_property(key);

        // Inside `fields`, a column named like `id` is user data
        let descriptor = schema
            .descriptor(&property)
            .filter(|d| !(in_fields && d.is_protected()));
        let Some(descriptor) = descriptor else {
            if in_fields {
                if let Some(extras) = schema.extras_mut(target) {
                    extras.insert(key.to_string(), value.clone());
                    return Ok(());
                }
            }
            if key.contains(' ') || key.contains('-') {
                warn!("Add an alias for columns with special characters: [{key}]");
            }
            warn!(
                "{} does not support property [{property}]",
                type_name::<T>()
            );
            return Ok(());
        };

        if value.is_null() && !descriptor.nullable() {
            debug!("Skipping null for non-optional property [{property}]");
            return Ok(());
        }

        self.converters
            .decode(descriptor.kind(), value)
            .and_then(|v| descriptor.set(target, v))
            .map_err(|e| Error::mapping_with(format!("cannot map field [{key}] to [{property}]"), e))
    }

    /// Build the `{"fields": {...}}` body for a create or update
    ///
    /// Create rejects items carrying server-assigned values. Update leaves
    /// `id`/`createdTime` out of the body and sends nulls explicitly.
    pub fn to_write_payload<T: Entity>(&self, item: &T, mode: WriteMode) -> Result<JsonObject> {
        let schema = T::schema();
        if mode == WriteMode::Create {
            check_create(schema, item)?;
        }

        let mut fields = JsonObject::new();
        for descriptor in schema.fields() {
            if descriptor.is_protected() {
                continue;
            }
            let value = descriptor.get(item);
            if value.is_null() && mode == WriteMode::Create {
                continue;
            }
            let encoded = self
                .converters
                .encode(descriptor.kind(), &value)
                .map_err(|e| {
                    Error::mapping_with(
                        format!("cannot serialize property [{}]", descriptor.property()),
                        e,
                    )
                })?;
            fields.insert(descriptor.wire_name().to_string(), encoded);
        }

        if let Some(extras) = schema.extras(item) {
            for (key, value) in extras {
                if value.is_null() && mode == WriteMode::Create {
                    continue;
                }
                fields
                    .entry(key.clone())
                    .or_insert_with(|| value.clone());
            }
        }

        let mut payload = JsonObject::new();
        payload.insert(FIELDS_KEY.to_string(), JsonValue::Object(fields));
        Ok(payload)
    }

    /// Record id of an item, required for update
    pub fn record_id<T: Entity>(&self, item: &T) -> Option<String> {
        T::schema().record_id(item)
    }
}

/// Protected and server-assigned attachment values must be unset on create
fn check_create<T>(schema: &Schema<T>, item: &T) -> Result<()> {
    for descriptor in schema.fields() {
        if descriptor.is_protected() {
            if !descriptor.get(item).is_null() {
                return Err(Error::validation(format!(
                    "Property {} should be null!",
                    descriptor.property()
                )));
            }
        } else if descriptor.kind() == FieldKind::Attachments {
            if let FieldValue::Attachments(attachments) = descriptor.get(item) {
                for attachment in &attachments {
                    if let Some(name) = attachment.server_assigned().first() {
                        return Err(Error::validation(format!(
                            "Property {name} should be null!"
                        )));
                    }
                }
            }
        }
    }
    Ok(())
}
