//! Per-type field descriptors
//!
//! A [`Schema`] is the explicit mapping table for one target type: for each
//! property it records the wire alias, the coercion kind, an accessor and a
//! mutator. Schemas are built once per type (usually in a `Lazy` static)
//! and shared by every mapper call.
//!
//! ```rust,ignore
//! impl Entity for Task {
//!     fn schema() -> &'static Schema<Self> {
//!         static SCHEMA: Lazy<Schema<Task>> = Lazy::new(|| {
//!             Schema::builder()
//!                 .id(|t: &Task| &t.id, |t, v| t.id = v)
//!                 .renamed("title", "Name", |t: &Task| &t.title, |t, v| t.title = v)
//!                 .field("done", |t: &Task| &t.done, |t, v| t.done = v)
//!                 .build()
//!         });
//!         &SCHEMA
//!     }
//! }
//! ```

use super::types::{
    Attachment, FieldKind, FieldValue, Thumbnails, CREATED_TIME_PROPERTY, ID_PROPERTY,
};
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use chrono::{DateTime, NaiveDate, Utc};

// ============================================================================
// Entity
// ============================================================================

/// A type that can be converted from and to the wire record shape
///
/// The mapper starts from `Self::default()` for every record, so properties
/// absent from a response keep their default value.
pub trait Entity: Default + Send + Sync + 'static {
    /// The mapping table for this type
    fn schema() -> &'static Schema<Self>;
}

// ============================================================================
// Field Types
// ============================================================================

/// A Rust type usable as a mapped property
pub trait FieldType: Sized {
    /// Converter used for this type
    const KIND: FieldKind;

    /// Whether a JSON `null` can be stored
    const NULLABLE: bool = false;

    fn from_field_value(value: FieldValue) -> Result<Self>;

    fn to_field_value(&self) -> FieldValue;
}

fn mismatch(expected: FieldKind, got: &FieldValue) -> Error {
    Error::mapping(format!("expected {expected:?} value, got {got:?}"))
}

macro_rules! field_type {
    ($ty:ty, $kind:ident) => {
        impl FieldType for $ty {
            const KIND: FieldKind = FieldKind::$kind;

            fn from_field_value(value: FieldValue) -> Result<Self> {
                match value {
                    FieldValue::$kind(v) => Ok(v),
                    other => Err(mismatch(Self::KIND, &other)),
                }
            }

            fn to_field_value(&self) -> FieldValue {
                FieldValue::$kind(self.clone())
            }
        }
    };
}

field_type!(String, Text);
field_type!(f64, Number);
field_type!(i64, Integer);
field_type!(bool, Boolean);
field_type!(DateTime<Utc>, DateTime);
field_type!(NaiveDate, Date);
field_type!(Vec<Attachment>, Attachments);
field_type!(Thumbnails, Thumbnails);

impl FieldType for JsonValue {
    const KIND: FieldKind = FieldKind::Json;
    const NULLABLE: bool = true;

    fn from_field_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Json(v) => Ok(v),
            FieldValue::Null => Ok(JsonValue::Null),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }

    fn to_field_value(&self) -> FieldValue {
        match self {
            JsonValue::Null => FieldValue::Null,
            v => FieldValue::Json(v.clone()),
        }
    }
}

impl<V: FieldType> FieldType for Option<V> {
    const KIND: FieldKind = V::KIND;
    const NULLABLE: bool = true;

    fn from_field_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Null => Ok(None),
            v => V::from_field_value(v).map(Some),
        }
    }

    fn to_field_value(&self) -> FieldValue {
        match self {
            Some(v) => v.to_field_value(),
            None => FieldValue::Null,
        }
    }
}

// ============================================================================
// Descriptors
// ============================================================================

type Getter<T> = Box<dyn Fn(&T) -> FieldValue + Send + Sync>;
type Setter<T> = Box<dyn Fn(&mut T, FieldValue) -> Result<()> + Send + Sync>;

/// Mapping entry for one property
pub struct FieldDescriptor<T> {
    property: &'static str,
    alias: Option<&'static str>,
    kind: FieldKind,
    nullable: bool,
    protected: bool,
    get: Getter<T>,
    set: Setter<T>,
}

impl<T: 'static> FieldDescriptor<T> {
    fn new<V: FieldType + 'static>(
        property: &'static str,
        alias: Option<&'static str>,
        protected: bool,
        get: fn(&T) -> &V,
        set: fn(&mut T, V),
    ) -> Self {
        Self {
            property,
            alias,
            kind: V::KIND,
            nullable: V::NULLABLE,
            protected,
            get: Box::new(move |target: &T| get(target).to_field_value()),
            set: Box::new(move |target: &mut T, value: FieldValue| {
                set(target, V::from_field_value(value)?);
                Ok(())
            }),
        }
    }
}

impl<T> FieldDescriptor<T> {
    /// Rust-side property name
    pub fn property(&self) -> &'static str {
        self.property
    }

    /// Explicit wire name override
    pub fn alias(&self) -> Option<&'static str> {
        self.alias
    }

    /// Name written to the `fields` map
    pub fn wire_name(&self) -> &'static str {
        self.alias.unwrap_or(self.property)
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    /// Server-assigned (`id`, `createdTime`)
    pub fn is_protected(&self) -> bool {
        self.protected
    }

    pub fn get(&self, target: &T) -> FieldValue {
        (self.get)(target)
    }

    pub fn set(&self, target: &mut T, value: FieldValue) -> Result<()> {
        (self.set)(target, value)
    }
}

impl<T> std::fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("property", &self.property)
            .field("alias", &self.alias)
            .field("kind", &self.kind)
            .field("protected", &self.protected)
            .finish_non_exhaustive()
    }
}

struct Extras<T> {
    get: fn(&T) -> &JsonObject,
    get_mut: fn(&mut T) -> &mut JsonObject,
}

// ============================================================================
// Schema
// ============================================================================

/// Mapping table for one target type
pub struct Schema<T> {
    fields: Vec<FieldDescriptor<T>>,
    extras: Option<Extras<T>>,
}

impl<T: 'static> Schema<T> {
    /// Create a new schema builder
    pub fn builder() -> SchemaBuilder<T> {
        SchemaBuilder {
            schema: Schema {
                fields: Vec::new(),
                extras: None,
            },
        }
    }
}

impl<T> Schema<T> {
    pub fn fields(&self) -> &[FieldDescriptor<T>] {
        &self.fields
    }

    /// Descriptor by exact property name
    pub fn descriptor(&self, property: &str) -> Option<&FieldDescriptor<T>> {
        self.fields.iter().find(|d| d.property == property)
    }

    /// Property name a raw wire key binds to
    ///
    /// An alias equal to the trimmed key under Unicode case folding wins.
    /// Otherwise the key is trimmed and its first character lower-cased.
    pub fn resolve_property(&self, raw_key: &str) -> String {
        let folded = raw_key.trim().to_lowercase();
        self.fields
            .iter()
            .find(|d| d.alias.is_some_and(|alias| alias.to_lowercase() == folded))
            .map_or_else(
                || derive_property_name(raw_key),
                |d| d.property.to_string(),
            )
    }

    /// Current record id of an item
    pub fn record_id(&self, target: &T) -> Option<String> {
        match self.descriptor(ID_PROPERTY)?.get(target) {
            FieldValue::Text(id) => Some(id),
            _ => None,
        }
    }

    /// Whether unknown field keys are kept instead of dropped
    pub fn has_extras(&self) -> bool {
        self.extras.is_some()
    }

    pub fn extras<'a>(&self, target: &'a T) -> Option<&'a JsonObject> {
        self.extras.as_ref().map(|e| (e.get)(target))
    }

    pub fn extras_mut<'a>(&self, target: &'a mut T) -> Option<&'a mut JsonObject> {
        self.extras.as_ref().map(|e| (e.get_mut)(target))
    }
}

impl<T> std::fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("fields", &self.fields)
            .field("has_extras", &self.extras.is_some())
            .finish()
    }
}

/// Builder for [`Schema`]
pub struct SchemaBuilder<T> {
    schema: Schema<T>,
}

impl<T: 'static> SchemaBuilder<T> {
    /// Map a property whose wire name is the property name
    #[must_use]
    pub fn field<V: FieldType + 'static>(
        self,
        property: &'static str,
        get: fn(&T) -> &V,
        set: fn(&mut T, V),
    ) -> Self {
        self.push(FieldDescriptor::new(property, None, false, get, set))
    }

    /// Map a property under an explicit wire name
    #[must_use]
    pub fn renamed<V: FieldType + 'static>(
        self,
        property: &'static str,
        wire_name: &'static str,
        get: fn(&T) -> &V,
        set: fn(&mut T, V),
    ) -> Self {
        self.push(FieldDescriptor::new(property, Some(wire_name), false, get, set))
    }

    /// Map the top-level record id
    #[must_use]
    pub fn id(self, get: fn(&T) -> &Option<String>, set: fn(&mut T, Option<String>)) -> Self {
        self.push(FieldDescriptor::new(ID_PROPERTY, None, true, get, set))
    }

    /// Map the top-level creation timestamp
    #[must_use]
    pub fn created_time(
        self,
        get: fn(&T) -> &Option<DateTime<Utc>>,
        set: fn(&mut T, Option<DateTime<Utc>>),
    ) -> Self {
        self.push(FieldDescriptor::new(
            CREATED_TIME_PROPERTY,
            None,
            true,
            get,
            set,
        ))
    }

    /// Keep unmatched field keys in a raw JSON map
    #[must_use]
    pub fn extras(
        mut self,
        get: fn(&T) -> &JsonObject,
        get_mut: fn(&mut T) -> &mut JsonObject,
    ) -> Self {
        self.schema.extras = Some(Extras { get, get_mut });
        self
    }

    fn push(mut self, descriptor: FieldDescriptor<T>) -> Self {
        debug_assert!(
            self.schema.descriptor(descriptor.property).is_none(),
            "duplicate property {}",
            descriptor.property
        );
        self.schema.fields.push(descriptor);
        self
    }

    pub fn build(self) -> Schema<T> {
        self.schema
    }
}

/// Trim and lower-case the first character (`"Text"` becomes `"text"`)
pub fn derive_property_name(key: &str) -> String {
    let mut chars = key.trim().chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
