//! Record mapping engine
//!
//! Converts between the semi-structured wire record
//! (`{"id", "createdTime", "fields": {...}}`) and typed values.
//!
//! # Overview
//!
//! - [`Schema`] is an explicit, per-type mapping table built once.
//! - [`ConverterRegistry`] coerces JSON into typed values and back.
//! - [`FieldMapper`] walks records and write payloads using both.

mod convert;
mod mapper;
mod schema;
mod types;

pub use convert::{
    AttachmentsConverter, BooleanConverter, Converter, ConverterRegistry, DateConverter,
    DateTimeConverter, IntegerConverter, JsonConverter, NumberConverter, TextConverter,
    ThumbnailsConverter, DATE_FORMAT, DATE_TIME_FORMAT,
};
pub use mapper::FieldMapper;
pub use schema::{derive_property_name, Entity, FieldDescriptor, FieldType, Schema, SchemaBuilder};
pub use types::{
    Attachment, Deleted, FieldKind, FieldValue, RecordItem, RecordList, Thumbnail, Thumbnails,
    WriteMode, CREATED_TIME_PROPERTY, FIELDS_KEY, ID_PROPERTY,
};
