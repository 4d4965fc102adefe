//! Typed table handle
//!
//! A [`Table<T>`] is a thin typed view over a shared [`TableCore`], which
//! owns the request builder for `{endpoint}/{baseId}/{tableName}` plus the
//! transport and mapper. The core is what the base caches, so handles for
//! different row types over the same table name share it.

use crate::classify::ApiError;
use crate::error::{Error, Result};
use crate::http::Transport;
use crate::mapping::{Deleted, Entity, FieldMapper, RecordList, WriteMode};
use crate::query::Query;
use crate::request::{ApiRequest, RequestBuilder};
use crate::types::JsonObject;
use futures::stream::{self, TryStreamExt};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Untyped state of one remote table
pub(crate) struct TableCore {
    name: String,
    requests: RequestBuilder,
    transport: Arc<dyn Transport>,
    mapper: Arc<FieldMapper>,
}

impl TableCore {
    pub(crate) fn new(
        endpoint_url: &str,
        base_id: &str,
        name: &str,
        transport: Arc<dyn Transport>,
        mapper: Arc<FieldMapper>,
    ) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            requests: RequestBuilder::new(endpoint_url, base_id, name)?,
            transport,
            mapper,
        })
    }

    /// Send a request and decode a successful body
    async fn execute<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R> {
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(ApiError::from_status(response.status, &response.body).into());
        }
        serde_json::from_str(&response.body).map_err(|e| {
            Error::mapping_with(format!("unexpected response body from table [{}]", self.name), e)
        })
    }
}

impl std::fmt::Debug for TableCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableCore")
            .field("name", &self.name)
            .field("url", &self.requests.table_url())
            .finish_non_exhaustive()
    }
}

/// Operations on one table, with rows converted to `T`
pub struct Table<T> {
    core: Arc<TableCore>,
    _row: PhantomData<fn() -> T>,
}

impl<T> Table<T> {
    pub(crate) fn from_core(core: Arc<TableCore>) -> Self {
        Self {
            core,
            _row: PhantomData,
        }
    }

    /// Table name as given to the base
    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// Resolved table endpoint
    pub fn url(&self) -> &str {
        self.core.requests.table_url()
    }

    /// Whether both handles use the same cached table
    pub fn same_table<U>(&self, other: &Table<U>) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }
}

impl<T: Entity> Table<T> {
    /// List records matching `query`
    ///
    /// Pages are fetched one after another until the response carries no
    /// `offset`. Records keep server order. Any failure aborts the call, as
    /// does an offset the server already handed out.
    pub async fn select(&self, query: &Query) -> Result<Vec<T>> {
        let core = &*self.core;
        // `None` ends the stream; the first page starts without an offset
        let start: Option<(Option<String>, HashSet<String>)> = Some((None, HashSet::new()));
        let pages: Vec<RecordList> = stream::try_unfold(start, move |cursor| async move {
            let Some((offset, mut seen)) = cursor else {
                return Ok(None);
            };
            let request = core.requests.select_page(query, offset.as_deref());
            let page: RecordList = core.execute(request).await?;
            debug!(
                "Received {} records from table [{}]",
                page.records.len(),
                core.name
            );
            let next = match page.offset.clone() {
                Some(next) if !seen.insert(next.clone()) => {
                    return Err(Error::mapping(format!(
                        "offset [{next}] repeated while listing table [{}]",
                        core.name
                    )));
                }
                Some(next) => Some((Some(next), seen)),
                None => None,
            };
            Ok::<_, Error>(Some((page, next)))
        })
        .try_collect()
        .await?;

        pages
            .iter()
            .flat_map(|page| &page.records)
            .map(|record| core.mapper.to_object(record))
            .collect()
    }

    /// List every record of the default view
    pub async fn select_all(&self) -> Result<Vec<T>> {
        self.select(&Query::default()).await
    }

    /// Fetch one record by id
    pub async fn find(&self, id: &str) -> Result<T> {
        let id = require_id(id, "find")?;
        let record: JsonObject = self.core.execute(self.core.requests.find(id)).await?;
        self.core.mapper.to_object(&record)
    }

    /// Create a record; `id` and `createdTime` must be unset
    pub async fn create(&self, item: &T) -> Result<T> {
        let payload = self.core.mapper.to_write_payload(item, WriteMode::Create)?;
        let record: JsonObject = self
            .core
            .execute(self.core.requests.create(payload))
            .await?;
        self.core.mapper.to_object(&record)
    }

    /// Patch the record identified by the item's `id`
    ///
    /// Unset optional properties clear the remote value.
    pub async fn update(&self, item: &T) -> Result<T> {
        let id = self
            .core
            .mapper
            .record_id(item)
            .ok_or_else(|| Error::validation("Property id is required for update"))?;
        let id = require_id(&id, "update")?;
        let payload = self.core.mapper.to_write_payload(item, WriteMode::Update)?;
        let record: JsonObject = self
            .core
            .execute(self.core.requests.update(id, payload))
            .await?;
        self.core.mapper.to_object(&record)
    }

    /// Delete a record, returning the server's `deleted` flag
    pub async fn destroy(&self, id: &str) -> Result<bool> {
        let id = require_id(id, "destroy")?;
        let deleted: Deleted = self.core.execute(self.core.requests.destroy(id)).await?;
        Ok(deleted.deleted)
    }

    /// Full replacement of a record (not supported)
    pub async fn replace(&self, _item: &T) -> Result<T> {
        Err(Error::NotImplemented {
            operation: "replace",
        })
    }
}

/// A blank id would address the table collection instead of one record
fn require_id<'a>(id: &'a str, operation: &str) -> Result<&'a str> {
    if id.trim().is_empty() {
        return Err(Error::validation(format!(
            "Property id is required for {operation}"
        )));
    }
    Ok(id)
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self::from_core(Arc::clone(&self.core))
    }
}

impl<T> std::fmt::Debug for Table<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("core", &self.core)
            .field("row", &std::any::type_name::<T>())
            .finish()
    }
}
