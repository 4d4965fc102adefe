//! A named Airtable base and its table cache

use super::table::{Table, TableCore};
use crate::error::{Error, Result};
use crate::http::Transport;
use crate::mapping::{Entity, FieldMapper, RecordItem};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// A remote workspace containing tables
///
/// Tables are created on first use and memoized by name. Asking again for
/// the same name, with any row type, reuses the cached table.
pub struct Base {
    id: String,
    endpoint_url: String,
    transport: Arc<dyn Transport>,
    mapper: Arc<FieldMapper>,
    tables: RwLock<HashMap<String, Arc<TableCore>>>,
}

impl Base {
    pub(crate) fn new(
        id: impl Into<String>,
        endpoint_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        mapper: Arc<FieldMapper>,
    ) -> Self {
        Self {
            id: id.into(),
            endpoint_url: endpoint_url.into(),
            transport,
            mapper,
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Base id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Table with rows converted to `T`
    pub fn table<T: Entity>(&self, name: &str) -> Result<Table<T>> {
        if name.trim().is_empty() {
            return Err(Error::config("table name was empty"));
        }

        if let Some(core) = self
            .tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return Ok(Table::from_core(Arc::clone(core)));
        }

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let core = match tables.entry(name.to_string()) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                debug!("Create new instance for table [{name}]");
                let core = TableCore::new(
                    &self.endpoint_url,
                    &self.id,
                    name,
                    Arc::clone(&self.transport),
                    Arc::clone(&self.mapper),
                )?;
                Arc::clone(entry.insert(Arc::new(core)))
            }
        };
        Ok(Table::from_core(core))
    }

    /// Table with weakly typed rows
    pub fn records(&self, name: &str) -> Result<Table<RecordItem>> {
        self.table(name)
    }

    /// Names of the tables created so far
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for Base {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Base")
            .field("id", &self.id)
            .field("endpoint_url", &self.endpoint_url)
            .field("tables", &self.table_names())
            .finish_non_exhaustive()
    }
}
