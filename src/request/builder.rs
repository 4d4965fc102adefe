//! Per-table request construction
//!
//! `RequestBuilder` holds the resolved table endpoint
//! (`{endpoint}/{baseId}/{tableName}`) and produces one [`ApiRequest`] per
//! operation. Path segments are percent-encoded, so table names with spaces
//! work as-is.

use crate::error::Result;
use crate::query::Query;
use crate::types::{JsonObject, JsonValue, Method};
use url::Url;

/// An HTTP request described as plain data
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Absolute URL without query string
    pub url: String,
    /// Query pairs in emission order; keys may repeat
    pub query: Vec<(String, String)>,
    /// JSON body for writes
    pub body: Option<JsonValue>,
}

impl ApiRequest {
    fn new(method: Method, url: String) -> Self {
        Self {
            method,
            url,
            query: Vec::new(),
            body: None,
        }
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// First value of a query parameter
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Builds requests for one table
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    table_url: Url,
}

impl RequestBuilder {
    /// Resolve the table endpoint
    pub fn new(endpoint_url: &str, base_id: &str, table_name: &str) -> Result<Self> {
        let mut table_url = Url::parse(endpoint_url)?;
        table_url.set_query(None);
        table_url
            .path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(base_id)
            .push(table_name);
        Ok(Self { table_url })
    }

    /// `{endpoint}/{baseId}/{tableName}`
    pub fn table_url(&self) -> &str {
        self.table_url.as_str()
    }

    fn record_url(&self, id: &str) -> String {
        let mut url = self.table_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(id);
        }
        url.into()
    }

    /// GET list request
    pub fn select(&self, query: &Query) -> ApiRequest {
        let mut request = ApiRequest::new(Method::GET, self.table_url.to_string());

        for field in &query.fields {
            request = request.query("fields[]", field.as_str());
        }
        if let Some(max_records) = query.max_records {
            request = request.query("maxRecords", max_records.to_string());
        }
        if let Some(view) = &query.view {
            request = request.query("view", view.as_str());
        }
        if let Some(formula) = &query.filter_by_formula {
            request = request.query("filterByFormula", formula.as_str());
        }
        if let Some(page_size) = query.effective_page_size() {
            request = request.query("pageSize", page_size.to_string());
        }
        for (i, sort) in query.sort.iter().enumerate() {
            request = request
                .query(format!("sort[{i}][field]"), sort.field.as_str())
                .query(format!("sort[{i}][direction]"), sort.direction.as_str());
        }

        request
    }

    /// GET list request continuing from a pagination cursor
    pub fn select_page(&self, query: &Query, offset: Option<&str>) -> ApiRequest {
        let request = self.select(query);
        match offset {
            Some(offset) => request.query("offset", offset),
            None => request,
        }
    }

    /// GET single record
    pub fn find(&self, id: &str) -> ApiRequest {
        ApiRequest::new(Method::GET, self.record_url(id))
    }

    /// POST a new record
    pub fn create(&self, payload: JsonObject) -> ApiRequest {
        ApiRequest::new(Method::POST, self.table_url.to_string()).json(JsonValue::Object(payload))
    }

    /// PATCH an existing record
    pub fn update(&self, id: &str, payload: JsonObject) -> ApiRequest {
        ApiRequest::new(Method::PATCH, self.record_url(id)).json(JsonValue::Object(payload))
    }

    /// DELETE a record
    pub fn destroy(&self, id: &str) -> ApiRequest {
        ApiRequest::new(Method::DELETE, self.record_url(id))
    }
}
