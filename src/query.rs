//! List query parameters
//!
//! A [`Query`] describes what a `select` should return. Every field is
//! optional; absent values emit no query parameter at all.

use serde::{Deserialize, Serialize};

/// Largest page size the service accepts
pub const MAX_PAGE_SIZE: u32 = 100;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Wire value (`asc` / `desc`)
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction: {other}")),
        }
    }
}

/// One sort key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

/// Parameters for a list query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// Field names to return; order is irrelevant
    #[serde(default)]
    pub fields: Vec<String>,
    /// Upper bound on returned records, passed through unclamped
    pub max_records: Option<u32>,
    /// View name or id
    pub view: Option<String>,
    /// Airtable formula, passed through verbatim
    pub filter_by_formula: Option<String>,
    /// Sort keys in priority order
    #[serde(default)]
    pub sort: Vec<Sort>,
    /// Records per page, clamped to [`MAX_PAGE_SIZE`] on the wire
    pub page_size: Option<u32>,
}

impl Query {
    /// Create an empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// Query limited to `max_records`
    pub fn with_max_records(max_records: u32) -> Self {
        Self::new().max_records(max_records)
    }

    /// Query of a named view
    pub fn with_view(view: impl Into<String>) -> Self {
        Self::new().view(view)
    }

    /// Query of a named view filtered by a formula
    pub fn with_view_and_formula(view: impl Into<String>, formula: impl Into<String>) -> Self {
        Self::new().view(view).filter_by_formula(formula)
    }

    /// Query sorted by a single key
    pub fn with_sort(sort: Sort) -> Self {
        Self::new().sort(sort)
    }

    /// Query returning only the given fields
    pub fn with_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Add a field to return
    #[must_use]
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }

    /// Set max records
    #[must_use]
    pub fn max_records(mut self, max_records: u32) -> Self {
        self.max_records = Some(max_records);
        self
    }

    /// Set the view
    #[must_use]
    pub fn view(mut self, view: impl Into<String>) -> Self {
        self.view = Some(view.into());
        self
    }

    /// Set the filter formula
    #[must_use]
    pub fn filter_by_formula(mut self, formula: impl Into<String>) -> Self {
        self.filter_by_formula = Some(formula.into());
        self
    }

    /// Append a sort key
    #[must_use]
    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort.push(sort);
        self
    }

    /// Set the page size
    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Page size as sent on the wire
    pub fn effective_page_size(&self) -> Option<u32> {
        self.page_size.map(|size| size.min(MAX_PAGE_SIZE))
    }
}
