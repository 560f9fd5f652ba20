//! In-memory list processing: free-text filter, stable sort and page slicing.
//!
//! The crate knows nothing about the records it processes. Callers describe
//! their records through [`Sortable`] and [`Searchable`] and hand a
//! [`ListQuery`] to [`paginate`].

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

mod filter;
mod order;
mod page;

pub use filter::filter_text;
pub use order::stable_sort;
pub use page::page_slice;

/// Default 1-based page number.
pub const DEFAULT_PAGE_NUMBER: u32 = 1;
/// Default page size.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Default sort field.
pub const DEFAULT_SORT_BY: &str = "firstName";

#[cfg_attr(feature = "with-utoipa", derive(utoipa::ToSchema))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid sort direction '{0}', expected 'asc' or 'desc'")]
pub struct InvalidSortDir(pub String);

impl FromStr for SortDir {
    type Err = InvalidSortDir;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDir::Asc),
            "desc" => Ok(SortDir::Desc),
            other => Err(InvalidSortDir(other.to_string())),
        }
    }
}

/// Parameters of a single listing request.
///
/// `page_number` is 1-based. Range checks on the numbers and on `sort_by`
/// belong to the caller; this crate never rejects a query.
#[cfg_attr(feature = "with-utoipa", derive(utoipa::ToSchema))]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page_number: u32,
    pub page_size: u32,
    pub sort_by: String,
    pub sort_order: SortDir,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: DEFAULT_SORT_BY.to_string(),
            sort_order: SortDir::Asc,
            search: None,
        }
    }
}

/// A comparable projection of one record field.
///
/// Variant order is significant: `Missing < Int < Text`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey<'a> {
    Missing,
    Int(i64),
    Text(Cow<'a, str>),
}

impl<'a> From<&'a str> for SortKey<'a> {
    fn from(s: &'a str) -> Self {
        SortKey::Text(Cow::Borrowed(s))
    }
}

impl From<i64> for SortKey<'_> {
    fn from(n: i64) -> Self {
        SortKey::Int(n)
    }
}

/// Records that can be ordered by a named field.
pub trait Sortable {
    /// Project `field` of this record. Unknown fields return [`SortKey::Missing`].
    fn sort_key(&self, field: &str) -> SortKey<'_>;
}

/// Records that take part in free-text search.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

/// Filter, sort and slice `items` according to `query`.
pub fn paginate<T>(items: Vec<T>, query: &ListQuery) -> Vec<T>
where
    T: Sortable + Searchable,
{
    let filtered = match query.search.as_deref() {
        Some(needle) => filter_text(items, needle),
        None => items,
    };
    let sorted = stable_sort(filtered, &query.sort_by, query.sort_order);
    page_slice(sorted, query.page_number, query.page_size)
}
