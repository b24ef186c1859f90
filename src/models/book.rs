//! Book record model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Full book record as stored on the shelf
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    pub page_count: u32,
    pub read_page: u32,
    /// Set once on creation from `read_page == page_count`
    pub finished: bool,
    pub reading: bool,
    pub inserted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create / update request body
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    /// Required on both create and update
    pub name: Option<String>,
    pub year: Option<i32>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub read_page: u32,
    #[serde(default)]
    pub reading: bool,
}

impl BookPayload {
    /// Returns the name when it is present and not blank
    pub fn valid_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.trim().is_empty())
    }

    pub fn read_page_exceeds_page_count(&self) -> bool {
        self.read_page > self.page_count
    }
}

/// Short book representation for lists
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BookSummary {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            name: book.name.clone(),
            publisher: book.publisher.clone(),
        }
    }
}

/// Query string accepted by the list endpoint
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Case-insensitive exact name match
    pub name: Option<String>,
    /// `1` for books being read, `0` for the others
    pub reading: Option<String>,
    /// `1` for finished books, `0` for the others
    pub finished: Option<String>,
}

/// Filter resolved from a [`BookQuery`].
///
/// Only one filter applies at a time: `name` wins over `reading`, which wins over
/// `finished`. Flags other than `"1"` and `"0"` are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookFilter {
    All,
    /// Case-insensitive exact match on the whole name, applied as a filter on the
    /// returned set. Substring matching is deliberately not used, and the name is
    /// never reduced to a per-book boolean list.
    Name(String),
    Reading(bool),
    Finished(bool),
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        match self {
            BookFilter::All => true,
            BookFilter::Name(name) => book.name.to_uppercase() == name.to_uppercase(),
            BookFilter::Reading(reading) => book.reading == *reading,
            BookFilter::Finished(finished) => book.finished == *finished,
        }
    }
}

fn parse_flag(value: Option<&str>) -> Option<bool> {
    match value {
        Some("1") => Some(true),
        Some("0") => Some(false),
        _ => None,
    }
}

impl From<&BookQuery> for BookFilter {
    fn from(query: &BookQuery) -> Self {
        if let Some(name) = &query.name {
            return BookFilter::Name(name.clone());
        }
        if let Some(reading) = parse_flag(query.reading.as_deref()) {
            return BookFilter::Reading(reading);
        }
        if let Some(finished) = parse_flag(query.finished.as_deref()) {
            return BookFilter::Finished(finished);
        }
        BookFilter::All
    }
}
