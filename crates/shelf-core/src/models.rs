//! Data models for Shelf
//!
//! Defines the book record loaded from the catalog file. Books are
//! immutable once loaded; the catalog replaces them wholesale on reload.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// Accent color used when a book doesn't declare one
pub const DEFAULT_COLOR: &str = "#6C5CE7";

/// Stable book identifier
///
/// Catalog files use either strings or integers for ids; both are
/// normalized to their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    /// Create an id from anything string-like
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl<'de> Deserialize<'de> for BookId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Int(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => BookId(s),
            RawId::Int(n) => BookId(n.to_string()),
        })
    }
}

/// A book in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Unique identifier
    pub id: BookId,
    /// Display title
    pub title: String,
    /// Author name
    #[serde(default)]
    pub author: String,
    /// Category used by the badge filter
    #[serde(default)]
    pub category: String,
    /// Year read (or published); derived from `date` when absent
    #[serde(default)]
    pub year: Option<i32>,
    /// Full ISO date (`YYYY-MM-DD`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Accent color (CSS hex)
    #[serde(default = "default_color")]
    pub color: String,
    /// Cover image reference
    #[serde(default, deserialize_with = "non_empty")]
    pub cover: Option<String>,
    /// Personal notes
    #[serde(default, deserialize_with = "non_empty")]
    pub notes: Option<String>,
    /// Short summary
    #[serde(default, deserialize_with = "non_empty")]
    pub summary: Option<String>,
    /// Favorite quotes
    #[serde(default)]
    pub quotes: Vec<String>,
    /// Generic external link
    #[serde(default, deserialize_with = "non_empty")]
    pub link: Option<String>,
    /// Goodreads page
    #[serde(default, deserialize_with = "non_empty")]
    pub goodreads_link: Option<String>,
    /// Amazon page
    #[serde(default, deserialize_with = "non_empty")]
    pub amazon_link: Option<String>,
}

impl Book {
    /// Create a book with the given id and title
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: BookId::new(id),
            title: title.into(),
            author: String::new(),
            category: String::new(),
            year: None,
            date: None,
            color: default_color(),
            cover: None,
            notes: None,
            summary: None,
            quotes: Vec::new(),
            link: None,
            goodreads_link: None,
            amazon_link: None,
        }
    }

    /// Builder-style author setter
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Builder-style category setter
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Builder-style year setter
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Effective year: explicit `year`, else the year of `date`
    pub fn year(&self) -> Option<i32> {
        self.year.or_else(|| {
            self.date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
                .map(|d| d.year())
        })
    }

    /// Whether the book declares a cover image
    pub fn has_cover(&self) -> bool {
        self.cover.is_some()
    }

    /// External links as `(label, url)` pairs, in display order
    pub fn external_links(&self) -> Vec<(&'static str, &str)> {
        let mut links = Vec::new();
        if let Some(url) = &self.link {
            links.push(("View Book", url.as_str()));
        }
        if let Some(url) = &self.goodreads_link {
            links.push(("View on Goodreads", url.as_str()));
        }
        if let Some(url) = &self.amazon_link {
            links.push(("View on Amazon", url.as_str()));
        }
        links
    }
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// Deserialize an optional string, mapping `""` to `None`
fn non_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
