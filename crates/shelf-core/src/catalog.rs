//! Book catalog
//!
//! Loads the book list from a JSON file and serves the derived views the
//! UI needs: category and year lists, and filtered/sorted book lists.
//!
//! ## File format
//!
//! ```text
//! { "books": [ { "id": 1, "title": "Dune", "author": "Frank Herbert", ... } ] }
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Book, BookId};

/// Sort order for the book list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Most recent year first
    #[default]
    Recent,
    /// Oldest year first
    Oldest,
    /// Title A-Z
    Title,
    /// Author A-Z
    Author,
}

impl SortOrder {
    /// Cycle to the next sort order (wrapping)
    pub fn next(self) -> Self {
        match self {
            SortOrder::Recent => SortOrder::Oldest,
            SortOrder::Oldest => SortOrder::Title,
            SortOrder::Title => SortOrder::Author,
            SortOrder::Author => SortOrder::Recent,
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Recent => "Most Recent",
            SortOrder::Oldest => "Oldest First",
            SortOrder::Title => "Title A-Z",
            SortOrder::Author => "Author A-Z",
        }
    }

    fn compare(self, a: &Book, b: &Book) -> Ordering {
        match self {
            SortOrder::Recent => compare_years(b, a),
            SortOrder::Oldest => compare_years(a, b),
            SortOrder::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortOrder::Author => a.author.to_lowercase().cmp(&b.author.to_lowercase()),
        }
    }
}

/// Books without a year sort last in both year orders
fn compare_years(first: &Book, second: &Book) -> Ordering {
    match (first.year(), second.year()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortOrder::Recent => "recent",
            SortOrder::Oldest => "oldest",
            SortOrder::Title => "title",
            SortOrder::Author => "author",
        };
        f.write_str(name)
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "recent" => Ok(SortOrder::Recent),
            "oldest" => Ok(SortOrder::Oldest),
            "title" => Ok(SortOrder::Title),
            "author" => Ok(SortOrder::Author),
            other => Err(format!(
                "unknown sort order '{}' (expected recent, oldest, title or author)",
                other
            )),
        }
    }
}

/// Category/year filter plus sort order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    /// Only books in this category
    pub category: Option<String>,
    /// Only books from this year
    pub year: Option<i32>,
    /// Sort order of the result
    pub sort: SortOrder,
}

impl BookFilter {
    fn matches(&self, book: &Book) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .map_or(true, |c| book.category == c);
        let year_ok = self.year.map_or(true, |y| book.year() == Some(y));
        category_ok && year_ok
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    books: Vec<Book>,
}

/// In-memory book catalog
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    books: Vec<Book>,
}

impl Catalog {
    /// Build a catalog from books, rejecting duplicate ids
    pub fn from_books(books: Vec<Book>) -> CatalogResult<Self> {
        let mut seen = HashSet::new();
        for book in &books {
            if !seen.insert(&book.id) {
                return Err(CatalogError::DuplicateId {
                    id: book.id.clone(),
                });
            }
        }
        Ok(Self { books })
    }

    /// Load the catalog from a JSON file
    pub fn load(path: &Path) -> CatalogResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::from_io(e, path.to_path_buf()))?;
        let catalog = Self::from_json(&content).map_err(|e| match e {
            CatalogError::InvalidFormat { source, .. } => CatalogError::InvalidFormat {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        info!("Loaded {} books from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    /// Parse a catalog from a JSON string
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|source| CatalogError::InvalidFormat {
                path: Default::default(),
                source,
            })?;
        Self::from_books(file.books)
    }

    /// All books in file order
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// Number of books
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Look up a book by id
    pub fn get(&self, id: &BookId) -> Option<&Book> {
        self.books.iter().find(|b| &b.id == id)
    }

    /// Unique categories, sorted
    pub fn categories(&self) -> Vec<String> {
        self.category_counts().into_keys().collect()
    }

    /// Number of books per category, keyed in sorted order
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for book in self.books.iter().filter(|b| !b.category.is_empty()) {
            *counts.entry(book.category.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Unique years, most recent first
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .books
            .iter()
            .filter_map(Book::year)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        years.sort_unstable_by(|a, b| b.cmp(a));
        years
    }

    /// Books matching the filter, in the filter's sort order
    ///
    /// The sort is stable, so ties keep file order.
    pub fn filtered(&self, filter: &BookFilter) -> Vec<Book> {
        let mut result: Vec<Book> = self
            .books
            .iter()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        result.sort_by(|a, b| filter.sort.compare(a, b));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample() -> Catalog {
        Catalog::from_books(vec![
            Book::new("1", "Dune")
                .with_author("Frank Herbert")
                .with_category("Sci-Fi")
                .with_year(2019),
            Book::new("2", "emma")
                .with_author("Jane Austen")
                .with_category("Classic")
                .with_year(2021),
            Book::new("3", "Anathem")
                .with_author("Neal Stephenson")
                .with_category("Sci-Fi")
                .with_year(2021),
            Book::new("4", "Untitled").with_category("Misc"),
        ])
        .unwrap()
    }

    fn ids(books: &[Book]) -> Vec<&str> {
        books.iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn test_categories_sorted_unique() {
        let catalog = sample();
        assert_eq!(catalog.categories(), vec!["Classic", "Misc", "Sci-Fi"]);
        assert_eq!(catalog.category_counts()["Sci-Fi"], 2);
    }

    #[test]
    fn test_years_descending() {
        assert_eq!(sample().years(), vec![2021, 2019]);
    }

    #[test]
    fn test_filter_by_category_sorted_recent() {
        let filter = BookFilter {
            category: Some("Sci-Fi".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&sample().filtered(&filter)), vec!["3", "1"]);
    }

    #[test]
    fn test_sort_orders() {
        let catalog = sample();
        let by = |sort| ids(&catalog.filtered(&BookFilter { sort, ..Default::default() }))
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        assert_eq!(by(SortOrder::Recent), vec!["2", "3", "1", "4"]);
        assert_eq!(by(SortOrder::Oldest), vec!["1", "2", "3", "4"]);
        assert_eq!(by(SortOrder::Title), vec!["3", "1", "2", "4"]);
        assert_eq!(by(SortOrder::Author)[0], "4");
    }

    #[test]
    fn test_filter_by_year() {
        let filter = BookFilter {
            year: Some(2021),
            sort: SortOrder::Title,
            ..Default::default()
        };
        assert_eq!(ids(&sample().filtered(&filter)), vec!["3", "2"]);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = Catalog::from_books(vec![Book::new("1", "A"), Book::new("1", "B")]);
        assert!(matches!(result, Err(CatalogError::DuplicateId { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"books": [{{"id": 1, "title": "Dune", "year": 2019}}]}}"#
        )
        .unwrap();

        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get(&BookId::new("1")).is_some());
    }

    #[test]
    fn test_load_invalid_json_reports_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = Catalog::load(file.path()).unwrap_err();
        match err {
            CatalogError::InvalidFormat { path, .. } => assert_eq!(path, file.path()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = Catalog::load(Path::new("/nonexistent/books.json")).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
    }

    #[test]
    fn test_sort_order_parse_and_cycle() {
        assert_eq!("Title".parse::<SortOrder>().unwrap(), SortOrder::Title);
        assert!("newest".parse::<SortOrder>().is_err());
        assert_eq!(SortOrder::Author.next(), SortOrder::Recent);
        assert_eq!(SortOrder::Oldest.to_string(), "oldest");
    }
}
