//! Book command handlers

use anyhow::{bail, Result};

use shelf_core::modal::RecentSelections;
use shelf_core::{BookFilter, BookId, Catalog, SortOrder};

use crate::output::Output;

/// List books, optionally filtered by category and year
pub fn list(
    catalog: &Catalog,
    category: Option<String>,
    year: Option<i32>,
    sort: SortOrder,
    output: &Output,
) -> Result<()> {
    if let Some(ref c) = category {
        if !catalog.categories().contains(c) {
            bail!(
                "Unknown category: '{}'. Run `shelf categories` to see the list.",
                c
            );
        }
    }

    let filter = BookFilter {
        category,
        year,
        sort,
    };
    output.print_books(&catalog.filtered(&filter));
    Ok(())
}

/// Show a single book
pub fn show(catalog: &Catalog, id: String, output: &Output) -> Result<()> {
    let book = catalog
        .get(&BookId::new(id.as_str()))
        .ok_or_else(|| anyhow::anyhow!("Book not found: {}", id))?;

    output.print_book(book);
    Ok(())
}

/// Pick `count` random books without immediate repeats
pub fn random(catalog: &Catalog, count: usize, output: &Output) -> Result<()> {
    if catalog.is_empty() {
        bail!("The catalog is empty.");
    }

    let mut recent = RecentSelections::new();
    let mut rng = rand::thread_rng();
    let picks: Vec<_> = (0..count)
        .filter_map(|_| recent.pick_random(catalog.books(), &mut rng).cloned())
        .collect();

    match picks.as_slice() {
        [single] => output.print_book(single),
        many => output.print_books(many),
    }
    Ok(())
}
