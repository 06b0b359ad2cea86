//! Category and year command handlers

use anyhow::Result;

use shelf_core::Catalog;

use crate::output::Output;

/// List categories with book counts
pub fn categories(catalog: &Catalog, output: &Output) -> Result<()> {
    output.print_categories(&catalog.category_counts(), catalog.len());
    Ok(())
}

/// List years, most recent first
pub fn years(catalog: &Catalog, output: &Output) -> Result<()> {
    output.print_years(&catalog.years());
    Ok(())
}
