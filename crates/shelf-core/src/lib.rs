//! Shelf Core Library
//!
//! This crate provides the core functionality for Shelf, a personal book
//! catalog with a detail view that lifts out of the book grid.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let catalog = Catalog::load(&config.books_path())?;
//! let books = catalog.filtered(&BookFilter::default());
//!
//! let mut modal = SpatialModal::new(Viewport::new(1280.0, 800.0));
//! modal.open(books[0].clone(), origin);
//! // every frame:
//! modal.poll();
//! ```
//!
//! # Modules
//!
//! - `models`: Book record
//! - `catalog`: Loading, filtering and sorting the book list
//! - `modal`: The spatial transition modal
//! - `config`: Application configuration
//! - `error`: Catalog errors

pub mod catalog;
pub mod config;
pub mod error;
pub mod modal;
pub mod models;

pub use catalog::{BookFilter, Catalog, SortOrder};
pub use config::Config;
pub use error::{CatalogError, CatalogResult};
pub use modal::{AnimationPhase, SpatialModal};
pub use models::{Book, BookId};
