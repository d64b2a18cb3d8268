//! # Library Module
//!
//! Book catalog and the view the library grid renders from it.
//!
//! ## Overview
//!
//! This crate contains:
//! - Domain models (`Book`, `Tag`, `User`) and their validation
//! - The `LibrarySource` contract every collection implements
//! - `BookCollection`, the in-memory reference collection
//! - The `view` module: fuzzy ranking, sort roles, filtering and the
//!   `LibraryProxyModel` that combines them
//! - Pagination over view rows
//!
//! ## Usage
//!
//! ```rust
//! use core_library::{Book, BookCollection, BookRole, LibraryProxyModel};
//! use std::sync::Arc;
//!
//! let collection = Arc::new(BookCollection::new());
//! collection.add_book(Book::new("Dune", "Frank Herbert", "epub", "/books/dune.epub")).unwrap();
//! collection.add_book(Book::new("Foundation", "Isaac Asimov", "epub", "/books/foundation.epub")).unwrap();
//!
//! let mut view = LibraryProxyModel::new(collection.clone());
//! view.set_sort_string("Fou");
//! assert_eq!(view.data(0, BookRole::Title).as_deref(), Some("Foundation"));
//! ```

pub mod collection;
pub mod error;
pub mod models;
pub mod pagination;
pub mod signal;
pub mod source;
pub mod view;

pub use collection::BookCollection;
pub use error::{LibraryError, Result};
pub use models::{Book, BookId, Tag, TagId, User};
pub use pagination::{Page, PageRequest};
pub use signal::{Signal, SubscriptionId};
pub use source::{BookRole, LibrarySource};
pub use view::{FilterRequest, LibraryProxyModel, SortRole};
