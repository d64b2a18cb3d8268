//! # Library View
//!
//! Presentation-side ordering of the book collection: which books the grid
//! shows and in what order.
//!
//! A pass over the collection runs in three stages:
//!
//! ```text
//!  source rows ──> filter ──> relevance ──> sort role ──> mapping
//!                 (filter)    (fuzzy)       (sort)
//! ```
//!
//! - [`filter`]: [`FilterRequest`] drops rows by authors and format.
//! - [`fuzzy`]: scores titles against the search string.
//! - [`sort`]: [`SortRole`] comparators, applied with a stable sort.
//!
//! [`LibraryProxyModel`] ties them together and keeps the resulting mapping
//! current.

pub mod filter;
pub mod fuzzy;
mod proxy;
pub mod sort;

pub use filter::FilterRequest;
pub use proxy::LibraryProxyModel;
pub use sort::SortRole;
