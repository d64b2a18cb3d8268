//! Row inclusion predicate for the library view

use crate::models::PLAIN_FORMAT;
use crate::source::{BookRole, LibrarySource};
use serde::{Deserialize, Serialize};

/// Which rows the library grid shows.
///
/// Text fields are stored lower-cased. `date`, `read` and `unread` are kept
/// for the filter UI to round-trip but do not affect inclusion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRequest {
    pub authors: String,
    pub format: String,
    pub date: String,
    pub only_books: bool,
    pub only_files: bool,
    pub read: bool,
    pub unread: bool,
}

impl FilterRequest {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        authors: &str,
        format: &str,
        date: &str,
        only_books: bool,
        only_files: bool,
        read: bool,
        unread: bool,
    ) -> Self {
        Self {
            authors: authors.to_lowercase(),
            format: format.to_lowercase(),
            date: date.to_lowercase(),
            only_books,
            only_files,
            read,
            unread,
        }
    }

    /// `true` when every row passes
    pub fn is_empty(&self) -> bool {
        self.authors.is_empty() && self.format.is_empty() && !self.only_books && !self.only_files
    }

    /// Whether `row` of `source` is shown.
    ///
    /// Authors and format must match exactly after lower-casing. A row the
    /// source no longer has reads as empty and is judged like any other.
    pub fn accepts<S>(&self, source: &S, row: usize) -> bool
    where
        S: LibrarySource + ?Sized,
    {
        let authors = source
            .data(row, BookRole::Authors)
            .unwrap_or_default()
            .to_lowercase();
        if !self.authors.is_empty() && self.authors != authors {
            return false;
        }

        let format = source
            .data(row, BookRole::Format)
            .unwrap_or_default()
            .to_lowercase();
        if !self.format.is_empty() && self.format != format {
            return false;
        }

        if self.only_files && format != PLAIN_FORMAT {
            return false;
        }

        if self.only_books && format == PLAIN_FORMAT {
            return false;
        }

        true
    }
}
