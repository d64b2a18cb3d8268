//! Domain models for the e-book library
//!
//! This module contains the book, tag and user records together with their
//! validation rules and the text encoding used for timestamps.

use crate::error::{LibraryError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Text layout of every timestamp exposed through the collection contract
/// (`hh:mm:ss - dd.MM.yyyy`).
pub const DATE_TIME_FORMAT: &str = "%H:%M:%S - %d.%m.%Y";

/// Format marker for documents that are plain files rather than structured books.
pub const PLAIN_FORMAT: &str = "plain";

/// Render a timestamp in [`DATE_TIME_FORMAT`].
pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(DATE_TIME_FORMAT).to_string()
}

/// Parse a timestamp written in [`DATE_TIME_FORMAT`].
///
/// Returns `None` for empty or malformed input; callers treat such values as
/// "never happened".
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), DATE_TIME_FORMAT).ok()
}

// =============================================================================
// ID Types
// =============================================================================

/// Unique identifier for a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookId(pub Uuid);

impl BookId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> std::result::Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagId(pub Uuid);

impl TagId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TagId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Domain Models
// =============================================================================

/// User-defined label attached to books
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

impl Tag {
    /// Create a tag with a trimmed name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TagId::new(),
            name: name.into().trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(invalid("tag.name", "Tag name cannot be empty"));
        }
        Ok(())
    }

    /// Tags are deduplicated by name, ignoring case
    pub fn same_name(&self, other: &Tag) -> bool {
        self.name.to_lowercase() == other.name.to_lowercase()
    }
}

/// A single catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier
    pub id: BookId,

    // Metadata
    pub title: String,
    /// Author list as displayed, e.g. "Frank Herbert"
    pub authors: String,
    /// File format marker (`pdf`, `epub`, `plain`, ...)
    pub format: String,
    pub file_path: String,
    pub language: Option<String>,

    // Reading state
    pub page_count: Option<u32>,
    pub current_page: u32,

    // Timestamps
    /// When the book entered the library
    pub added_to_library: Option<NaiveDateTime>,
    /// Last time the reader opened it
    pub last_opened: Option<NaiveDateTime>,

    pub tags: Vec<Tag>,
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        authors: impl Into<String>,
        format: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            id: BookId::new(),
            title: title.into(),
            authors: authors.into(),
            format: format.into(),
            file_path: file_path.into(),
            language: None,
            page_count: None,
            current_page: 0,
            added_to_library: None,
            last_opened: None,
            tags: Vec::new(),
        }
    }

    /// Validate book data
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(invalid("book.title", "Book title cannot be empty"));
        }

        if self.format.trim().is_empty() {
            return Err(invalid("book.format", "Book format cannot be empty"));
        }

        if let Some(page_count) = self.page_count {
            if self.current_page > page_count {
                return Err(invalid(
                    "book.current_page",
                    &format!(
                        "Current page {} is past the last page {}",
                        self.current_page, page_count
                    ),
                ));
            }
        }

        for tag in &self.tags {
            tag.validate()?;
        }

        Ok(())
    }

    /// Reading progress in percent, when the page count is known
    pub fn progress(&self) -> Option<u8> {
        match self.page_count {
            Some(0) | None => None,
            Some(total) => Some(((self.current_page as u64 * 100) / total as u64) as u8),
        }
    }

    pub fn is_plain_file(&self) -> bool {
        self.format.eq_ignore_ascii_case(PLAIN_FORMAT)
    }

    pub fn has_tag(&self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        self.tags.iter().any(|tag| tag.name.to_lowercase() == name)
    }
}

/// Signed-in account owning the library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub tags: Vec<Tag>,
}

impl User {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            tags: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.first_name.trim().is_empty() {
            return Err(invalid("user.first_name", "First name cannot be empty"));
        }
        if self.last_name.trim().is_empty() {
            return Err(invalid("user.last_name", "Last name cannot be empty"));
        }
        if !self.email.contains('@') {
            return Err(invalid("user.email", "Email address is malformed"));
        }
        Ok(())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn invalid(field: &str, message: &str) -> LibraryError {
    LibraryError::InvalidInput {
        field: field.to_string(),
        message: message.to_string(),
    }
}
