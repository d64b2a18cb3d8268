//! # In-Memory Book Collection
//!
//! `BookCollection` is the reference [`LibrarySource`]: an ordered list of
//! books kept in insertion order, addressable by row, that announces every
//! change in row count.
//!
//! ## Notifications
//!
//! Two channels, for two kinds of listener:
//!
//! - The synchronous count signal behind
//!   [`LibrarySource::subscribe_count_changed`]. Views rely on it to mark
//!   their ordering stale before the mutating call returns.
//! - An optional [`EventBus`] carrying [`LibraryEvent`]s for everyone else.
//!
//! Both fire after the internal lock is released, so listeners may read the
//! collection from inside their callback.

use crate::error::{LibraryError, Result};
use crate::models::{format_timestamp, Book, BookId, Tag};
use crate::signal::{Signal, SubscriptionId};
use crate::source::{BookRole, CountChangedCallback, LibrarySource};
use bridge_traits::{Clock, SystemClock};
use chrono::NaiveDateTime;
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus, LibraryEvent};
use core_runtime::logging::strip_path;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, instrument, warn};

pub struct BookCollection {
    books: RwLock<Vec<Book>>,
    count_changed: Signal<usize>,
    clock: Arc<dyn Clock>,
    event_bus: Option<EventBus>,
}

impl BookCollection {
    /// Empty collection stamped by the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            books: RwLock::new(Vec::new()),
            count_changed: Signal::new(),
            clock,
            event_bus: None,
        }
    }

    /// Collection stamped by `config.clock`, publishing on the shared `event_bus`
    pub fn from_config(config: &CoreConfig, event_bus: EventBus) -> Self {
        Self::with_clock(config.clock.clone()).with_event_bus(event_bus)
    }

    /// Publish [`LibraryEvent`]s on `event_bus` from now on.
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Append `book`.
    ///
    /// Books without `added_to_library` are stamped with the clock's current
    /// time (UTC).
    #[instrument(skip(self, book), fields(book_id = %book.id))]
    pub fn add_book(&self, mut book: Book) -> Result<BookId> {
        book.validate()?;

        if book.added_to_library.is_none() {
            book.added_to_library = Some(self.now());
        }

        let id = book.id;
        let added = LibraryEvent::BookAdded {
            book_id: id.to_string(),
            title: book.title.clone(),
            authors: book.authors.clone(),
        };
        let file = strip_path(&book.file_path).to_string();

        let count = {
            let mut books = self.write();
            if books.iter().any(|existing| existing.id == id) {
                return Err(LibraryError::InvalidInput {
                    field: "book.id".to_string(),
                    message: format!("Book {} is already in the library", id),
                });
            }
            books.push(book);
            books.len()
        };

        info!(file = %file, count, "Book added");
        self.publish(added);
        self.announce_count(count);

        Ok(id)
    }

    #[instrument(skip(self))]
    pub fn delete_book(&self, id: &BookId) -> Result<()> {
        let count = {
            let mut books = self.write();
            let position = Self::position(&books, id)?;
            books.remove(position);
            books.len()
        };

        info!(count, "Book deleted");
        self.publish(LibraryEvent::BookDeleted {
            book_id: id.to_string(),
        });
        self.announce_count(count);

        Ok(())
    }

    /// Replace the stored record that has `book.id`.
    ///
    /// The row count is unchanged, so views are not notified; call
    /// `invalidate()` on them if the edit affects ordering.
    #[instrument(skip(self, book), fields(book_id = %book.id))]
    pub fn update_book(&self, book: Book) -> Result<()> {
        book.validate()?;

        let id = book.id;
        let updated_fields = {
            let mut books = self.write();
            let position = Self::position(&books, &id)?;
            let changed = changed_fields(&books[position], &book);
            books[position] = book;
            changed
        };

        if updated_fields.is_empty() {
            debug!("Update left the book unchanged");
            return Ok(());
        }

        debug!(fields = ?updated_fields, "Book updated");
        self.publish(LibraryEvent::BookUpdated {
            book_id: id.to_string(),
            updated_fields,
        });

        Ok(())
    }

    /// Attach `tag` to the book. Tag names are unique per book, ignoring case.
    #[instrument(skip(self, tag), fields(tag = %tag.name))]
    pub fn add_tag(&self, id: &BookId, tag: Tag) -> Result<()> {
        tag.validate()?;

        {
            let mut books = self.write();
            let position = Self::position(&books, id)?;
            let book = &mut books[position];
            if book.tags.iter().any(|existing| existing.same_name(&tag)) {
                return Err(LibraryError::DuplicateTag {
                    book_id: id.to_string(),
                    name: tag.name,
                });
            }
            book.tags.push(tag.clone());
        }

        debug!("Tag added");
        self.publish(LibraryEvent::TagAdded {
            book_id: id.to_string(),
            tag: tag.name,
        });

        Ok(())
    }

    /// Stamp `last_opened` with the clock's current time.
    pub fn mark_opened(&self, id: &BookId) -> Result<()> {
        let now = self.now();
        {
            let mut books = self.write();
            let position = Self::position(&books, id)?;
            books[position].last_opened = Some(now);
        }

        self.publish(LibraryEvent::BookUpdated {
            book_id: id.to_string(),
            updated_fields: vec!["last_opened".to_string()],
        });

        Ok(())
    }

    pub fn book(&self, id: &BookId) -> Option<Book> {
        self.read().iter().find(|book| book.id == *id).cloned()
    }

    /// Snapshot of every book in row order
    pub fn books(&self) -> Vec<Book> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn now(&self) -> NaiveDateTime {
        self.clock.naive_now()
    }

    fn position(books: &[Book], id: &BookId) -> Result<usize> {
        books.iter().position(|book| book.id == *id).ok_or_else(|| {
            warn!(book_id = %id, "Unknown book id");
            LibraryError::book_not_found(id)
        })
    }

    fn announce_count(&self, count: usize) {
        self.count_changed.emit(&count);
        self.publish(LibraryEvent::BookCountChanged {
            count: count as u64,
        });
    }

    fn publish(&self, event: LibraryEvent) {
        if let Some(event_bus) = &self.event_bus {
            event_bus.publish(CoreEvent::Library(event));
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Book>> {
        self.books.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Book>> {
        self.books.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for BookCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BookCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookCollection")
            .field("len", &self.len())
            .field("count_subscribers", &self.count_changed.slot_count())
            .field("event_bus", &self.event_bus.is_some())
            .finish()
    }
}

impl LibrarySource for BookCollection {
    fn row_count(&self) -> usize {
        self.len()
    }

    fn data(&self, row: usize, role: BookRole) -> Option<String> {
        let books = self.read();
        let book = books.get(row)?;

        let value = match role {
            BookRole::Title => book.title.clone(),
            BookRole::Authors => book.authors.clone(),
            BookRole::Format => book.format.clone(),
            BookRole::LastOpened => book
                .last_opened
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_default(),
            BookRole::AddedToLibrary => book
                .added_to_library
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_default(),
        };

        Some(value)
    }

    fn subscribe_count_changed(&self, callback: CountChangedCallback) -> SubscriptionId {
        self.count_changed.connect(move |count| callback(*count))
    }

    fn unsubscribe_count_changed(&self, id: SubscriptionId) -> bool {
        self.count_changed.disconnect(id)
    }
}

fn changed_fields(before: &Book, after: &Book) -> Vec<String> {
    let checks = [
        ("title", before.title != after.title),
        ("authors", before.authors != after.authors),
        ("format", before.format != after.format),
        ("file_path", before.file_path != after.file_path),
        ("language", before.language != after.language),
        ("page_count", before.page_count != after.page_count),
        ("current_page", before.current_page != after.current_page),
        ("added_to_library", before.added_to_library != after.added_to_library),
        ("last_opened", before.last_opened != after.last_opened),
        ("tags", before.tags != after.tags),
    ];

    checks
        .into_iter()
        .filter(|(_, changed)| *changed)
        .map(|(name, _)| name.to_string())
        .collect()
}
