//! Read-only contract between the library view and the collection that owns
//! the books.
//!
//! The view never touches `Book` values directly. It asks for one attribute
//! of one row at a time, the same way a table widget would, which keeps it
//! usable with any collection that can answer these questions (including
//! test doubles).

use crate::signal::SubscriptionId;
use serde::{Deserialize, Serialize};

/// Callback invoked with the new row count whenever rows are added or removed.
pub type CountChangedCallback = Box<dyn Fn(usize) + Send + Sync>;

/// Attributes a collection exposes per row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookRole {
    Title,
    Authors,
    /// Lower- or mixed-case format marker; see [`crate::models::PLAIN_FORMAT`]
    Format,
    /// Text in [`crate::models::DATE_TIME_FORMAT`], empty when never opened
    LastOpened,
    /// Text in [`crate::models::DATE_TIME_FORMAT`]
    AddedToLibrary,
}

impl BookRole {
    pub const ALL: [BookRole; 5] = [
        BookRole::Title,
        BookRole::Authors,
        BookRole::Format,
        BookRole::LastOpened,
        BookRole::AddedToLibrary,
    ];
}

/// Indexed, observable collection of books.
///
/// Rows are addressed by position. A row index is only meaningful until the
/// next structural change, which implementations must announce through the
/// count-changed subscription.
pub trait LibrarySource: Send + Sync {
    /// Number of rows currently in the collection
    fn row_count(&self) -> usize;

    /// Text value of `role` for `row`, or `None` when the row does not exist
    fn data(&self, row: usize, role: BookRole) -> Option<String>;

    /// Register `callback` for row count changes
    fn subscribe_count_changed(&self, callback: CountChangedCallback) -> SubscriptionId;

    /// Drop a subscription. Returns `false` for unknown ids.
    fn unsubscribe_count_changed(&self, id: SubscriptionId) -> bool;
}
