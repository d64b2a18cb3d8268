//! Ordering of view rows
//!
//! Each [`SortRole`] owns one "less than" predicate, looked up from a fixed
//! table. A non-empty search string adds a relevance stage in front of it:
//! rows that match the query better come first and only ties reach the
//! role's predicate.
//!
//! Keys are extracted once per pass (one `data()` call per row and role)
//! instead of once per comparison.

use crate::models::parse_timestamp;
use crate::source::{BookRole, LibrarySource};
use crate::view::fuzzy::match_score;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Criterion the library grid is ordered by.
///
/// The discriminants are the values hosts persist and pass to
/// `LibraryProxyModel::set_sort_role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum SortRole {
    /// Most recently added first
    #[default]
    RecentlyAdded = 0,
    Title = 1,
    Authors = 2,
    /// Most recently opened first
    LastOpened = 3,
}

impl SortRole {
    pub const FIRST: SortRole = SortRole::RecentlyAdded;
    pub const LAST: SortRole = SortRole::LastOpened;

    /// Map a persisted value back to a role. `None` outside
    /// `FIRST..=LAST`.
    pub fn from_index(index: i32) -> Option<Self> {
        if !(Self::FIRST.index()..=Self::LAST.index()).contains(&index) {
            return None;
        }

        match index {
            0 => Some(SortRole::RecentlyAdded),
            1 => Some(SortRole::Title),
            2 => Some(SortRole::Authors),
            3 => Some(SortRole::LastOpened),
            _ => None,
        }
    }

    pub fn index(self) -> i32 {
        self as i32
    }

    /// Row attribute this role orders by
    pub fn book_role(self) -> BookRole {
        match self {
            SortRole::RecentlyAdded => BookRole::AddedToLibrary,
            SortRole::Title => BookRole::Title,
            SortRole::Authors => BookRole::Authors,
            SortRole::LastOpened => BookRole::LastOpened,
        }
    }

    fn less_than(self) -> LessThan {
        LESS_THAN[self as usize]
    }
}

impl fmt::Display for SortRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortRole::RecentlyAdded => "recently-added",
            SortRole::Title => "title",
            SortRole::Authors => "authors",
            SortRole::LastOpened => "last-opened",
        };
        f.write_str(name)
    }
}

impl TryFrom<i32> for SortRole {
    type Error = i32;

    fn try_from(index: i32) -> Result<Self, Self::Error> {
        Self::from_index(index).ok_or(index)
    }
}

/// Everything the comparators look at for one row
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    /// Fuzzy score of the title, present only while a query is set
    pub relevance: Option<f64>,
    /// Lower-cased title or authors; empty when the row has none
    pub text: String,
    /// Parsed timestamp; `None` when missing or unparseable
    pub timestamp: Option<NaiveDateTime>,
}

impl SortKey {
    /// Read the key for `row` from `source`.
    pub fn extract<S>(source: &S, row: usize, role: SortRole, query: &str) -> Self
    where
        S: LibrarySource + ?Sized,
    {
        let relevance = (!query.is_empty()).then(|| {
            let title = source.data(row, BookRole::Title).unwrap_or_default();
            match_score(query, &title)
        });

        let value = source.data(row, role.book_role()).unwrap_or_default();
        let (text, timestamp) = match role {
            SortRole::Title | SortRole::Authors => (value.to_lowercase(), None),
            SortRole::RecentlyAdded | SortRole::LastOpened => (String::new(), parse_timestamp(&value)),
        };

        Self {
            relevance,
            text,
            timestamp,
        }
    }
}

type LessThan = fn(&SortKey, &SortKey) -> bool;

/// Indexed by `SortRole as usize`.
const LESS_THAN: [LessThan; 4] = [more_recent, text_before, text_before, more_recent];

/// Empty text never sorts before anything; anything sorts before empty text.
fn text_before(left: &SortKey, right: &SortKey) -> bool {
    if left.text.is_empty() {
        return false;
    }
    if right.text.is_empty() {
        return true;
    }
    left.text < right.text
}

/// Missing timestamps sink to the end; otherwise newest first.
fn more_recent(left: &SortKey, right: &SortKey) -> bool {
    match (left.timestamp, right.timestamp) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(left), Some(right)) => left > right,
    }
}

/// Strict weak "`left` goes before `right`" under `role`.
pub fn less_than(role: SortRole, left: &SortKey, right: &SortKey) -> bool {
    if let (Some(left_score), Some(right_score)) = (left.relevance, right.relevance) {
        if left_score > right_score {
            return true;
        }
        if left_score < right_score {
            return false;
        }
    }

    (role.less_than())(left, right)
}

/// Turn [`less_than`] into a total `Ordering` for `sort_by`. Incomparable
/// keys are `Equal`, so a stable sort keeps their incoming order.
pub fn compare(role: SortRole, left: &SortKey, right: &SortKey) -> Ordering {
    if less_than(role, left, right) {
        Ordering::Less
    } else if less_than(role, right, left) {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// Order `rows` (source indices) for display.
pub fn sort_rows<S>(source: &S, rows: Vec<usize>, role: SortRole, query: &str) -> Vec<usize>
where
    S: LibrarySource + ?Sized,
{
    let mut keyed: Vec<(usize, SortKey)> = rows
        .into_iter()
        .map(|row| (row, SortKey::extract(source, row, role, query)))
        .collect();

    keyed.sort_by(|(_, left), (_, right)| compare(role, left, right));

    keyed.into_iter().map(|(row, _)| row).collect()
}
