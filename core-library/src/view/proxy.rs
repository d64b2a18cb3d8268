use crate::pagination::{Page, PageRequest};
use crate::signal::{Signal, SubscriptionId};
use crate::source::{BookRole, LibrarySource};
use crate::view::filter::FilterRequest;
use crate::view::sort::{sort_rows, SortRole};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard};
use tracing::{debug, trace};

/// Sorted, filtered window onto a [`LibrarySource`].
///
/// The proxy never changes the collection. It keeps a list of source row
/// indices (the "mapping") that it rebuilds whenever the sort role, search
/// string or filter changes, and after the collection reports a new row
/// count.
///
/// Setters rebuild before they return. Count changes only mark the mapping
/// stale, and the next read rebuilds it, so a burst of inserts costs one
/// pass.
///
/// ```ignore
/// let mut view = LibraryProxyModel::new(collection.clone());
/// view.set_sort_role(SortRole::Title.index());
/// view.set_sort_string("fou");
/// let first = view.data(0, BookRole::Title);
/// ```
pub struct LibraryProxyModel<S: LibrarySource + ?Sized> {
    source: Arc<S>,
    sort_role: SortRole,
    sort_string: String,
    filter_request: FilterRequest,
    mapping: RwLock<Vec<usize>>,
    stale: Arc<AtomicBool>,
    book_count_changed: Arc<Signal<usize>>,
    source_subscription: SubscriptionId,
}

impl<S: LibrarySource + ?Sized> LibraryProxyModel<S> {
    /// Wrap `source`, ordered by [`SortRole::RecentlyAdded`] with no query
    /// and no filter.
    pub fn new(source: Arc<S>) -> Self {
        let stale = Arc::new(AtomicBool::new(false));
        let book_count_changed = Arc::new(Signal::new());

        let source_subscription = {
            let stale = stale.clone();
            let book_count_changed = book_count_changed.clone();
            source.subscribe_count_changed(Box::new(move |count| {
                stale.store(true, Ordering::Release);
                book_count_changed.emit(&count);
            }))
        };

        let proxy = Self {
            source,
            sort_role: SortRole::default(),
            sort_string: String::new(),
            filter_request: FilterRequest::default(),
            mapping: RwLock::new(Vec::new()),
            stale,
            book_count_changed,
            source_subscription,
        };
        proxy.rebuild("initial sort");
        proxy
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    // ------------------------------------------------------------------
    // Sorting
    // ------------------------------------------------------------------

    /// Select the sort criterion by its persisted index.
    ///
    /// Values outside `0..=3` are ignored and leave the ordering alone.
    pub fn set_sort_role(&mut self, role: i32) {
        let Some(role) = SortRole::from_index(role) else {
            trace!(role, "Ignoring out-of-range sort role");
            return;
        };

        self.sort_role = role;
        self.rebuild("sort role changed");
    }

    pub fn sort_role(&self) -> SortRole {
        self.sort_role
    }

    /// Set the live search string. Empty turns relevance ranking off.
    pub fn set_sort_string(&mut self, sort_string: impl Into<String>) {
        self.sort_string = sort_string.into();
        self.rebuild("sort string changed");
    }

    pub fn sort_string(&self) -> &str {
        &self.sort_string
    }

    // ------------------------------------------------------------------
    // Filtering
    // ------------------------------------------------------------------

    /// Replace the filter. Text arguments are lower-cased.
    #[allow(clippy::too_many_arguments)]
    pub fn set_filter_request(
        &mut self,
        authors: &str,
        format: &str,
        date: &str,
        only_books: bool,
        only_files: bool,
        read: bool,
        unread: bool,
    ) {
        self.filter_request =
            FilterRequest::new(authors, format, date, only_books, only_files, read, unread);
        self.rebuild("filter changed");
    }

    pub fn filter_request(&self) -> &FilterRequest {
        &self.filter_request
    }

    // ------------------------------------------------------------------
    // Book count
    // ------------------------------------------------------------------

    /// Rows in the collection, ignoring the filter.
    pub fn book_count(&self) -> usize {
        self.source.row_count()
    }

    /// Called with the collection's new row count every time it changes.
    pub fn subscribe_book_count_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&usize) + Send + Sync + 'static,
    {
        self.book_count_changed.connect(callback)
    }

    pub fn unsubscribe_book_count_changed(&self, id: SubscriptionId) -> bool {
        self.book_count_changed.disconnect(id)
    }

    // ------------------------------------------------------------------
    // Rows
    // ------------------------------------------------------------------

    /// Rows that pass the filter.
    pub fn row_count(&self) -> usize {
        self.rows().len()
    }

    /// Source index shown at view position `row`.
    pub fn map_to_source(&self, row: usize) -> Option<usize> {
        self.rows().get(row).copied()
    }

    /// View position of `source_row`, or `None` when it is filtered out.
    pub fn map_from_source(&self, source_row: usize) -> Option<usize> {
        self.rows().iter().position(|&row| row == source_row)
    }

    /// `role` of the book shown at view position `row`.
    pub fn data(&self, row: usize, role: BookRole) -> Option<String> {
        let source_row = self.map_to_source(row)?;
        self.source.data(source_row, role)
    }

    /// The whole mapping, in display order.
    pub fn source_rows(&self) -> Vec<usize> {
        self.rows().clone()
    }

    /// One page of the mapping, in display order.
    pub fn page(&self, request: PageRequest) -> Page<usize> {
        Page::from_rows(&self.rows(), request)
    }

    /// Re-read the collection and rebuild the mapping now.
    pub fn invalidate(&self) {
        self.rebuild("invalidated");
    }

    /// Re-run the filter (and with it the sort) now.
    pub fn invalidate_filter(&self) {
        self.rebuild("filter invalidated");
    }

    fn rows(&self) -> RwLockReadGuard<'_, Vec<usize>> {
        if self.stale.swap(false, Ordering::AcqRel) {
            self.rebuild("row count changed");
        }
        self.mapping.read().unwrap_or_else(|e| e.into_inner())
    }

    fn rebuild(&self, reason: &'static str) {
        let row_count = self.source.row_count();
        let accepted: Vec<usize> = (0..row_count)
            .filter(|&row| self.filter_request.accepts(self.source.as_ref(), row))
            .collect();
        let ordered = sort_rows(
            self.source.as_ref(),
            accepted,
            self.sort_role,
            &self.sort_string,
        );

        debug!(
            reason,
            sort_role = %self.sort_role,
            source_rows = row_count,
            visible_rows = ordered.len(),
            "Library view rebuilt"
        );

        *self.mapping.write().unwrap_or_else(|e| e.into_inner()) = ordered;
    }
}

impl<S: LibrarySource + ?Sized> Drop for LibraryProxyModel<S> {
    fn drop(&mut self) {
        self.source
            .unsubscribe_count_changed(self.source_subscription);
    }
}

impl<S: LibrarySource + ?Sized> fmt::Debug for LibraryProxyModel<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryProxyModel")
            .field("sort_role", &self.sort_role)
            .field("sort_string", &self.sort_string)
            .field("filter_request", &self.filter_request)
            .field("stale", &self.stale.load(Ordering::Acquire))
            .field("subscription", &self.source_subscription)
            .finish_non_exhaustive()
    }
}
