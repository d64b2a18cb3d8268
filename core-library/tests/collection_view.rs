//! BookCollection and LibraryProxyModel wired together

use bridge_traits::FixedClock;
use chrono::{DateTime, Duration};
use core_library::{Book, BookCollection, BookRole, LibraryProxyModel, LibrarySource, SortRole, Tag};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus, EventStream, LibraryEvent};
use core_runtime::settings::InMemorySettingsStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn library() -> (Arc<BookCollection>, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(
        DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
    ));
    (
        Arc::new(BookCollection::with_clock(clock.clone())),
        clock,
    )
}

fn titles(view: &LibraryProxyModel<BookCollection>) -> Vec<String> {
    (0..view.row_count())
        .filter_map(|row| view.data(row, BookRole::Title))
        .collect()
}

#[test]
fn test_search_example() {
    let (collection, _clock) = library();
    collection
        .add_book(Book::new("Dune", "Frank Herbert", "epub", "/books/dune.epub"))
        .unwrap();
    collection
        .add_book(Book::new("Foundation", "Isaac Asimov", "epub", "/books/foundation.epub"))
        .unwrap();

    let mut view = LibraryProxyModel::new(collection);
    view.set_sort_role(SortRole::Title.index());
    assert_eq!(titles(&view), vec!["Dune", "Foundation"]);

    view.set_sort_string("Fou");
    assert_eq!(titles(&view), vec!["Foundation", "Dune"]);
}

#[test]
fn test_recently_added_follows_the_clock() {
    let (collection, clock) = library();
    for title in ["First", "Second", "Third"] {
        collection
            .add_book(Book::new(title, "", "pdf", format!("/books/{title}.pdf")))
            .unwrap();
        clock.advance(Duration::seconds(1));
    }

    let view = LibraryProxyModel::new(collection);
    assert_eq!(titles(&view), vec!["Third", "Second", "First"]);
}

#[test]
fn test_view_tracks_inserts_and_deletes() {
    let (collection, clock) = library();
    let view = LibraryProxyModel::new(collection.clone());
    let last_count = Arc::new(AtomicUsize::new(usize::MAX));
    let sink = last_count.clone();
    view.subscribe_book_count_changed(move |count| sink.store(*count, Ordering::SeqCst));

    assert_eq!(view.row_count(), 0);

    let dune = collection
        .add_book(Book::new("Dune", "Frank Herbert", "epub", "/books/dune.epub"))
        .unwrap();
    clock.advance(Duration::minutes(1));
    collection
        .add_book(Book::new("Notes", "", "plain", "/docs/notes.txt"))
        .unwrap();

    assert_eq!(last_count.load(Ordering::SeqCst), 2);
    assert_eq!(titles(&view), vec!["Notes", "Dune"]);

    collection.delete_book(&dune).unwrap();
    assert_eq!(last_count.load(Ordering::SeqCst), 1);
    assert_eq!(view.book_count(), 1);
    assert_eq!(titles(&view), vec!["Notes"]);
}

#[test]
fn test_dropping_view_unsubscribes() {
    let (collection, _clock) = library();
    let view = LibraryProxyModel::new(collection.clone());
    assert!(format!("{:?}", collection).contains("count_subscribers: 1"));

    drop(view);
    assert!(format!("{:?}", collection).contains("count_subscribers: 0"));

    collection
        .add_book(Book::new("Dune", "Frank Herbert", "epub", "/books/dune.epub"))
        .unwrap();
}

#[test]
fn test_last_opened_after_mark_opened() {
    let (collection, clock) = library();
    let dune = collection
        .add_book(Book::new("Dune", "Frank Herbert", "epub", "/books/dune.epub"))
        .unwrap();
    let emma = collection
        .add_book(Book::new("Emma", "Jane Austen", "epub", "/books/emma.epub"))
        .unwrap();
    collection
        .add_book(Book::new("Unread", "", "epub", "/books/unread.epub"))
        .unwrap();

    collection.mark_opened(&emma).unwrap();
    clock.advance(Duration::hours(1));
    collection.mark_opened(&dune).unwrap();

    let mut view = LibraryProxyModel::new(collection.clone());
    view.set_sort_role(SortRole::LastOpened.index());
    assert_eq!(titles(&view), vec!["Dune", "Emma", "Unread"]);

    clock.advance(Duration::hours(1));
    collection.mark_opened(&emma).unwrap();
    view.invalidate();
    assert_eq!(titles(&view), vec!["Emma", "Dune", "Unread"]);
}

#[test]
fn test_file_and_book_filters() {
    let (collection, _clock) = library();
    collection
        .add_book(Book::new("Dune", "Frank Herbert", "epub", "/books/dune.epub"))
        .unwrap();
    collection
        .add_book(Book::new("Shopping list", "", "plain", "/docs/list.txt"))
        .unwrap();

    let mut view = LibraryProxyModel::new(collection);
    view.set_filter_request("", "", "", false, true, false, false);
    assert_eq!(titles(&view), vec!["Shopping list"]);

    view.set_filter_request("", "", "", true, false, false, false);
    assert_eq!(titles(&view), vec!["Dune"]);
}

#[tokio::test]
async fn test_collection_publishes_library_events() {
    let bus = EventBus::new(32);
    let mut stream = EventStream::new(bus.subscribe()).filter(|event| {
        !matches!(
            event,
            CoreEvent::Library(LibraryEvent::BookCountChanged { .. })
        )
    });
    let collection = BookCollection::new().with_event_bus(bus);

    let id = collection
        .add_book(Book::new("Dune", "Frank Herbert", "epub", "/books/dune.epub"))
        .unwrap();
    collection.add_tag(&id, Tag::new("classic")).unwrap();
    collection.delete_book(&id).unwrap();

    assert!(matches!(
        stream.recv().await.unwrap(),
        CoreEvent::Library(LibraryEvent::BookAdded { .. })
    ));
    assert_eq!(
        stream.recv().await.unwrap(),
        CoreEvent::Library(LibraryEvent::TagAdded {
            book_id: id.to_string(),
            tag: "classic".to_string(),
        })
    );
    assert_eq!(
        stream.recv().await.unwrap(),
        CoreEvent::Library(LibraryEvent::BookDeleted {
            book_id: id.to_string(),
        })
    );
}

#[tokio::test]
async fn test_collection_from_config_uses_configured_clock() {
    let clock = Arc::new(FixedClock::new(
        DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
    ));
    let config = CoreConfig::builder()
        .settings_store(Arc::new(InMemorySettingsStore::new()))
        .clock(clock.clone())
        .event_buffer_size(8)
        .build()
        .unwrap();
    let bus = config.event_bus();
    let mut events = bus.subscribe();

    let collection = BookCollection::from_config(&config, bus);
    let id = collection
        .add_book(Book::new("Dune", "Frank Herbert", "epub", "/books/dune.epub"))
        .unwrap();

    assert_eq!(
        collection.data(0, BookRole::AddedToLibrary).unwrap(),
        "22:13:20 - 14.11.2023"
    );
    assert_eq!(
        events.recv().await.unwrap(),
        CoreEvent::Library(LibraryEvent::BookAdded {
            book_id: id.to_string(),
            title: "Dune".to_string(),
            authors: "Frank Herbert".to_string(),
        })
    );
    assert_eq!(
        events.recv().await.unwrap(),
        CoreEvent::Library(LibraryEvent::BookCountChanged { count: 1 })
    );
    assert_eq!(collection.book(&id).unwrap().title, "Dune");
}
