//! E-book library core.
//!
//! Single dependency for host applications. Re-exports the member crates so
//! a host can write `ebook_library_workspace::library::LibraryProxyModel`
//! without wiring each crate individually.
//!
//! - [`bridge`]: capability traits the host implements (`SettingsStore`,
//!   `Clock`, `LoggerSink`)
//! - [`runtime`]: configuration, logging, events and per-user settings
//! - [`library`]: books, the reference collection and the library view

pub use bridge_traits as bridge;
pub use core_library as library;
pub use core_runtime as runtime;

pub use core_library::{
    Book, BookCollection, BookId, BookRole, FilterRequest, LibraryProxyModel, LibrarySource,
    SortRole,
};
pub use core_runtime::config::CoreConfig;
pub use core_runtime::settings::SettingsService;
