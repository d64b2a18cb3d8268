//! # Host Bridge Traits
//!
//! Capability contracts that the host application implements for the
//! e-book library core.
//!
//! ## Overview
//!
//! The core never talks to the operating system directly. Anything that is
//! platform specific (where settings live, what time it is, where log lines
//! end up) is expressed here as a trait and injected at construction time.
//!
//! ## Traits
//!
//! ### Storage
//! - [`SettingsStore`](storage::SettingsStore) - Key-value preferences storage
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type.
//! Implementations should convert their own failures into it and keep the
//! message actionable (which key, which file).
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared
//! through `Arc` between the UI thread and background tasks.

pub mod error;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use storage::SettingsStore;
pub use time::{Clock, ConsoleLogger, FixedClock, LogEntry, LogLevel, LoggerSink, SystemClock};
