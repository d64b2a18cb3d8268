//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the e-book library core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//! - Per-user settings
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the library crate depends
//! on. It establishes the logging conventions, the configuration builder and
//! the event broadcasting used throughout the system.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod settings;

pub use error::{Error, Result};
