//! Integration tests for logging system

use bridge_traits::time::LogLevel;
use core_runtime::logging::{default_filter, redact_if_sensitive, strip_path, LogFormat, LoggingConfig};

#[test]
fn test_logging_config_builder() {
    // Logging can only be initialised once per process, so only the builder is exercised here.
    let config = LoggingConfig::default()
        .with_format(LogFormat::Json)
        .with_level(LogLevel::Debug)
        .with_spans(true);

    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.level, LogLevel::Debug);
    assert!(config.enable_spans);
    assert!(config.logger_sink.is_none());
}

#[test]
fn test_redaction_of_credentials() {
    assert_eq!(redact_if_sensitive("access_token", "eyJhbGciOi"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("password", "hunter2"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("Authorization", "Bearer abc"), "[REDACTED]");
}

#[test]
fn test_redaction_of_emails() {
    let redacted = redact_if_sensitive("email", "ada@example.com");

    assert!(redacted.starts_with('a'));
    assert!(redacted.contains("[REDACTED]"));
    assert!(!redacted.contains("example.com"));
}

#[test]
fn test_ordinary_values_pass_through() {
    assert_eq!(redact_if_sensitive("title", "Foundation"), "Foundation");
    assert_eq!(redact_if_sensitive("authors", "Isaac Asimov"), "Isaac Asimov");
    assert_eq!(redact_if_sensitive("sort_role", "2"), "2");
}

#[test]
fn test_path_stripping() {
    assert_eq!(strip_path("/home/ada/Books/dune.epub"), "dune.epub");
    assert_eq!(strip_path("C:\\Users\\Ada\\Books\\foundation.pdf"), "foundation.pdf");
    assert_eq!(strip_path("notes.txt"), "notes.txt");
    assert_eq!(strip_path("/home/ada/Books/"), "");
    assert_eq!(strip_path(""), "");
}

#[test]
fn test_default_format_follows_build_profile() {
    #[cfg(debug_assertions)]
    assert_eq!(LoggingConfig::default().format, LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(LoggingConfig::default().format, LogFormat::Json);
}

#[test]
fn test_filter_configuration() {
    let config = LoggingConfig::default().with_filter("core_library=trace,core_runtime=debug");

    assert_eq!(
        config.filter,
        Some("core_library=trace,core_runtime=debug".to_string())
    );
}

#[test]
fn test_default_filter_covers_workspace_crates() {
    let filter = default_filter(LogLevel::Warn);

    assert!(filter.contains("core_library=warn"));
    assert!(filter.contains("core_runtime=warn"));
}

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn)
        .with_spans(false)
        .with_target(false)
        .with_thread_info(true);

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(!config.enable_spans);
    assert!(!config.display_target);
    assert!(config.display_thread_info);
}
