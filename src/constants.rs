//! Configuration constants for dpdm
//!
//! This module contains the defaults used throughout the application. Most of
//! them can be overridden through command line flags, environment variables
//! or the configuration file.

use std::time::Duration;

/// Progress spinner configuration
pub mod progress {
    use super::*;

    /// Duration between spinner updates
    pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

    /// Spinner frames
    pub const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];
}

/// Graph building defaults
pub mod build {
    /// Extensions tried when a specifier has none, in priority order
    pub const DEFAULT_EXTENSIONS: &[&str] = &["ts", "tsx", "mjs", "js", "jsx", "json"];

    /// Extensions of files that are scanned for references
    pub const DEFAULT_JS_EXTENSIONS: &[&str] = &["ts", "tsx", "mjs", "js", "jsx"];

    pub const DEFAULT_INCLUDE: &str = ".*";

    pub const DEFAULT_EXCLUDE: &str = "node_modules";

    /// Upper bound on graph nodes before traversal gives up
    pub const DEFAULT_MAX_MODULES: usize = 100_000;

    /// Directories never descended into when an entry is a directory
    pub const SKIPPED_DIRECTORIES: &[&str] = &["node_modules", ".git"];
}

/// Output formatting configuration
pub mod output {
    /// Default output format when not specified
    pub const DEFAULT_FORMAT: &str = "human";
}

/// Process exit codes
pub mod exit {
    pub const SUCCESS: u8 = 0;

    /// Default code when cycles were found; `--exit-code circular:N` overrides it
    pub const CYCLES_FOUND: u8 = 1;

    pub const FATAL: u8 = 2;
}
