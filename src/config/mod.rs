//! # Configuration Module
//!
//! This module provides configuration structures for all dpdm commands. Each
//! command has its own config module with a builder; the graph building
//! options every command shares live in [`BuildConfig`].
//!
//! ## Command Configurations
//!
//! - **CheckConfig**: Configuration for the `check` command to detect cycles
//! - **TreeConfig**: Configuration for the `tree` command
//! - **GraphOptions**: Configuration for the `graph` command to visualize
//!   the module graph
//! - **AnalyzeConfig**: Configuration for the `analyze` command
//! - **UnusedConfig**: Configuration for the `unused` command
//!
//! ## Example
//!
//! ```
//! use std::path::PathBuf;
//!
//! use dpdm::cli::GraphFormat;
//! use dpdm::common::ConfigBuilder;
//! use dpdm::config::{BuildConfig, GraphOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let build = BuildConfig::builder()
//!     .with_context(PathBuf::from("/project"))
//!     .with_exclude("node_modules|dist")
//!     .build()?;
//!
//! let options = GraphOptions::builder()
//!     .with_entries(vec!["src/index.ts".to_string()])
//!     .with_build(build)
//!     .with_format(GraphFormat::Dot)
//!     .with_output(None)
//!     .with_highlight_cycles(true)
//!     .build()?;
//!
//! assert!(options.highlight_cycles);
//! # Ok(())
//! # }
//! ```

pub mod analyze;
pub mod build;
pub mod check;
pub mod graph;
pub mod tree;
pub mod unused;

pub use analyze::AnalyzeConfig;
pub use build::{BuildConfig, BuildConfigBuilder, ConfigFile};
pub use check::CheckConfig;
pub use graph::GraphOptions;
pub use tree::TreeConfig;
pub use unused::UnusedConfig;

use crate::error::DpdmError;

pub(crate) fn missing(field: &str) -> DpdmError {
    DpdmError::ConfigurationError {
        message: format!("Missing required field: {field}"),
    }
}
