//! # dpdm - Detect Circular Imports in JavaScript and TypeScript
//!
//! dpdm follows `import`, `export ... from`, `import()` and `require()`
//! references from a set of entry files, builds the module dependency graph
//! and reports every simple import cycle it contains.
//!
//! ## Main Components
//!
//! - **Extractor**: Lexical scan of a module for the specifiers it references
//! - **Resolver**: Maps specifiers to files the way bundlers do, including
//!   tsconfig path aliases, `package.json` entry points and index files
//! - **Graph**: Breadth-first graph construction and DOT / Mermaid rendering
//! - **Detector**: Tarjan's SCC followed by Johnson's circuit enumeration
//! - **Reports**: Human, JSON, JUnit, GitHub Actions and tree output
//!
//! ## Usage
//!
//! ```no_run
//! use dpdm::common::ConfigBuilder;
//! use dpdm::config::BuildConfig;
//! use dpdm::detector::CycleDetector;
//! use dpdm::graph::ModuleGraphBuilder;
//! use dpdm::reports::{HumanReportGenerator, ReportGenerator};
//!
//! # fn main() -> miette::Result<()> {
//! // Step 1: Configure resolution; unset fields take the built-in defaults
//! let config = BuildConfig::builder()
//!     .with_tsconfig("tsconfig.json".into())
//!     .build()?;
//!
//! // Step 2: Build the module graph from the entry points
//! let builder = ModuleGraphBuilder::new(config)?;
//! let entries = builder.resolve_entries(&["src/index.ts".to_string()])?;
//! let graph = builder.build(&entries, None)?;
//!
//! println!("Scanned {} modules", graph.module_count());
//!
//! // Step 3: Detect circular imports
//! let mut detector = CycleDetector::new();
//! detector.detect_cycles(graph.graph());
//!
//! // Step 4: Report them
//! if detector.has_cycles() {
//!     let report = HumanReportGenerator::new(Some(5));
//!     println!("{}", report.generate_report(&graph, &detector)?);
//! }
//! # Ok(())
//! # }
//! ```

// Private modules
mod constants;
mod entries;
mod logging;
mod progress;
mod utils;

// Public modules
pub mod analyzer;
pub mod cli;
pub mod commands;
pub mod common;
pub mod config;
pub mod core;
pub mod detector;
pub mod error;
pub mod executors;
pub mod extractor;
pub mod graph;
pub mod reports;
pub mod resolver;

pub use constants::exit as exit_codes;

/// Main entry point for the library, returning the process exit code
pub fn run() -> miette::Result<u8> {
    use clap::Parser;

    use crate::cli::Cli;
    use crate::commands::execute_command;

    let cli = Cli::parse();
    logging::init_logger(cli.verbose, cli.quiet);

    execute_command(cli.command)
}
