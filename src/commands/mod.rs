//! Command implementations for the dpdm CLI
//!
//! This module contains the implementations for each CLI command:
//! - check: Find circular imports reachable from the entry points
//! - tree: Print the dependency tree of each entry point
//! - graph: Render the module graph for Graphviz or Mermaid
//! - analyze: List the transitive dependencies of specific files
//! - unused: List files that no entry point reaches

pub mod analyze;
pub mod check;
pub mod graph;
pub mod tree;
pub mod unused;

use miette::Result;

use crate::cli::Commands;

/// Execute a command based on CLI input, returning the process exit code
pub fn execute_command(command: Commands) -> Result<u8> {
    match &command {
        Commands::Check { .. } => check::execute_check_command(command),
        Commands::Tree { .. } => tree::execute_tree_command(command),
        Commands::Graph { .. } => graph::execute_graph_command(command),
        Commands::Analyze { .. } => analyze::execute_analyze_command(command),
        Commands::Unused { .. } => unused::execute_unused_command(command),
    }
}
