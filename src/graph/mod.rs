//! # Graph Construction and Rendering Module
//!
//! This module discovers the module graph and renders it for visualization.
//!
//! ## Components
//!
//! ### Graph Building
//! - **ModuleGraphBuilder**: Breadth-first discovery from the entry points,
//!   scanning each level in parallel
//! - **ModuleNode**: A module and its scan state
//! - **ImportEdge**: A reference from one module to another
//!
//! ### Graph Rendering
//! - **GraphRenderer**: Renders graphs as Graphviz DOT or Mermaid, optionally
//!   highlighting cycles
//!
//! ## Example
//!
//! ```
//! use std::path::PathBuf;
//!
//! use dpdm::core::{ModuleId, ReferenceKind};
//! use dpdm::graph::{GraphRenderer, ImportEdge, ModuleGraph, ModuleNode, ModuleState};
//! use petgraph::graph::DiGraph;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut graph = DiGraph::new();
//! let app = graph.add_node(ModuleNode::new(ModuleId::file("/p/app.ts"), 0, ModuleState::Scanned));
//! let util = graph.add_node(ModuleNode::new(ModuleId::file("/p/util.ts"), 1, ModuleState::Scanned));
//! graph.add_edge(
//!     app,
//!     util,
//!     ImportEdge { specifier: "./util".into(), kind: ReferenceKind::Import, order: 0 },
//! );
//!
//! let graph = ModuleGraph::from_parts(graph, vec![ModuleId::file("/p/app.ts")], PathBuf::from("/p"));
//!
//! let renderer = GraphRenderer::new(true);
//! let mut output = Vec::new();
//! renderer.render_dot(&graph, &[], &mut output)?;
//!
//! let dot_output = String::from_utf8(output)?;
//! assert!(dot_output.contains("digraph"));
//! assert!(dot_output.contains("app.ts"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Output Formats
//!
//! - **DOT**: Graphviz format for detailed visualization
//! - **Mermaid**: Markdown-compatible diagrams for documentation

mod builder;
mod renderer;
mod types;

pub use builder::{CancellationToken, ModuleGraph, ModuleGraphBuilder};
pub use renderer::GraphRenderer;
pub use types::{ImportEdge, ModuleNode, ModuleState, SkipReason};
