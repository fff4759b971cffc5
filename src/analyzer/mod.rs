//! # Dependency Analysis Module
//!
//! Queries that run on a finished [`ModuleGraph`](crate::graph::ModuleGraph):
//!
//! - **Transitive dependencies**: everything a file imports, directly or not
//! - **Transitive dependents**: everything that ends up importing a file
//! - **Unused files**: files matched by a glob that no entry point reaches
//!
//! ## Example
//!
//! ```
//! use std::path::{Path, PathBuf};
//!
//! use dpdm::analyzer::DependencyAnalysis;
//! use dpdm::core::{ModuleId, ReferenceKind};
//! use dpdm::graph::{ImportEdge, ModuleGraph, ModuleNode, ModuleState};
//! use petgraph::graph::DiGraph;
//!
//! let mut graph = DiGraph::new();
//! let app = graph.add_node(ModuleNode::new(ModuleId::file("/p/app.ts"), 0, ModuleState::Scanned));
//! let util = graph.add_node(ModuleNode::new(ModuleId::file("/p/util.ts"), 1, ModuleState::Scanned));
//! graph.add_edge(
//!     app,
//!     util,
//!     ImportEdge { specifier: "./util".into(), kind: ReferenceKind::Import, order: 0 },
//! );
//! let graph = ModuleGraph::from_parts(graph, vec![ModuleId::file("/p/app.ts")], PathBuf::from("/p"));
//!
//! let analysis = DependencyAnalysis::new(&graph);
//! assert_eq!(analysis.transitive_dependencies(Path::new("/p/app.ts")), vec!["util.ts"]);
//! assert_eq!(analysis.transitive_dependents(Path::new("/p/util.ts")), vec!["app.ts"]);
//! ```

mod analyzer_impl;
pub use analyzer_impl::*;
