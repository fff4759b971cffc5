//! # Cycle Detection Module
//!
//! This module finds circular imports in the module graph.
//!
//! ## Algorithm
//!
//! Tarjan's Strongly Connected Components algorithm first splits the graph
//! into components in O(V + E). Only components with more than one module, or
//! a module importing itself, can contain cycles. Inside each of those,
//! Johnson's circuit search enumerates every simple cycle exactly once,
//! starting from the component's smallest module id so that each cycle is
//! reported in canonical rotation.
//!
//! Enumeration can be exponential in dense components, so [`CycleLimits`]
//! caps the number and length of cycles; hitting a cap marks the result as
//! truncated instead of failing.
//!
//! ## Example
//!
//! ```
//! use dpdm::core::{ModuleId, ReferenceKind};
//! use dpdm::detector::CycleDetector;
//! use dpdm::graph::{ImportEdge, ModuleNode, ModuleState};
//! use petgraph::graph::DiGraph;
//!
//! let mut graph = DiGraph::new();
//! let a = graph.add_node(ModuleNode::new(ModuleId::file("/src/a.ts"), 0, ModuleState::Scanned));
//! let b = graph.add_node(ModuleNode::new(ModuleId::file("/src/b.ts"), 1, ModuleState::Scanned));
//!
//! // a.ts -> b.ts -> a.ts
//! graph.add_edge(a, b, ImportEdge { specifier: "./b".into(), kind: ReferenceKind::Import, order: 0 });
//! graph.add_edge(b, a, ImportEdge { specifier: "./a".into(), kind: ReferenceKind::Import, order: 0 });
//!
//! let mut detector = CycleDetector::new();
//! detector.detect_cycles(&graph);
//!
//! assert!(detector.has_cycles());
//! assert_eq!(detector.cycle_count(), 1);
//! assert_eq!(detector.cycles()[0].closed_path().len(), 3);
//! ```

mod detector_impl;

pub use detector_impl::*;
