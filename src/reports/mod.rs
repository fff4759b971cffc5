//! Report generation modules for different output formats
//!
//! This module contains report generators for various output formats:
//! - human: Human-readable console output
//! - tree: The dependency tree below each entry point
//! - json: JSON format for programmatic use
//! - junit: JUnit XML format for CI/CD integration
//! - github: GitHub Actions workflow annotations

pub mod github;
pub mod human;
pub mod json;
pub mod junit;
pub mod tree;

use petgraph::Direction;

use crate::constants::exit;
use crate::detector::CycleDetector;
use crate::error::DpdmError;
use crate::graph::{ModuleGraph, ModuleState};

/// Common trait for all report generators
pub trait ReportGenerator {
    /// Generate a report from a module graph and its cycle detection results
    fn generate_report(
        &self,
        graph: &ModuleGraph,
        detector: &CycleDetector,
    ) -> Result<String, DpdmError>;
}

// Re-export for convenience
pub use github::GitHubReportGenerator;
pub use human::HumanReportGenerator;
pub use json::JsonReportGenerator;
pub use junit::JunitReportGenerator;
pub use tree::TreeReportGenerator;

/// A module that could not be resolved or read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Display name of the failing module
    pub module: String,
    pub message: String,
    /// Modules referencing it, in discovery order
    pub importers: Vec<String>,
}

/// Warnings for every errored module, in discovery order
pub fn collect_warnings(graph: &ModuleGraph) -> Vec<Warning> {
    let inner = graph.graph();
    inner
        .node_indices()
        .filter_map(|idx| {
            let node = &inner[idx];
            let ModuleState::Errored(error) = &node.state else {
                return None;
            };

            let mut importers: Vec<_> = inner
                .neighbors_directed(idx, Direction::Incoming)
                .collect();
            importers.sort();
            importers.dedup();

            Some(Warning {
                module: graph.display(&node.id),
                message: error.to_string(),
                importers: importers
                    .into_iter()
                    .map(|i| graph.display(&inner[i].id))
                    .collect(),
            })
        })
        .collect()
}

/// Exit codes configured with `--exit-code case:code[,case:code]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCodes {
    pub circular: u8,
}

impl Default for ExitCodes {
    fn default() -> Self {
        Self {
            circular: exit::CYCLES_FOUND,
        }
    }
}

impl ExitCodes {
    const CASES: &'static [&'static str] = &["circular"];

    pub fn parse(spec: &str) -> Result<Self, DpdmError> {
        let mut codes = Self::default();

        for case in spec.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            let Some((label, code)) = case.split_once(':') else {
                return Err(DpdmError::ConfigurationError {
                    message: format!("Invalid exit code '{case}', expected <case>:<code>"),
                });
            };
            let code = code
                .trim()
                .parse::<u8>()
                .map_err(|_| DpdmError::ConfigurationError {
                    message: format!("Exit code for '{label}' must be a number from 0 to 255"),
                })?;

            if code == exit::SUCCESS || code == exit::FATAL {
                return Err(DpdmError::ConfigurationError {
                    message: format!(
                        "Exit code for '{}' must differ from {} (success) and {} (fatal error)",
                        label.trim(),
                        exit::SUCCESS,
                        exit::FATAL
                    ),
                });
            }

            match label.trim() {
                "circular" => codes.circular = code,
                other => {
                    return Err(DpdmError::ConfigurationError {
                        message: format!(
                            "Unsupported exit case '{other}', expected one of: {}",
                            Self::CASES.join(", ")
                        ),
                    });
                }
            }
        }

        Ok(codes)
    }
}

/// Process exit code for a finished check
///
/// A truncated search only happens inside a strongly connected component,
/// so it counts as cyclic even when no cycle was kept.
pub fn exit_code(detector: &CycleDetector, codes: &ExitCodes) -> u8 {
    if detector.has_cycles() || detector.is_truncated() {
        codes.circular
    } else {
        exit::SUCCESS
    }
}

/// Graph and detector fixtures shared by the report tests
#[cfg(test)]
pub(crate) mod fixtures {
    use std::path::PathBuf;

    use petgraph::graph::DiGraph;

    use crate::core::{ModuleId, ReferenceKind};
    use crate::detector::CycleDetector;
    use crate::error::{ModuleError, ResolveError};
    use crate::graph::{ImportEdge, ModuleGraph, ModuleNode, ModuleState};

    fn edge(spec: &str, order: usize) -> ImportEdge {
        ImportEdge {
            specifier: spec.to_string(),
            kind: ReferenceKind::Import,
            order,
        }
    }

    /// `index.ts -> a.ts <-> b.ts`, plus `index.ts -> ./missing`
    pub fn cyclic() -> (ModuleGraph, CycleDetector) {
        let mut graph = DiGraph::new();
        let index = graph.add_node(ModuleNode::new(
            ModuleId::file("/p/index.ts"),
            0,
            ModuleState::Scanned,
        ));
        let a = graph.add_node(ModuleNode::new(
            ModuleId::file("/p/src/a.ts"),
            1,
            ModuleState::Scanned,
        ));
        let missing = graph.add_node(ModuleNode::new(
            ModuleId::Unresolved("/p/missing".to_string()),
            1,
            ModuleState::Errored(ModuleError::Resolve(ResolveError::NotFound {
                specifier: "./missing".to_string(),
            })),
        ));
        let b = graph.add_node(ModuleNode::new(
            ModuleId::file("/p/src/b.ts"),
            2,
            ModuleState::Scanned,
        ));
        graph[index].entry = true;
        graph.add_edge(index, a, edge("./src/a", 0));
        graph.add_edge(index, missing, edge("./missing", 1));
        graph.add_edge(a, b, edge("./b", 0));
        graph.add_edge(b, a, edge("./a", 0));

        finish(graph, "/p/index.ts")
    }

    /// `index.ts -> a.ts`
    pub fn acyclic() -> (ModuleGraph, CycleDetector) {
        let mut graph = DiGraph::new();
        let index = graph.add_node(ModuleNode::new(
            ModuleId::file("/p/index.ts"),
            0,
            ModuleState::Scanned,
        ));
        let a = graph.add_node(ModuleNode::new(
            ModuleId::file("/p/a.ts"),
            1,
            ModuleState::Scanned,
        ));
        graph[index].entry = true;
        graph.add_edge(index, a, edge("./a", 0));

        finish(graph, "/p/index.ts")
    }

    fn finish(graph: DiGraph<ModuleNode, ImportEdge>, entry: &str) -> (ModuleGraph, CycleDetector) {
        let graph = ModuleGraph::from_parts(graph, vec![ModuleId::file(entry)], PathBuf::from("/p"));
        let mut detector = CycleDetector::new();
        detector.detect_cycles(graph.graph());
        (graph, detector)
    }
}
