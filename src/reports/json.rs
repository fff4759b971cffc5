//! JSON format report generation

use serde_json::{Map, Value, json};

use super::{ReportGenerator, collect_warnings};
use crate::detector::CycleDetector;
use crate::error::DpdmError;
use crate::graph::{ModuleGraph, ModuleState};

pub struct JsonReportGenerator;

impl Default for JsonReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonReportGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Each module mapped to its references, or `null` when it was not scanned
    fn tree(graph: &ModuleGraph) -> Map<String, Value> {
        let inner = graph.graph();
        inner
            .node_indices()
            .map(|idx| {
                let node = &inner[idx];
                let references = match node.state {
                    ModuleState::Scanned => Value::Array(
                        graph
                            .dependencies(idx)
                            .into_iter()
                            .map(|(target, edge)| {
                                let id = if inner[target].is_unresolved() {
                                    Value::Null
                                } else {
                                    Value::String(graph.display(&inner[target].id))
                                };
                                json!({
                                    "issuer": graph.display(&node.id),
                                    "request": edge.specifier,
                                    "kind": edge.kind.to_string(),
                                    "id": id,
                                })
                            })
                            .collect(),
                    ),
                    _ => Value::Null,
                };
                (graph.display(&node.id), references)
            })
            .collect()
    }
}

impl ReportGenerator for JsonReportGenerator {
    fn generate_report(
        &self,
        graph: &ModuleGraph,
        detector: &CycleDetector,
    ) -> Result<String, DpdmError> {
        let entries: Vec<String> = graph.entries().iter().map(|id| graph.display(id)).collect();

        let circulars: Vec<Vec<String>> = detector
            .cycles()
            .iter()
            .map(|cycle| cycle.modules().iter().map(|id| graph.display(id)).collect())
            .collect();

        let cycles: Vec<Value> = detector
            .cycles()
            .iter()
            .map(|cycle| {
                let edges: Vec<Value> = cycle
                    .edges()
                    .iter()
                    .map(|edge| {
                        json!({
                            "from": graph.display(&edge.from),
                            "to": graph.display(&edge.to),
                            "specifier": edge.specifier,
                            "kind": edge.kind.to_string(),
                        })
                    })
                    .collect();

                json!({
                    "modules": cycle.modules().iter().map(|id| graph.display(id)).collect::<Vec<_>>(),
                    "edges": edges,
                })
            })
            .collect();

        let warnings: Vec<Value> = collect_warnings(graph)
            .into_iter()
            .map(|w| {
                json!({
                    "module": w.module,
                    "message": w.message,
                    "importers": w.importers,
                })
            })
            .collect();

        let report = json!({
            "entries": entries,
            "tree": Self::tree(graph),
            "module_count": graph.module_count(),
            "edge_count": graph.edge_count(),
            "has_cycles": detector.has_cycles(),
            "cycle_count": detector.cycle_count(),
            "truncated": detector.is_truncated(),
            "circulars": circulars,
            "cycles": cycles,
            "warnings": warnings,
        });

        serde_json::to_string_pretty(&report).map_err(DpdmError::Json)
    }
}
