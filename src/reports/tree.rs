//! Dependency tree report
//!
//! Walks the graph depth first from each entry point. Every module gets a
//! number the first time it is printed; later occurrences reuse the number
//! and are not expanded again.

use std::collections::HashMap;
use std::fmt::Write;

use console::style;
use petgraph::graph::NodeIndex;

use super::{ReportGenerator, collect_warnings};
use crate::detector::CycleDetector;
use crate::error::DpdmError;
use crate::graph::{ModuleGraph, ModuleState};

const INDENT: &str = "    ";

pub struct TreeReportGenerator {
    show_warnings: bool,
}

impl Default for TreeReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeReportGenerator {
    pub fn new() -> Self {
        Self {
            show_warnings: true,
        }
    }

    pub fn with_warnings(mut self, show_warnings: bool) -> Self {
        self.show_warnings = show_warnings;
        self
    }

    fn annotation(state: &ModuleState) -> Option<String> {
        match state {
            ModuleState::Skipped(reason) => Some(format!("[{reason}]")),
            ModuleState::Errored(_) => Some("[unresolved]".to_string()),
            ModuleState::Pending | ModuleState::Scanned => None,
        }
    }
}

impl ReportGenerator for TreeReportGenerator {
    fn generate_report(
        &self,
        graph: &ModuleGraph,
        detector: &CycleDetector,
    ) -> Result<String, DpdmError> {
        let inner = graph.graph();
        let mut output = String::new();
        let mut numbers: HashMap<NodeIndex, usize> = HashMap::new();

        writeln!(output, "{} Dependencies Tree", style("•").bold())?;

        let roots: Vec<NodeIndex> = graph
            .entries()
            .iter()
            .rev()
            .filter_map(|id| graph.index_of(id))
            .collect();
        let mut stack: Vec<(NodeIndex, usize)> = roots.into_iter().map(|idx| (idx, 1)).collect();

        while let Some((idx, level)) = stack.pop() {
            let node = &inner[idx];
            let pad = INDENT.repeat(level);
            let name = graph.display(&node.id);
            let note = Self::annotation(&node.state)
                .map(|n| format!(" {}", style(n).dim()))
                .unwrap_or_default();

            if let Some(number) = numbers.get(&idx) {
                writeln!(
                    output,
                    "{pad}{} {}) {}{note}",
                    style("·").dim(),
                    number,
                    style(name).dim()
                )?;
                continue;
            }

            let number = numbers.len();
            numbers.insert(idx, number);
            writeln!(output, "{pad}- {number}) {name}{note}")?;

            for (child, _) in graph.dependencies(idx).into_iter().rev() {
                stack.push((child, level + 1));
            }
        }

        if detector.has_cycles() {
            writeln!(
                output,
                "\n{} {} circular imports, run `dpdm check` for details",
                style("⚠").yellow().bold(),
                detector.cycle_count()
            )?;
        }

        if self.show_warnings {
            let warnings = collect_warnings(graph);
            if !warnings.is_empty() {
                writeln!(output, "\n{} Warnings", style("•").bold())?;
                for (i, warning) in warnings.iter().enumerate() {
                    writeln!(
                        output,
                        "{INDENT}{}) {}",
                        i + 1,
                        style(&warning.message).yellow()
                    )?;
                }
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use console::strip_ansi_codes;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::reports::fixtures;

    #[test]
    fn test_tree_numbers_modules_and_marks_repeats() {
        let (graph, detector) = fixtures::cyclic();
        let report = TreeReportGenerator::new()
            .with_warnings(false)
            .generate_report(&graph, &detector)
            .unwrap();
        let report = strip_ansi_codes(&report);

        let lines: Vec<&str> = report.lines().take(6).collect();
        assert_eq!(
            lines,
            vec![
                "• Dependencies Tree",
                "    - 0) index.ts",
                "        - 1) src/a.ts",
                "            - 2) src/b.ts",
                "                · 1) src/a.ts",
                "        - 3) missing [unresolved]",
            ]
        );
        assert!(report.contains("1 circular imports"));
        assert!(!report.contains("Warnings"));
    }

    #[test]
    fn test_tree_lists_warnings() {
        let (graph, detector) = fixtures::cyclic();
        let report = TreeReportGenerator::new()
            .generate_report(&graph, &detector)
            .unwrap();

        assert!(strip_ansi_codes(&report).contains("1) Cannot find module './missing'"));
    }

    #[test]
    fn test_tree_without_cycles() {
        let (graph, detector) = fixtures::acyclic();
        let report = TreeReportGenerator::new()
            .generate_report(&graph, &detector)
            .unwrap();
        let report = strip_ansi_codes(&report);

        assert!(report.contains("- 1) a.ts"));
        assert!(!report.contains("circular"));
    }
}
