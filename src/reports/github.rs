//! GitHub Actions format report generation

use std::fmt::Write;

use super::{ReportGenerator, collect_warnings};
use crate::detector::CycleDetector;
use crate::error::DpdmError;
use crate::graph::ModuleGraph;
use crate::utils::string::pluralize;

pub struct GitHubReportGenerator;

impl Default for GitHubReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl GitHubReportGenerator {
    pub fn new() -> Self {
        Self
    }
}

// Workflow commands end at a newline and treat `%` as an escape
fn escape_data(text: &str) -> String {
    text.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(text: &str) -> String {
    escape_data(text).replace(':', "%3A").replace(',', "%2C")
}

impl ReportGenerator for GitHubReportGenerator {
    fn generate_report(
        &self,
        graph: &ModuleGraph,
        detector: &CycleDetector,
    ) -> Result<String, DpdmError> {
        let mut output = String::new();

        for warning in collect_warnings(graph) {
            match warning.importers.first() {
                Some(importer) => writeln!(
                    output,
                    "::warning file={},title=Unresolved import::{}",
                    escape_property(importer),
                    escape_data(&warning.message)
                )?,
                None => writeln!(
                    output,
                    "::warning title=Unresolved import::{}",
                    escape_data(&warning.message)
                )?,
            }
        }

        if !detector.has_cycles() {
            writeln!(
                output,
                "::notice title=Circular Imports::No circular imports detected! ✅"
            )?;
            return Ok(output);
        }

        writeln!(
            output,
            "::error title=Circular Imports::Found {} circular {}",
            detector.cycle_count(),
            pluralize("import", detector.cycle_count())
        )?;

        for (i, cycle) in detector.cycles().iter().enumerate() {
            let chain: Vec<String> = cycle
                .closed_path()
                .into_iter()
                .map(|id| graph.display(id))
                .collect();

            match cycle.edges().first() {
                Some(edge) if edge.from.is_file() => writeln!(
                    output,
                    "::error file={},title=Cycle {}::{}",
                    escape_property(&graph.display(&edge.from)),
                    i + 1,
                    escape_data(&chain.join(" → "))
                )?,
                _ => writeln!(
                    output,
                    "::error title=Cycle {}::{}",
                    i + 1,
                    escape_data(&chain.join(" → "))
                )?,
            }
        }

        if detector.is_truncated() {
            writeln!(
                output,
                "::notice title=Circular Imports::Cycle enumeration stopped early; the list may \
                 be incomplete"
            )?;
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::reports::fixtures;

    #[test]
    fn test_github_annotations() {
        let (graph, detector) = fixtures::cyclic();
        let report = GitHubReportGenerator::new()
            .generate_report(&graph, &detector)
            .unwrap();

        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(
            lines,
            vec![
                "::warning file=index.ts,title=Unresolved import::Cannot find module './missing'",
                "::error title=Circular Imports::Found 1 circular import",
                "::error file=src/a.ts,title=Cycle 1::src/a.ts → src/b.ts → src/a.ts",
            ]
        );
    }

    #[test]
    fn test_github_clean() {
        let (graph, detector) = fixtures::acyclic();
        let report = GitHubReportGenerator::new()
            .generate_report(&graph, &detector)
            .unwrap();

        assert!(report.starts_with("::notice"));
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_data("50%\nnext"), "50%25%0Anext");
        assert_eq!(escape_property("a:b,c"), "a%3Ab%2Cc");
    }
}
