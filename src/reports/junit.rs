//! JUnit XML format report generation
//!
//! One test case per cycle, so CI dashboards list every circular import as
//! its own failure.

use std::fmt::Write;

use super::{ReportGenerator, collect_warnings};
use crate::detector::CycleDetector;
use crate::error::DpdmError;
use crate::graph::ModuleGraph;

pub struct JunitReportGenerator;

impl Default for JunitReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl JunitReportGenerator {
    pub fn new() -> Self {
        Self
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl ReportGenerator for JunitReportGenerator {
    fn generate_report(
        &self,
        graph: &ModuleGraph,
        detector: &CycleDetector,
    ) -> Result<String, DpdmError> {
        let mut output = String::new();
        let failures = detector.cycle_count();
        let tests = failures.max(1);
        let warnings = collect_warnings(graph);

        writeln!(output, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            output,
            r#"<testsuites name="dpdm" tests="{tests}" failures="{failures}">"#
        )?;
        writeln!(
            output,
            r#"  <testsuite name="circular-imports" tests="{tests}" failures="{failures}">"#
        )?;

        if detector.has_cycles() {
            for (i, cycle) in detector.cycles().iter().enumerate() {
                let chain: Vec<String> = cycle
                    .closed_path()
                    .into_iter()
                    .map(|id| graph.display(id))
                    .collect();
                let chain = escape(&chain.join(" → "));

                writeln!(
                    output,
                    r#"    <testcase name="cycle-{}" classname="dpdm.circular">"#,
                    i + 1
                )?;
                writeln!(output, r#"      <failure message="{chain}">"#)?;
                for edge in cycle.edges() {
                    writeln!(
                        output,
                        "{} imports '{}' ({})",
                        escape(&graph.display(&edge.from)),
                        escape(&edge.specifier),
                        edge.kind
                    )?;
                }
                writeln!(output, r#"      </failure>"#)?;
                writeln!(output, r#"    </testcase>"#)?;
            }
        } else {
            writeln!(
                output,
                r#"    <testcase name="check-circular-imports" classname="dpdm.circular" />"#
            )?;
        }

        if !warnings.is_empty() {
            writeln!(output, r#"    <system-err>"#)?;
            for warning in warnings {
                writeln!(output, "{}", escape(&warning.message))?;
            }
            writeln!(output, r#"    </system-err>"#)?;
        }

        writeln!(output, r#"  </testsuite>"#)?;
        writeln!(output, r#"</testsuites>"#)?;

        Ok(output)
    }
}
