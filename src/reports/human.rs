//! Human-readable console report generation

use std::fmt::Write;

use console::style;

use super::{ReportGenerator, collect_warnings};
use crate::detector::CycleDetector;
use crate::error::DpdmError;
use crate::graph::ModuleGraph;
use crate::utils::string::pluralize;

pub struct HumanReportGenerator {
    max_cycles: Option<usize>,
    show_warnings: bool,
}

impl HumanReportGenerator {
    pub fn new(max_cycles: Option<usize>) -> Self {
        Self {
            max_cycles,
            show_warnings: true,
        }
    }

    pub fn with_warnings(mut self, show_warnings: bool) -> Self {
        self.show_warnings = show_warnings;
        self
    }

    fn write_warnings(&self, graph: &ModuleGraph, output: &mut String) -> Result<(), DpdmError> {
        let warnings = collect_warnings(graph);
        if !self.show_warnings || warnings.is_empty() {
            return Ok(());
        }

        writeln!(
            output,
            "\n{} {} {}:",
            style("⚠").yellow().bold(),
            style(warnings.len()).yellow().bold(),
            pluralize("warning", warnings.len())
        )?;
        for warning in warnings {
            writeln!(
                output,
                "  {} {}",
                style("•").dim(),
                style(&warning.message).yellow()
            )?;
            if !warning.importers.is_empty() {
                writeln!(
                    output,
                    "    {} imported by {}",
                    style("↳").dim(),
                    warning.importers.join(", ")
                )?;
            }
        }
        Ok(())
    }
}

impl ReportGenerator for HumanReportGenerator {
    fn generate_report(
        &self,
        graph: &ModuleGraph,
        detector: &CycleDetector,
    ) -> Result<String, DpdmError> {
        let mut output = String::new();

        writeln!(
            output,
            "\n{} Scanned {} {} from {} {}",
            style("📦").blue(),
            style(graph.module_count()).bold(),
            pluralize("module", graph.module_count()),
            graph.entries().len(),
            pluralize("entry point", graph.entries().len())
        )?;

        if !detector.has_cycles() {
            write!(
                output,
                "\n{} No circular imports detected!\n",
                style("✅").green().bold()
            )?;
            self.write_warnings(graph, &mut output)?;
            return Ok(output);
        }

        write!(
            output,
            "\n{} Found {} circular {}:\n\n",
            style("❌").red().bold(),
            style(detector.cycle_count()).red().bold(),
            pluralize("import", detector.cycle_count())
        )?;

        let total_cycles = detector.cycle_count();
        let shown = self.max_cycles.unwrap_or(total_cycles).min(total_cycles);

        for (i, cycle) in detector.cycles().iter().take(shown).enumerate() {
            writeln!(
                output,
                "{} Cycle #{} ({} {})",
                style("🔄").yellow(),
                i + 1,
                cycle.len(),
                pluralize("module", cycle.len())
            )?;

            for (step, id) in cycle.closed_path().into_iter().enumerate() {
                let arrow = if step == 0 { " " } else { "→" };
                writeln!(
                    output,
                    "  {} {}",
                    style(arrow).dim(),
                    style(graph.display(id)).bold()
                )?;
            }

            writeln!(
                output,
                "\n  {} References creating this cycle:",
                style("🔗").cyan()
            )?;
            for edge in cycle.edges() {
                writeln!(
                    output,
                    "    {} {} imports '{}' ({})",
                    style("→").dim(),
                    style(graph.display(&edge.from)).yellow(),
                    edge.specifier,
                    style(edge.kind).dim()
                )?;
            }
            writeln!(output)?;
        }

        if shown < total_cycles {
            writeln!(
                output,
                "{} Showing {} of {} cycles. Use --max-cycles to see more.",
                style("ℹ️").blue(),
                style(shown).yellow(),
                style(total_cycles).yellow()
            )?;
        }

        if detector.is_truncated() {
            writeln!(
                output,
                "{} Cycle enumeration stopped early; raise --cycle-limit or --max-cycle-length \
                 to search further.",
                style("ℹ️").blue()
            )?;
        }

        self.write_warnings(graph, &mut output)?;

        writeln!(
            output,
            "\n{} To break a cycle, remove or invert at least one of its references.",
            style("💡").yellow()
        )?;
        writeln!(
            output,
            "{} Modules shared by several cycles are the cheapest place to start.",
            style("💡").yellow()
        )?;

        Ok(output)
    }
}
