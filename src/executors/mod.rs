//! Command executors that handle the actual logic for each command

pub mod analyze;
pub mod check;
pub mod graph;
pub mod tree;
pub mod unused;

use std::fs;
use std::path::Path;

use console::style;
use miette::{IntoDiagnostic, Result, WrapErr};

use crate::config::BuildConfig;
use crate::detector::{CycleDetector, CycleLimits};
use crate::graph::{ModuleGraph, ModuleGraphBuilder};
use crate::progress::ProgressReporter;

/// Trait for command executors
pub trait CommandExecutor {
    type Config;

    /// Execute the command with the given configuration, returning the
    /// process exit code
    fn execute(config: Self::Config) -> Result<u8>;
}

/// Graph building and cycle detection with terminal progress
pub(crate) struct Pipeline {
    progress: Option<ProgressReporter>,
}

impl Pipeline {
    pub(crate) fn new() -> Self {
        Self {
            progress: ProgressReporter::for_terminal(),
        }
    }

    pub(crate) fn build_graph(
        &mut self,
        entries: &[String],
        config: BuildConfig,
    ) -> Result<ModuleGraph> {
        let builder = ModuleGraphBuilder::new(config)
            .wrap_err("Failed to prepare the module resolver")?;

        if let Some(p) = self.progress.as_mut() {
            p.start_graph_building();
        }

        let result = builder
            .resolve_entries(entries)
            .and_then(|ids| Ok(builder.build(&ids, self.progress.as_ref())?));

        match result {
            Ok(graph) => {
                if let Some(p) = self.progress.as_mut() {
                    p.finish_graph_building(graph.module_count());
                }
                Ok(graph)
            }
            Err(e) => {
                if let Some(p) = self.progress.as_mut() {
                    p.abandon();
                }
                Err(e).wrap_err("Failed to build the module graph")
            }
        }
    }

    pub(crate) fn detect_cycles(&self, graph: &ModuleGraph, limits: CycleLimits) -> CycleDetector {
        if let Some(p) = self.progress.as_ref() {
            p.start_cycle_detection();
        }

        let mut detector = CycleDetector::with_limits(limits);
        detector.detect_cycles(graph.graph());

        if let Some(p) = self.progress.as_ref() {
            p.finish_cycle_detection(detector.cycle_count());
        }
        detector
    }
}

/// Print `content` to stdout, or write it to `output` when given
pub(crate) fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to write output file '{}'", path.display()))?;
            eprintln!(
                "{} Output written to {}",
                style("✓").green(),
                style(path.display()).bold()
            );
        }
        None => print!("{content}"),
    }
    Ok(())
}
