//! Analyze command executor

use miette::{IntoDiagnostic, Result, WrapErr};

use super::{Pipeline, write_output};
use crate::analyzer::DependencyAnalysis;
use crate::config::AnalyzeConfig;
use crate::constants::exit;
use crate::executors::CommandExecutor;

pub struct AnalyzeExecutor;

impl CommandExecutor for AnalyzeExecutor {
    type Config = AnalyzeConfig;

    fn execute(config: Self::Config) -> Result<u8> {
        let mut pipeline = Pipeline::new();
        let graph = pipeline.build_graph(&config.entries, config.build)?;

        let report = DependencyAnalysis::new(&graph).analyze(&config.files, config.reverse);
        let mut json = serde_json::to_string_pretty(&report)
            .into_diagnostic()
            .wrap_err("Failed to serialize analysis result")?;
        json.push('\n');

        write_output(config.output.as_deref(), &json)?;
        Ok(exit::SUCCESS)
    }
}
