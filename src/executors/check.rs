//! Check command executor

use console::style;
use miette::{Result, WrapErr};

use super::{Pipeline, write_output};
use crate::cli::OutputFormat;
use crate::config::CheckConfig;
use crate::error::DpdmError;
use crate::executors::CommandExecutor;
use crate::reports::{
    GitHubReportGenerator, HumanReportGenerator, JsonReportGenerator, JunitReportGenerator,
    ReportGenerator, exit_code,
};

pub struct CheckExecutor;

impl CommandExecutor for CheckExecutor {
    type Config = CheckConfig;

    fn execute(config: Self::Config) -> Result<u8> {
        eprintln!("{} Checking for circular imports...\n", style("🔁").cyan());

        let mut pipeline = Pipeline::new();
        let graph = pipeline.build_graph(&config.entries, config.build)?;
        let detector = pipeline.detect_cycles(&graph, config.limits);

        // Generate report based on format
        let report = match config.format {
            OutputFormat::Human => HumanReportGenerator::new(config.max_cycles)
                .with_warnings(config.show_warnings)
                .generate_report(&graph, &detector),
            OutputFormat::Json => JsonReportGenerator::new().generate_report(&graph, &detector),
            OutputFormat::Junit => JunitReportGenerator::new().generate_report(&graph, &detector),
            OutputFormat::GitHub => {
                GitHubReportGenerator::new().generate_report(&graph, &detector)
            }
        }
        .wrap_err("Failed to generate report")?;

        write_output(config.output.as_deref(), &report)?;

        let unresolved = graph.unresolved_count();
        if config.fail_on_unresolved && unresolved > 0 {
            return Err(DpdmError::UnresolvedModules { count: unresolved }.into());
        }

        Ok(exit_code(&detector, &config.exit_codes))
    }
}
