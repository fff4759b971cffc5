//! Tree command executor

use miette::{Result, WrapErr};

use super::{Pipeline, write_output};
use crate::config::TreeConfig;
use crate::constants::exit;
use crate::detector::CycleLimits;
use crate::executors::CommandExecutor;
use crate::reports::{ReportGenerator, TreeReportGenerator};

pub struct TreeExecutor;

impl CommandExecutor for TreeExecutor {
    type Config = TreeConfig;

    fn execute(config: Self::Config) -> Result<u8> {
        let mut pipeline = Pipeline::new();
        let graph = pipeline.build_graph(&config.entries, config.build)?;
        let detector = pipeline.detect_cycles(&graph, CycleLimits::default());

        let report = TreeReportGenerator::new()
            .with_warnings(config.show_warnings)
            .generate_report(&graph, &detector)
            .wrap_err("Failed to render the dependency tree")?;

        write_output(config.output.as_deref(), &report)?;
        Ok(exit::SUCCESS)
    }
}
