//! Unused command executor

use console::style;
use miette::{Result, WrapErr};

use super::Pipeline;
use crate::analyzer::DependencyAnalysis;
use crate::config::UnusedConfig;
use crate::constants::exit;
use crate::executors::CommandExecutor;
use crate::utils::string::pluralize;

pub struct UnusedExecutor;

impl CommandExecutor for UnusedExecutor {
    type Config = UnusedConfig;

    fn execute(config: Self::Config) -> Result<u8> {
        let mut pipeline = Pipeline::new();
        let graph = pipeline.build_graph(&config.entries, config.build)?;

        let unused = DependencyAnalysis::new(&graph)
            .unused_files(&config.from)
            .wrap_err("Failed to list candidate files")?;

        for file in &unused {
            println!("{file}");
        }

        if unused.is_empty() {
            eprintln!(
                "{} Every file matching {} is reachable",
                style("✓").green(),
                style(&config.from).bold()
            );
        } else {
            eprintln!(
                "{} {} unused {}",
                style("ℹ").blue(),
                style(unused.len()).yellow().bold(),
                pluralize("file", unused.len())
            );
        }

        Ok(exit::SUCCESS)
    }
}
