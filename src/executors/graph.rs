//! Graph command executor

use std::fs::File;
use std::io::{self, BufWriter, Write};

use console::style;
use miette::{IntoDiagnostic, Result, WrapErr};

use super::Pipeline;
use crate::cli::GraphFormat;
use crate::config::GraphOptions;
use crate::constants::exit;
use crate::executors::CommandExecutor;
use crate::graph::GraphRenderer;

pub struct GraphExecutor;

impl CommandExecutor for GraphExecutor {
    type Config = GraphOptions;

    fn execute(config: Self::Config) -> Result<u8> {
        eprintln!(
            "{} Generating {} module graph...",
            style("📊").cyan(),
            format!("{:?}", config.format).to_lowercase()
        );

        let mut pipeline = Pipeline::new();
        let graph = pipeline.build_graph(&config.entries, config.build)?;

        // Detect cycles if highlighting is requested
        let cycles = if config.highlight_cycles {
            pipeline
                .detect_cycles(&graph, Default::default())
                .cycles()
                .to_vec()
        } else {
            Vec::new()
        };

        let renderer = GraphRenderer::new(config.highlight_cycles);

        // Determine output destination
        let mut output_writer: Box<dyn Write> = if let Some(output_path) = config.output.as_ref()
        {
            Box::new(BufWriter::new(
                File::create(output_path)
                    .into_diagnostic()
                    .wrap_err_with(|| {
                        format!("Failed to create output file '{}'", output_path.display())
                    })?,
            ))
        } else {
            Box::new(io::stdout())
        };

        match config.format {
            GraphFormat::Mermaid => renderer
                .render_mermaid(&graph, &cycles, output_writer.as_mut())
                .wrap_err("Failed to render Mermaid graph")?,
            GraphFormat::Dot => renderer
                .render_dot(&graph, &cycles, output_writer.as_mut())
                .wrap_err("Failed to render DOT graph")?,
        }
        output_writer
            .flush()
            .into_diagnostic()
            .wrap_err("Failed to flush graph output")?;

        if let Some(output_path) = config.output {
            eprintln!(
                "{} Graph written to {}",
                style("✓").green(),
                style(output_path.display()).bold()
            );
        }

        Ok(exit::SUCCESS)
    }
}
