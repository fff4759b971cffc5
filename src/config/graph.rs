//! Graph command configuration

use std::path::PathBuf;

use super::{BuildConfig, missing};
use crate::cli::GraphFormat;
use crate::error::DpdmError;

#[derive(Debug, Clone)]
pub struct GraphOptions {
    pub entries: Vec<String>,
    pub build: BuildConfig,
    pub format: GraphFormat,
    pub output: Option<PathBuf>,
    pub highlight_cycles: bool,
}

impl GraphOptions {
    pub fn builder() -> GraphOptionsBuilder {
        GraphOptionsBuilder::new()
    }
}

#[derive(Default)]
pub struct GraphOptionsBuilder {
    entries: Option<Vec<String>>,
    build: Option<BuildConfig>,
    format: Option<GraphFormat>,
    output: Option<Option<PathBuf>>,
    highlight_cycles: Option<bool>,
}

impl GraphOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(mut self, entries: Vec<String>) -> Self {
        self.entries = Some(entries);
        self
    }

    pub fn with_build(mut self, build: BuildConfig) -> Self {
        self.build = Some(build);
        self
    }

    pub fn with_format(mut self, format: GraphFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_highlight_cycles(mut self, highlight_cycles: bool) -> Self {
        self.highlight_cycles = Some(highlight_cycles);
        self
    }
}

impl crate::common::ConfigBuilder for GraphOptionsBuilder {
    type Config = GraphOptions;

    fn build(self) -> Result<Self::Config, DpdmError> {
        Ok(GraphOptions {
            entries: self.entries.ok_or_else(|| missing("entries"))?,
            build: self.build.ok_or_else(|| missing("build"))?,
            format: self.format.ok_or_else(|| missing("format"))?,
            output: self.output.ok_or_else(|| missing("output"))?,
            highlight_cycles: self
                .highlight_cycles
                .ok_or_else(|| missing("highlight_cycles"))?,
        })
    }
}
