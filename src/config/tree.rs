//! Tree command configuration

use std::path::PathBuf;

use super::{BuildConfig, missing};
use crate::error::DpdmError;

#[derive(Debug, Clone)]
pub struct TreeConfig {
    pub entries: Vec<String>,
    pub build: BuildConfig,
    pub show_warnings: bool,
    pub output: Option<PathBuf>,
}

impl TreeConfig {
    pub fn builder() -> TreeConfigBuilder {
        TreeConfigBuilder::default()
    }
}

#[derive(Default)]
pub struct TreeConfigBuilder {
    entries: Option<Vec<String>>,
    build: Option<BuildConfig>,
    show_warnings: Option<bool>,
    output: Option<Option<PathBuf>>,
}

impl TreeConfigBuilder {
    pub fn with_entries(mut self, entries: Vec<String>) -> Self {
        self.entries = Some(entries);
        self
    }

    pub fn with_build(mut self, build: BuildConfig) -> Self {
        self.build = Some(build);
        self
    }

    pub fn with_show_warnings(mut self, show_warnings: bool) -> Self {
        self.show_warnings = Some(show_warnings);
        self
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = Some(output);
        self
    }
}

impl crate::common::ConfigBuilder for TreeConfigBuilder {
    type Config = TreeConfig;

    fn build(self) -> Result<Self::Config, DpdmError> {
        Ok(TreeConfig {
            entries: self.entries.ok_or_else(|| missing("entries"))?,
            build: self.build.ok_or_else(|| missing("build"))?,
            show_warnings: self.show_warnings.unwrap_or(true),
            output: self.output.ok_or_else(|| missing("output"))?,
        })
    }
}
