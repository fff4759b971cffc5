//! Analyze command configuration

use std::path::PathBuf;

use super::{BuildConfig, missing};
use crate::error::DpdmError;

#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    pub entries: Vec<String>,
    pub build: BuildConfig,
    /// Files whose dependencies are listed
    pub files: Vec<String>,
    /// List dependents instead of dependencies
    pub reverse: bool,
    pub output: Option<PathBuf>,
}

impl AnalyzeConfig {
    pub fn builder() -> AnalyzeConfigBuilder {
        AnalyzeConfigBuilder::default()
    }
}

#[derive(Default)]
pub struct AnalyzeConfigBuilder {
    entries: Option<Vec<String>>,
    build: Option<BuildConfig>,
    files: Option<Vec<String>>,
    reverse: Option<bool>,
    output: Option<Option<PathBuf>>,
}

impl AnalyzeConfigBuilder {
    pub fn with_entries(mut self, entries: Vec<String>) -> Self {
        self.entries = Some(entries);
        self
    }

    pub fn with_build(mut self, build: BuildConfig) -> Self {
        self.build = Some(build);
        self
    }

    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.files = Some(files);
        self
    }

    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = Some(reverse);
        self
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = Some(output);
        self
    }
}

impl crate::common::ConfigBuilder for AnalyzeConfigBuilder {
    type Config = AnalyzeConfig;

    fn build(self) -> Result<Self::Config, DpdmError> {
        let files = self.files.ok_or_else(|| missing("files"))?;
        if files.is_empty() {
            return Err(DpdmError::ConfigurationError {
                message: "At least one --file is required".to_string(),
            });
        }

        Ok(AnalyzeConfig {
            entries: self.entries.ok_or_else(|| missing("entries"))?,
            build: self.build.ok_or_else(|| missing("build"))?,
            files,
            reverse: self.reverse.unwrap_or(false),
            output: self.output.ok_or_else(|| missing("output"))?,
        })
    }
}
