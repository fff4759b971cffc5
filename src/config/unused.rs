//! Unused command configuration

use super::{BuildConfig, missing};
use crate::error::DpdmError;

#[derive(Debug, Clone)]
pub struct UnusedConfig {
    pub entries: Vec<String>,
    pub build: BuildConfig,
    /// Glob of candidate files
    pub from: String,
}

impl UnusedConfig {
    pub fn builder() -> UnusedConfigBuilder {
        UnusedConfigBuilder::default()
    }
}

#[derive(Default)]
pub struct UnusedConfigBuilder {
    entries: Option<Vec<String>>,
    build: Option<BuildConfig>,
    from: Option<String>,
}

impl UnusedConfigBuilder {
    pub fn with_entries(mut self, entries: Vec<String>) -> Self {
        self.entries = Some(entries);
        self
    }

    pub fn with_build(mut self, build: BuildConfig) -> Self {
        self.build = Some(build);
        self
    }

    pub fn with_from(mut self, from: String) -> Self {
        self.from = Some(from);
        self
    }
}

impl crate::common::ConfigBuilder for UnusedConfigBuilder {
    type Config = UnusedConfig;

    fn build(self) -> Result<Self::Config, DpdmError> {
        Ok(UnusedConfig {
            entries: self.entries.ok_or_else(|| missing("entries"))?,
            build: self.build.ok_or_else(|| missing("build"))?,
            from: self.from.ok_or_else(|| missing("from"))?,
        })
    }
}
