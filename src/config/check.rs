//! Check command configuration

use std::path::PathBuf;

use super::{BuildConfig, missing};
use crate::cli::OutputFormat;
use crate::detector::CycleLimits;
use crate::error::DpdmError;
use crate::reports::ExitCodes;

/// Configuration for the check command
///
/// This struct contains all options for detecting and reporting circular
/// imports.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// Entry files, directories or globs
    pub entries: Vec<String>,
    pub build: BuildConfig,
    /// Output format for the report
    pub format: OutputFormat,
    /// Caps on cycle enumeration
    pub limits: CycleLimits,
    /// Maximum number of cycles to display (None = all)
    pub max_cycles: Option<usize>,
    pub exit_codes: ExitCodes,
    /// Treat unresolved imports as a fatal error
    pub fail_on_unresolved: bool,
    pub show_warnings: bool,
    pub output: Option<PathBuf>,
}

impl CheckConfig {
    pub fn builder() -> CheckConfigBuilder {
        CheckConfigBuilder::new()
    }
}

#[derive(Default)]
pub struct CheckConfigBuilder {
    entries: Option<Vec<String>>,
    build: Option<BuildConfig>,
    format: Option<OutputFormat>,
    limits: Option<CycleLimits>,
    max_cycles: Option<Option<usize>>,
    exit_codes: Option<ExitCodes>,
    fail_on_unresolved: Option<bool>,
    show_warnings: Option<bool>,
    output: Option<Option<PathBuf>>,
}

impl CheckConfigBuilder {
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

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_limits(mut self, limits: CycleLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn with_max_cycles(mut self, max_cycles: Option<usize>) -> Self {
        self.max_cycles = Some(max_cycles);
        self
    }

    pub fn with_exit_codes(mut self, exit_codes: ExitCodes) -> Self {
        self.exit_codes = Some(exit_codes);
        self
    }

    pub fn with_fail_on_unresolved(mut self, fail_on_unresolved: bool) -> Self {
        self.fail_on_unresolved = Some(fail_on_unresolved);
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

impl crate::common::ConfigBuilder for CheckConfigBuilder {
    type Config = CheckConfig;

    fn build(self) -> Result<Self::Config, DpdmError> {
        let limits = self.limits.unwrap_or_default();
        if limits.max_cycles == Some(0) {
            return Err(DpdmError::ConfigurationError {
                message: "--cycle-limit must be at least 1".to_string(),
            });
        }
        if limits.max_length == Some(0) {
            return Err(DpdmError::ConfigurationError {
                message: "--max-cycle-length must be at least 1".to_string(),
            });
        }

        Ok(CheckConfig {
            entries: self.entries.ok_or_else(|| missing("entries"))?,
            build: self.build.ok_or_else(|| missing("build"))?,
            format: self.format.ok_or_else(|| missing("format"))?,
            limits,
            max_cycles: self.max_cycles.ok_or_else(|| missing("max_cycles"))?,
            exit_codes: self.exit_codes.unwrap_or_default(),
            fail_on_unresolved: self
                .fail_on_unresolved
                .ok_or_else(|| missing("fail_on_unresolved"))?,
            show_warnings: self.show_warnings.unwrap_or(true),
            output: self.output.ok_or_else(|| missing("output"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ConfigBuilder;

    fn build_config() -> BuildConfig {
        BuildConfig::builder()
            .with_context(PathBuf::from("/project"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let config = CheckConfig::builder()
            .with_entries(vec!["src".to_string()])
            .with_build(build_config())
            .with_format(OutputFormat::Human)
            .with_max_cycles(None)
            .with_fail_on_unresolved(false)
            .with_output(None)
            .build()
            .unwrap();

        assert_eq!(config.exit_codes, ExitCodes::default());
        assert_eq!(config.limits, CycleLimits::default());
        assert!(config.show_warnings);
    }

    fn with_limits(limits: CycleLimits) -> Result<CheckConfig, DpdmError> {
        CheckConfig::builder()
            .with_entries(vec!["src".to_string()])
            .with_build(build_config())
            .with_format(OutputFormat::Human)
            .with_limits(limits)
            .with_max_cycles(None)
            .with_fail_on_unresolved(false)
            .with_output(None)
            .build()
    }

    #[test]
    fn test_zero_cycle_limit_is_rejected() {
        let err = with_limits(CycleLimits {
            max_cycles: Some(0),
            max_length: None,
        })
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Configuration error: --cycle-limit must be at least 1"
        );
    }

    #[test]
    fn test_zero_cycle_length_is_rejected() {
        let err = with_limits(CycleLimits {
            max_cycles: None,
            max_length: Some(0),
        })
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Configuration error: --max-cycle-length must be at least 1"
        );
    }

    #[test]
    fn test_positive_limits_are_kept() {
        let limits = CycleLimits {
            max_cycles: Some(1),
            max_length: Some(2),
        };
        assert_eq!(with_limits(limits).unwrap().limits, limits);
    }

    #[test]
    fn test_builder_missing_field() {
        let err = CheckConfig::builder()
            .with_build(build_config())
            .build()
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Configuration error: Missing required field: entries"
        );
    }
}
