//! Analyze command implementation

use miette::{Result, WrapErr};

use crate::cli::Commands;
use crate::common::{ConfigBuilder, FromCommand};
use crate::config::AnalyzeConfig;
use crate::error::DpdmError;

impl FromCommand for AnalyzeConfig {
    fn from_command(command: Commands) -> Result<Self, DpdmError> {
        match command {
            Commands::Analyze {
                common,
                files,
                reverse,
                output,
            } => AnalyzeConfig::builder()
                .with_build(common.build_config()?)
                .with_entries(common.entries)
                .with_files(files)
                .with_reverse(reverse)
                .with_output(output)
                .build(),
            _ => Err(DpdmError::ConfigurationError {
                message: "Invalid command type for AnalyzeConfig".to_string(),
            }),
        }
    }
}

crate::impl_try_from_command!(AnalyzeConfig);

/// Execute the analyze command for listing transitive dependencies
pub fn execute_analyze_command(command: Commands) -> Result<u8> {
    let config = AnalyzeConfig::from_command(command)
        .wrap_err("Failed to parse analyze command configuration")?;

    use crate::executors::CommandExecutor;
    use crate::executors::analyze::AnalyzeExecutor;
    AnalyzeExecutor::execute(config)
}
