//! Unused command implementation

use miette::{Result, WrapErr};

use crate::cli::Commands;
use crate::common::{ConfigBuilder, FromCommand};
use crate::config::UnusedConfig;
use crate::error::DpdmError;

impl FromCommand for UnusedConfig {
    fn from_command(command: Commands) -> Result<Self, DpdmError> {
        match command {
            Commands::Unused { common, from } => UnusedConfig::builder()
                .with_build(common.build_config()?)
                .with_entries(common.entries)
                .with_from(from)
                .build(),
            _ => Err(DpdmError::ConfigurationError {
                message: "Invalid command type for UnusedConfig".to_string(),
            }),
        }
    }
}

crate::impl_try_from_command!(UnusedConfig);

/// Execute the unused command for finding unreachable files
pub fn execute_unused_command(command: Commands) -> Result<u8> {
    let config = UnusedConfig::from_command(command)
        .wrap_err("Failed to parse unused command configuration")?;

    use crate::executors::CommandExecutor;
    use crate::executors::unused::UnusedExecutor;
    UnusedExecutor::execute(config)
}
