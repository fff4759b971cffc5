//! Tree command implementation

use miette::{Result, WrapErr};

use crate::cli::Commands;
use crate::common::{ConfigBuilder, FromCommand};
use crate::config::TreeConfig;
use crate::error::DpdmError;

impl FromCommand for TreeConfig {
    fn from_command(command: Commands) -> Result<Self, DpdmError> {
        match command {
            Commands::Tree {
                common,
                no_warning,
                output,
            } => TreeConfig::builder()
                .with_build(common.build_config()?)
                .with_entries(common.entries)
                .with_show_warnings(!no_warning)
                .with_output(output)
                .build(),
            _ => Err(DpdmError::ConfigurationError {
                message: "Invalid command type for TreeConfig".to_string(),
            }),
        }
    }
}

crate::impl_try_from_command!(TreeConfig);

/// Execute the tree command for printing the dependency tree
pub fn execute_tree_command(command: Commands) -> Result<u8> {
    let config = TreeConfig::from_command(command)
        .wrap_err("Failed to parse tree command configuration")?;

    use crate::executors::CommandExecutor;
    use crate::executors::tree::TreeExecutor;
    TreeExecutor::execute(config)
}
