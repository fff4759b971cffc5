//! Check command implementation

use miette::{Result, WrapErr};

use crate::cli::Commands;
use crate::common::{ConfigBuilder, FromCommand};
use crate::config::CheckConfig;
use crate::error::DpdmError;
use crate::reports::ExitCodes;

impl FromCommand for CheckConfig {
    fn from_command(command: Commands) -> Result<Self, DpdmError> {
        match command {
            Commands::Check {
                common,
                format,
                cycle_display,
                exit_code,
                fail_on_unresolved,
                no_warning,
                output,
            } => {
                let exit_codes = match exit_code {
                    Some(spec) => ExitCodes::parse(&spec)?,
                    None => ExitCodes::default(),
                };

                CheckConfig::builder()
                    .with_build(common.build_config()?)
                    .with_entries(common.entries)
                    .with_format(format.format)
                    .with_limits(cycle_display.limits())
                    .with_max_cycles(cycle_display.max_cycles)
                    .with_exit_codes(exit_codes)
                    .with_fail_on_unresolved(fail_on_unresolved)
                    .with_show_warnings(!no_warning)
                    .with_output(output)
                    .build()
            }
            _ => Err(DpdmError::ConfigurationError {
                message: "Invalid command type for CheckConfig".to_string(),
            }),
        }
    }
}

crate::impl_try_from_command!(CheckConfig);

/// Execute the check command for detecting circular imports
pub fn execute_check_command(command: Commands) -> Result<u8> {
    let config = CheckConfig::from_command(command)
        .wrap_err("Failed to parse check command configuration")?;

    use crate::executors::CommandExecutor;
    use crate::executors::check::CheckExecutor;
    CheckExecutor::execute(config)
}
