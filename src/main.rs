use std::process::ExitCode;

/// Main entry point for the dpdm CLI tool
fn main() -> ExitCode {
    // Install miette's panic and error handler for beautiful error reporting
    miette::set_panic_hook();

    match dpdm::run() {
        Ok(code) => ExitCode::from(code),
        Err(report) => {
            eprintln!("{report:?}");
            ExitCode::from(dpdm::exit_codes::FATAL)
        }
    }
}
