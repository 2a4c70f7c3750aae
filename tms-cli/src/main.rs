//! Entry point for the `tms` binary.
#![forbid(unsafe_code)]

use tms_cli::CliError;

fn main() -> eyre::Result<()> {
    tms_cli::logging::init()?;
    match tms_cli::run() {
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        outcome => outcome.map_err(eyre::Report::from),
    }
}
