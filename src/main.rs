//! Storefront cart CLI

use std::{io, process::ExitCode};

use tracing::error;

use crate::cli::Cli;

mod cli;
mod config;
mod observability;

fn main() -> ExitCode {
    let cli = Cli::load().unwrap_or_else(|error| error.exit());

    if let Err(error) = observability::init_subscriber(&cli.config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized, must use eprintln for setup errors"
        )]
        {
            eprintln!("Logging error: {error}");
        }

        return ExitCode::FAILURE;
    }

    let mut stdout = io::stdout().lock();

    match cli.run(&mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(source) => {
            error!(%source, "command failed");

            #[expect(
                clippy::print_stderr,
                reason = "command errors are user-facing output"
            )]
            {
                eprintln!("error: {source}");
            }

            ExitCode::FAILURE
        }
    }
}
