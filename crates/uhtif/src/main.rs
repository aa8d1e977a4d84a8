// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! `uhtif` binary: maps the UIO window and runs one session.

use std::process::ExitCode;

use tracing::{debug, error, info};
use uhtif::cli::Cli;
use uhtif::shutdown::Shutdown;
use uhtif::{driver, logging};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let (cli, ignored) = match Cli::parse_with_plusargs(std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(err) => err.exit(),
    };
    logging::init(cli.verbose);
    info!(version = uhtif::VERSION, "uhtif starting");
    for arg in &ignored {
        debug!(%arg, "ignoring plusarg");
    }

    let mut shutdown = match Shutdown::install() {
        Ok(shutdown) => shutdown,
        Err(err) => {
            error!("cannot install signal handlers: {err}");
            return ExitCode::FAILURE;
        }
    };

    match driver::run(&cli, shutdown.wait()).await {
        Ok(outcome) => {
            info!(?outcome, "session finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
