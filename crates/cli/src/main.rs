// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tfr: command-line envelope around the step engine

mod cli;
mod commands;
mod exit_error;
mod logging;

use clap::Parser;

use crate::cli::{Cli, Command};
use crate::exit_error::{ExitError, EXIT_USAGE};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let log_guard = logging::init(cli.verbose, tfr_engine::env::log_dir().as_deref());

    let result = match cli.command {
        Command::Invoke(args) => commands::invoke::handle(args).await,
    };

    if let Err(err) = result {
        let code = match err.downcast_ref::<ExitError>() {
            Some(exit) => {
                if !exit.message.is_empty() {
                    eprintln!("{}", exit.message);
                }
                exit.code
            }
            None => {
                tracing::error!(error = %format!("{err:#}"), "tfr failed");
                eprintln!("Error: {err:#}");
                EXIT_USAGE
            }
        };
        drop(log_guard);
        std::process::exit(code);
    }
}
