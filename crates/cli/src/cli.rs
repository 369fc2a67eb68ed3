// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::{ArgAction, Parser, Subcommand};

use crate::commands::invoke::InvokeArgs;

/// Resumable terraform deployments on a remote host
#[derive(Parser, Debug)]
#[command(name = "tfr", version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one step of create, update or delete and print the progress event
    Invoke(InvokeArgs),
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
