// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tfr invoke`: run one step of an operation and print the progress event.

use anyhow::{Context, Result};
use clap::Args;
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::{Path, PathBuf};
use tfr_core::{OperationContext, OperationKind, ProgressEvent, ResourceModel};
use tfr_engine::EngineDeps;

use crate::exit_error::ExitError;

/// Path argument meaning "read from stdin".
const STDIN: &str = "-";

#[derive(Args, Debug)]
pub struct InvokeArgs {
    /// Operation to run: create, update or delete
    pub operation: OperationKind,

    /// Resource model JSON file (`-` for stdin)
    #[arg(long, value_name = "FILE")]
    pub model: PathBuf,

    /// Callback context JSON from the previous event; omit on the first call
    #[arg(long, value_name = "FILE")]
    pub context: Option<PathBuf>,

    /// Pretty-print the event
    #[arg(long)]
    pub pretty: bool,
}

pub async fn handle(args: InvokeArgs) -> Result<()> {
    let deps = EngineDeps::from_env()?;
    let event = run(&args, &deps).await?;
    println!("{}", render(&event, args.pretty)?);
    match ExitError::for_status(event.status) {
        Some(exit) => Err(exit.into()),
        None => Ok(()),
    }
}

/// Read inputs and run a single invocation.
pub async fn run(args: &InvokeArgs, deps: &EngineDeps) -> Result<ProgressEvent> {
    let model: ResourceModel = read_json(&args.model).context("reading resource model")?;
    let context = match &args.context {
        Some(path) => read_context(path)?,
        None => None,
    };
    Ok(tfr_engine::handle(args.operation, deps, model, context).await)
}

/// A blank context file is treated as a first invocation.
fn read_context(path: &Path) -> Result<Option<OperationContext>> {
    let text = read_input(path).context("reading callback context")?;
    if text.trim().is_empty() || text.trim() == "null" {
        return Ok(None);
    }
    let context = serde_json::from_str(&text)
        .with_context(|| format!("invalid callback context in {}", path.display()))?;
    Ok(Some(context))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = read_input(path)?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == STDIN {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

pub fn render(event: &ProgressEvent, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(event)?
    } else {
        serde_json::to_string(event)?
    };
    Ok(json)
}

#[cfg(test)]
#[path = "invoke_tests.rs"]
mod tests;
