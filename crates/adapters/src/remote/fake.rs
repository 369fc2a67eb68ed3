// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted remote channel for tests.

use super::{CommandOutput, RemoteChannel, RemoteError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Recorded remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    Exec(String),
    Upload { dir: String, name: String, contents: Vec<u8> },
}

impl RemoteCall {
    pub fn command(&self) -> Option<&str> {
        match self {
            RemoteCall::Exec(command) => Some(command),
            RemoteCall::Upload { .. } => None,
        }
    }
}

/// Scripted transport failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeFailure {
    Timeout,
    Unreachable,
}

impl FakeFailure {
    fn to_error(self, command: &str) -> RemoteError {
        match self {
            FakeFailure::Timeout => RemoteError::Timeout {
                timeout: Duration::from_secs(30),
                command: command.to_string(),
            },
            FakeFailure::Unreachable => RemoteError::Connect {
                addr: "fake:22".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
            },
        }
    }
}

type Response = Result<CommandOutput, FakeFailure>;

struct Rule {
    pattern: String,
    responses: VecDeque<Response>,
}

struct FakeRemoteState {
    rules: Vec<Rule>,
    calls: Vec<RemoteCall>,
    upload_failure: Option<FakeFailure>,
}

/// Fake remote channel.
///
/// Commands are answered by the most recently added rule whose pattern is
/// a substring of the command. Each rule replays its queued responses in
/// order and keeps returning the last one. Unmatched commands succeed with
/// empty output.
#[derive(Clone)]
pub struct FakeRemote {
    inner: Arc<Mutex<FakeRemoteState>>,
}

impl Default for FakeRemote {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeRemoteState {
                rules: Vec::new(),
                calls: Vec::new(),
                upload_failure: None,
            })),
        }
    }
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands containing `pattern` with `outputs`, in order.
    pub fn on(&self, pattern: &str, outputs: impl IntoIterator<Item = CommandOutput>) -> &Self {
        self.push_rule(pattern, outputs.into_iter().map(Ok).collect())
    }

    /// Answer commands containing `pattern` with exit 0 and `stdout`.
    pub fn on_stdout(&self, pattern: &str, stdout: &str) -> &Self {
        self.on(pattern, [CommandOutput::new(0, stdout, "")])
    }

    /// Answer commands containing `pattern` with `stdout` values in order.
    pub fn on_stdout_seq(&self, pattern: &str, stdouts: &[&str]) -> &Self {
        self.on(pattern, stdouts.iter().map(|s| CommandOutput::new(0, *s, "")))
    }

    /// Fail commands containing `pattern` with a transport error.
    pub fn fail(&self, pattern: &str, failure: FakeFailure) -> &Self {
        self.push_rule(pattern, VecDeque::from([Err(failure)]))
    }

    /// Fail every upload with a transport error.
    pub fn fail_uploads(&self, failure: FakeFailure) -> &Self {
        self.inner.lock().upload_failure = Some(failure);
        self
    }

    fn push_rule(&self, pattern: &str, responses: VecDeque<Response>) -> &Self {
        self.inner.lock().rules.push(Rule { pattern: pattern.to_string(), responses });
        self
    }

    /// All recorded calls, in order
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.inner.lock().calls.clone()
    }

    /// Executed commands, in order
    pub fn commands(&self) -> Vec<String> {
        self.calls().iter().filter_map(|c| c.command().map(str::to_string)).collect()
    }

    /// Executed commands containing `pattern`
    pub fn commands_matching(&self, pattern: &str) -> Vec<String> {
        self.commands().into_iter().filter(|c| c.contains(pattern)).collect()
    }

    /// Recorded uploads as `(dir, name, contents)`
    pub fn uploads(&self) -> Vec<(String, String, Vec<u8>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                RemoteCall::Upload { dir, name, contents } => Some((dir, name, contents)),
                RemoteCall::Exec(_) => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }
}

#[async_trait]
impl RemoteChannel for FakeRemote {
    async fn exec(&self, command: &str) -> Result<CommandOutput, RemoteError> {
        let mut state = self.inner.lock();
        state.calls.push(RemoteCall::Exec(command.to_string()));
        let rule = state.rules.iter_mut().rev().find(|r| command.contains(&r.pattern));
        let response = match rule {
            Some(rule) if rule.responses.len() > 1 => rule.responses.pop_front(),
            Some(rule) => rule.responses.front().cloned(),
            None => None,
        };
        match response {
            Some(Ok(output)) => Ok(output),
            Some(Err(failure)) => Err(failure.to_error(command)),
            None => Ok(CommandOutput::default()),
        }
    }

    async fn upload(&self, dir: &str, name: &str, contents: &[u8]) -> Result<(), RemoteError> {
        let mut state = self.inner.lock();
        state.calls.push(RemoteCall::Upload {
            dir: dir.to_string(),
            name: name.to_string(),
            contents: contents.to_vec(),
        });
        match state.upload_failure {
            Some(failure) => Err(failure.to_error(&format!("upload {dir}/{name}"))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
