// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Captured output of a detached command.
//!
//! Each stream is redirected to `tfr-<cmd>-<stream>.log` in the working
//! directory. A sibling `.offset` file records how many bytes have been
//! drained, so incremental reads survive across invocations.

use super::TerraformCommand;
use crate::remote::RemoteError;
use crate::toolbox::SshToolbox;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

tfr_core::simple_display! {
    Stream {
        Stdout => "stdout",
        Stderr => "stderr",
    }
}

#[derive(Clone)]
pub struct ProcessOutput {
    ssh: SshToolbox,
    workdir: String,
    command: TerraformCommand,
}

impl ProcessOutput {
    pub fn new(ssh: SshToolbox, workdir: impl Into<String>, command: TerraformCommand) -> Self {
        Self { ssh, workdir: workdir.into(), command }
    }

    /// File name (relative to the working directory) of a stream's log.
    pub fn log_name(&self, stream: Stream) -> String {
        format!("tfr-{}-{stream}.log", self.command)
    }

    fn offset_name(&self, stream: Stream) -> String {
        format!("tfr-{}-{stream}.offset", self.command)
    }

    fn log_path(&self, stream: Stream) -> String {
        format!("{}/{}", self.workdir, self.log_name(stream))
    }

    fn offset_path(&self, stream: Stream) -> String {
        format!("{}/{}", self.workdir, self.offset_name(stream))
    }

    /// Relative names of every file this output owns, for clearing on start.
    pub fn artifact_names(&self) -> Vec<String> {
        [Stream::Stdout, Stream::Stderr]
            .into_iter()
            .flat_map(|s| [self.log_name(s), self.offset_name(s)])
            .collect()
    }

    /// Shell command printing the undrained tail of `stream` and advancing
    /// its offset.
    ///
    /// The end of the range is pulled back to the lead byte of a trailing
    /// UTF-8 sequence that is not yet complete, so a character split across
    /// writes is drained whole on a later call.
    pub fn drain_command(&self, stream: Stream) -> String {
        let log = self.log_path(stream);
        let offset = self.offset_path(stream);
        format!(
            "pos=$(cat {offset} 2>/dev/null || echo 0); \
             size=$(stat -c %s {log} 2>/dev/null || echo 0); \
             if [ \"$size\" -gt \"$pos\" ]; then \
             n=$((size - pos)); if [ \"$n\" -gt 3 ]; then n=3; fi; \
             end=$size; at=$((size - n)); lead=; need=0; \
             for b in $(tail -c +$((at + 1)) {log} | head -c $n | od -An -v -tu1); do \
             if [ \"$b\" -ge 240 ]; then lead=$at; need=4; \
             elif [ \"$b\" -ge 224 ]; then lead=$at; need=3; \
             elif [ \"$b\" -ge 192 ]; then lead=$at; need=2; \
             elif [ \"$b\" -lt 128 ]; then lead=; fi; \
             at=$((at + 1)); \
             done; \
             if [ -n \"$lead\" ] && [ $((lead + need)) -gt \"$size\" ]; then end=$lead; fi; \
             if [ \"$end\" -gt \"$pos\" ]; then \
             tail -c +$((pos + 1)) {log} | head -c $((end - pos)); \
             echo \"$end\" > {offset}; \
             fi; \
             fi"
        )
    }

    pub fn full_command(&self, stream: Stream) -> String {
        format!("cat {} 2>/dev/null || true", self.log_path(stream))
    }

    pub async fn incremental(&self, stream: Stream) -> Result<String, RemoteError> {
        let command = self.drain_command(stream);
        Ok(self.ssh.run_checked(&command).await?.stdout)
    }

    pub async fn full(&self, stream: Stream) -> Result<String, RemoteError> {
        let command = self.full_command(stream);
        Ok(self.ssh.run_checked(&command).await?.stdout)
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
