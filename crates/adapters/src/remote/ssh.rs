// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SSH channel backed by libssh2.
//!
//! libssh2 is blocking, so every call runs on tokio's blocking pool. The
//! session timeout bounds each libssh2 call during setup; command output is
//! read without blocking against one deadline for the whole command.

use super::{CommandOutput, RemoteChannel, RemoteError};
use crate::params::TerraformParameters;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;
use ssh2::{HashType, Session};
use std::io::{ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::{Duration, Instant};

/// Ceiling for a single remote command, including connection setup.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// libssh2's LIBSSH2_ERROR_TIMEOUT
const LIBSSH2_ERROR_TIMEOUT: i32 = -9;

/// Pause between reads when neither stream has data.
const READ_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Resolved connection settings for one session.
#[derive(Clone)]
pub struct SshTarget {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub private_key: String,
    pub fingerprint: Option<String>,
}

impl std::fmt::Debug for SshTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}

/// Remote channel that resolves its connection parameters on every call.
#[derive(Clone)]
pub struct SshChannel {
    params: TerraformParameters,
    timeout: Duration,
}

impl SshChannel {
    pub fn new(params: TerraformParameters) -> Self {
        Self { params, timeout: DEFAULT_COMMAND_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn blocking<T, F>(&self, label: String, f: F) -> Result<T, RemoteError>
    where
        T: Send + 'static,
        F: FnOnce(&SshTarget, Duration) -> Result<T, RemoteError> + Send + 'static,
    {
        let target = self.params.ssh_target().await?;
        let timeout = self.timeout;
        tokio::task::spawn_blocking(move || f(&target, timeout))
            .await
            .map_err(|e| RemoteError::Task(format!("{label}: {e}")))?
    }
}

#[async_trait]
impl RemoteChannel for SshChannel {
    async fn exec(&self, command: &str) -> Result<CommandOutput, RemoteError> {
        let command = command.to_string();
        tracing::debug!(%command, "ssh exec");
        self.blocking(command.clone(), move |target, timeout| {
            exec_blocking(target, &command, timeout)
        })
        .await
    }

    async fn upload(&self, dir: &str, name: &str, contents: &[u8]) -> Result<(), RemoteError> {
        let path = format!("{}/{}", dir.trim_end_matches('/'), name);
        let contents = contents.to_vec();
        tracing::debug!(%path, bytes = contents.len(), "ssh upload");
        self.blocking(path.clone(), move |target, timeout| {
            upload_blocking(target, &path, &contents, timeout)
        })
        .await
    }
}

fn exec_blocking(
    target: &SshTarget,
    command: &str,
    timeout: Duration,
) -> Result<CommandOutput, RemoteError> {
    let deadline = Instant::now() + timeout;
    let session = connect(target, timeout)?;

    let mut channel = session.channel_session().map_err(|e| ssh_error(e, timeout, command))?;
    channel.exec(command).map_err(|e| ssh_error(e, timeout, command))?;

    session.set_blocking(false);
    let collected = {
        let mut stdout = channel.stream(0);
        let mut stderr = channel.stderr();
        collect_output(&mut stdout, &mut stderr, deadline)
    };
    session.set_blocking(true);
    let (stdout, stderr) = collected.map_err(|e| io_error(e, timeout, command))?;

    channel.wait_close().map_err(|e| ssh_error(e, timeout, command))?;
    let exit_status = channel.exit_status().map_err(|e| ssh_error(e, timeout, command))?;
    let _ = session.disconnect(None, "done", None);

    Ok(CommandOutput {
        exit_status,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    })
}

/// What one pass over a non-blocking stream produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drained {
    Eof,
    Data,
    Idle,
}

/// Read everything currently available from `reader` into `sink`.
fn drain_available(reader: &mut impl Read, sink: &mut Vec<u8>) -> std::io::Result<Drained> {
    let mut buf = [0u8; 16 * 1024];
    let mut state = Drained::Idle;
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(Drained::Eof),
            Ok(n) => {
                sink.extend_from_slice(&buf[..n]);
                state = Drained::Data;
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(state),
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
}

/// Read both streams to EOF, alternating so neither can stall the other.
///
/// Fails with [`ErrorKind::TimedOut`] once `deadline` passes.
fn collect_output(
    stdout: &mut impl Read,
    stderr: &mut impl Read,
    deadline: Instant,
) -> std::io::Result<(Vec<u8>, Vec<u8>)> {
    let (mut out, mut err) = (Vec::new(), Vec::new());
    let (mut out_done, mut err_done) = (false, false);
    loop {
        let mut idle = true;
        if !out_done {
            match drain_available(stdout, &mut out)? {
                Drained::Eof => out_done = true,
                Drained::Data => idle = false,
                Drained::Idle => {}
            }
        }
        if !err_done {
            match drain_available(stderr, &mut err)? {
                Drained::Eof => err_done = true,
                Drained::Data => idle = false,
                Drained::Idle => {}
            }
        }
        if out_done && err_done {
            return Ok((out, err));
        }
        if Instant::now() >= deadline {
            return Err(std::io::Error::new(ErrorKind::TimedOut, "command output deadline passed"));
        }
        if idle {
            std::thread::sleep(READ_POLL_INTERVAL);
        }
    }
}

fn upload_blocking(
    target: &SshTarget,
    path: &str,
    contents: &[u8],
    timeout: Duration,
) -> Result<(), RemoteError> {
    let session = connect(target, timeout)?;
    let mut remote = session
        .scp_send(Path::new(path), 0o644, contents.len() as u64, None)
        .map_err(|e| ssh_error(e, timeout, path))?;
    remote.write_all(contents).map_err(|e| io_error(e, timeout, path))?;
    remote.send_eof()?;
    remote.wait_eof()?;
    remote.close()?;
    remote.wait_close()?;
    let _ = session.disconnect(None, "done", None);
    Ok(())
}

fn connect(target: &SshTarget, timeout: Duration) -> Result<Session, RemoteError> {
    let addr_label = format!("{}:{}", target.host, target.port);
    let addr = (target.host.as_str(), target.port)
        .to_socket_addrs()
        .map_err(|source| RemoteError::Connect { addr: addr_label.clone(), source })?
        .next()
        .ok_or_else(|| RemoteError::Connect {
            addr: addr_label.clone(),
            source: std::io::Error::new(ErrorKind::NotFound, "no addresses resolved"),
        })?;
    let tcp = TcpStream::connect_timeout(&addr, timeout)
        .map_err(|source| RemoteError::Connect { addr: addr_label.clone(), source })?;

    let mut session = Session::new()?;
    session.set_tcp_stream(tcp);
    session.set_timeout(u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX));
    session.handshake().map_err(|e| ssh_error(e, timeout, "handshake"))?;

    verify_host_key(&session, target)?;

    session.userauth_pubkey_memory(&target.username, None, &target.private_key, None).map_err(
        |e| {
            tracing::warn!(host = %target.host, user = %target.username, error = %e, "ssh auth failed");
            RemoteError::AuthFailed { user: target.username.clone(), host: target.host.clone() }
        },
    )?;
    if !session.authenticated() {
        return Err(RemoteError::AuthFailed {
            user: target.username.clone(),
            host: target.host.clone(),
        });
    }
    Ok(session)
}

fn verify_host_key(session: &Session, target: &SshTarget) -> Result<(), RemoteError> {
    let sha256 = session.host_key_hash(HashType::Sha256);
    let md5 = session.host_key_hash(HashType::Md5);
    let actual = sha256.map(sha256_fingerprint).unwrap_or_else(|| "unknown".to_string());

    let Some(expected) = target.fingerprint.as_deref() else {
        tracing::warn!(
            host = %target.host,
            fingerprint = %actual,
            "no host fingerprint configured, accepting host key"
        );
        return Ok(());
    };

    if fingerprint_matches(expected, sha256, md5) {
        Ok(())
    } else {
        Err(RemoteError::HostKeyMismatch { host: target.host.clone(), actual })
    }
}

fn sha256_fingerprint(hash: &[u8]) -> String {
    format!("SHA256:{}", STANDARD_NO_PAD.encode(hash))
}

fn md5_fingerprint(hash: &[u8]) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join(":")
}

/// Compare a configured fingerprint with the host key hashes.
///
/// Accepts `SHA256:<base64>` (padding optional), bare base64 SHA256,
/// `MD5:<hex pairs>` and bare colon-separated MD5 hex.
pub fn fingerprint_matches(expected: &str, sha256: Option<&[u8]>, md5: Option<&[u8]>) -> bool {
    let expected = expected.trim();
    if let Some(hex) = strip_prefix_ignore_case(expected, "MD5:") {
        return md5.is_some_and(|h| md5_fingerprint(h).eq_ignore_ascii_case(hex.trim()));
    }
    let looks_like_md5 = expected.len() == 47 && expected.matches(':').count() == 15;
    if looks_like_md5 {
        return md5.is_some_and(|h| md5_fingerprint(h).eq_ignore_ascii_case(expected));
    }
    let b64 = strip_prefix_ignore_case(expected, "SHA256:").unwrap_or(expected);
    let b64 = b64.trim().trim_end_matches('=');
    sha256.is_some_and(|h| STANDARD_NO_PAD.encode(h) == b64)
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

fn ssh_error(err: ssh2::Error, timeout: Duration, command: &str) -> RemoteError {
    match err.code() {
        ssh2::ErrorCode::Session(LIBSSH2_ERROR_TIMEOUT) => {
            RemoteError::Timeout { timeout, command: command.to_string() }
        }
        _ => RemoteError::Ssh(err),
    }
}

fn io_error(err: std::io::Error, timeout: Duration, command: &str) -> RemoteError {
    match err.kind() {
        ErrorKind::TimedOut | ErrorKind::WouldBlock => {
            RemoteError::Timeout { timeout, command: command.to_string() }
        }
        _ => RemoteError::Io(err),
    }
}

#[cfg(test)]
#[path = "ssh_tests.rs"]
mod tests;
