//! Shell session lifecycle and command execution.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::BufReader;
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

use super::config::SessionConfig;
use super::sentinel::{CommandStatus, Sentinel};
use super::wire::Wire;
use crate::error::{Result, TclBridgeError};

/// Permanent session fault, replayed on every later call.
#[derive(Debug, Clone)]
enum Fault {
    Transport(String),
    Timeout,
}

impl Fault {
    fn to_error(&self) -> TclBridgeError {
        match self {
            Fault::Transport(msg) => TclBridgeError::Transport(msg.clone()),
            Fault::Timeout => TclBridgeError::Timeout,
        }
    }
}

/// An owned, long-lived interactive shell child process.
///
/// One command is in flight at a time (`&mut self` serializes callers; a
/// shared session belongs behind a `tokio::sync::Mutex`). Results come
/// back in issue order. A transport failure or timeout permanently
/// invalidates the session: the child's internal state (working
/// directory, loaded packages, open hardware handles) cannot be
/// reconstructed, so there is no reconnection.
///
/// Dropping an `execute` future mid-command leaves the byte stream
/// unsynchronized; treat that like a transport failure and close the
/// session. The child itself is killed on drop as a backstop, but
/// well-behaved callers should [`close`](Self::close) explicitly.
#[derive(Debug)]
pub struct ShellSession {
    child: Child,
    wire: Option<Wire<BufReader<ChildStdout>, ChildStdin>>,
    config: SessionConfig,
    seq: u64,
    fault: Option<Fault>,
}

impl ShellSession {
    /// Spawn the shell described by `config`.
    ///
    /// Stdin and stdout are piped; stderr is discarded unless
    /// `config.inherit_stderr` is set. If `config.init_command` is
    /// present it is executed through the normal protocol before this
    /// returns, and a failure closes the child and surfaces the error.
    pub async fn spawn(config: SessionConfig) -> Result<Self> {
        let mut command = Command::new(&config.program);
        command
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(if config.inherit_stderr {
                Stdio::inherit()
            } else {
                Stdio::null()
            })
            .kill_on_drop(true);
        if let Some(dir) = &config.working_dir {
            command.current_dir(dir);
        }
        for (key, value) in &config.env {
            command.env(key, value);
        }

        let mut child = command.spawn()?;
        let stdin = child.stdin.take().ok_or_else(|| {
            TclBridgeError::Transport("child process stdin was not captured".into())
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            TclBridgeError::Transport("child process stdout was not captured".into())
        })?;
        debug!(program = %config.program, pid = child.id().unwrap_or(0), "spawned shell");

        let mut session = Self {
            child,
            wire: Some(Wire::new(BufReader::new(stdout), stdin)),
            config,
            seq: 0,
            fault: None,
        };

        if let Some(init) = session.config.init_command.clone() {
            if let Err(e) = session.execute(&init).await {
                warn!(error = %e, "initial sub-context command failed");
                let _ = session.close().await;
                return Err(e);
            }
        }

        Ok(session)
    }

    /// Execute one command line and return exactly the text it produced.
    ///
    /// A shell-side fault yields [`TclBridgeError::Command`] carrying the
    /// shell's error text, and the session stays usable. Loss of the
    /// child yields [`TclBridgeError::Transport`] and every later call
    /// fails immediately with the same error.
    ///
    /// The command must be syntactically complete on its own and contain
    /// no raw newline. If the config carries a timeout, it bounds this
    /// call as in [`execute_timeout`](Self::execute_timeout).
    pub async fn execute(&mut self, command: &str) -> Result<String> {
        match self.config.timeout {
            Some(limit) => self.execute_timeout(command, limit).await,
            None => self.round_trip(command).await,
        }
    }

    /// Execute one command bounded by `limit`.
    ///
    /// On expiry the read position inside the byte stream can no longer
    /// be trusted, so the session is permanently invalidated and this
    /// returns [`TclBridgeError::Timeout`].
    pub async fn execute_timeout(&mut self, command: &str, limit: Duration) -> Result<String> {
        match timeout(limit, self.round_trip(command)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    limit_ms = limit.as_millis() as u64,
                    "command timed out; session invalidated"
                );
                self.fault = Some(Fault::Timeout);
                Err(TclBridgeError::Timeout)
            }
        }
    }

    async fn round_trip(&mut self, command: &str) -> Result<String> {
        if let Some(fault) = &self.fault {
            return Err(fault.to_error());
        }
        self.seq += 1;
        let sentinel = Sentinel::for_sequence(self.seq);
        let Some(wire) = self.wire.as_mut() else {
            return Err(TclBridgeError::SessionClosed);
        };

        debug!(seq = self.seq, command, "executing");
        let reply = match wire.send(command, &sentinel).await {
            Ok(()) => wire.read_reply(&sentinel).await,
            Err(e) => Err(e),
        };

        match reply {
            Ok(reply) => match reply.status {
                CommandStatus::Success => Ok(reply.output),
                CommandStatus::Fault => Err(TclBridgeError::Command(reply.output)),
            },
            Err(e) => {
                if let TclBridgeError::Transport(msg) = &e {
                    self.fault = Some(Fault::Transport(msg.clone()));
                }
                Err(e)
            }
        }
    }

    /// Close the session, releasing the child process and its pipes.
    ///
    /// If the session is still live this writes the graceful exit
    /// command, closes stdin, waits up to the configured grace period
    /// for the child to exit, and force-kills it otherwise. Idempotent:
    /// closing an already-closed session is a no-op. Subsequent
    /// `execute` calls return [`TclBridgeError::SessionClosed`].
    pub async fn close(&mut self) -> Result<()> {
        let Some(mut wire) = self.wire.take() else {
            return Ok(());
        };

        if self.fault.is_none() {
            if let Err(e) = wire.send_raw(&self.config.exit_command).await {
                debug!(error = %e, "graceful exit write failed");
            }
        }
        // dropping the wire closes the child's stdin
        drop(wire);

        match timeout(self.config.close_grace, self.child.wait()).await {
            Ok(Ok(status)) => debug!(?status, "shell exited"),
            Ok(Err(e)) => warn!(error = %e, "waiting for shell exit failed"),
            Err(_) => {
                warn!("shell did not exit within grace period; killing");
                if let Err(e) = self.child.kill().await {
                    warn!(error = %e, "failed to kill shell");
                }
            }
        }

        Ok(())
    }

    /// OS process id of the child, if it is still running.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.wire.is_none()
    }

    /// Whether a transport failure or timeout has invalidated the session.
    pub fn is_poisoned(&self) -> bool {
        self.fault.is_some()
    }
}
