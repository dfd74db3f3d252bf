//! Request/response framing over the shell's pipes.
//!
//! A request is two lines: the command evaluated under `catch` (the
//! shell's error-status primitive), then a reporter line that prints the
//! captured result and the sentinel with the status code. The reply is
//! everything the shell emits before the sentinel line.
//!
//! The wire is generic over its reader/writer pair so the protocol can be
//! exercised over in-memory pipes; [`ShellSession`](crate::ShellSession)
//! drives it over the child's stdin/stdout.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use super::sentinel::{CommandStatus, Sentinel};
use crate::error::{Result, TclBridgeError};

/// Shell variable holding the `catch` status of the current command.
const STATUS_VAR: &str = "__tcl_bridge_status";

/// Shell variable holding the command's result value or error message.
const RESULT_VAR: &str = "__tcl_bridge_result";

/// Result of one framed exchange.
#[derive(Debug, Clone)]
pub struct Reply {
    /// Text the shell emitted before the sentinel line, with the
    /// trailing newline normalized away.
    pub output: String,
    /// Error status the shell reported for the command.
    pub status: CommandStatus,
}

/// Framing protocol over an arbitrary async reader/writer pair.
#[derive(Debug)]
pub struct Wire<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> Wire<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Create a wire over the given pipes.
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Write the framed request for `command`.
    ///
    /// Any write failure is a transport failure: the shell end of the
    /// pipe is gone.
    pub async fn send(&mut self, command: &str, sentinel: &Sentinel) -> Result<()> {
        let request = render_request(command, sentinel);
        trace!(bytes = request.len(), "writing request");
        self.write_all(request.as_bytes()).await
    }

    /// Write a single unframed line (used for the graceful exit command).
    pub async fn send_raw(&mut self, line: &str) -> Result<()> {
        trace!(line, "writing raw line");
        self.write_all(format!("{line}\n").as_bytes()).await
    }

    /// Read lines until the sentinel line appears as a complete line.
    ///
    /// Everything accumulated strictly before it is the command's
    /// output. End of stream before the sentinel means the shell died.
    pub async fn read_reply(&mut self, sentinel: &Sentinel) -> Result<Reply> {
        let mut accum = String::new();

        loop {
            let mut line = String::new();
            let n = self
                .reader
                .read_line(&mut line)
                .await
                .map_err(|e| TclBridgeError::Transport(format!("failed to read from shell: {e}")))?;
            if n == 0 {
                return Err(TclBridgeError::Transport(
                    "shell closed its output stream before the reply completed".into(),
                ));
            }
            // only a complete line can be the sentinel; a partial line at
            // EOF falls through and the next read reports the closed stream
            if line.ends_with('\n') {
                if let Some(status) = sentinel.match_line(&line) {
                    let output = strip_trailing_newline(accum);
                    debug!(?status, bytes = output.len(), "reply complete");
                    return Ok(Reply { output, status });
                }
            }
            trace!(line = line.trim_end(), "output line");
            accum.push_str(&line);
        }
    }

    async fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer
            .write_all(bytes)
            .await
            .map_err(|e| TclBridgeError::Transport(format!("failed to write to shell: {e}")))?;
        self.writer
            .flush()
            .await
            .map_err(|e| TclBridgeError::Transport(format!("failed to flush to shell: {e}")))
    }
}

/// Render the two request lines for a command.
///
/// The command is evaluated under `catch` so its error status and result
/// value are captured; the reporter line prints the result (error message
/// on failure, result value on success when non-empty) and then the
/// sentinel with the status code. The command must be syntactically
/// complete on its own and contain no raw newline, or the framing breaks.
pub(crate) fn render_request(command: &str, sentinel: &Sentinel) -> String {
    format!(
        "set {sv} [catch {{{command}}} {rv}]\n\
         if {{${sv} || ${rv} ne \"\"}} {{ puts ${rv} }}; puts \"{token} ${sv}\"\n",
        sv = STATUS_VAR,
        rv = RESULT_VAR,
        token = sentinel.token(),
    )
}

fn strip_trailing_newline(mut s: String) -> String {
    if s.ends_with('\n') {
        s.pop();
        if s.ends_with('\r') {
            s.pop();
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, split, BufReader};

    #[test]
    fn test_render_request_shape() {
        let sentinel = Sentinel::for_sequence(7);
        let request = render_request("expr 1 + 2", &sentinel);

        let lines: Vec<&str> = request.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "set __tcl_bridge_status [catch {expr 1 + 2} __tcl_bridge_result]"
        );
        assert!(lines[1].contains(sentinel.token()));
        assert!(lines[1].contains("puts $__tcl_bridge_result"));
        assert!(request.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_read_reply_success() {
        let (client, server) = duplex(1024);
        let (server_read, mut server_write) = split(server);
        let (client_read, client_write) = split(client);
        let mut wire = Wire::new(BufReader::new(client_read), client_write);

        let sentinel = Sentinel::for_sequence(1);
        let feed = format!("line one\nline two\n{} 0\n", sentinel.token());
        tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            server_write.write_all(feed.as_bytes()).await.unwrap();
        });
        drop(server_read);

        let reply = wire.read_reply(&sentinel).await.unwrap();
        assert_eq!(reply.output, "line one\nline two");
        assert_eq!(reply.status, CommandStatus::Success);
    }

    #[tokio::test]
    async fn test_read_reply_fault_status() {
        let (client, server) = duplex(1024);
        let (_server_read, mut server_write) = split(server);
        let (client_read, client_write) = split(client);
        let mut wire = Wire::new(BufReader::new(client_read), client_write);

        let sentinel = Sentinel::for_sequence(9);
        let feed = format!("divide by zero\n{} 1\n", sentinel.token());
        tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            server_write.write_all(feed.as_bytes()).await.unwrap();
        });

        let reply = wire.read_reply(&sentinel).await.unwrap();
        assert_eq!(reply.output, "divide by zero");
        assert!(reply.status.is_fault());
    }

    #[tokio::test]
    async fn test_read_reply_empty_output() {
        let (client, server) = duplex(1024);
        let (_server_read, mut server_write) = split(server);
        let (client_read, client_write) = split(client);
        let mut wire = Wire::new(BufReader::new(client_read), client_write);

        let sentinel = Sentinel::for_sequence(2);
        let feed = format!("{} 0\n", sentinel.token());
        tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            server_write.write_all(feed.as_bytes()).await.unwrap();
        });

        let reply = wire.read_reply(&sentinel).await.unwrap();
        assert_eq!(reply.output, "");
        assert_eq!(reply.status, CommandStatus::Success);
    }

    #[tokio::test]
    async fn test_read_reply_eof_is_transport_failure() {
        let (client, server) = duplex(1024);
        let (client_read, client_write) = split(client);
        let mut wire = Wire::new(BufReader::new(client_read), client_write);

        let sentinel = Sentinel::for_sequence(3);
        // close the shell end with output still incomplete
        drop(server);

        let err = wire.read_reply(&sentinel).await.unwrap_err();
        assert!(matches!(err, TclBridgeError::Transport(_)));
    }

    #[tokio::test]
    async fn test_send_writes_request_and_newline() {
        let (client, server) = duplex(4096);
        let (client_read, client_write) = split(client);
        let (mut server_read, _server_write) = split(server);
        let mut wire = Wire::new(BufReader::new(client_read), client_write);

        let sentinel = Sentinel::for_sequence(4);
        wire.send("puts hi", &sentinel).await.unwrap();

        use tokio::io::AsyncReadExt;
        let mut buf = vec![0u8; 4096];
        let n = server_read.read(&mut buf).await.unwrap();
        let written = String::from_utf8_lossy(&buf[..n]).into_owned();
        assert_eq!(written, render_request("puts hi", &sentinel));
    }

    #[tokio::test]
    async fn test_send_to_closed_pipe_is_transport_failure() {
        let (client, server) = duplex(16);
        drop(server);
        let (client_read, client_write) = split(client);
        let mut wire = Wire::new(BufReader::new(client_read), client_write);

        let sentinel = Sentinel::for_sequence(5);
        let err = wire.send("puts hi", &sentinel).await.unwrap_err();
        assert!(matches!(err, TclBridgeError::Transport(_)));
    }
}
