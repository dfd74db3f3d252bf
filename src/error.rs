//! Error types for tcl-bridge.

use thiserror::Error;

/// Main error type for tcl-bridge operations.
#[derive(Error, Debug)]
pub enum TclBridgeError {
    /// The shell reported a fault while executing a command.
    ///
    /// Carries the shell's own error text. The session remains usable.
    #[error("tcl error: {0}")]
    Command(String),

    /// The child process died or a pipe broke.
    ///
    /// The session is permanently unusable; every later call fails
    /// immediately with the same error.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Text does not conform to the Tcl list grammar.
    #[error("list parse error: {0}")]
    Parse(String),

    /// A caller-imposed bound elapsed before the command completed.
    ///
    /// The read position in the byte stream can no longer be trusted,
    /// so the session is invalidated like a transport failure.
    #[error("command execution timeout")]
    Timeout,

    /// The session has been closed.
    #[error("session closed")]
    SessionClosed,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TclBridgeError {
    /// Whether the session that produced this error is still usable.
    ///
    /// Command and parse errors are recoverable; transport failures,
    /// timeouts, and use-after-close are not.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Command(_) | Self::Parse(_))
    }
}

/// Convenience Result type for tcl-bridge operations.
pub type Result<T> = std::result::Result<T, TclBridgeError>;
