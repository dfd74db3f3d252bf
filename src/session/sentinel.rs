//! Per-command completion sentinels.
//!
//! The shell gives no explicit end-of-output marker, so each command is
//! followed by a reporter line that prints a sentinel token plus the
//! shell's error status. Tokens are derived from a monotonically
//! increasing per-session counter behind a fixed, unlikely prefix. The
//! scheme is heuristic: a command could in principle emit an identical
//! line, and the counter only minimizes that risk.

use std::fmt;

/// Error status the shell reported on the sentinel line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// The command completed normally.
    Success,
    /// The shell raised an error (or other abnormal completion code).
    Fault,
}

impl CommandStatus {
    /// Whether the shell reported a fault.
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault)
    }
}

/// Completion marker unique to one command round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentinel {
    token: String,
}

impl Sentinel {
    /// Create the sentinel for the given sequence number.
    pub fn for_sequence(seq: u64) -> Self {
        Self {
            token: format!("__tcl_bridge_{seq:08x}__"),
        }
    }

    /// The bare token, as embedded in the reporter line.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Recognize a complete reply line: the token, one space, and the
    /// shell's numeric status. Returns `None` for ordinary output lines.
    pub fn match_line(&self, line: &str) -> Option<CommandStatus> {
        let line = line.trim_end_matches(['\r', '\n']);
        let rest = line.strip_prefix(self.token.as_str())?;
        let code: u32 = rest.strip_prefix(' ')?.parse().ok()?;
        if code == 0 {
            Some(CommandStatus::Success)
        } else {
            Some(CommandStatus::Fault)
        }
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}
