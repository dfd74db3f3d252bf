//! Session spawn configuration.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Default grace period for [`ShellSession::close`](crate::ShellSession::close).
pub const DEFAULT_CLOSE_GRACE: Duration = Duration::from_secs(5);

/// Configuration for spawning a shell session.
///
/// The default spawns a bare `tclsh`; tool-hosted shells usually need a
/// program, arguments, and sometimes an initial sub-context command:
///
/// ```
/// use tcl_bridge::SessionConfig;
///
/// let config = SessionConfig::new("quartus_stp")
///     .arg("-s")
///     .init_command("set_current_subshell stp");
/// assert_eq!(config.program, "quartus_stp");
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Executable to launch.
    pub program: String,
    /// Extra startup command-line arguments.
    pub args: Vec<String>,
    /// Working directory override (if any).
    pub working_dir: Option<PathBuf>,
    /// Extra environment variables to set.
    pub env: HashMap<String, String>,
    /// Command issued through the protocol right after spawn, for shells
    /// hosting multiple named contexts that require entering one first.
    pub init_command: Option<String>,
    /// Graceful termination command written on close.
    pub exit_command: String,
    /// How long close waits for the child before force-killing it.
    pub close_grace: Duration,
    /// Per-command execution bound. The protocol itself imposes none.
    pub timeout: Option<Duration>,
    /// Pass the child's stderr through to the parent for diagnostics
    /// instead of discarding it.
    pub inherit_stderr: bool,
}

impl SessionConfig {
    /// Create a configuration for the given shell executable.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            env: HashMap::new(),
            init_command: None,
            exit_command: "exit".to_string(),
            close_grace: DEFAULT_CLOSE_GRACE,
            timeout: None,
            inherit_stderr: false,
        }
    }

    /// Append one startup argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append multiple startup arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Add an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the initial sub-context command.
    pub fn init_command(mut self, command: impl Into<String>) -> Self {
        self.init_command = Some(command.into());
        self
    }

    /// Override the graceful termination command (default `exit`).
    pub fn exit_command(mut self, command: impl Into<String>) -> Self {
        self.exit_command = command.into();
        self
    }

    /// Override the close grace period.
    pub fn close_grace(mut self, grace: Duration) -> Self {
        self.close_grace = grace;
        self
    }

    /// Bound every command with a timeout. Tripping it permanently
    /// invalidates the session.
    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Pass the child's stderr through instead of discarding it.
    pub fn inherit_stderr(mut self, inherit: bool) -> Self {
        self.inherit_stderr = inherit;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new("tclsh")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.program, "tclsh");
        assert!(config.args.is_empty());
        assert!(config.working_dir.is_none());
        assert!(config.env.is_empty());
        assert!(config.init_command.is_none());
        assert_eq!(config.exit_command, "exit");
        assert_eq!(config.close_grace, DEFAULT_CLOSE_GRACE);
        assert!(config.timeout.is_none());
        assert!(!config.inherit_stderr);
    }

    #[test]
    fn test_builder_chain() {
        let config = SessionConfig::new("quartus_stp")
            .arg("-s")
            .working_dir("/project")
            .env("LM_LICENSE_FILE", "1800@licenses")
            .init_command("set_current_subshell stp")
            .timeout(Duration::from_secs(60));

        assert_eq!(config.program, "quartus_stp");
        assert_eq!(config.args, vec!["-s"]);
        assert_eq!(config.working_dir, Some(PathBuf::from("/project")));
        assert_eq!(
            config.env.get("LM_LICENSE_FILE"),
            Some(&"1800@licenses".to_string())
        );
        assert_eq!(
            config.init_command.as_deref(),
            Some("set_current_subshell stp")
        );
        assert_eq!(config.timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_args_extend() {
        let config = SessionConfig::new("tclsh").args(["-encoding", "utf-8"]).arg("-");
        assert_eq!(config.args, vec!["-encoding", "utf-8", "-"]);
    }

    #[test]
    fn test_exit_and_grace_overrides() {
        let config = SessionConfig::new("tclsh")
            .exit_command("quit")
            .close_grace(Duration::from_millis(100));
        assert_eq!(config.exit_command, "quit");
        assert_eq!(config.close_grace, Duration::from_millis(100));
    }
}
