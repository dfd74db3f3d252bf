//! Configuration management for tcl-bridge.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file (JSON)
//! 3. Default values

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::session::SessionConfig;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Shell spawn configuration.
    pub shell: ShellSection,
    /// Session behavior configuration.
    pub session: SessionSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Shell spawn configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSection {
    /// Shell executable to launch.
    pub program: String,
    /// Extra startup arguments.
    pub args: Vec<String>,
    /// Working directory for the child.
    pub working_dir: Option<String>,
    /// Sub-context command issued right after spawn.
    pub init_command: Option<String>,
}

impl Default for ShellSection {
    fn default() -> Self {
        Self {
            program: "tclsh".to_string(),
            args: Vec::new(),
            working_dir: None,
            init_command: None,
        }
    }
}

/// Session behavior configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Per-command timeout in seconds, if any.
    pub timeout_secs: Option<u64>,
    /// Grace period before close force-kills the child.
    pub close_grace_secs: u64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            close_grace_secs: 5,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(program) = std::env::var("TCL_BRIDGE_PROGRAM") {
            if !program.is_empty() {
                self.shell.program = program;
            }
        }

        if let Ok(dir) = std::env::var("TCL_BRIDGE_WORKING_DIR") {
            if !dir.is_empty() {
                self.shell.working_dir = Some(dir);
            }
        }

        if let Ok(secs) = std::env::var("TCL_BRIDGE_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                self.session.timeout_secs = Some(secs);
            }
        }

        if let Ok(level) = std::env::var("TCL_BRIDGE_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Load configuration with the full priority chain.
    ///
    /// Priority: env vars > config file > defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => BridgeConfig::from_file(path)?,
            None => BridgeConfig::default(),
        };

        config.apply_env();

        Ok(config)
    }

    /// Convert to a [`SessionConfig`] for spawning a session.
    pub fn to_session_config(&self) -> SessionConfig {
        let mut config = SessionConfig::new(self.shell.program.as_str())
            .args(self.shell.args.iter().cloned())
            .close_grace(Duration::from_secs(self.session.close_grace_secs));

        if let Some(ref dir) = self.shell.working_dir {
            config = config.working_dir(dir);
        }
        if let Some(ref init) = self.shell.init_command {
            config = config.init_command(init.as_str());
        }
        if let Some(secs) = self.session.timeout_secs {
            config = config.timeout(Duration::from_secs(secs));
        }

        config
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
