//! Command-line building.
//!
//! An explicit builder for the shell's `name -flag value` command shape.
//! Every value passes through [`quote`](crate::codec::quote), so callers
//! never hand-escape anything.

use crate::codec::{parse, quote};
use crate::error::Result;
use crate::session::ShellSession;

/// Builder for a single shell command line.
///
/// # Example
///
/// ```
/// use tcl_bridge::TclCommand;
///
/// let line = TclCommand::new("get_device_names")
///     .flag("hardware_name", "Foo Bar")
///     .build();
/// assert_eq!(line, "get_device_names -hardware_name {Foo Bar}");
/// ```
#[derive(Debug, Clone)]
pub struct TclCommand {
    name: String,
    parts: Vec<String>,
}

impl TclCommand {
    /// Start building a command with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parts: Vec::new(),
        }
    }

    /// Append a positional argument, quoted.
    pub fn arg(mut self, value: impl AsRef<str>) -> Self {
        self.parts.push(quote(value.as_ref()));
        self
    }

    /// Append `-name value`, with the value quoted. Flag names are taken
    /// verbatim; they are identifiers, not values.
    pub fn flag(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.parts.push(format!("-{}", name.as_ref()));
        self.parts.push(quote(value.as_ref()));
        self
    }

    /// Append `-name value` when a value is present; a `None` flag
    /// contributes nothing at all, not an empty string.
    pub fn flag_opt(self, name: impl AsRef<str>, value: Option<impl AsRef<str>>) -> Self {
        match value {
            Some(value) => self.flag(name, value),
            None => self,
        }
    }

    /// Render the full command line.
    pub fn build(&self) -> String {
        if self.parts.is_empty() {
            return self.name.clone();
        }
        format!("{} {}", self.name, self.parts.join(" "))
    }

    /// Execute the built command on a session.
    pub async fn run(&self, session: &mut ShellSession) -> Result<String> {
        session.execute(&self.build()).await
    }

    /// Execute the built command and parse its result as a Tcl list.
    ///
    /// A single result value comes back as a one-element vec.
    pub async fn run_list(&self, session: &mut ShellSession) -> Result<Vec<String>> {
        parse(&self.run(session).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_command() {
        assert_eq!(TclCommand::new("get_hardware_names").build(), "get_hardware_names");
    }

    #[test]
    fn test_positional_args() {
        let line = TclCommand::new("expr").arg("1").arg("+").arg("2").build();
        assert_eq!(line, "expr 1 + 2");
    }

    #[test]
    fn test_flag_value_quoted() {
        let line = TclCommand::new("get_device_names")
            .flag("hardware_name", "Foo Bar")
            .build();
        assert_eq!(line, "get_device_names -hardware_name {Foo Bar}");
    }

    #[test]
    fn test_flag_value_with_substitution_chars() {
        let line = TclCommand::new("puts").arg("$just [vars]").build();
        assert_eq!(line, "puts {$just [vars]}");
    }

    #[test]
    fn test_flag_opt_none_omitted() {
        let line = TclCommand::new("read_probe_data")
            .flag("instance_index", "0")
            .flag_opt("value_in_hex", None::<&str>)
            .build();
        assert_eq!(line, "read_probe_data -instance_index 0");
    }

    #[test]
    fn test_flag_opt_some_present() {
        let line = TclCommand::new("read_probe_data")
            .flag_opt("value_in_hex", Some("on"))
            .build();
        assert_eq!(line, "read_probe_data -value_in_hex on");
    }

    #[test]
    fn test_empty_value_still_emitted() {
        let line = TclCommand::new("set_name").flag("name", "").build();
        assert_eq!(line, "set_name -name {}");
    }

    #[test]
    fn test_mixed_args_and_flags_in_order() {
        let line = TclCommand::new("start_insystem_source_probe")
            .arg("target")
            .flag("device_name", "@1: 5CEBA4 (0x02D020DD)")
            .build();
        assert_eq!(
            line,
            "start_insystem_source_probe target -device_name {@1: 5CEBA4 (0x02D020DD)}"
        );
    }
}
