//! # tcl-bridge
//!
//! Bridge to a long-lived interactive Tcl shell subprocess.
//!
//! This crate drives tool-hosted Tcl shells (tclsh, Intel Quartus
//! `quartus_stp` and friends) over plain pipes: it sends command lines,
//! detects where each command's output ends and whether it raised an
//! error, and converts between Tcl list syntax and Rust sequences of
//! strings, including arbitrarily nested lists.
//!
//! ## Features
//!
//! - **Sentinel framing**: reliable end-of-output and error detection on
//!   a stream with no message boundaries
//! - **Typed failures**: shell faults are recoverable; a dead child
//!   permanently invalidates the session
//! - **List codec**: parse and serialize the shell's brace/quote list
//!   grammar with round-trip fidelity
//! - **Async I/O**: non-blocking pipe reads using tokio
//!
//! ## Quick Start
//!
//! ```no_run
//! use tcl_bridge::{SessionConfig, ShellSession, TclCommand};
//!
//! #[tokio::main]
//! async fn main() -> tcl_bridge::Result<()> {
//!     // Initialize logging
//!     tcl_bridge::logging::try_init().ok();
//!
//!     let mut shell = ShellSession::spawn(SessionConfig::new("tclsh")).await?;
//!
//!     let sum = shell.execute("expr 1 + 2").await?;
//!     assert_eq!(sum, "3");
//!
//!     let devices = TclCommand::new("get_device_names")
//!         .flag("hardware_name", "Foo Bar")
//!         .run_list(&mut shell)
//!         .await?;
//!     println!("devices: {devices:?}");
//!
//!     shell.close().await?;
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod command;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;

// Re-export commonly used types
pub use codec::{parse, parse_levels, quote, serialize, TclValue};
pub use command::TclCommand;
pub use config::BridgeConfig;
pub use error::{Result, TclBridgeError};
pub use session::{CommandStatus, SessionConfig, ShellSession, DEFAULT_CLOSE_GRACE};
