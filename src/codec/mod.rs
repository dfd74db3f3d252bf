//! Bidirectional Tcl list codec.
//!
//! Pure, stateless conversion between the shell's brace/quote-delimited
//! list syntax and sequences of strings:
//! - [`parse`] splits one level of a list into elements
//! - [`parse_levels`] recurses into nested lists to a requested depth
//! - [`serialize`] renders elements back into list syntax
//! - [`quote`] protects a single value for use in a list or command line
//!
//! # Example
//!
//! ```
//! use tcl_bridge::codec;
//!
//! let line = codec::serialize(["hello world", "42"]);
//! assert_eq!(line, "{hello world} 42");
//! assert_eq!(codec::parse(&line).unwrap(), vec!["hello world", "42"]);
//! ```

mod list;
mod quote;

pub use list::{parse, parse_levels, serialize, TclValue};
pub use quote::quote;
