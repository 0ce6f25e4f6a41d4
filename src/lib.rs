//! `argbind` parses a flat list of command line tokens against expectations you declare
//! one call at a time.
//!
//! Although other crates provide command line parser functionality, we have found they
//! prioritize different concerns than those we are interested in.
//! `argbind` has no schema description language and builds no grammar up front.
//! Instead, it attempts to prioritize the following design concerns:
//! * *Declare-and-consume*:
//! Each declaration call (`allow_*`/`expect_*`) consumes its matching tokens
//! immediately, so the shape of the parse can depend on what has already been seen.
//! * *Value semantics*:
//! Every declaration returns a new, independent [`Bindings`] snapshot.
//! The state a declaration was called on is never altered, so intermediate states can
//! be retained, branched, and queried without corrupting each other.
//! * *Allowance vs. expectation paradigm*:
//! An allowance may be absent without failing validation; an expectation's absence is
//! a validation failure.
//! Failures accumulate across the whole chain and surface together at the terminal
//! validate call, each cause individually inspectable.
//! * *Remainder hand-off*:
//! The chop family discards (or retrieves) whatever tokens remain unconsumed,
//! typically to feed a nested chain for a sub-command.
//!
//! # Usage
//! ```
//! use argbind::Bindings;
//!
//! let result = Bindings::load(["do", "something", "--carefully", "--and", "slowly"])
//!     .expect_param()
//!     .expect_param_named("command")
//!     .expect_flag("carefully", &[])
//!     .expect_option("and", &[])
//!     .validate()
//!     .unwrap();
//!
//! assert_eq!(result.param_at(0).unwrap(), "do");
//! assert_eq!(result.param_named("command").unwrap(), "something");
//! assert!(result.flag("carefully").unwrap());
//! assert_eq!(result.option("and").unwrap(), "slowly");
//! ```
//!
//! Validation reports every failure at once, not just the first:
//! ```
//! use argbind::{BindFailure, Bindings};
//!
//! let error = Bindings::load(["stray"])
//!     .expect_flag("verbose", &[])
//!     .validate()
//!     .unwrap_err();
//!
//! assert_eq!(
//!     error.failures(),
//!     &[
//!         BindFailure::MissingFlag("verbose".to_string()),
//!         BindFailure::UnconsumedTokens(1),
//!     ],
//! );
//! ```
//!
//! # Matching Semantics
//! `argbind` matches tokens according to the following set of rules.
//! * A flag or option name matches the token `--NAME`, or `-N` for a single-character
//! name.
//! Alternate names may be declared; they are tried in order after the primary name,
//! and all recorded state is keyed by the primary name only.
//! * An option's value is the token immediately after its name token, claimed by
//! position.
//! An option name found as the very last token is still consumed, but records a
//! "missing value" failure rather than binding anything.
//! * Positional parameters are order-sensitive: each `*_param` declaration binds the
//! first (leftmost) token no previous declaration has consumed, whatever its shape.
//! Flags and options are not order-sensitive.
//! * A token, once consumed, is never matched again; tokens still unconsumed at
//! validation time fail the chain unless explicitly chopped.
//!
//! # Features
//! * `tracing_debug`: Emit [`tracing`](https://docs.rs/tracing) debug events at match
//! decision points.
#![deny(missing_docs)]
mod api;
mod model;
mod tokens;

pub use api::*;
pub use model::*;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
