//! rillc-util - Shared infrastructure for the Rill compiler.
//!
//! This crate holds the two pieces every compiler phase leans on:
//!
//! - The diagnostic sink ([`Handler`]), which collects warnings and
//!   errors with line context and tracks whether any error has been
//!   reported. The scanner only warns; the parser does both.
//! - The source buffer ([`SourceBuffer`]), a line-indexed view of the
//!   input file that serves characters to the scanner and line text to
//!   diagnostic rendering.
//!
//! Nothing here knows about tokens, scopes, or generated code; the
//! phase crates build on top of these types.

pub mod diagnostic;
pub mod source;

pub use diagnostic::{Category, Diagnostic, Handler, Level};
pub use source::{SourceBuffer, SourceError};
