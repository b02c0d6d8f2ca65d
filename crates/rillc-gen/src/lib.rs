//! rillc-gen - Intermediate-code generation for the Rill compiler.
//!
//! The target is a textual register machine dressed up as C: an
//! unbounded register file `R`, a flat memory `MM`, and three pinned
//! registers `SP`, `FP`, and `GB` for the stack pointer, frame pointer,
//! and global base. Every semantic action in the parser maps to one
//! emission method here; the generator owns all the text.
//!
//! Allocation state lives alongside the code buffer:
//!
//! - a monotone virtual-register counter (never reset, so register
//!   names are unique across the whole output),
//! - a monotone label counter shared by procedure entries and
//!   control-flow joins,
//! - per-procedure local and parameter offsets, reset at each
//!   procedure header and saved around nested declarations.
//!
//! Emitted code accumulates in memory and reaches disk only through
//! [`Generator::commit`], which the driver calls when the compile
//! finished without errors.

pub mod buffer;
pub mod generator;
pub mod runtime;

pub use buffer::CodeBuffer;
pub use generator::{FrameState, Generator};
pub use runtime::{runtime_functions, RuntimeParam};
