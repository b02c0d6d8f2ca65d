//! rillc-sem - Name resolution for the Rill language.
//!
//! The language has a deliberately flat scoping model: a name is
//! visible if it lives in the innermost scope or in the global scope,
//! and nothing in between. Procedures do not close over their parents.
//! The identifier table here models that directly as a stack of scope
//! maps where only the top and the bottom are ever searched.
//!
//! Each scope carries an owner tag (the program or procedure it
//! belongs to), which is how parameter references are told apart from
//! locals: a name matching one of the owner's declared parameters is
//! addressed through the frame pointer and checked against its `in`/
//! `out` direction by the parser.

pub mod ident;
pub mod table;

pub use ident::{Direction, IdType, Identifier, Location, Parameter};
pub use table::{IdentTable, NameError};
