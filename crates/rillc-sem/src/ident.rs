//! Identifier records and their classification types.

use std::fmt;

/// The type attached to an identifier or computed for an expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdType {
    Int,
    Float,
    Bool,
    Str,
    /// The program identifier itself.
    Program,
    /// A procedure (user-declared or runtime-library).
    Function,
}

impl IdType {
    /// True for the four value types a variable can hold.
    pub fn is_variable(self) -> bool {
        matches!(self, IdType::Int | IdType::Float | IdType::Bool | IdType::Str)
    }

    /// True for types valid under `+ - * /`.
    pub fn is_numeric(self) -> bool {
        matches!(self, IdType::Int | IdType::Float)
    }

    /// True for types valid under `& |`, relational operators, and
    /// `not`.
    pub fn is_logical(self) -> bool {
        matches!(self, IdType::Int | IdType::Bool)
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IdType::Int => "int",
            IdType::Float => "float",
            IdType::Bool => "bool",
            IdType::Str => "str",
            IdType::Program => "program",
            IdType::Function => "function",
        };
        write!(f, "{name}")
    }
}

/// Mode of a procedure parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Read by the callee; any expression may be passed.
    In,
    /// Written by the callee back to the caller; the argument must be
    /// a bare identifier.
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
        }
    }
}

/// The base-pointer class a variable is addressed through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    /// Addressed from the global base register.
    Global,
    /// Addressed from the frame pointer.
    Param,
    /// Addressed from the stack pointer.
    Local,
}

/// A declared name.
///
/// `address` is a stack offset for variables and parameters, and the
/// procedure label id for programs and procedures.
#[derive(Clone, Debug, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub ty: IdType,
    /// Array length; `None` for scalars.
    pub size: Option<u32>,
    /// Ordered parameter list; present only when `ty` is `Function`.
    pub params: Option<Vec<Parameter>>,
    pub address: u32,
}

impl Identifier {
    /// A scalar or array variable.
    pub fn variable(name: impl Into<String>, ty: IdType, size: Option<u32>, address: u32) -> Self {
        Self {
            name: name.into(),
            ty,
            size,
            params: None,
            address,
        }
    }

    /// A procedure with its declared parameters and entry label id.
    pub fn function(name: impl Into<String>, params: Vec<Parameter>, label: u32) -> Self {
        Self {
            name: name.into(),
            ty: IdType::Function,
            size: None,
            params: Some(params),
            address: label,
        }
    }

    /// The program identifier with its entry label id.
    pub fn program(name: impl Into<String>, label: u32) -> Self {
        Self {
            name: name.into(),
            ty: IdType::Program,
            size: None,
            params: None,
            address: label,
        }
    }
}

/// A procedure parameter: the declared identifier plus its direction.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    pub id: Identifier,
    pub direction: Direction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_classes() {
        assert!(IdType::Str.is_variable());
        assert!(!IdType::Function.is_variable());
        assert!(IdType::Float.is_numeric());
        assert!(!IdType::Bool.is_numeric());
        assert!(IdType::Bool.is_logical());
        assert!(!IdType::Float.is_logical());
    }

    #[test]
    fn display_forms_match_report_text() {
        assert_eq!(IdType::Int.to_string(), "int");
        assert_eq!(IdType::Function.to_string(), "function");
        assert_eq!(Direction::Out.to_string(), "out");
    }

    #[test]
    fn constructors_fill_the_record() {
        let v = Identifier::variable("x", IdType::Int, Some(4), 2);
        assert_eq!(v.size, Some(4));
        assert_eq!(v.params, None);

        let f = Identifier::function("f", Vec::new(), 3);
        assert_eq!(f.ty, IdType::Function);
        assert_eq!(f.address, 3);
        assert_eq!(f.params.as_deref(), Some(&[][..]));
    }
}
