//! Expression parsing.
//!
//! The precedence ladder deliberately places relational operators
//! between the additive and multiplicative levels:
//!
//! ```text
//! expr   = ["not"] arith {("&" | "|") arith}
//! arith  = rel {("+" | "-") rel}
//! rel    = term {("<"|">"|"<="|">="|"=="|"!=") term}
//! term   = factor {("*"|"/") factor}
//! ```
//!
//! This is unconventional but part of the language definition.
//!
//! Every production returns the operand's type together with the
//! register holding its value, so chained operations always know both
//! operand registers without consulting allocator state. Mixed
//! `int`/`float` operands are allowed for the arithmetic operators
//! only; `& |` and the relational operators take `int`/`bool`.

use rillc_lex::TokenKind;
use rillc_sem::{Direction, IdType, Location};

use crate::{ParseError, ParseResult, Parser};

impl<'a> Parser<'a> {
    /// `["not"] arith {("&" | "|") arith}`
    pub(crate) fn parse_expression(&mut self) -> ParseResult<(IdType, u32)> {
        self.gen.comment("expression");

        let negate = self.accept_kw("not");
        let line = self.current.line;
        let (ty, mut reg) = self.parse_arith_op()?;

        if negate && !ty.is_logical() {
            self.type_error("int or bool", &ty.to_string(), line);
            return Err(ParseError::Type);
        }

        loop {
            let op = if self.accept_sym("&") {
                "&"
            } else if self.accept_sym("|") {
                "|"
            } else {
                break;
            };

            if !ty.is_logical() {
                self.type_error("int or bool", &ty.to_string(), line);
                return Err(ParseError::Type);
            }

            let (next_ty, next_reg) = self.parse_arith_op()?;
            if !next_ty.is_logical() {
                self.type_error("int or bool", &next_ty.to_string(), line);
                return Err(ParseError::Type);
            }

            reg = self.gen.operation(reg, ty, next_reg, next_ty, op);
        }

        if negate {
            self.gen.complement(reg);
        }

        Ok((ty, reg))
    }

    /// `rel {("+" | "-") rel}`
    fn parse_arith_op(&mut self) -> ParseResult<(IdType, u32)> {
        let line = self.current.line;
        let (ty, mut reg) = self.parse_relation()?;

        loop {
            let op = if self.accept_sym("+") {
                "+"
            } else if self.accept_sym("-") {
                "-"
            } else {
                break;
            };

            if !ty.is_numeric() {
                self.type_error("int or float", &ty.to_string(), line);
                return Err(ParseError::Type);
            }

            let (next_ty, next_reg) = self.parse_relation()?;
            if !next_ty.is_numeric() {
                self.type_error("int or float", &next_ty.to_string(), line);
                return Err(ParseError::Type);
            }

            reg = self.gen.operation(reg, ty, next_reg, next_ty, op);
        }

        Ok((ty, reg))
    }

    /// `term {("<"|">"|"<="|">="|"=="|"!=") term}` - relational
    /// operators are restricted to `int` and `bool`.
    fn parse_relation(&mut self) -> ParseResult<(IdType, u32)> {
        let line = self.current.line;
        let (ty, mut reg) = self.parse_term()?;

        loop {
            let op = if self.accept_sym("<") {
                "<"
            } else if self.accept_sym(">") {
                ">"
            } else if self.accept_sym("<=") {
                "<="
            } else if self.accept_sym(">=") {
                ">="
            } else if self.accept_sym("==") {
                "=="
            } else if self.accept_sym("!=") {
                "!="
            } else {
                break;
            };

            if !ty.is_logical() {
                self.type_error("int or bool", &ty.to_string(), line);
                return Err(ParseError::Type);
            }

            let (next_ty, next_reg) = self.parse_term()?;
            if !next_ty.is_logical() {
                self.type_error("int or bool", &next_ty.to_string(), line);
                return Err(ParseError::Type);
            }

            reg = self.gen.operation(reg, ty, next_reg, next_ty, op);
        }

        Ok((ty, reg))
    }

    /// `factor {("*"|"/") factor}`
    fn parse_term(&mut self) -> ParseResult<(IdType, u32)> {
        let mut line = self.current.line;
        let (ty, mut reg) = self.parse_factor()?;

        loop {
            let op = if self.accept_sym("*") {
                "*"
            } else if self.accept_sym("/") {
                "/"
            } else {
                break;
            };

            if !ty.is_numeric() {
                self.type_error("int or float", &ty.to_string(), line);
                return Err(ParseError::Type);
            }

            line = self.current.line;
            let (next_ty, next_reg) = self.parse_factor()?;
            if !next_ty.is_numeric() {
                self.type_error("int or float", &next_ty.to_string(), line);
                return Err(ParseError::Type);
            }

            reg = self.gen.operation(reg, ty, next_reg, next_ty, op);
        }

        Ok((ty, reg))
    }

    /// `"(" expr ")" | STR | "true" | "false" | ["-"] (name | NUMBER)`
    fn parse_factor(&mut self) -> ParseResult<(IdType, u32)> {
        if self.accept_sym("(") {
            let result = self.parse_expression()?;
            self.expect_sym(")")?;
            Ok(result)
        } else if self.accept_kind(TokenKind::Str) {
            let value = self.previous.value.clone();
            let reg = self.gen.load_string(&value);
            Ok((IdType::Str, reg))
        } else if self.accept_kw("true") {
            Ok((IdType::Bool, self.gen.load_bool(true)))
        } else if self.accept_kw("false") {
            Ok((IdType::Bool, self.gen.load_bool(false)))
        } else if self.accept_sym("-") {
            if self.check_kind(TokenKind::Identifier) {
                let (ty, reg) = self.parse_name()?;
                self.gen.negate(reg);
                Ok((ty, reg))
            } else if self.check_kind(TokenKind::Int) || self.check_kind(TokenKind::Float) {
                self.parse_number(true)
            } else {
                Err(self.syntax_error("variable name, int, or float"))
            }
        } else if self.check_kind(TokenKind::Identifier) {
            self.parse_name()
        } else if self.check_kind(TokenKind::Int) || self.check_kind(TokenKind::Float) {
            self.parse_number(false)
        } else {
            Err(self.syntax_error("factor"))
        }
    }

    /// A variable reference, optionally subscripted. Parameters may
    /// only be read when their direction is `in`.
    pub(crate) fn parse_name(&mut self) -> ParseResult<(IdType, u32)> {
        let name_token = self.expect_kind(TokenKind::Identifier)?;

        let id = match self.ids.find(&name_token.value) {
            Ok(id) => id,
            Err(_) => {
                self.name_error("not declared in this scope", &name_token.value, name_token.line);
                return Err(ParseError::Name);
            }
        };
        if !id.ty.is_variable() {
            self.type_error("variable", &id.ty.to_string(), name_token.line);
            return Err(ParseError::Type);
        }

        let mut index_reg = None;
        if self.accept_sym("[") {
            let (index_ty, reg) = self.parse_expression()?;
            if index_ty != IdType::Int {
                self.type_error("int", &index_ty.to_string(), name_token.line);
                return Err(ParseError::Type);
            }
            self.expect_sym("]")?;
            index_reg = Some(reg);
        } else if id.size.is_some() {
            self.runtime_error(
                format!("{}: array requires index", id.name),
                name_token.line,
            );
        }

        let location = self.ids.location(&id.name);
        if location == Location::Param {
            let direction = self.ids.param_direction(&id.name);
            if direction != Some(Direction::In) {
                let found = direction
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                self.type_error("'in' param", &format!("'{found}' param"), name_token.line);
                return Err(ParseError::Type);
            }
        }

        let reg = self.gen.load_name(&id, location, index_reg);
        Ok((id.ty, reg))
    }

    /// An int or float literal, loaded into a fresh register.
    fn parse_number(&mut self, negate: bool) -> ParseResult<(IdType, u32)> {
        let (ty, value) = self.parse_number_literal()?;
        let reg = self.gen.load_number(&value, negate);
        Ok((ty, reg))
    }

    /// Matches a numeric literal without emitting code; array sizes in
    /// declarations use this directly.
    pub(crate) fn parse_number_literal(&mut self) -> ParseResult<(IdType, String)> {
        if self.accept_kind(TokenKind::Int) {
            Ok((IdType::Int, self.previous.value.clone()))
        } else if self.accept_kind(TokenKind::Float) {
            Ok((IdType::Float, self.previous.value.clone()))
        } else {
            Err(self.syntax_error("number"))
        }
    }
}
