//! Statement parsing: return, if, for, procedure calls, assignments.

use rillc_lex::TokenKind;
use rillc_sem::{Direction, IdType, Identifier, Location, Parameter};

use crate::{ParseError, ParseResult, Parser};

impl<'a> Parser<'a> {
    /// Dispatches on the statement's first token. `IDENT "("` is a
    /// procedure call, any other `IDENT` starts an assignment.
    pub(crate) fn parse_statement(&mut self) -> ParseResult<()> {
        if self.accept_kw("return") {
            self.gen.emit_return();
            Ok(())
        } else if self.check_kw("if") {
            self.parse_if_statement()
        } else if self.check_kw("for") {
            self.parse_loop_statement()
        } else if self.check_kind(TokenKind::Identifier) && self.future_is_sym("(") {
            self.parse_procedure_call()
        } else if self.check_kind(TokenKind::Identifier) {
            self.parse_assignment_statement()
        } else {
            Err(self.syntax_error("statement"))
        }
    }

    /// `"if" "(" expr ")" "then" {statement ";"} ["else"
    /// {statement ";"}] "finish" "if"`
    fn parse_if_statement(&mut self) -> ParseResult<()> {
        self.expect_kw("if")?;
        self.expect_sym("(")?;
        let (_, expr_reg) = self.parse_expression()?;
        self.expect_sym(")")?;
        self.expect_kw("then")?;

        let label = self.gen.fresh_label();
        self.gen.cond_jump(expr_reg, &format!("else_{label}"));
        self.gen.tab_push();

        loop {
            if self.at_eof() {
                return Err(self.syntax_error("statement"));
            }
            if self.parse_statement().is_err() {
                self.resync_to_semicolon();
            }
            self.expect_sym(";")?;
            if self.check_kw("else") || self.check_kw("finish") {
                break;
            }
        }

        self.gen.jump(&format!("endif_{label}"));
        self.gen.tab_pop();
        self.gen.label(&format!("else_{label}"));
        self.gen.tab_push();

        if self.accept_kw("else") {
            loop {
                if self.at_eof() {
                    return Err(self.syntax_error("statement"));
                }
                if self.parse_statement().is_err() {
                    self.resync_to_semicolon();
                }
                self.expect_sym(";")?;
                if self.check_kw("finish") {
                    break;
                }
            }
        }

        self.expect_kw("finish")?;
        self.expect_kw("if")?;

        self.gen.tab_pop();
        self.gen.label(&format!("endif_{label}"));
        Ok(())
    }

    /// `"for" "(" assign_stmt ";" expr ")" {statement ";"} "finish"
    /// "for"` - the assignment runs on every iteration, matching the
    /// loop label placement.
    fn parse_loop_statement(&mut self) -> ParseResult<()> {
        self.expect_kw("for")?;
        self.expect_sym("(")?;

        let label = self.gen.fresh_label();
        self.gen.label(&format!("loop_{label}"));
        self.gen.tab_push();

        if self.parse_assignment_statement().is_err() {
            self.resync_to_semicolon();
        }
        self.expect_sym(";")?;

        let (_, expr_reg) = self.parse_expression()?;
        self.expect_sym(")")?;
        self.gen.cond_jump(expr_reg, &format!("endloop_{label}"));

        while !self.accept_kw("finish") {
            if self.at_eof() {
                return Err(self.syntax_error("\"finish\" (keyword)"));
            }
            if self.parse_statement().is_err() {
                self.resync_to_semicolon();
            }
            self.expect_sym(";")?;
        }
        self.expect_kw("for")?;

        self.gen.jump(&format!("loop_{label}"));
        self.gen.tab_pop();
        self.gen.label(&format!("endloop_{label}"));
        Ok(())
    }

    /// `dest "=" expr` - checks type equality and, when the target is
    /// a parameter, that its direction allows writing.
    pub(crate) fn parse_assignment_statement(&mut self) -> ParseResult<()> {
        let line = self.current.line;
        let (id, index_reg) = self.parse_destination()?;

        self.expect_sym("=")?;
        let (expr_ty, expr_reg) = self.parse_expression()?;

        if id.ty != expr_ty {
            self.type_error(&id.ty.to_string(), &expr_ty.to_string(), line);
        }

        let location = self.ids.location(&id.name);
        if location == Location::Param {
            let direction = self.ids.param_direction(&id.name);
            if direction != Some(Direction::Out) {
                let found = direction
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                self.type_error("'out' param", &format!("'{found}' param"), line);
                return Err(ParseError::Type);
            }
        }

        self.gen.assignment(&id, location, index_reg, expr_reg);
        Ok(())
    }

    /// The assignment target: a declared variable, optionally
    /// subscripted. Returns the identifier and the index register when
    /// one was emitted.
    fn parse_destination(&mut self) -> ParseResult<(Identifier, Option<u32>)> {
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
            let index_line = self.current.line;
            let (index_ty, reg) = self.parse_expression()?;
            if index_ty != IdType::Int {
                self.type_error("int", &index_ty.to_string(), index_line);
            }
            self.accept_sym("]");
            index_reg = Some(reg);
        } else if id.size.is_some() {
            self.runtime_error(
                format!("{}: array requires index", id.name),
                name_token.line,
            );
        }

        Ok((id, index_reg))
    }

    /// `IDENT "(" [arg_list] ")"` - emits the full call protocol:
    /// pushes (right to left, done by the argument list), the jump,
    /// then pops in declared order with write-backs for `out`
    /// parameters.
    fn parse_procedure_call(&mut self) -> ParseResult<()> {
        let name_token = self.expect_kind(TokenKind::Identifier)?;

        let id = match self.ids.find(&name_token.value) {
            Ok(id) => id,
            Err(_) => {
                self.name_error(
                    "procedure has not been declared",
                    &name_token.value,
                    name_token.line,
                );
                return Err(ParseError::Name);
            }
        };
        if id.ty != IdType::Function {
            self.type_error("function", &id.ty.to_string(), name_token.line);
            return Err(ParseError::Type);
        }

        self.expect_sym("(")?;
        let params = id.params.clone().unwrap_or_default();
        let mut out_names: Vec<Option<String>> = Vec::new();

        if !self.check_sym(")") {
            let given = self.parse_argument_list(&params, &mut out_names, 0)?;
            if given < params.len() {
                self.runtime_error(
                    format!(
                        "procedure call accepts {} argument(s), {} given",
                        params.len(),
                        given
                    ),
                    name_token.line,
                );
                return Err(ParseError::Runtime);
            }
        } else if !params.is_empty() {
            self.runtime_error(
                format!(
                    "procedure call accepts {} argument(s), 0 given",
                    params.len()
                ),
                name_token.line,
            );
            return Err(ParseError::Runtime);
        }
        self.expect_sym(")")?;

        self.gen.call(&id.name, id.address);

        for (index, param) in params.iter().enumerate() {
            let reg = self.gen.param_pop(&param.id.name);
            if param.direction == Direction::Out {
                if let Some(Some(out_name)) = out_names.get(index) {
                    // The argument was validated when it was parsed.
                    if let Ok(out_id) = self.ids.find(out_name) {
                        let location = self.ids.location(out_name);
                        self.gen.param_store(&out_id, location, reg);
                    }
                }
            }
        }

        self.gen.call_end();
        Ok(())
    }

    /// `expr {"," expr}`, checked against the callee's parameter list.
    ///
    /// An `out` position takes a bare name (captured for the
    /// write-back); an `in` position takes any expression. Pushes
    /// happen after the recursive tail so arguments land on the stack
    /// in reverse syntactic order, which is the order the pops undo.
    fn parse_argument_list(
        &mut self,
        params: &[Parameter],
        out_names: &mut Vec<Option<String>>,
        index: usize,
    ) -> ParseResult<usize> {
        let line = self.current.line;

        if index >= params.len() {
            self.runtime_error(
                format!("procedure call accepts only {} argument(s)", params.len()),
                line,
            );
            return Err(ParseError::Runtime);
        }

        let param = &params[index];
        let (arg_ty, arg_reg) = match param.direction {
            Direction::Out => {
                let arg_name = self.current.value.clone();
                let result = self.parse_name()?;
                out_names.push(Some(arg_name));
                result
            }
            Direction::In => {
                let result = self.parse_expression()?;
                out_names.push(None);
                result
            }
        };

        if arg_ty != param.id.ty {
            self.type_error(&param.id.ty.to_string(), &arg_ty.to_string(), line);
        }

        let mut given = index + 1;
        if self.accept_sym(",") {
            given = self.parse_argument_list(params, out_names, given)?;
        }

        self.gen.param_push(arg_reg);
        Ok(given)
    }
}
