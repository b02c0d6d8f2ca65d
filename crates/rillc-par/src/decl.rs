//! Declaration parsing: variables, procedures, and parameter lists.

use rillc_lex::TokenKind;
use rillc_sem::{Direction, IdType, Identifier, Parameter};

use crate::{ParseError, ParseResult, Parser};

impl<'a> Parser<'a> {
    /// `["global"] (variable_decl | procedure_decl)` - returns the
    /// stack cells the declaration added to the enclosing frame
    /// (`None` for procedures).
    pub(crate) fn parse_declaration(&mut self) -> ParseResult<Option<u32>> {
        let is_global = self.accept_kw("global");

        if self.at_procedure_declaration() {
            self.parse_procedure_declaration(is_global)?;
            Ok(None)
        } else if self.at_variable_declaration() {
            let id = self.parse_variable_declaration(is_global, false)?;
            Ok(Some(id.size.unwrap_or(1)))
        } else {
            Err(self.syntax_error("procedure or variable declaration"))
        }
    }

    fn at_variable_declaration(&self) -> bool {
        self.check_kw("int") || self.check_kw("float") || self.check_kw("bool") || self.check_kw("str")
    }

    fn at_procedure_declaration(&self) -> bool {
        self.check_kw("function")
    }

    /// `type IDENT ["[" int_literal "]"]` - allocates the variable's
    /// stack cells and records it in the identifier table (parameters
    /// are recorded by the procedure header instead).
    pub(crate) fn parse_variable_declaration(
        &mut self,
        is_global: bool,
        is_param: bool,
    ) -> ParseResult<Identifier> {
        let ty = self.parse_type_mark()?;
        let name_token = self.expect_kind(TokenKind::Identifier)?;

        let mut size = None;
        if self.accept_sym("[") {
            let index_line = self.current.line;
            let (index_ty, value) = self.parse_number_literal()?;
            if index_ty != IdType::Int {
                self.type_error("int", &index_ty.to_string(), index_line);
                return Err(ParseError::Type);
            }
            let length = value
                .parse::<u32>()
                .map_err(|_| self.syntax_error("array size"))?;
            size = Some(length);
            self.expect_sym("]")?;
        }

        let address = self.gen.alloc_mem(size, is_param);
        let id = Identifier::variable(name_token.value.clone(), ty, size, address);

        if !is_param {
            if let Err(e) = self.ids.add(id.clone(), is_global) {
                self.name_error(&e.to_string(), &id.name, name_token.line);
            }
        }

        Ok(id)
    }

    /// `"int" | "float" | "bool" | "str"`
    fn parse_type_mark(&mut self) -> ParseResult<IdType> {
        if self.accept_kw("int") {
            Ok(IdType::Int)
        } else if self.accept_kw("float") {
            Ok(IdType::Float)
        } else if self.accept_kw("bool") {
            Ok(IdType::Bool)
        } else if self.accept_kw("str") {
            Ok(IdType::Str)
        } else {
            Err(self.syntax_error("variable type"))
        }
    }

    /// Header and body of a procedure declaration. The enclosing
    /// frame's allocation pointers are saved around the nested
    /// declaration so later declarations in the outer scope resume
    /// from their previous offsets.
    fn parse_procedure_declaration(&mut self, is_global: bool) -> ParseResult<()> {
        let enclosing = self.gen.frame_state();
        let id = self.parse_procedure_header(is_global)?;
        self.parse_procedure_body(&id)?;
        self.gen.restore_frame(enclosing);
        Ok(())
    }

    /// `"function" IDENT "(" [param_list] ")" "is"` - declares the
    /// procedure in the enclosing scope, opens its own scope, records
    /// its parameters there, and emits the entry label.
    fn parse_procedure_header(&mut self, is_global: bool) -> ParseResult<Identifier> {
        self.expect_kw("function")?;
        let name_token = self.expect_kind(TokenKind::Identifier)?;
        self.expect_sym("(")?;

        // Parameters and locals of this procedure start at offset 0.
        self.gen.reset_local_ptr();
        self.gen.reset_param_ptr();

        let mut params = Vec::new();
        if !self.check_sym(")") {
            self.parse_parameter_list(&mut params)?;
        }
        self.expect_sym(")")?;
        self.expect_kw("is")?;

        let label = self.gen.fresh_label();
        let id = Identifier::function(name_token.value.clone(), params.clone(), label);

        if let Err(e) = self.ids.add(id.clone(), is_global) {
            self.name_error(&e.to_string(), &id.name, name_token.line);
        }

        // The scope is opened even when the declaration collided, so
        // the body's pop keeps the stack balanced. The procedure is
        // added to its own scope to resolve as owner.
        self.ids.push_scope(id.name.clone());
        if let Err(e) = self.ids.add(id.clone(), false) {
            self.name_error(&e.to_string(), &id.name, name_token.line);
        }
        for param in &params {
            if let Err(e) = self.ids.add(param.id.clone(), false) {
                self.name_error(&e.to_string(), &param.id.name, name_token.line);
            }
        }

        self.gen.procedure_entry(&id.name, id.address);
        Ok(id)
    }

    /// `{declaration ";"} "body" {statement ";"} "finish" "function"`
    fn parse_procedure_body(&mut self, procedure: &Identifier) -> ParseResult<()> {
        let mut local_size: u32 = 0;
        while !self.accept_kw("body") {
            if self.at_eof() {
                return Err(self.syntax_error("\"body\" (keyword)"));
            }
            match self.parse_declaration() {
                Ok(Some(size)) => local_size += size,
                Ok(None) => {}
                Err(_) => self.resync_to_semicolon(),
            }
            self.expect_sym(";")?;
        }

        self.gen
            .body_entry(&procedure.name, procedure.address, local_size, false);

        while !self.accept_kw("finish") {
            if self.at_eof() {
                return Err(self.syntax_error("\"finish\" (keyword)"));
            }
            if self.parse_statement().is_err() {
                self.resync_to_semicolon();
            }
            self.expect_sym(";")?;
        }
        self.expect_kw("function")?;

        self.gen.procedure_exit();
        self.ids.pop_scope();
        Ok(())
    }

    /// `param {"," param}`
    fn parse_parameter_list(&mut self, params: &mut Vec<Parameter>) -> ParseResult<()> {
        loop {
            let param = self.parse_parameter()?;
            params.push(param);
            if !self.accept_sym(",") {
                return Ok(());
            }
        }
    }

    /// `variable_decl ("in" | "out")` - the identifier is built here
    /// but only enters the table once the procedure scope exists.
    fn parse_parameter(&mut self) -> ParseResult<Parameter> {
        let id = self.parse_variable_declaration(false, true)?;

        let direction = if self.accept_kw("in") {
            Direction::In
        } else if self.accept_kw("out") {
            Direction::Out
        } else {
            return Err(self.syntax_error("\"in\" or \"out\""));
        };

        Ok(Parameter { id, direction })
    }
}
