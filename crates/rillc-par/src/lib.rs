//! rillc-par - Recursive-descent parser with integrated semantic
//! analysis and code generation.
//!
//! This is a single-pass front end: there is no syntax tree. Each
//! grammar production is a method; semantic actions (identifier-table
//! updates, type checks, emission calls into the generator) are
//! interleaved with the token matching, so by the time a production
//! returns, its code is already in the buffer.
//!
//! ## Lookahead
//!
//! The parser keeps a three-token window: `previous` (the token just
//! consumed, used to read matched lexemes), `current`, and `future`.
//! One peek at `future` is enough to disambiguate the only ambiguous
//! spot in the grammar: `IDENT (` starts a procedure call, any other
//! `IDENT` an assignment.
//!
//! ## Error discipline
//!
//! Productions return `Result<_, ParseError>`. The error value carries
//! no payload; the diagnostic was already reported through the shared
//! sink at the raise site. Statement and declaration loops are the
//! recovery boundaries: on any error they advance the stream to the
//! next `;`, consume it, and keep parsing, so one bad statement costs
//! exactly one statement. Emission for statements that completed
//! earlier is never rolled back, but the driver suppresses the final
//! commit whenever any error was reported.

mod decl;
mod expr;
mod stmt;

use thiserror::Error;

use rillc_gen::{runtime_functions, Generator};
use rillc_lex::{Scanner, Token, TokenKind};
use rillc_sem::{IdentTable, Identifier, Parameter};
use rillc_util::{Category, Handler};

/// Label id shared by all runtime-library procedures. The label
/// counter hands out ids starting at 1 to user code, but runtime
/// labels are distinguished by name, never by id alone.
const RUNTIME_LABEL: u32 = 1;

/// Parser failure, used only for control flow up to the nearest
/// recovery boundary. The diagnostic is reported before this is
/// raised.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A `match` primitive met the wrong token.
    #[error("syntax error")]
    Syntax,
    /// A name could not be resolved or declared.
    #[error("name error")]
    Name,
    /// A type check failed hard enough to abandon the statement.
    #[error("type error")]
    Type,
    /// An argument-count or array-usage check failed.
    #[error("runtime error")]
    Runtime,
}

pub(crate) type ParseResult<T> = Result<T, ParseError>;

/// The single-pass compiler core: pulls tokens, checks semantics,
/// emits code.
pub struct Parser<'a> {
    scanner: Scanner<'a>,
    handler: &'a Handler,
    ids: IdentTable,
    gen: Generator,
    previous: Token,
    current: Token,
    future: Token,
}

impl<'a> Parser<'a> {
    /// Builds a parser over a scanner, priming the two-token
    /// lookahead.
    pub fn new(mut scanner: Scanner<'a>, handler: &'a Handler, debug: bool) -> Self {
        let future = scanner.next_token();
        let mut parser = Self {
            scanner,
            handler,
            ids: IdentTable::new(),
            gen: Generator::new(debug),
            previous: Token::eof(0),
            current: Token::eof(0),
            future,
        };
        parser.advance();
        parser
    }

    /// Runs the whole compile: runtime injection, header, the program
    /// production, footer, and the end-of-file junk check. Diagnostics
    /// land in the shared handler; the caller decides whether to
    /// commit the generated code.
    pub fn compile(&mut self) {
        self.add_runtime();
        self.gen.emit_header();
        if self.parse_program().is_err() {
            // Unrecoverable syntax error; the diagnostic is already
            // reported and the commit will be suppressed.
            return;
        }
        self.gen.emit_footer();
        if !self.at_eof() {
            self.handler
                .warn("Content found after end of program", self.current.line);
        }
    }

    /// Number of open scopes; one (the global scope) after a balanced
    /// parse.
    pub fn scope_depth(&self) -> usize {
        self.ids.depth()
    }

    /// Releases the generator with the emitted code.
    pub fn into_generator(self) -> Generator {
        self.gen
    }

    /// Seeds the global scope with the runtime-library procedures so
    /// user code can call them without declaring them.
    fn add_runtime(&mut self) {
        for (name, params) in runtime_functions() {
            let param_ids = params
                .iter()
                .enumerate()
                .map(|(index, p)| Parameter {
                    id: Identifier::variable(p.name, p.ty, None, index as u32),
                    direction: p.direction,
                })
                .collect();
            let func = Identifier::function(name, param_ids, RUNTIME_LABEL);
            // The runtime table is a closed set; a fresh table cannot
            // reject these names.
            let _ = self.ids.add(func, true);
        }
    }

    // =====================================================================
    // Token window
    // =====================================================================

    /// Slides the three-token window one token forward. Once `future`
    /// is `eof` the scanner is not consulted again.
    fn advance(&mut self) {
        self.previous = std::mem::replace(&mut self.current, self.future.clone());
        if !self.future.is_eof() {
            self.future = self.scanner.next_token();
        }
    }

    fn token_matches(token: &Token, kind: TokenKind, value: Option<&str>) -> bool {
        token.kind == kind && value.map_or(true, |v| token.value == v)
    }

    fn check_kind(&self, kind: TokenKind) -> bool {
        Self::token_matches(&self.current, kind, None)
    }

    fn check_kw(&self, keyword: &str) -> bool {
        Self::token_matches(&self.current, TokenKind::Keyword, Some(keyword))
    }

    fn check_sym(&self, symbol: &str) -> bool {
        Self::token_matches(&self.current, TokenKind::Symbol, Some(symbol))
    }

    /// Peeks one past `current`; the call/assignment disambiguation.
    fn future_is_sym(&self, symbol: &str) -> bool {
        Self::token_matches(&self.future, TokenKind::Symbol, Some(symbol))
    }

    fn at_eof(&self) -> bool {
        self.current.is_eof()
    }

    fn accept_kind(&mut self, kind: TokenKind) -> bool {
        if self.check_kind(kind) {
            self.advance();
            return true;
        }
        false
    }

    fn accept_kw(&mut self, keyword: &str) -> bool {
        if self.check_kw(keyword) {
            self.advance();
            return true;
        }
        false
    }

    fn accept_sym(&mut self, symbol: &str) -> bool {
        if self.check_sym(symbol) {
            self.advance();
            return true;
        }
        false
    }

    /// Advances past the expected token kind or raises a syntax
    /// error. Returns the consumed token.
    fn expect_kind(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.accept_kind(kind) {
            return Ok(self.previous.clone());
        }
        Err(self.syntax_error(&kind.to_string()))
    }

    fn expect_kw(&mut self, keyword: &str) -> ParseResult<Token> {
        if self.accept_kw(keyword) {
            return Ok(self.previous.clone());
        }
        Err(self.syntax_error(&format!("\"{keyword}\" (keyword)")))
    }

    fn expect_sym(&mut self, symbol: &str) -> ParseResult<Token> {
        if self.accept_sym(symbol) {
            return Ok(self.previous.clone());
        }
        Err(self.syntax_error(&format!("\"{symbol}\" (symbol)")))
    }

    /// Panic-mode recovery: drop tokens until the next `;` (or end of
    /// input). The boundary that called this consumes the `;` itself.
    fn resync_to_semicolon(&mut self) {
        while !self.check_sym(";") && !self.at_eof() {
            self.advance();
        }
    }

    // =====================================================================
    // Reporting
    // =====================================================================

    fn syntax_error(&self, expected: &str) -> ParseError {
        let message = format!("Expected {expected}, encountered {}", self.current);
        self.handler
            .error(Category::Syntax, message, self.current.line);
        ParseError::Syntax
    }

    fn name_error(&self, message: &str, name: &str, line: usize) {
        self.handler
            .error(Category::Name, format!("{name}: {message}"), line);
    }

    fn type_error(&self, expected: &str, encountered: &str, line: usize) {
        self.handler.error(
            Category::Type,
            format!("Expected {expected} type, encountered {encountered}"),
            line,
        );
    }

    fn runtime_error(&self, message: impl Into<String>, line: usize) {
        self.handler.error(Category::Runtime, message, line);
    }

    // =====================================================================
    // The program production
    // =====================================================================

    fn parse_program(&mut self) -> ParseResult<()> {
        let program = self.parse_program_header()?;
        self.parse_program_body(&program)
    }

    /// `{statement ";"} "the" "program" IDENT "is"` - declares the
    /// program identifier globally, emits its entry point, and opens
    /// the program scope.
    fn parse_program_header(&mut self) -> ParseResult<Identifier> {
        while !self.accept_kw("the") {
            if self.at_eof() {
                return Err(self.syntax_error("\"the\" (keyword)"));
            }
            if self.parse_statement().is_err() {
                self.resync_to_semicolon();
            }
            self.expect_sym(";")?;
        }
        self.expect_kw("program")?;

        let name_token = self.expect_kind(TokenKind::Identifier)?;
        let label = self.gen.fresh_label();
        let program = Identifier::program(name_token.value.clone(), label);

        if let Err(e) = self.ids.add(program.clone(), true) {
            self.name_error(&e.to_string(), &program.name, name_token.line);
        }

        self.expect_kw("is")?;

        self.gen.program_entry(&program.name, program.address);

        // The program is added to its own scope so it resolves as the
        // scope owner.
        self.ids.push_scope(program.name.clone());
        if let Err(e) = self.ids.add(program.clone(), false) {
            self.name_error(&e.to_string(), &program.name, name_token.line);
        }

        Ok(program)
    }

    /// `{statement ";"} "define" {declaration ";"} "body"
    /// {statement ";"} "finish" "program"` - the body label is emitted
    /// only once declarations fixed the local frame size.
    fn parse_program_body(&mut self, program: &Identifier) -> ParseResult<()> {
        while !self.accept_kw("define") {
            if self.at_eof() {
                return Err(self.syntax_error("\"define\" (keyword)"));
            }
            if self.parse_statement().is_err() {
                self.resync_to_semicolon();
            }
            self.expect_sym(";")?;
        }

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
            .body_entry(&program.name, program.address, local_size, true);

        while !self.accept_kw("finish") {
            if self.at_eof() {
                return Err(self.syntax_error("\"finish\" (keyword)"));
            }
            if self.parse_statement().is_err() {
                self.resync_to_semicolon();
            }
            self.expect_sym(";")?;
        }
        self.expect_kw("program")?;

        self.ids.pop_scope();
        self.gen.program_exit();
        Ok(())
    }
}
