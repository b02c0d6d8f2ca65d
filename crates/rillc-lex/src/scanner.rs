//! The scanner: a cursor over the source buffer producing tokens.

use rillc_util::{Handler, SourceBuffer};

use crate::token::{starts_symbol, Token, TokenKind, KEYWORDS, SYMBOLS};

/// Characters allowed inside a string literal besides alphanumerics.
const STRING_PUNCT: &str = " _,;:.'";

/// Produces the token stream for one compilation.
///
/// The scanner keeps a `(line, column)` cursor into the source buffer
/// and hands out one token per `next_token` call. It reports malformed
/// input as warnings through the shared diagnostic [`Handler`] and is
/// restartable after any of them; only end of input stops the stream.
pub struct Scanner<'a> {
    src: &'a SourceBuffer,
    handler: &'a Handler,

    /// 0-based line of the next character to scan.
    line_pos: usize,

    /// 0-based column of the next character, counted in characters.
    char_pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a SourceBuffer, handler: &'a Handler) -> Self {
        Self {
            src,
            handler,
            line_pos: 0,
            char_pos: 0,
        }
    }

    /// Returns the next token, or an `eof` token once the buffer is
    /// exhausted. Never fails: anything unscannable produces a warning
    /// and scanning resumes at the next character or line.
    pub fn next_token(&mut self) -> Token {
        loop {
            let Some(first) = self.next_word() else {
                return Token::eof(self.src.line_count());
            };

            if first == '"' {
                return self.scan_string();
            }
            if first.is_ascii_digit() {
                return self.scan_number(first);
            }
            if first.is_alphabetic() {
                return self.scan_identifier(first);
            }
            if starts_symbol(first) {
                match self.scan_symbol(first) {
                    Some(token) => return token,
                    None => {
                        // Line comment: drop the rest of the line.
                        self.next_line();
                        continue;
                    }
                }
            }

            self.handler.warn(
                format!("Invalid character '{first}' encountered"),
                self.line_pos + 1,
            );
        }
    }

    /// Skips whitespace and newlines, then consumes and returns the
    /// first character of the next lexeme. `None` at end of input.
    fn next_word(&mut self) -> Option<char> {
        loop {
            let c = self.src.char_at(self.line_pos, self.char_pos)?;
            match c {
                '\n' => {
                    if !self.next_line() {
                        return None;
                    }
                }
                ' ' | '\t' | '\r' => self.char_pos += 1,
                _ => {
                    self.char_pos += 1;
                    return Some(c);
                }
            }
        }
    }

    /// Moves the cursor to the start of the next line. False when the
    /// buffer has no further lines.
    fn next_line(&mut self) -> bool {
        self.line_pos += 1;
        self.char_pos = 0;
        self.line_pos < self.src.line_count()
    }

    /// Peeks the character under the cursor; `None` at the line's end.
    fn peek_char(&self) -> Option<char> {
        match self.src.char_at(self.line_pos, self.char_pos) {
            Some('\n') | None => None,
            Some(c) => Some(c),
        }
    }

    /// Scans a string literal. The opening quote is already consumed.
    ///
    /// The literal must close on the same line; a hanging quote is a
    /// warning and end of line becomes the terminator. Characters
    /// outside the permitted set are replaced by spaces, one warning
    /// each.
    fn scan_string(&mut self) -> Token {
        let line_no = self.line_pos + 1;
        let chars: Vec<char> = self
            .src
            .raw_line(self.line_pos)
            .map(|l| l.chars().collect())
            .unwrap_or_default();

        let mut end = self.char_pos;
        while end < chars.len() && chars[end] != '"' && chars[end] != '\n' {
            end += 1;
        }
        let hanging = end >= chars.len() || chars[end] != '"';
        if hanging {
            self.handler.warn("No closing quotation in string", line_no);
        }

        let mut value = String::with_capacity(end - self.char_pos);
        for &c in &chars[self.char_pos..end] {
            if c.is_alphanumeric() || STRING_PUNCT.contains(c) {
                value.push(c);
            } else {
                self.handler
                    .warn(format!("Invalid character '{c}' in string"), line_no);
                value.push(' ');
            }
        }

        self.char_pos = end + usize::from(!hanging);
        Token::new(TokenKind::Str, value, line_no)
    }

    /// Scans an integer or float literal starting with `first`.
    ///
    /// Underscores are digit separators and are stripped; the first `.`
    /// switches to float mode; a trailing `.` gets a `0` fraction.
    fn scan_number(&mut self, first: char) -> Token {
        let line_no = self.line_pos + 1;
        let mut value = String::from(first);
        let mut kind = TokenKind::Int;

        while let Some(c) = self.peek_char() {
            if c == '.' && kind == TokenKind::Int {
                kind = TokenKind::Float;
            } else if !c.is_ascii_digit() && c != '_' {
                break;
            }
            value.push(c);
            self.char_pos += 1;
        }

        value.retain(|c| c != '_');
        if kind == TokenKind::Float && value.ends_with('.') {
            value.push('0');
        }
        Token::new(kind, value, line_no)
    }

    /// Scans an identifier starting with `first`, reclassifying it as a
    /// keyword when it matches the reserved-word table.
    fn scan_identifier(&mut self, first: char) -> Token {
        let line_no = self.line_pos + 1;
        let mut value = String::from(first);

        while let Some(c) = self.peek_char() {
            if !c.is_alphanumeric() && c != '_' {
                break;
            }
            value.push(c);
            self.char_pos += 1;
        }

        let kind = if KEYWORDS.contains(&value.as_str()) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Token::new(kind, value, line_no)
    }

    /// Scans a symbol with greedy matching. Returns `None` when the
    /// lexeme turns out to be the `//` comment opener.
    fn scan_symbol(&mut self, first: char) -> Option<Token> {
        let line_no = self.line_pos + 1;
        let mut value = String::from(first);

        while let Some(c) = self.peek_char() {
            let mut candidate = value.clone();
            candidate.push(c);
            if candidate == "//" {
                return None;
            }
            if !SYMBOLS.contains(&candidate.as_str()) {
                break;
            }
            value = candidate;
            self.char_pos += 1;
        }

        Some(Token::new(TokenKind::Symbol, value, line_no))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scan_all(input: &str) -> (Vec<Token>, Handler) {
        let src = SourceBuffer::from_source(input);
        let handler = Handler::new();
        let mut tokens = Vec::new();
        {
            let mut scanner = Scanner::new(&src, &handler);
            loop {
                let token = scanner.next_token();
                let done = token.is_eof();
                tokens.push(token);
                if done {
                    break;
                }
            }
        }
        (tokens, handler)
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_and_identifiers() {
        let (tokens, handler) = scan_all("the program p is");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Keyword,
                TokenKind::Keyword,
                TokenKind::Identifier,
                TokenKind::Keyword,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[2].value, "p");
        assert_eq!(handler.warning_count(), 0);
    }

    #[test]
    fn numbers_strip_underscores_and_default_fractions() {
        let (tokens, _) = scan_all("42 3.14 1_000 7.");
        assert_eq!(tokens[0], Token::new(TokenKind::Int, "42", 1));
        assert_eq!(tokens[1], Token::new(TokenKind::Float, "3.14", 1));
        assert_eq!(tokens[2], Token::new(TokenKind::Int, "1000", 1));
        assert_eq!(tokens[3], Token::new(TokenKind::Float, "7.0", 1));
    }

    #[test]
    fn second_dot_terminates_a_float() {
        // "." is not a symbol on its own, so the stray dot warns and
        // scanning resumes at the trailing digits.
        let (tokens, handler) = scan_all("1.2.3");
        assert_eq!(tokens[0], Token::new(TokenKind::Float, "1.2", 1));
        assert_eq!(tokens[1], Token::new(TokenKind::Int, "3", 1));
        assert_eq!(handler.warning_count(), 1);
    }

    #[test]
    fn symbols_match_greedily() {
        let (tokens, _) = scan_all("<= < = == != ! [ ]");
        let values: Vec<_> = tokens
            .iter()
            .filter(|t| !t.is_eof())
            .map(|t| t.value.as_str())
            .collect();
        assert_eq!(values, vec!["<=", "<", "=", "==", "!=", "!", "[", "]"]);
    }

    #[test]
    fn adjacent_symbols_split_correctly() {
        let (tokens, _) = scan_all("x<=3;");
        let values: Vec<_> = tokens
            .iter()
            .filter(|t| !t.is_eof())
            .map(|t| t.value.as_str())
            .collect();
        assert_eq!(values, vec!["x", "<=", "3", ";"]);
    }

    #[test]
    fn comments_run_to_end_of_line() {
        let (tokens, handler) = scan_all("x // everything here is dropped ;\ny");
        assert_eq!(tokens[0], Token::new(TokenKind::Identifier, "x", 1));
        assert_eq!(tokens[1], Token::new(TokenKind::Identifier, "y", 2));
        assert_eq!(handler.warning_count(), 0);
    }

    #[test]
    fn division_is_still_a_symbol() {
        let (tokens, _) = scan_all("a / b");
        assert_eq!(tokens[1], Token::new(TokenKind::Symbol, "/", 1));
    }

    #[test]
    fn string_literal_is_unquoted() {
        let (tokens, handler) = scan_all("\"hello, world\"");
        assert_eq!(tokens[0], Token::new(TokenKind::Str, "hello, world", 1));
        assert_eq!(handler.warning_count(), 0);
    }

    #[test]
    fn hanging_quote_warns_and_terminates_at_line_end() {
        let (tokens, handler) = scan_all("\"hello\nx");
        assert_eq!(tokens[0], Token::new(TokenKind::Str, "hello", 1));
        assert_eq!(tokens[1], Token::new(TokenKind::Identifier, "x", 2));
        assert_eq!(handler.warning_count(), 1);
        assert!(!handler.has_errors());
    }

    #[test]
    fn illegal_string_characters_become_spaces() {
        let (tokens, handler) = scan_all("\"a@b\"");
        assert_eq!(tokens[0], Token::new(TokenKind::Str, "a b", 1));
        assert_eq!(handler.warning_count(), 1);
    }

    #[test]
    fn invalid_character_warns_and_scanning_continues() {
        let (tokens, handler) = scan_all("# x");
        assert_eq!(tokens[0], Token::new(TokenKind::Identifier, "x", 1));
        assert_eq!(handler.warning_count(), 1);
        assert!(!handler.has_errors());
    }

    #[test]
    fn line_numbers_are_one_based() {
        let (tokens, _) = scan_all("a\nb\n\nc");
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[2].line, 4);
    }

    #[test]
    fn eof_repeats_after_exhaustion() {
        let src = SourceBuffer::from_source("x");
        let handler = Handler::new();
        let mut scanner = Scanner::new(&src, &handler);
        assert_eq!(scanner.next_token().kind, TokenKind::Identifier);
        assert!(scanner.next_token().is_eof());
        assert!(scanner.next_token().is_eof());
    }

    proptest! {
        #[test]
        fn scanning_terminates_on_arbitrary_input(input in prop::collection::vec(any::<char>(), 0..200)) {
            let text: String = input.into_iter().collect();
            let src = SourceBuffer::from_source(&text);
            let handler = Handler::new();
            let mut scanner = Scanner::new(&src, &handler);
            let mut count = 0usize;
            while !scanner.next_token().is_eof() {
                count += 1;
                prop_assert!(count < 10_000);
            }
        }

        #[test]
        fn scanning_is_deterministic(input in "[ -~\n]{0,200}") {
            let src = SourceBuffer::from_source(&input);
            let first = {
                let handler = Handler::new();
                let mut scanner = Scanner::new(&src, &handler);
                let mut tokens = Vec::new();
                loop {
                    let t = scanner.next_token();
                    let done = t.is_eof();
                    tokens.push(t);
                    if done { break; }
                }
                tokens
            };
            let second = {
                let handler = Handler::new();
                let mut scanner = Scanner::new(&src, &handler);
                let mut tokens = Vec::new();
                loop {
                    let t = scanner.next_token();
                    let done = t.is_eof();
                    tokens.push(t);
                    if done { break; }
                }
                tokens
            };
            prop_assert_eq!(first, second);
        }
    }
}
