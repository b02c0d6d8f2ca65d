//! rillc-lex - Lexical analysis for the Rill language.
//!
//! The scanner turns the line-indexed source buffer into a lazy stream
//! of tokens. It is a small character-class state machine: the first
//! character of each lexeme picks one of five paths (string literal,
//! number, identifier/keyword, symbol, or junk), and each path runs to
//! the end of the lexeme before the next `next_token` call.
//!
//! Two properties matter to the parser sitting on top:
//!
//! - The stream is total. Malformed input (stray characters, hanging
//!   quotes, illegal characters inside strings) produces warnings
//!   through the diagnostic sink and a best-effort token; scanning
//!   always continues to end of file, where `next_token` returns an
//!   `eof` token forever after.
//! - Tokens carry their 1-based source line, which is all the parser
//!   needs for its reports.
//!
//! Comments (`//` to end of line) and whitespace are consumed here and
//! never surface as tokens.

pub mod scanner;
pub mod token;

pub use scanner::Scanner;
pub use token::{Token, TokenKind, KEYWORDS, SYMBOLS};
