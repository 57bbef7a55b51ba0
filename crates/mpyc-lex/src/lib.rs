//! mpyc-lex - lexical analysis for miniPy.
//!
//! Turns a source string into a flat stream of [`Token`]s. A physical
//! newline is itself a significant token (`NEW_LINE`) rather than
//! whitespace: blocks are delimited by `:` ... `#`, not by indentation,
//! so the parser needs to see line breaks to recognize the boundary
//! between a block's last statement and the `#` sentinel.
//!
//! An unrecognized character is reported through the [`Handler`] and
//! skipped; scanning continues from the next character, matching the
//! "report and skip one" recovery strategy used throughout this
//! compiler's error handling.

pub mod cursor;

use cursor::Cursor;
use mpyc_util::{Handler, Interner, Span, Symbol};
use std::fmt;

/// A single lexical token together with the source line it started on.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
}

impl Token {
    pub fn span(&self) -> Span {
        Span::new(self.line)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    NewLine,

    Int(i64),
    Float(f64),
    /// The lexeme exactly as written, including the surrounding quotes.
    Str(String),
    Id(Symbol),

    // Reserved words
    True,
    False,
    And,
    Or,
    Not,
    If,
    Elif,
    Else,
    While,
    Def,
    Append,
    Extend,
    Insert,
    Index,
    Pop,
    Copy,
    Len,
    Return,
    Print,

    // Multi-character operators
    Power,        // **
    IntDivide,    // //
    LessEqual,    // <=
    GreaterEqual, // >=
    NotEqual,     // !=
    EqualEqual,   // ==

    // Single-character literals
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Less,
    Greater,
    Dot,
    Comma,
    Colon,
    Equal,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Hash,

    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

fn reserved_word(word: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match word {
        "True" => True,
        "False" => False,
        "and" => And,
        "or" => Or,
        "not" => Not,
        "if" => If,
        "elif" => Elif,
        "else" => Else,
        "while" => While,
        "def" => Def,
        "append" => Append,
        "extend" => Extend,
        "insert" => Insert,
        "index" => Index,
        "pop" => Pop,
        "copy" => Copy,
        "len" => Len,
        "return" => Return,
        "print" => Print,
        _ => return None,
    })
}

fn is_id_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_id_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    handler: &'a mut Handler,
    interner: &'a mut Interner,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, handler: &'a mut Handler, interner: &'a mut Interner) -> Self {
        Self { cursor: Cursor::new(source), handler, interner }
    }

    /// Lexes the whole source into a token list terminated by `Eof`.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let is_eof = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn next_token(&mut self) -> Token {
        self.skip_ignored();

        let line = self.cursor.line();
        let c = self.cursor.current_char();

        if c == '\0' {
            return Token { kind: TokenKind::Eof, line };
        }

        if c == '\n' {
            self.cursor.advance();
            self.cursor.bump_line();
            return Token { kind: TokenKind::NewLine, line };
        }

        if is_id_start(c) {
            return self.lex_identifier(line);
        }

        if c.is_ascii_digit() || (c == '.' && self.cursor.char_at(1).is_ascii_digit()) {
            return self.lex_number(line);
        }

        if (c == '+' || c == '-') && self.starts_signed_number() {
            return self.lex_number(line);
        }

        if c == '"' {
            return self.lex_string(line);
        }

        self.lex_operator(line)
    }

    /// Whitespace (space, tab) is insignificant; newlines are not.
    fn skip_ignored(&mut self) {
        loop {
            match self.cursor.current_char() {
                ' ' | '\t' => {
                    self.cursor.advance();
                }
                _ => break,
            }
        }
    }

    /// A `+`/`-` immediately followed by a digit, or by `.` and a digit,
    /// is absorbed into the numeric literal rather than lexed as a
    /// standalone operator (the reference lexer this is ported from
    /// allows an optional leading sign directly in its number regexes).
    fn starts_signed_number(&self) -> bool {
        let next = self.cursor.char_at(1);
        next.is_ascii_digit() || (next == '.' && self.cursor.char_at(2).is_ascii_digit())
    }

    fn lex_identifier(&mut self, line: u32) -> Token {
        let start = self.cursor.position();
        while is_id_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start);
        let kind = reserved_word(text).unwrap_or_else(|| TokenKind::Id(self.interner.intern(text)));
        Token { kind, line }
    }

    /// Lexes `[+-]?(0|[1-9][0-9]*)` or `[+-]?[0-9]*.[0-9]+`, deciding
    /// integer vs. float on whether a `.` is present.
    fn lex_number(&mut self, line: u32) -> Token {
        let start = self.cursor.position();
        if self.cursor.current_char() == '+' || self.cursor.current_char() == '-' {
            self.cursor.advance();
        }
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }
        let mut is_float = false;
        if self.cursor.current_char() == '.' {
            is_float = true;
            self.cursor.advance();
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        }
        let text = self.cursor.slice_from(start);
        let kind = if is_float {
            TokenKind::Float(text.parse().unwrap_or(0.0))
        } else {
            TokenKind::Int(text.parse().unwrap_or(0))
        };
        Token { kind, line }
    }

    /// Lexes `"[^"]*"`. An unterminated string runs to end of input; the
    /// grammar has no escape syntax to worry about.
    fn lex_string(&mut self, line: u32) -> Token {
        let start = self.cursor.position();
        self.cursor.advance(); // opening quote
        while self.cursor.current_char() != '"' && !self.cursor.is_at_end() {
            self.cursor.advance();
        }
        if self.cursor.current_char() == '"' {
            self.cursor.advance();
        } else {
            self.handler.error("unterminated string literal", Span::new(line));
        }
        let text = self.cursor.slice_from(start).to_string();
        Token { kind: TokenKind::Str(text), line }
    }

    fn lex_operator(&mut self, line: u32) -> Token {
        use TokenKind::*;
        let c = self.cursor.advance();
        let kind = match c {
            '*' if self.cursor.match_char('*') => Power,
            '/' if self.cursor.match_char('/') => IntDivide,
            '<' if self.cursor.match_char('=') => LessEqual,
            '>' if self.cursor.match_char('=') => GreaterEqual,
            '!' if self.cursor.match_char('=') => NotEqual,
            '=' if self.cursor.match_char('=') => EqualEqual,
            '+' => Plus,
            '-' => Minus,
            '*' => Star,
            '/' => Slash,
            '%' => Percent,
            '<' => Less,
            '>' => Greater,
            '.' => Dot,
            ',' => Comma,
            ':' => Colon,
            '=' => Equal,
            '(' => LParen,
            ')' => RParen,
            '[' => LBracket,
            ']' => RBracket,
            '{' => LBrace,
            '}' => RBrace,
            '#' => Hash,
            other => {
                self.handler.error(format!("Illegal character '{other}'"), Span::new(line));
                return self.next_token();
            }
        };
        Token { kind, line }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> (Vec<TokenKind>, bool) {
        let mut handler = Handler::new();
        let mut interner = Interner::new();
        let tokens = Lexer::new(src, &mut handler, &mut interner).tokenize();
        (tokens.into_iter().map(|t| t.kind).collect(), handler.has_errors())
    }

    #[test]
    fn keywords_shadow_identifiers() {
        let (kinds, errs) = lex("if while True False");
        assert!(!errs);
        assert_eq!(kinds, vec![TokenKind::If, TokenKind::While, TokenKind::True, TokenKind::False, TokenKind::Eof]);
    }

    #[test]
    fn plain_identifier_is_not_reserved() {
        let (kinds, _) = lex("iffy");
        assert!(matches!(kinds[0], TokenKind::Id(_)));
    }

    #[test]
    fn integer_and_float_literals() {
        let (kinds, _) = lex("42 3.14 0");
        assert_eq!(kinds, vec![TokenKind::Int(42), TokenKind::Float(3.14), TokenKind::Int(0), TokenKind::Eof]);
    }

    #[test]
    fn adjacent_sign_is_absorbed_into_the_literal() {
        let (kinds, _) = lex("-5 +3.0");
        assert_eq!(kinds, vec![TokenKind::Int(-5), TokenKind::Float(3.0), TokenKind::Eof]);
    }

    #[test]
    fn sign_with_space_is_a_separate_operator() {
        let (kinds, _) = lex("x - 1");
        assert!(matches!(kinds[0], TokenKind::Id(_)));
        assert_eq!(kinds[1], TokenKind::Minus);
        assert_eq!(kinds[2], TokenKind::Int(1));
    }

    #[test]
    fn string_literal_keeps_its_quotes() {
        let (kinds, _) = lex(r#""hello""#);
        assert_eq!(kinds[0], TokenKind::Str("\"hello\"".to_string()));
    }

    #[test]
    fn multi_char_operators_win_over_their_prefixes() {
        let (kinds, _) = lex("** // <= >= != ==");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Power,
                TokenKind::IntDivide,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::NotEqual,
                TokenKind::EqualEqual,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn newline_is_a_token_not_whitespace() {
        let (kinds, _) = lex("x\ny");
        assert_eq!(kinds[1], TokenKind::NewLine);
    }

    #[test]
    fn illegal_character_is_reported_and_skipped() {
        let (kinds, errs) = lex("x @ y");
        assert!(errs);
        assert!(matches!(kinds[0], TokenKind::Id(_)));
        assert!(matches!(kinds[1], TokenKind::Id(_)));
    }

    #[test]
    fn block_sentinel_characters_lex_as_punctuation() {
        let (kinds, _) = lex(":#()[]{},.");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Colon,
                TokenKind::Hash,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Eof,
            ]
        );
    }
}
