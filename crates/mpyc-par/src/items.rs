//! Function definitions: `def name(params?): NEWLINE block #`.

use crate::ast::FunctionDef;
use crate::Parser;
use mpyc_lex::TokenKind;

impl<'a> Parser<'a> {
    pub(crate) fn parse_function_def(&mut self) -> Option<FunctionDef> {
        let line = self.current_line();
        self.advance(); // 'def'

        let name = match self.peek().clone() {
            TokenKind::Id(name) => {
                self.advance();
                name
            }
            other => {
                self.error_here(format!("expected a function name, found {other:?}"));
                return None;
            }
        };

        self.expect(&TokenKind::LParen, "'(' after function name");
        let params = self.parse_params()?;
        self.expect(&TokenKind::RParen, "')' to close parameter list");

        self.expect(&TokenKind::Colon, "':' to open function body");
        self.skip_newlines();
        let mut body = Vec::new();
        while !self.check(&TokenKind::Hash) {
            if self.at_eof() {
                self.error_here("unterminated function body: reached end of input before '#'");
                return None;
            }
            if let Some(line) = self.parse_code_line() {
                body.push(line);
            }
            self.skip_newlines();
        }
        self.expect(&TokenKind::Hash, "'#' to close function body");

        Some(FunctionDef { name, params, body, line })
    }

    fn parse_params(&mut self) -> Option<Vec<mpyc_util::Symbol>> {
        let mut params = Vec::new();
        if self.check(&TokenKind::RParen) {
            return Some(params);
        }
        loop {
            match self.peek().clone() {
                TokenKind::Id(name) => {
                    self.advance();
                    params.push(name);
                }
                other => {
                    self.error_here(format!("expected a parameter name, found {other:?}"));
                    return None;
                }
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Some(params)
    }
}
