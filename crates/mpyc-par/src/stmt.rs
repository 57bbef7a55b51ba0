//! Statement grammar: assignment, `if`/`elif`/`else`, `while`,
//! `return`, `print`, and the `:` ... `#` block delimiter shared by all
//! of them.

use crate::ast::{Block, ElifStatement, IfStatement, Statement};
use crate::Parser;
use mpyc_lex::TokenKind;

impl<'a> Parser<'a> {
    pub(crate) fn parse_statement(&mut self) -> Option<Statement> {
        match self.peek() {
            TokenKind::If => self.parse_if().map(Statement::If),
            TokenKind::While => self.parse_while(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Print => self.parse_print(),
            other => {
                self.error_here(format!("expected a statement, found {other:?}"));
                None
            }
        }
    }

    pub(crate) fn parse_assignment(&mut self) -> Option<Statement> {
        let line = self.current_line();
        let TokenKind::Id(name) = self.peek().clone() else { unreachable!() };
        self.advance();
        self.expect(&TokenKind::Equal, "'=' in assignment");
        let expr = self.parse_expression()?;
        Some(Statement::Assignment { name, expr, line })
    }

    /// Consumes `':' NEWLINE+ code_line* '#'`, leaving any trailing
    /// newline after the `#` for the caller's surrounding loop to skip.
    fn parse_block(&mut self) -> Option<Block> {
        self.expect(&TokenKind::Colon, "':' to open a block");
        self.skip_newlines();
        let mut lines = Vec::new();
        while !self.check(&TokenKind::Hash) {
            if self.at_eof() {
                self.error_here("unterminated block: reached end of input before '#'");
                return None;
            }
            if let Some(line) = self.parse_code_line() {
                lines.push(line);
            }
            self.skip_newlines();
        }
        self.expect(&TokenKind::Hash, "'#' to close block");
        Some(lines)
    }

    /// `else` binds to the end of the whole `if`/`elif*` chain, not to
    /// whichever clause happens to precede it, so a trailing `else`
    /// found at the bottom of the elif recursion is threaded back up
    /// to land on `IfStatement::else_body` rather than on the last
    /// `ElifStatement`.
    fn parse_if(&mut self) -> Option<IfStatement> {
        let line = self.current_line();
        self.advance(); // 'if'
        let cond = self.parse_expression()?;
        let if_body = self.parse_block()?;
        self.skip_newlines();

        let (elif_chain, else_body) = self.parse_trailing_clauses()?;

        Some(IfStatement { cond, if_body, elif_chain, else_body, line })
    }

    fn parse_trailing_clauses(&mut self) -> Option<(Option<Box<ElifStatement>>, Option<Block>)> {
        if self.check(&TokenKind::Elif) {
            let (elif, else_body) = self.parse_elif()?;
            Some((Some(Box::new(elif)), else_body))
        } else if self.eat(&TokenKind::Else) {
            Some((None, Some(self.parse_block()?)))
        } else {
            Some((None, None))
        }
    }

    fn parse_elif(&mut self) -> Option<(ElifStatement, Option<Block>)> {
        let line = self.current_line();
        self.advance(); // 'elif'
        let cond = self.parse_expression()?;
        let body = self.parse_block()?;
        self.skip_newlines();

        let (other, else_body) = self.parse_trailing_clauses()?;

        Some((ElifStatement { cond, body, other, line }, else_body))
    }

    fn parse_while(&mut self) -> Option<Statement> {
        let line = self.current_line();
        self.advance(); // 'while'
        let cond = self.parse_expression()?;
        let body = self.parse_block()?;
        Some(Statement::While { cond, body, line })
    }

    fn parse_return(&mut self) -> Option<Statement> {
        let line = self.current_line();
        self.advance(); // 'return'
        let expr = if self.check(&TokenKind::NewLine) || self.at_eof() || self.check(&TokenKind::Hash) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        Some(Statement::Return { expr, line })
    }

    fn parse_print(&mut self) -> Option<Statement> {
        let line = self.current_line();
        self.advance(); // 'print'
        self.expect(&TokenKind::LParen, "'(' after 'print'");
        let expr = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&TokenKind::RParen, "')' to close 'print(...)'");
        Some(Statement::Print { expr, line })
    }
}
