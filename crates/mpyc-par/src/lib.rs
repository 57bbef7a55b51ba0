//! mpyc-par - recursive-descent parser for miniPy.
//!
//! Consumes the token stream from `mpyc-lex` and builds the AST defined
//! in [`ast`]. The grammar is small enough that a hand-written
//! recursive-descent parser, with a Pratt-style expression parser for
//! operator precedence, reads more directly than a generated LALR
//! table would.
//!
//! Blocks are delimited by `:` ... `#`, not indentation: a block is one
//! or more newline-separated code lines between those two tokens. On a
//! malformed construct the parser reports the offending token through
//! the `Handler` and returns a placeholder node so that parsing can
//! keep going and surface more than one error per run; callers must
//! check `handler.has_errors()` before trusting the resulting tree.

pub mod ast;
mod expr;
mod items;
mod stmt;

use ast::{CodeLine, Program};
use mpyc_lex::{Token, TokenKind};
use mpyc_util::{Handler, Span};

pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    handler: &'a mut Handler,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, handler: &'a mut Handler) -> Self {
        Self { tokens, pos: 0, handler }
    }

    pub fn parse_program(mut self) -> Program {
        let mut code_lines = Vec::new();
        self.skip_newlines();
        while !self.at_eof() {
            if let Some(line) = self.parse_code_line() {
                code_lines.push(line);
            }
            self.skip_newlines();
        }
        Program { code_lines }
    }

    // --- token stream plumbing ---

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_at(&self, ahead: usize) -> &TokenKind {
        let idx = (self.pos + ahead).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn current_line(&self) -> u32 {
        self.tokens[self.pos].line
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek() == kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if !self.at_eof() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes `kind` or reports a syntax error naming what was found instead.
    fn expect(&mut self, kind: &TokenKind, what: &str) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error_here(format!("expected {what}, found {:?}", self.peek()));
            false
        }
    }

    fn error_here(&mut self, message: impl Into<String>) {
        self.handler.error(message, Span::new(self.current_line()));
    }

    fn skip_newlines(&mut self) {
        while self.eat(&TokenKind::NewLine) {}
    }

    /// Error recovery: discard tokens up to and including the next
    /// newline (or EOF), so one malformed code line doesn't cascade
    /// into spurious errors for every line after it.
    fn synchronize(&mut self) {
        while !self.at_eof() && !self.check(&TokenKind::NewLine) {
            self.advance();
        }
    }

    // --- code lines ---

    fn parse_code_line(&mut self) -> Option<CodeLine> {
        let result = match self.peek() {
            TokenKind::Def => self.parse_function_def().map(CodeLine::FunctionDef),
            TokenKind::If | TokenKind::While | TokenKind::Return | TokenKind::Print => {
                self.parse_statement().map(CodeLine::Statement)
            }
            TokenKind::Id(_) if self.is_assignment_ahead() => {
                self.parse_assignment().map(CodeLine::Statement)
            }
            _ => self.parse_expression().map(CodeLine::Expr),
        };
        if result.is_none() {
            self.synchronize();
        }
        result
    }

    /// An assignment is `ID '=' expr`; anything else starting with an
    /// identifier is a bare expression code line (e.g. a function call
    /// used for its side effect).
    fn is_assignment_ahead(&self) -> bool {
        matches!(self.peek_at(1), TokenKind::Equal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast::{Expr, Statement};
    use mpyc_lex::Lexer;
    use mpyc_util::{Handler, Interner};

    fn parse_source(src: &str) -> (Program, bool) {
        let mut handler = Handler::new();
        let mut interner = Interner::new();
        let tokens = Lexer::new(src, &mut handler, &mut interner).tokenize();
        let program = Parser::new(tokens, &mut handler).parse_program();
        (program, handler.has_errors())
    }

    #[test]
    fn assignment_and_print() {
        let (program, errs) = parse_source("x = 1\nprint(x)\n");
        assert!(!errs);
        assert_eq!(program.code_lines.len(), 2);
        assert!(matches!(
            program.code_lines[0],
            CodeLine::Statement(Statement::Assignment { .. })
        ));
        assert!(matches!(program.code_lines[1], CodeLine::Statement(Statement::Print { .. })));
    }

    #[test]
    fn if_elif_else_chain() {
        let src = "if x:\nprint(1)\n#\nelif y:\nprint(2)\n#\nelse:\nprint(3)\n#\n";
        let (program, errs) = parse_source(src);
        assert!(!errs);
        match &program.code_lines[0] {
            CodeLine::Statement(Statement::If(stmt)) => {
                assert_eq!(stmt.if_body.len(), 1);
                let elif = stmt.elif_chain.as_ref().expect("elif chain");
                assert_eq!(elif.body.len(), 1);
                assert!(elif.other.is_none());
                assert!(stmt.else_body.is_some());
            }
            other => panic!("expected an if statement, got {other:?}"),
        }
    }

    #[test]
    fn while_loop_body() {
        let (program, errs) = parse_source("while x:\nx = x - 1\n#\n");
        assert!(!errs);
        match &program.code_lines[0] {
            CodeLine::Statement(Statement::While { body, .. }) => assert_eq!(body.len(), 1),
            other => panic!("expected a while statement, got {other:?}"),
        }
    }

    #[test]
    fn function_def_with_params_and_return() {
        let (program, errs) = parse_source("def add(a, b):\nreturn a + b\n#\n");
        assert!(!errs);
        match &program.code_lines[0] {
            CodeLine::FunctionDef(def) => {
                assert_eq!(def.params.len(), 2);
                assert_eq!(def.body.len(), 1);
            }
            other => panic!("expected a function definition, got {other:?}"),
        }
    }

    #[test]
    fn bare_expression_code_line_is_a_statement_by_itself() {
        let (program, errs) = parse_source("f(1)\n");
        assert!(!errs);
        assert!(matches!(program.code_lines[0], CodeLine::Expr(Expr::FunctionCall { .. })));
    }

    #[test]
    fn unterminated_block_reports_an_error_instead_of_hanging() {
        let (_program, errs) = parse_source("if x:\nprint(1)\n");
        assert!(errs);
    }

    #[test]
    fn malformed_line_does_not_stop_the_rest_of_the_program_from_parsing() {
        let (program, errs) = parse_source("x = \ny = 2\n");
        assert!(errs);
        assert!(program.code_lines.iter().any(|line| matches!(
            line,
            CodeLine::Statement(Statement::Assignment { .. })
        )));
    }
}
