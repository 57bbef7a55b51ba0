//! Expression grammar: a Pratt parser for binary/unary operators, with
//! a postfix loop for indexing, slicing and sequence-method calls.
//!
//! Binding powers are spaced two apart so that a left-associative
//! binary operator at level `L` is encoded as `(lbp, rbp) = (L, L + 1)`:
//! recursing on the right-hand side with `min_bp = L + 1` stops before
//! consuming another operator at the same level `L`, which is exactly
//! what left-associativity means. `**` is confirmed left-associative
//! in the grammar this is ported from, so it gets the same treatment
//! as every other binary operator here; nothing in this grammar is
//! right-associative except the two families of prefix operators.
//!
//! `not` and unary `+`/`-` are prefix-only and are handled outside the
//! binding-power table: `not`'s operand is parsed with `min_bp =
//! bp::COMPARISON`, so it swallows comparisons and everything tighter
//! but stops before `and`/`or`. Unary `+`/`-`'s operand is parsed with
//! `min_bp = bp::UNARY`, the highest level there is, so it swallows
//! nothing but another prefix operator or a primary - `**` is left to
//! the enclosing call to pick up, which is why `-x ** 2` parses as
//! `(-x) ** 2` rather than `-(x ** 2)`.

use crate::ast::{BinaryOp, Expr, Literal, SequenceMethod, UnaryOp};
use crate::Parser;
use mpyc_lex::TokenKind;

pub mod bp {
    pub const MIN: u8 = 0;
    pub const OR: u8 = 2;
    pub const AND: u8 = 4;
    pub const COMPARISON: u8 = 8;
    pub const ADDITIVE: u8 = 10;
    pub const MULTIPLICATIVE: u8 = 12;
    pub const POWER: u8 = 14;
    pub const UNARY: u8 = 18;
}

fn infix_binding_power(kind: &TokenKind) -> Option<(u8, u8, BinaryOp)> {
    use TokenKind::*;
    Some(match kind {
        Or => (bp::OR, bp::OR + 1, BinaryOp::Or),
        And => (bp::AND, bp::AND + 1, BinaryOp::And),
        EqualEqual => (bp::COMPARISON, bp::COMPARISON + 1, BinaryOp::Eq),
        NotEqual => (bp::COMPARISON, bp::COMPARISON + 1, BinaryOp::Ne),
        Less => (bp::COMPARISON, bp::COMPARISON + 1, BinaryOp::Lt),
        Greater => (bp::COMPARISON, bp::COMPARISON + 1, BinaryOp::Gt),
        LessEqual => (bp::COMPARISON, bp::COMPARISON + 1, BinaryOp::Le),
        GreaterEqual => (bp::COMPARISON, bp::COMPARISON + 1, BinaryOp::Ge),
        Plus => (bp::ADDITIVE, bp::ADDITIVE + 1, BinaryOp::Add),
        Minus => (bp::ADDITIVE, bp::ADDITIVE + 1, BinaryOp::Sub),
        Star => (bp::MULTIPLICATIVE, bp::MULTIPLICATIVE + 1, BinaryOp::Mul),
        Slash => (bp::MULTIPLICATIVE, bp::MULTIPLICATIVE + 1, BinaryOp::Div),
        Percent => (bp::MULTIPLICATIVE, bp::MULTIPLICATIVE + 1, BinaryOp::Mod),
        IntDivide => (bp::MULTIPLICATIVE, bp::MULTIPLICATIVE + 1, BinaryOp::FloorDiv),
        Power => (bp::POWER, bp::POWER + 1, BinaryOp::Pow),
        _ => return None,
    })
}

impl<'a> Parser<'a> {
    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        self.parse_expr_bp(bp::MIN)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Option<Expr> {
        let mut lhs = self.parse_prefix()?;
        loop {
            let Some((lbp, rbp, op)) = infix_binding_power(self.peek()) else { break };
            if lbp < min_bp {
                break;
            }
            let line = self.current_line();
            self.advance();
            let rhs = self.parse_expr_bp(rbp)?;
            lhs = Expr::Binary { op, left: Box::new(lhs), right: Box::new(rhs), line };
        }
        Some(lhs)
    }

    fn parse_prefix(&mut self) -> Option<Expr> {
        let line = self.current_line();
        match self.peek() {
            TokenKind::Not => {
                self.advance();
                let operand = self.parse_expr_bp(bp::COMPARISON)?;
                Some(Expr::Unary { op: UnaryOp::Not, expr: Box::new(operand), line })
            }
            TokenKind::Plus => {
                self.advance();
                let operand = self.parse_expr_bp(bp::UNARY)?;
                Some(Expr::Unary { op: UnaryOp::Plus, expr: Box::new(operand), line })
            }
            TokenKind::Minus => {
                self.advance();
                let operand = self.parse_expr_bp(bp::UNARY)?;
                Some(Expr::Unary { op: UnaryOp::Minus, expr: Box::new(operand), line })
            }
            _ => self.parse_postfix(),
        }
    }

    /// A primary expression followed by zero or more `[` ... `]` index/
    /// slice operations or `.method(...)` sequence-method calls.
    fn parse_postfix(&mut self) -> Option<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                TokenKind::LBracket => expr = self.parse_index_or_slice(expr)?,
                TokenKind::Dot => expr = self.parse_sequence_method(expr)?,
                _ => break,
            }
        }
        Some(expr)
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        let line = self.current_line();
        match self.peek().clone() {
            TokenKind::True => {
                self.advance();
                Some(Expr::Literal(Literal::Bool(true), line))
            }
            TokenKind::False => {
                self.advance();
                Some(Expr::Literal(Literal::Bool(false), line))
            }
            TokenKind::Int(v) => {
                self.advance();
                Some(Expr::Literal(Literal::Int(v), line))
            }
            TokenKind::Float(v) => {
                self.advance();
                Some(Expr::Literal(Literal::Float(v), line))
            }
            TokenKind::Str(s) => {
                self.advance();
                Some(Expr::Literal(Literal::Str(s), line))
            }
            TokenKind::Len => {
                self.advance();
                self.expect(&TokenKind::LParen, "'(' after 'len'");
                let arg = self.parse_expression()?;
                self.expect(&TokenKind::RParen, "')' to close 'len(...)'");
                Some(Expr::SequenceFunctionCall { arg: Box::new(arg), line })
            }
            TokenKind::Id(name) => {
                self.advance();
                if self.eat(&TokenKind::LParen) {
                    let args = self.parse_args()?;
                    self.expect(&TokenKind::RParen, "')' to close function call");
                    Some(Expr::FunctionCall { name, args, line })
                } else {
                    Some(Expr::Id(name, line))
                }
            }
            TokenKind::LParen => {
                self.advance();
                self.parse_paren_expr_or_tuple(line)
            }
            TokenKind::LBracket => {
                self.advance();
                let elements = self.parse_elements(&TokenKind::RBracket)?;
                self.expect(&TokenKind::RBracket, "']' to close list");
                Some(Expr::List(elements, line))
            }
            other => {
                self.error_here(format!("expected an expression, found {other:?}"));
                None
            }
        }
    }

    /// `(` was already consumed. An empty `()` or a first element
    /// followed by `,` is a tuple; a single expression followed
    /// directly by `)` is just a parenthesized expression.
    fn parse_paren_expr_or_tuple(&mut self, line: u32) -> Option<Expr> {
        if self.eat(&TokenKind::RParen) {
            return Some(Expr::Tuple(Vec::new(), line));
        }
        let first = self.parse_expression()?;
        if self.check(&TokenKind::Comma) {
            let mut elements = vec![first];
            while self.eat(&TokenKind::Comma) {
                if self.check(&TokenKind::RParen) {
                    break;
                }
                elements.push(self.parse_expression()?);
            }
            self.expect(&TokenKind::RParen, "')' to close tuple");
            Some(Expr::Tuple(elements, line))
        } else {
            self.expect(&TokenKind::RParen, "')' to close grouped expression");
            Some(first)
        }
    }

    fn parse_elements(&mut self, closer: &TokenKind) -> Option<Vec<Expr>> {
        let mut elements = Vec::new();
        if self.check(closer) {
            return Some(elements);
        }
        elements.push(self.parse_expression()?);
        while self.eat(&TokenKind::Comma) {
            if self.check(closer) {
                break;
            }
            elements.push(self.parse_expression()?);
        }
        Some(elements)
    }

    fn parse_args(&mut self) -> Option<Vec<Expr>> {
        self.parse_elements(&TokenKind::RParen)
    }

    /// `[` was already consumed by the postfix loop's caller; here it
    /// still needs consuming since `parse_postfix` only peeked at it.
    ///
    /// Disambiguates `seq[expr]` (index) from the slice forms
    /// `seq[start:end]` / `seq[start:end:step]` by looking at what
    /// follows the optional first sub-expression, rather than porting
    /// the reference grammar's twelve separate slice productions.
    fn parse_index_or_slice(&mut self, seq: Expr) -> Option<Expr> {
        let line = self.current_line();
        self.advance(); // '['

        let start = if self.check(&TokenKind::Colon) || self.check(&TokenKind::RBracket) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        if self.eat(&TokenKind::RBracket) {
            let Some(index) = start else {
                self.error_here("expected an index expression inside '[]'");
                return None;
            };
            return Some(Expr::SequenceIndex { seq: Box::new(seq), index, line });
        }

        self.expect(&TokenKind::Colon, "':' in slice");

        let end = if self.check(&TokenKind::Colon) || self.check(&TokenKind::RBracket) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        if self.eat(&TokenKind::RBracket) {
            return Some(Expr::SequenceSlice { seq: Box::new(seq), start, end, step: None, line });
        }

        self.expect(&TokenKind::Colon, "second ':' in slice");

        let step = if self.check(&TokenKind::RBracket) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        self.expect(&TokenKind::RBracket, "']' to close slice");
        Some(Expr::SequenceSlice { seq: Box::new(seq), start, end, step, line })
    }

    /// `.` was not yet consumed.
    fn parse_sequence_method(&mut self, seq: Expr) -> Option<Expr> {
        let line = self.current_line();
        self.advance(); // '.'
        let method = match self.peek() {
            TokenKind::Append => SequenceMethod::Append,
            TokenKind::Extend => SequenceMethod::Extend,
            TokenKind::Insert => SequenceMethod::Insert,
            TokenKind::Index => SequenceMethod::Index,
            TokenKind::Pop => SequenceMethod::Pop,
            TokenKind::Copy => SequenceMethod::Copy,
            other => {
                self.error_here(format!(
                    "expected a sequence method (append, extend, insert, index, pop, copy), found {other:?}"
                ));
                return None;
            }
        };
        self.advance();
        self.expect(&TokenKind::LParen, "'(' after method name");

        let (arg1, arg2) = match method {
            SequenceMethod::Append | SequenceMethod::Extend | SequenceMethod::Index => {
                (Some(Box::new(self.parse_expression()?)), None)
            }
            SequenceMethod::Insert => {
                let a1 = Box::new(self.parse_expression()?);
                self.expect(&TokenKind::Comma, "',' between insert's arguments");
                let a2 = Box::new(self.parse_expression()?);
                (Some(a1), Some(a2))
            }
            SequenceMethod::Pop => {
                if self.check(&TokenKind::RParen) {
                    (None, None)
                } else {
                    (Some(Box::new(self.parse_expression()?)), None)
                }
            }
            SequenceMethod::Copy => (None, None),
        };

        self.expect(&TokenKind::RParen, "')' to close method call");
        Some(Expr::SequenceMethod { seq: Box::new(seq), method, arg1, arg2, line })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpyc_lex::Lexer;
    use mpyc_util::{Handler, Interner};

    fn parse_expr_source(src: &str) -> (Option<Expr>, bool) {
        let mut handler = Handler::new();
        let mut interner = Interner::new();
        let tokens = Lexer::new(src, &mut handler, &mut interner).tokenize();
        let mut parser = Parser::new(tokens, &mut handler);
        let expr = parser.parse_expression();
        (expr, handler.has_errors())
    }

    fn as_binary(expr: &Expr) -> (BinaryOp, &Expr, &Expr) {
        match expr {
            Expr::Binary { op, left, right, .. } => (*op, left, right),
            other => panic!("expected a binary expression, got {other:?}"),
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let (expr, errs) = parse_expr_source("1 + 2 * 3");
        assert!(!errs);
        let (op, _left, right) = as_binary(&expr.unwrap());
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(right, Expr::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn power_is_left_associative() {
        let (expr, _) = parse_expr_source("2 ** 3 ** 2");
        let (op, left, _right) = as_binary(&expr.unwrap());
        assert_eq!(op, BinaryOp::Pow);
        assert!(matches!(left.as_ref(), Expr::Binary { op: BinaryOp::Pow, .. }));
    }

    #[test]
    fn unary_minus_binds_tighter_than_power() {
        let (expr, _) = parse_expr_source("-2 ** 2");
        let (op, left, _right) = as_binary(&expr.unwrap());
        assert_eq!(op, BinaryOp::Pow);
        assert!(matches!(left.as_ref(), Expr::Unary { op: UnaryOp::Minus, .. }));
    }

    #[test]
    fn not_binds_looser_than_comparison_but_tighter_than_and() {
        let (expr, _) = parse_expr_source("a and not b == c");
        let (op, _left, right) = as_binary(&expr.unwrap());
        assert_eq!(op, BinaryOp::And);
        match right {
            Expr::Unary { op: UnaryOp::Not, expr, .. } => {
                assert!(matches!(expr.as_ref(), Expr::Binary { op: BinaryOp::Eq, .. }));
            }
            other => panic!("expected `not (b == c)`, got {other:?}"),
        }
    }

    #[test]
    fn plain_index_is_distinguished_from_a_slice() {
        let (expr, errs) = parse_expr_source("xs[0]");
        assert!(!errs);
        assert!(matches!(expr.unwrap(), Expr::SequenceIndex { .. }));
    }

    #[test]
    fn full_slice_with_all_three_parts() {
        let (expr, errs) = parse_expr_source("xs[1:2:3]");
        assert!(!errs);
        match expr.unwrap() {
            Expr::SequenceSlice { start, end, step, .. } => {
                assert!(start.is_some());
                assert!(end.is_some());
                assert!(step.is_some());
            }
            other => panic!("expected a slice, got {other:?}"),
        }
    }

    #[test]
    fn open_ended_slice_omits_bounds() {
        let (expr, errs) = parse_expr_source("xs[:]");
        assert!(!errs);
        match expr.unwrap() {
            Expr::SequenceSlice { start, end, step, .. } => {
                assert!(start.is_none());
                assert!(end.is_none());
                assert!(step.is_none());
            }
            other => panic!("expected a slice, got {other:?}"),
        }
    }

    #[test]
    fn parenthesized_single_expr_is_not_a_tuple() {
        let (expr, _) = parse_expr_source("(1)");
        assert!(matches!(expr.unwrap(), Expr::Literal(Literal::Int(1), _)));
    }

    #[test]
    fn trailing_comma_makes_a_one_tuple() {
        let (expr, errs) = parse_expr_source("(1,)");
        assert!(!errs);
        match expr.unwrap() {
            Expr::Tuple(elements, _) => assert_eq!(elements.len(), 1),
            other => panic!("expected a tuple, got {other:?}"),
        }
    }

    #[test]
    fn empty_tuple_and_empty_list() {
        let (tup, _) = parse_expr_source("()");
        assert!(matches!(tup.unwrap(), Expr::Tuple(elements, _) if elements.is_empty()));
        let (list, _) = parse_expr_source("[]");
        assert!(matches!(list.unwrap(), Expr::List(elements, _) if elements.is_empty()));
    }

    #[test]
    fn len_call_is_not_a_general_function_call() {
        let (expr, errs) = parse_expr_source("len(xs)");
        assert!(!errs);
        assert!(matches!(expr.unwrap(), Expr::SequenceFunctionCall { .. }));
    }

    #[test]
    fn sequence_method_chain() {
        let (expr, errs) = parse_expr_source("xs.pop().copy()");
        assert!(!errs);
        match expr.unwrap() {
            Expr::SequenceMethod { method: SequenceMethod::Copy, seq, .. } => {
                assert!(matches!(seq.as_ref(), Expr::SequenceMethod { method: SequenceMethod::Pop, .. }));
            }
            other => panic!("expected a chained method call, got {other:?}"),
        }
    }

    #[test]
    fn insert_takes_two_arguments() {
        let (expr, errs) = parse_expr_source("xs.insert(0, 5)");
        assert!(!errs);
        match expr.unwrap() {
            Expr::SequenceMethod { method: SequenceMethod::Insert, arg1, arg2, .. } => {
                assert!(arg1.is_some());
                assert!(arg2.is_some());
            }
            other => panic!("expected insert with two arguments, got {other:?}"),
        }
    }

    #[test]
    fn function_call_with_arguments() {
        let (expr, errs) = parse_expr_source("f(1, 2, 3)");
        assert!(!errs);
        match expr.unwrap() {
            Expr::FunctionCall { args, .. } => assert_eq!(args.len(), 3),
            other => panic!("expected a function call, got {other:?}"),
        }
    }
}
