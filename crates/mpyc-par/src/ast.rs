//! The miniPy abstract syntax tree.
//!
//! Tagged variants with structural children, matching what the parser
//! below builds. The reference implementation this grammar is ported
//! from dispatches on a node's class name at every visitor; here the
//! compiler gets exhaustiveness checking for free by matching on these
//! enums instead.
//!
//! `ParamsList`/`ArgsList`/`ElementsList` are not given their own node
//! type: each is just a plain `Vec` in the position that needs it. A
//! wrapper struct whose only field is the list itself adds a layer of
//! indirection without adding meaning.

use mpyc_util::Symbol;

pub type Block = Vec<CodeLine>;

#[derive(Debug, Clone)]
pub struct Program {
    pub code_lines: Vec<CodeLine>,
}

#[derive(Debug, Clone)]
pub enum CodeLine {
    FunctionDef(FunctionDef),
    Statement(Statement),
    Expr(Expr),
}

#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: Symbol,
    pub params: Vec<Symbol>,
    pub body: Block,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub enum Statement {
    Assignment { name: Symbol, expr: Expr, line: u32 },
    If(IfStatement),
    While { cond: Expr, body: Block, line: u32 },
    Return { expr: Option<Expr>, line: u32 },
    Print { expr: Option<Expr>, line: u32 },
}

#[derive(Debug, Clone)]
pub struct IfStatement {
    pub cond: Expr,
    pub if_body: Block,
    pub elif_chain: Option<Box<ElifStatement>>,
    pub else_body: Option<Block>,
    pub line: u32,
}

/// A right-linear chain, one node per `elif`: `other` is the next
/// `elif` in the chain, not the trailing `else`.
#[derive(Debug, Clone)]
pub struct ElifStatement {
    pub cond: Expr,
    pub body: Block,
    pub other: Option<Box<ElifStatement>>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Includes the surrounding quotes, as produced by the lexer.
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    And,
    Or,
    Eq,
    Ne,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    FloorDiv,
    Gt,
    Lt,
    Ge,
    Le,
}

impl BinaryOp {
    /// The textual operator as it appears in TAC and that the target
    /// generator's operator-translation table keys off of.
    pub fn as_str(self) -> &'static str {
        use BinaryOp::*;
        match self {
            And => "and",
            Or => "or",
            Eq => "==",
            Ne => "!=",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
            Pow => "**",
            FloorDiv => "//",
            Gt => ">",
            Lt => "<",
            Ge => ">=",
            Le => "<=",
        }
    }
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "not",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceMethod {
    Append,
    Extend,
    Insert,
    Index,
    Pop,
    Copy,
}

impl SequenceMethod {
    pub fn name(self) -> &'static str {
        match self {
            SequenceMethod::Append => "append",
            SequenceMethod::Extend => "extend",
            SequenceMethod::Insert => "insert",
            SequenceMethod::Index => "index",
            SequenceMethod::Pop => "pop",
            SequenceMethod::Copy => "copy",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Id(Symbol, u32),
    Literal(Literal, u32),
    Unary { op: UnaryOp, expr: Box<Expr>, line: u32 },
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr>, line: u32 },
    FunctionCall { name: Symbol, args: Vec<Expr>, line: u32 },
    List(Vec<Expr>, u32),
    Tuple(Vec<Expr>, u32),
    SequenceIndex { seq: Box<Expr>, index: Box<Expr>, line: u32 },
    SequenceSlice {
        seq: Box<Expr>,
        start: Option<Box<Expr>>,
        end: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
        line: u32,
    },
    /// `len(arg)`.
    SequenceFunctionCall { arg: Box<Expr>, line: u32 },
    SequenceMethod {
        seq: Box<Expr>,
        method: SequenceMethod,
        arg1: Option<Box<Expr>>,
        arg2: Option<Box<Expr>>,
        line: u32,
    },
}

impl Expr {
    pub fn line(&self) -> u32 {
        match self {
            Expr::Id(_, l)
            | Expr::Literal(_, l)
            | Expr::Unary { line: l, .. }
            | Expr::Binary { line: l, .. }
            | Expr::FunctionCall { line: l, .. }
            | Expr::List(_, l)
            | Expr::Tuple(_, l)
            | Expr::SequenceIndex { line: l, .. }
            | Expr::SequenceSlice { line: l, .. }
            | Expr::SequenceFunctionCall { line: l, .. }
            | Expr::SequenceMethod { line: l, .. } => *l,
        }
    }
}
