//! Three-address code: the flat, linear instruction list the IR
//! generator lowers a program to.
//!
//! A [`Tac`] record has the same four-field shape throughout - a
//! result, an opcode, and up to two operands - regardless of whether
//! it represents an assignment, a function call, a control-flow
//! marker, or a sequence operation. [`Tac`]'s `Display` impl is the
//! instruction's canonical textual rendering, the form written to the
//! `.ir` output file and used in this crate's tests; [`mpyc_gen`]
//! consumes the structured fields directly rather than re-parsing
//! this text.

use std::fmt;

/// A single operand: a register, a name, a literal, or a nested
/// collection of operands (a parameter list, an argument tuple, a
/// slice's `(start, end, step)` triple).
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A compiler-generated temporary, `_t1`, `_t2`, ... (numbered from 1).
    Reg(u32),
    /// A variable name, function name, or method name, written bare
    /// (not quoted) the way an identifier is.
    Name(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Includes the surrounding quotes.
    Str(String),
    List(Vec<Operand>),
    Tuple(Vec<Operand>),
    /// An absent slice bound (`xs[:2]`'s missing start, say). Kept
    /// distinct from an empty string so that a present-but-zero bound
    /// renders as `0` rather than disappearing.
    Absent,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Reg(n) => write!(f, "_t{n}"),
            Operand::Name(s) => write!(f, "{s}"),
            Operand::Bool(true) => write!(f, "True"),
            Operand::Bool(false) => write!(f, "False"),
            Operand::Int(v) => write!(f, "{v}"),
            Operand::Float(v) => write!(f, "{}", format_float(*v)),
            Operand::Str(s) => write!(f, "{s}"),
            Operand::List(items) => write!(f, "[{}]", join(items)),
            Operand::Tuple(items) => match items.as_slice() {
                [] => write!(f, "()"),
                [single] => write!(f, "({single},)"),
                _ => write!(f, "({})", join(items)),
            },
            Operand::Absent => write!(f, ""),
        }
    }
}

fn join(items: &[Operand]) -> String {
    items.iter().map(|o| o.to_string()).collect::<Vec<_>>().join(", ")
}

/// Matches Python's `str(float)`: an integral float still prints a
/// trailing `.0` rather than collapsing to an integer literal.
pub fn format_float(v: f64) -> String {
    if v.is_finite() && v == v.trunc() {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// No operator: `result <- left`.
    Copy,
    /// One of `and or == != + - * / % ** // > < >= <=`; unary forms
    /// (`left_operand` only, no `right`) are folded in here too, the
    /// same way the rendering this is ported from handles both with
    /// one branch keyed only on whether `right` is present.
    Operator(&'static str),
    FuncDef,
    If,
    ElseIf,
    Else,
    While,
    EndLabel,
    Print,
    Return,
    FCall,
    Index,
    Slice,
    MCall,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tac {
    pub result: Option<Operand>,
    pub op: Op,
    pub left: Option<Operand>,
    pub right: Option<Operand>,
}

impl fmt::Display for Tac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = || self.result.as_ref().expect("opcode requires a result operand");
        let left = || self.left.as_ref().expect("opcode requires a left operand");
        match self.op {
            Op::Copy => write!(f, "{} <- {}", result(), left()),
            Op::Operator(sym) => match &self.right {
                Some(right) => write!(f, "{} <- {} {} {}", result(), left(), sym, right),
                None => write!(f, "{} <- {} {}", result(), sym, left()),
            },
            Op::FuncDef => write!(f, "func-def {} {}", left(), self.right.as_ref().expect("fdef needs params")),
            Op::If => write!(f, "if {}", left()),
            Op::ElseIf => write!(f, "else-if {}", left()),
            Op::Else => write!(f, "else"),
            Op::While => write!(f, "while {}", left()),
            Op::EndLabel => write!(f, "end"),
            Op::Print => write!(f, "print {}", self.left.as_ref().map(ToString::to_string).unwrap_or_default()),
            Op::Return => write!(f, "return {}", self.left.as_ref().map(ToString::to_string).unwrap_or_default()),
            Op::FCall => write!(f, "{} <- func-call {} {}", result(), left(), self.right.as_ref().expect("fcall needs args")),
            Op::Index => write!(f, "{} <- index {} {}", result(), left(), self.right.as_ref().expect("index needs an index operand")),
            Op::Slice => {
                let (start, end, step) = match &self.right {
                    Some(Operand::Tuple(parts)) if parts.len() == 3 => (&parts[0], &parts[1], &parts[2]),
                    _ => panic!("slice TAC must carry a 3-element (start, end, step) tuple"),
                };
                write!(f, "{} <- slice {} [{}:{}:{}]", result(), left(), render_slice_part(start), render_slice_part(end), render_slice_part(step))
            }
            Op::MCall => write!(f, "{} <- method-call {} {}", result(), left(), self.right.as_ref().expect("mcall needs args")),
        }
    }
}

fn render_slice_part(part: &Operand) -> String {
    part.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_renders_as_an_arrow() {
        let tac = Tac { result: Some(Operand::Name("x".into())), op: Op::Copy, left: Some(Operand::Int(1)), right: None };
        assert_eq!(tac.to_string(), "x <- 1");
    }

    #[test]
    fn binary_operator_includes_both_operands() {
        let tac = Tac {
            result: Some(Operand::Reg(0)),
            op: Op::Operator("+"),
            left: Some(Operand::Int(1)),
            right: Some(Operand::Int(2)),
        };
        assert_eq!(tac.to_string(), "_t0 <- 1 + 2");
    }

    #[test]
    fn unary_operator_omits_the_right_operand() {
        let tac = Tac { result: Some(Operand::Reg(0)), op: Op::Operator("-"), left: Some(Operand::Int(1)), right: None };
        assert_eq!(tac.to_string(), "_t0 <- - 1");
    }

    #[test]
    fn print_with_no_expression_has_no_trailing_space() {
        let tac = Tac { result: None, op: Op::Print, left: None, right: None };
        assert_eq!(tac.to_string(), "print ");
    }

    #[test]
    fn slice_with_a_literal_zero_bound_keeps_the_zero() {
        let tac = Tac {
            result: Some(Operand::Reg(0)),
            op: Op::Slice,
            left: Some(Operand::Name("xs".into())),
            right: Some(Operand::Tuple(vec![Operand::Int(0), Operand::Absent, Operand::Absent])),
        };
        assert_eq!(tac.to_string(), "_t0 <- slice xs [0::]");
    }

    #[test]
    fn float_operand_keeps_its_trailing_zero() {
        assert_eq!(Operand::Float(3.0).to_string(), "3.0");
        assert_eq!(Operand::Float(3.5).to_string(), "3.5");
    }

    #[test]
    fn one_tuple_keeps_its_trailing_comma() {
        assert_eq!(Operand::Tuple(vec![Operand::Int(1)]).to_string(), "(1,)");
        assert_eq!(Operand::Tuple(vec![]).to_string(), "()");
    }
}
