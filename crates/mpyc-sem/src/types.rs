//! The static type lattice miniPy is checked against.
//!
//! `Any` sits at the top: it is compatible with every other type and,
//! per the operator tables below, contaminates a binary or unary
//! result the moment either operand carries it. This lets the checker
//! stay usefully silent about values whose type genuinely can't be
//! pinned down (the result of indexing a heterogeneous list, say)
//! instead of rejecting programs the source language allows.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Bool,
    Int,
    Float,
    Str,
    List,
    Tuple,
    Any,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Type::Bool => "bool",
            Type::Int => "int",
            Type::Float => "float",
            Type::Str => "str",
            Type::List => "list",
            Type::Tuple => "tuple",
            Type::Any => "Any",
        };
        write!(f, "{name}")
    }
}

impl Type {
    pub fn is_numeric(self) -> bool {
        matches!(self, Type::Bool | Type::Int | Type::Float)
    }

    /// `bool <= int <= float`: the wider of two numeric types, used by
    /// every arithmetic operator that isn't sequence concatenation.
    fn widen(a: Type, b: Type) -> Type {
        if a == Type::Float || b == Type::Float {
            Type::Float
        } else {
            Type::Int
        }
    }
}

/// `and`, `or`, `==`, `!=`: always boolean, any operand types accepted.
pub fn logical_or_equality_result(left: Type, right: Type) -> Type {
    if left == Type::Any || right == Type::Any {
        Type::Any
    } else {
        Type::Bool
    }
}

/// `>`, `<`, `>=`, `<=`: boolean, but only between two numeric operands
/// or two strings.
pub fn comparison_result(left: Type, right: Type) -> Result<Type, String> {
    if left == Type::Any || right == Type::Any {
        return Ok(Type::Any);
    }
    let ok = (left.is_numeric() && right.is_numeric()) || (left == Type::Str && right == Type::Str);
    if ok {
        Ok(Type::Bool)
    } else {
        Err(format!("cannot compare '{left}' with '{right}'"))
    }
}

/// `+`: numeric widening, or same-kind sequence concatenation
/// (`str+str`, `list+list`, `tuple+tuple`).
pub fn add_result(left: Type, right: Type) -> Result<Type, String> {
    if left == Type::Any || right == Type::Any {
        return Ok(Type::Any);
    }
    if left.is_numeric() && right.is_numeric() {
        return Ok(Type::widen(left, right));
    }
    if left == right && matches!(left, Type::Str | Type::List | Type::Tuple) {
        return Ok(left);
    }
    Err(format!("unsupported operand types for +: '{left}' and '{right}'"))
}

/// `*`: numeric widening, or sequence repetition (`(int|bool) x
/// (str|list|tuple)`, in either order).
pub fn mul_result(left: Type, right: Type) -> Result<Type, String> {
    if left == Type::Any || right == Type::Any {
        return Ok(Type::Any);
    }
    if left.is_numeric() && right.is_numeric() {
        return Ok(Type::widen(left, right));
    }
    let is_repeat_count = |t: Type| matches!(t, Type::Int | Type::Bool);
    let is_sequence = |t: Type| matches!(t, Type::Str | Type::List | Type::Tuple);
    if is_repeat_count(left) && is_sequence(right) {
        return Ok(right);
    }
    if is_sequence(left) && is_repeat_count(right) {
        return Ok(left);
    }
    Err(format!("unsupported operand types for *: '{left}' and '{right}'"))
}

/// `-`, `/`, `%`, `**`, `//`: numeric only; float if either side is a
/// float, otherwise int.
pub fn numeric_only_result(op: &str, left: Type, right: Type) -> Result<Type, String> {
    if left == Type::Any || right == Type::Any {
        return Ok(Type::Any);
    }
    if left.is_numeric() && right.is_numeric() {
        Ok(Type::widen(left, right))
    } else {
        Err(format!("unsupported operand types for {op}: '{left}' and '{right}'"))
    }
}

/// Unary `+`/`-`: numeric passthrough, widening `bool` to `int`.
pub fn unary_numeric_result(op: &str, operand: Type) -> Result<Type, String> {
    if operand == Type::Any {
        return Ok(Type::Any);
    }
    match operand {
        Type::Bool | Type::Int => Ok(Type::Int),
        Type::Float => Ok(Type::Float),
        other => Err(format!("bad operand type for unary {op}: '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_widens_bool_to_int_to_float() {
        assert_eq!(add_result(Type::Bool, Type::Int).unwrap(), Type::Int);
        assert_eq!(add_result(Type::Int, Type::Float).unwrap(), Type::Float);
    }

    #[test]
    fn add_concatenates_matching_sequences() {
        assert_eq!(add_result(Type::Str, Type::Str).unwrap(), Type::Str);
        assert!(add_result(Type::Str, Type::List).is_err());
    }

    #[test]
    fn mul_repeats_a_sequence_by_a_count() {
        assert_eq!(mul_result(Type::Int, Type::List).unwrap(), Type::List);
        assert_eq!(mul_result(Type::List, Type::Bool).unwrap(), Type::List);
        assert!(mul_result(Type::List, Type::List).is_err());
    }

    #[test]
    fn any_short_circuits_every_operator() {
        assert_eq!(add_result(Type::Any, Type::List).unwrap(), Type::Any);
        assert_eq!(numeric_only_result("**", Type::Any, Type::Str).unwrap(), Type::Any);
        assert_eq!(comparison_result(Type::Any, Type::Bool).unwrap(), Type::Any);
    }

    #[test]
    fn division_family_is_numeric_only() {
        assert!(numeric_only_result("/", Type::Str, Type::Int).is_err());
        assert_eq!(numeric_only_result("//", Type::Int, Type::Int).unwrap(), Type::Int);
        assert_eq!(numeric_only_result("%", Type::Int, Type::Float).unwrap(), Type::Float);
    }
}
