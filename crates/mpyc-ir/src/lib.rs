//! mpyc-ir - lowers a checked miniPy program to three-address code.
//!
//! [`tac`] defines the instruction format; [`gen::IrGen`] is the single
//! entry point that walks a [`mpyc_par::ast::Program`] and produces a
//! flat `Vec<Tac>`, folding constant subexpressions as it goes.

pub mod gen;
pub mod tac;

pub use gen::IrGen;
pub use tac::{Op, Operand, Tac};
