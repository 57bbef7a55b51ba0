//! mpyc-sem - name resolution and static type checking for miniPy.
//!
//! miniPy has no type annotations: every type in [`types::Type`] is
//! inferred bottom-up from literals and operators, with [`types::Type::Any`]
//! standing in wherever that inference can't pin a value down (a
//! function's return value, an element read back out of a list). The
//! checker's job is narrower than a full inference pass - it never
//! needs to solve constraints or unify type variables - it just walks
//! the tree once, computing each expression's type as it goes and
//! flagging the combinations the operator tables in [`types`] reject.
//!
//! Running the checker is a prerequisite for lowering to the next
//! phase, not because the IR generator consults its results - constant
//! folding there works off the literal shape of each expression, not
//! this pass's inferred types - but because a program with unresolved
//! names or incompatible operators has no well-defined lowering to
//! begin with.

pub mod analysis;
pub mod scope;
pub mod types;

pub use analysis::TypeChecker;
pub use scope::SymbolTable;
pub use types::Type;
