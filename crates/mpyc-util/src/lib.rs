//! mpyc-util - Core Utilities and Foundation Types
//!
//! Shared infrastructure used by every phase of the miniPy-to-targetJ
//! compiler: interned identifiers, source spans, typed-index collections,
//! and the diagnostic machinery that every other crate reports errors
//! through.
//!
//! None of the types here know anything about miniPy grammar or targetJ
//! semantics; they are the zero-cost plumbing the phase crates build on.

mod diagnostic;
mod error;
mod index_vec;
mod span;
mod symbol;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use error::{UtilError, UtilResult};
pub use index_vec::{Idx, IndexVec};
pub use span::Span;
pub use symbol::{Interner, Symbol};

pub use rustc_hash::{FxHashMap, FxHashSet};
