//! Interned identifiers.
//!
//! Every `ID` token the lexer produces, and every reserved word, is
//! interned through an [`Interner`] owned by the compilation session
//! rather than a process-global table: two separate `Session`s (as in a
//! test harness that lexes several source files) never share symbol
//! space, and there is nothing to initialize before the first token is
//! scanned.
//!
//! A [`Symbol`] is a 4-byte handle; comparing two symbols is a u32
//! comparison rather than a string compare, which matters because names
//! are compared constantly during scope resolution.

use std::fmt;

/// An interned string handle. Two symbols compare equal iff the strings
/// they were interned from compare equal.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

/// Owns the backing storage for every [`Symbol`] produced from it.
///
/// Strings are never evicted once interned, which is fine here: a
/// miniPy source file has at most a few hundred distinct identifiers.
pub struct Interner {
    strings: Vec<Box<str>>,
    lookup: rustc_hash::FxHashMap<Box<str>, Symbol>,
}

impl Interner {
    pub fn new() -> Self {
        Self { strings: Vec::new(), lookup: rustc_hash::FxHashMap::default() }
    }

    pub fn intern(&mut self, s: &str) -> Symbol {
        if let Some(&sym) = self.lookup.get(s) {
            return sym;
        }
        let sym = Symbol(self.strings.len() as u32);
        let boxed: Box<str> = s.into();
        self.strings.push(boxed.clone());
        self.lookup.insert(boxed, sym);
        sym
    }

    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.0 as usize]
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_string_twice_yields_same_symbol() {
        let mut interner = Interner::new();
        let a = interner.intern("foo");
        let b = interner.intern("foo");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_strings_get_distinct_symbols() {
        let mut interner = Interner::new();
        let a = interner.intern("foo");
        let b = interner.intern("bar");
        assert_ne!(a, b);
    }

    #[test]
    fn resolve_round_trips_the_original_text() {
        let mut interner = Interner::new();
        let sym = interner.intern("append");
        assert_eq!(interner.resolve(sym), "append");
    }
}
