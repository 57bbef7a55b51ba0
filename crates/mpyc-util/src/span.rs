//! Source locations.
//!
//! miniPy diagnostics are reported by physical line number only (there is
//! no multi-file compilation and no need to point at a byte range), so
//! `Span` is a thin newtype around a 1-based line number rather than the
//! lo/hi byte-offset span a multi-file compiler would carry.

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    line: u32,
}

impl Span {
    pub const DUMMY: Span = Span { line: 0 };

    pub fn new(line: u32) -> Self {
        Self { line }
    }

    pub fn line(self) -> u32 {
        self.line
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.line)
    }
}
