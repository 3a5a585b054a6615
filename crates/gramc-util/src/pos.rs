//! Source positions for grammar names and literals.

use std::fmt;

/// A line/column coordinate in a grammar source file. Both components are
/// 1-based; `Pos::default()` denotes an unknown position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pos {
    pub line: u32,
    pub column: u32,
}

impl Pos {
    pub fn new(line: u32, column: u32) -> Pos {
        Pos { line, column }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.line, self.column)
    }
}

/// A string taken from grammar source text, together with its position.
/// Used for names, keywords and string literals in the grammar IR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynString {
    pub text: String,
    pub pos: Pos,
}

impl SynString {
    pub fn new(text: impl Into<String>, pos: Pos) -> SynString {
        SynString {
            text: text.into(),
            pos,
        }
    }

    /// A string without a meaningful source position.
    pub fn synthetic(text: impl Into<String>) -> SynString {
        SynString::new(text, Pos::default())
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for SynString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
