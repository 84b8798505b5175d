use core::fmt;
use std::fmt::{Display, Formatter};

/// A source span, compared lexicographically by (line, column).
///
/// A default (all-zero) location means "synthetic" — it was produced by a
/// pass rather than copied from parsed text.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct Location {
    pub first_line: i32,
    pub first_column: i32,
    pub last_line: i32,
    pub last_column: i32,
}

impl Location {
    #[must_use]
    pub fn new(first_line: i32, first_column: i32, last_line: i32, last_column: i32) -> Self {
        Self {
            first_line,
            first_column,
            last_line,
            last_column,
        }
    }

    /// The synthetic/unknown location, used for nodes a pass manufactures
    /// (e.g. an inserted typecast) rather than copies from the parser.
    #[must_use]
    pub const fn synthetic() -> Self {
        Self {
            first_line: 0,
            first_column: 0,
            last_line: 0,
            last_column: 0,
        }
    }

    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.first_line <= 0 && self.first_column <= 0
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.first_line, self.first_column)
    }
}
