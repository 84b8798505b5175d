use core::fmt;
use std::fmt::{Display, Formatter};

/// The inferred value type of an expression node.
///
/// `Error` is the sentinel assigned after a type error so later passes can
/// propagate it silently instead of cascading a second diagnostic from the
/// same mistake.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub enum ValueType {
    #[default]
    Void,
    Integer,
    Float,
    String,
    Key,
    Vector,
    Rotation,
    List,
    Error,
}

impl ValueType {
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueType::Integer | ValueType::Float)
    }

    #[must_use]
    pub fn is_error(self) -> bool {
        matches!(self, ValueType::Error)
    }

    /// Source-code spelling of the type, as it would appear in a declaration.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            ValueType::Void => "void",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Key => "key",
            ValueType::Vector => "vector",
            ValueType::Rotation => "rotation",
            ValueType::List => "list",
            ValueType::Error => "<error>",
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
