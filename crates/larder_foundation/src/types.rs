//! Type descriptors for fact field values.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The type of a scalar [`Value`](crate::Value).
///
/// Used in type-mismatch errors raised while evaluating guards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ValueType {
    /// String type.
    String,
    /// 64-bit signed integer type.
    Int,
    /// 64-bit floating point type.
    Float,
    /// Either numeric type (int widens to float).
    Number,
}

impl ValueType {
    /// Returns true if a value of type `actual` satisfies this type.
    #[must_use]
    pub fn accepts(self, actual: ValueType) -> bool {
        match self {
            Self::Number => matches!(actual, Self::Int | Self::Float | Self::Number),
            other => other == actual,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Number => write!(f, "number"),
        }
    }
}
