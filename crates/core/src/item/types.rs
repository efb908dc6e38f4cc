use std::collections::HashMap;
use std::fmt;

/// A single stored record: attribute name to typed value.
pub type Item = HashMap<String, Value>;

/// A typed attribute value as held by the key-value store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// String.
    S(String),
    /// Number, kept in its wire representation to avoid precision loss.
    N(String),
    /// Binary.
    B(Vec<u8>),
    Bool(bool),
    Null,
    /// List of heterogeneous values.
    L(Vec<Value>),
    /// Nested map.
    M(HashMap<String, Value>),
    /// String set.
    Ss(Vec<String>),
    /// Number set.
    Ns(Vec<String>),
    /// Binary set.
    Bs(Vec<Vec<u8>>),
}

impl Value {
    /// Creates a string value.
    pub fn s(value: impl Into<String>) -> Self {
        Self::S(value.into())
    }

    /// Creates a number value from anything printable as a number.
    pub fn n(value: impl ToString) -> Self {
        Self::N(value.to_string())
    }

    /// Returns the string payload, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::S(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::S(_) => "string",
            Self::N(_) => "number",
            Self::B(_) => "binary",
            Self::Bool(_) => "bool",
            Self::Null => "null",
            Self::L(_) => "list",
            Self::M(_) => "map",
            Self::Ss(_) => "string set",
            Self::Ns(_) => "number set",
            Self::Bs(_) => "binary set",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::S(s) | Self::N(s) => write!(f, "{s}"),
            Self::B(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Null => write!(f, "null"),
            Self::L(values) => write!(f, "<list of {}>", values.len()),
            Self::M(map) => write!(f, "<map of {}>", map.len()),
            Self::Ss(values) | Self::Ns(values) => write!(f, "{{{}}}", values.join(",")),
            Self::Bs(values) => write!(f, "<binary set of {}>", values.len()),
        }
    }
}
