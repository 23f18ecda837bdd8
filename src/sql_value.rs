//! Defines an enum of all the values a decoded column can hold.

use enum_as_inner::EnumAsInner;

/// Holds any value a stored record cell decodes to.
/// The variants match the storage classes database files use.
#[derive(Debug, Clone, PartialEq, EnumAsInner)]
pub enum SqlValue {
    Int(i64),
    Text(String),
    Blob(Vec<u8>),
    Real(f64),
    Null,
}

impl std::fmt::Display for SqlValue {
    // NULL renders as the empty string, which is how rows are emitted;
    // BLOBs have no text rendering and are refused before display.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Int(x) => write!(f, "{}", x),
            SqlValue::Text(x) => write!(f, "{}", x),
            SqlValue::Blob(_) => write!(f, "<BLOB>"),
            SqlValue::Real(x) => write!(f, "{}", x),
            SqlValue::Null => Ok(()),
        }
    }
}
