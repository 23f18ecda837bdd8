//! This module defines abstract syntax tree (AST) types for the SQL
//! subset.  The AST discards lexical detail like case, quoting and
//! position in the input.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColName {
    pub name: String,
}

impl std::fmt::Display for ColName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.name.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelItem {
    ColName(ColName),
    CountStar,
}

impl std::fmt::Display for SelItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelItem::ColName(x) => x.fmt(f),
            SelItem::CountStar => "COUNT(*)".fmt(f),
        }
    }
}

/// The one predicate shape supported: `column = 'literal'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhereEq {
    pub column: ColName,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectStatement {
    pub items: Vec<SelItem>,
    pub tablename: String,
    pub filter: Option<WhereEq>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColDef {
    pub colname: ColName,
    pub coltype: String,
    pub primary_key: bool,
}

impl ColDef {
    /// True when this column aliases the rowid.  The format stores such
    /// columns as NULL and keeps the key in the cell framing.
    pub fn is_rowid_alias(&self) -> bool {
        self.primary_key && self.coltype.eq_ignore_ascii_case("integer")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateStatement {
    pub tablename: String,
    pub coldefs: Vec<ColDef>,
}
