//! schema reads the `sqlite_schema` catalog stored on page 1.
//!
//! Page 1 is always a table btree page holding the catalog, which
//! describes every other object in the file.  Each catalog row has five
//! columns: (type, name, tbl_name, rootpage, sql).

use crate::btree;
use crate::pager::{PageNum, Pager};
use crate::sql_value::SqlValue;
use crate::typed_row;

pub const SCHEMA_TABLE_NAME: &str = "sqlite_schema";
pub const SCHEMA_BTREE_ROOT_PAGENUM: PageNum = 1;
pub const SCHEMA_SCHEMA: &str =
    "CREATE TABLE sqlite_schema (type text, name text, tbl_name text, rootpage integer, sql text)";
const SCHEMA_TABLE_NUM_COLS: usize = 5;
const SCHEMA_TABLE_TYPE_COLIDX: usize = 0;
const SCHEMA_TABLE_NAME_COLIDX: usize = 1;
const SCHEMA_TABLE_TBL_NAME_COLIDX: usize = 2;
const SCHEMA_TABLE_ROOTPAGE_COLIDX: usize = 3;
const SCHEMA_TABLE_SQL_COLIDX: usize = 4;

// Page 1's btree header sits after the 100-byte file header, but its cell
// pointers are relative to the page start.
const SCHEMA_PAGE_BTREE_OFFSET: usize = 100;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error loading the catalog page: {0}")]
    Pager(#[from] crate::pager::Error),
    #[error("Error walking the catalog btree: {0}")]
    Btree(#[from] btree::Error),
    #[error("Error decoding catalog cell {cellidx}: {source}")]
    Row {
        cellidx: usize,
        source: typed_row::Error,
    },
    #[error("Catalog column `{0}` holds an unexpected type.")]
    UnexpectedColumnType(&'static str),
    #[error("Catalog rootpage for table {0} is not a positive integer.")]
    BadRootPage(String),
    #[error("Table {0} not found in database.")]
    TableNameNotFound(String),
}

/// One row of the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaObject {
    /// "table", "index", "view" or "trigger".
    pub kind: String,
    pub name: String,
    pub tbl_name: String,
    pub rootpage: i64,
    pub sql: String,
}

/// Reads every catalog entry from page 1, in cell-pointer order.
pub fn read_catalog(pager: &mut Pager) -> Result<Vec<SchemaObject>, Error> {
    let page = pager.get_page_ro(SCHEMA_BTREE_ROOT_PAGENUM)?;
    let li = btree::leaf::Iterator::new(page, SCHEMA_PAGE_BTREE_OFFSET)?;
    let mut objects = Vec::new();
    for (cellidx, framed) in li.enumerate() {
        let (rowid, payload) = framed?;
        let row = typed_row::build_row(rowid, payload, SCHEMA_TABLE_NUM_COLS, None)
            .map_err(|e| Error::Row { cellidx, source: e })?;
        objects.push(schema_object_from_row(&row)?);
    }
    Ok(objects)
}

fn schema_object_from_row(row: &typed_row::Row) -> Result<SchemaObject, Error> {
    let kind = text_column(&row.items[SCHEMA_TABLE_TYPE_COLIDX], "type")?;
    let name = text_column(&row.items[SCHEMA_TABLE_NAME_COLIDX], "name")?;
    let tbl_name = text_column(&row.items[SCHEMA_TABLE_TBL_NAME_COLIDX], "tbl_name")?;
    // Entries without storage (views, some auto-indexes) carry NULL or 0
    // here; those are only rejected if something tries to scan them.
    let rootpage = match &row.items[SCHEMA_TABLE_ROOTPAGE_COLIDX] {
        SqlValue::Int(i) => *i,
        SqlValue::Null => 0,
        _ => return Err(Error::UnexpectedColumnType("rootpage")),
    };
    let sql = match &row.items[SCHEMA_TABLE_SQL_COLIDX] {
        SqlValue::Text(s) => s.clone(),
        SqlValue::Null => String::new(),
        _ => return Err(Error::UnexpectedColumnType("sql")),
    };
    Ok(SchemaObject {
        kind,
        name,
        tbl_name,
        rootpage,
        sql,
    })
}

fn text_column(v: &SqlValue, what: &'static str) -> Result<String, Error> {
    v.as_text()
        .cloned()
        .ok_or(Error::UnexpectedColumnType(what))
}

/// Names of the user tables, in catalog order.  Internal `sqlite_`-prefixed
/// objects are excluded.
pub fn user_table_names(catalog: &[SchemaObject]) -> Vec<&str> {
    catalog
        .iter()
        .filter(|o| o.kind == "table" && !o.tbl_name.starts_with("sqlite_"))
        .map(|o| o.tbl_name.as_str())
        .collect()
}

/// Finds `table_name`'s catalog entry and returns its root page number and
/// the SQL CREATE statement used to create it.
pub fn resolve_table(
    catalog: &[SchemaObject],
    table_name: &str,
) -> Result<(PageNum, String), Error> {
    if table_name == SCHEMA_TABLE_NAME {
        return Ok((SCHEMA_BTREE_ROOT_PAGENUM, String::from(SCHEMA_SCHEMA)));
    }
    let obj = catalog
        .iter()
        .find(|o| o.kind == "table" && o.tbl_name == table_name)
        .ok_or_else(|| Error::TableNameNotFound(table_name.to_string()))?;
    if obj.rootpage < 1 {
        return Err(Error::BadRootPage(table_name.to_string()));
    }
    Ok((obj.rootpage as PageNum, obj.sql.clone()))
}
