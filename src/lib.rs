mod ast;
pub mod btree;
pub mod dbheader;
pub mod pager;
pub mod parser;
mod pt_to_ast;
pub mod query;
mod record;
pub mod schema;
mod serial_type;
pub mod sql_value;
pub mod typed_row;
pub mod varint;
pub mod vfs;

extern crate pest;
#[macro_use]
extern crate pest_derive;

use anyhow::Result;

/// Opens `path` and prints the `.dbinfo` summary: the page size and the
/// catalog page's cell count.
pub fn print_db_info(path: &str) -> Result<()> {
    let mut pager = pager::Pager::open(path)?;
    let (page_size, num_tables) = query::db_info(&mut pager)?;
    println!("database page size: {}", page_size);
    println!("number of tables: {}", num_tables);
    Ok(())
}

/// Opens `path` and prints the user table names, space-joined in catalog
/// order.
pub fn print_tables(path: &str) -> Result<()> {
    let mut pager = pager::Pager::open(path)?;
    let names = query::list_tables(&mut pager)?;
    println!("{}", names.join(" "));
    Ok(())
}

/// Opens `path`, runs one SELECT, and prints its rows.
pub fn run_sql(path: &str, sql: &str) -> Result<()> {
    let mut pager = pager::Pager::open(path)?;
    query::run_query(&mut pager, sql)
}
