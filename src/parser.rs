//! parser holds the pest-generated parser for the SQL subset.
//! The grammar lives in `src/sql.pest`; `pt_to_ast` turns its parse trees
//! into AST types.

#[derive(Parser)]
#[grammar = "sql.pest"]
pub struct SQLParser;
