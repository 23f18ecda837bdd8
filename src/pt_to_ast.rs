//! `pt_to_ast` has routines for converting parse trees to ASTs for SQL.
//! A pest parse tree has one enum for all terminals and non-terminals;
//! the AST keeps only what evaluation needs.

use anyhow::{bail, Context, Result};
use pest::Parser;

use crate::ast;
use crate::parser::{Rule, SQLParser};

/// Parses the text of a CREATE TABLE statement, as found in the catalog's
/// `sql` column, into the ordered column definitions.
pub fn parse_create_statement(c: &str) -> Result<ast::CreateStatement> {
    let mut parsed = SQLParser::parse(Rule::create_stmt, c)
        .with_context(|| format!("parsing CREATE TABLE statement: {}", c))?;
    let create_stmt = parsed.next().context("empty CREATE TABLE parse")?;

    let mut tablename = String::new();
    let mut coldefs = vec![];
    for p in create_stmt.into_inner() {
        match p.as_rule() {
            Rule::table_identifier => tablename = unquote_identifier(p.as_str()),
            Rule::column_defs => {
                for column_def in p.into_inner() {
                    coldefs.push(parse_column_def(column_def)?);
                }
            }
            Rule::EOI => (),
            _ => bail!("unexpected syntax in CREATE TABLE: {}", p.as_str()),
        }
    }
    Ok(ast::CreateStatement { tablename, coldefs })
}

fn parse_column_def(pair: pest::iterators::Pair<'_, Rule>) -> Result<ast::ColDef> {
    let mut colname = None;
    let mut coltype = String::new();
    let mut primary_key = false;
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::column_name => colname = Some(unquote_identifier(p.as_str())),
            Rule::type_name => coltype = String::from(p.as_str()),
            Rule::primary_key => primary_key = true,
            _ => bail!("unexpected syntax in column definition: {}", p.as_str()),
        }
    }
    Ok(ast::ColDef {
        colname: ast::ColName {
            name: colname.context("column definition without a name")?,
        },
        coltype,
        primary_key,
    })
}

/// Parses a SELECT in the supported subset: bare columns or a lone
/// COUNT(*), one FROM table, at most one `col = 'literal'` predicate.
pub fn parse_select_statement(query: &str) -> Result<ast::SelectStatement> {
    use itertools::Itertools;

    let mut parsed = SQLParser::parse(Rule::select_stmt, query)
        .with_context(|| format!("parsing SELECT statement: {}", query))?;
    let select_stmt = parsed.next().context("empty SELECT parse")?;

    let mut items = vec![];
    let mut tablename = None;
    let mut filter = None;
    for s in select_stmt.into_inner() {
        match s.as_rule() {
            Rule::select_items => {
                for t in s.into_inner() {
                    let u = t.into_inner().next().context("empty select item")?;
                    items.push(match u.as_rule() {
                        Rule::column_name => ast::SelItem::ColName(ast::ColName {
                            name: unquote_identifier(u.as_str()),
                        }),
                        Rule::count_star => ast::SelItem::CountStar,
                        _ => bail!("unsupported select item: {}", u.as_str()),
                    });
                }
            }
            Rule::table_identifier => tablename = Some(unquote_identifier(s.as_str())),
            Rule::where_clause => {
                let eq = s.into_inner().next().context("empty WHERE clause")?;
                let (col, lit) = eq
                    .into_inner()
                    .collect_tuple()
                    .context("WHERE supports a single equality")?;
                filter = Some(ast::WhereEq {
                    column: ast::ColName {
                        name: unquote_identifier(col.as_str()),
                    },
                    value: remove_single_quoting(lit.as_str()),
                });
            }
            Rule::EOI => (),
            _ => bail!("unexpected syntax in SELECT: {}", s.as_str()),
        }
    }
    Ok(ast::SelectStatement {
        items,
        tablename: tablename.context("SELECT requires a FROM table")?,
        filter,
    })
}

fn unquote_identifier(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        String::from(&s[1..s.len() - 1])
    } else {
        String::from(s)
    }
}

/// Strips the outer quotes from a single-quoted string literal and
/// unescapes doubled quotes.
fn remove_single_quoting(s: &str) -> String {
    let inner = s
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .unwrap_or(s);
    inner.replace("''", "'")
}
