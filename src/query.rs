//! query plans and runs the supported commands against one database file.
//!
//! A SELECT becomes a single-table scan: resolve the table through the
//! catalog, map column names to ordinals through its CREATE TABLE text,
//! then walk the root page's cells in pointer order, filter, and project.

use anyhow::{bail, Context, Result};
use itertools::Itertools;
use tracing::debug;

use crate::ast;
use crate::btree;
use crate::pager::{PageNum, Pager};
use crate::pt_to_ast;
use crate::schema;
use crate::sql_value::SqlValue;
use crate::typed_row::{self, Row};

/// Output of a query: one Vec of values per emitted row, in on-disk cell
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutput {
    pub rows: Vec<Vec<SqlValue>>,
}

/// `.dbinfo`: the page size and the raw cell count of the catalog page.
/// The count includes internal catalog entries, for parity with the
/// sqlite3 shell's "number of tables".
pub fn db_info(pager: &mut Pager) -> Result<(u32, u32)> {
    let page_size = pager.page_size();
    let page = pager
        .get_page_ro(schema::SCHEMA_BTREE_ROOT_PAGENUM)
        .context("loading catalog page")?;
    let hdr = btree::header::parse_header(page, 100).context("decoding catalog page header")?;
    Ok((page_size, hdr.num_cells))
}

/// `.tables`: the user table names, in catalog order.
pub fn list_tables(pager: &mut Pager) -> Result<Vec<String>> {
    let catalog = schema::read_catalog(pager).context("reading catalog")?;
    Ok(schema::user_table_names(&catalog)
        .into_iter()
        .map(String::from)
        .collect())
}

/// Runs a SELECT and returns its output rows without printing them.
pub fn run_query_no_print(pager: &mut Pager, query: &str) -> Result<QueryOutput> {
    let stmt = pt_to_ast::parse_select_statement(query)?;
    debug!(table = %stmt.tablename, items = stmt.items.len(), "planned select");
    let catalog = schema::read_catalog(pager).context("reading catalog")?;
    let (root_page, creation_sql) = schema::resolve_table(&catalog, &stmt.tablename)?;

    if stmt.items.iter().any(|i| *i == ast::SelItem::CountStar) {
        if stmt.items.len() != 1 || stmt.filter.is_some() {
            bail!("COUNT(*) must be the only select item and takes no WHERE");
        }
        let n = count_rows(pager, root_page)
            .with_context(|| format!("counting rows of table {}", stmt.tablename))?;
        return Ok(QueryOutput {
            rows: vec![vec![SqlValue::Int(n as i64)]],
        });
    }

    let create = pt_to_ast::parse_create_statement(&creation_sql)
        .with_context(|| format!("parsing schema DDL for table {}", stmt.tablename))?;
    let plan = Plan::build(&stmt, &create)?;
    scan(pager, root_page, &plan)
        .with_context(|| format!("scanning table {}", stmt.tablename))
}

/// Runs a SELECT and prints its rows to stdout, projected columns joined
/// by `|`, one row per line.
pub fn run_query(pager: &mut Pager, query: &str) -> Result<()> {
    let output = run_query_no_print(pager, query)?;
    for row in &output.rows {
        println!("{}", row.iter().map(|v| v.to_string()).join("|"));
    }
    Ok(())
}

/// A compiled single-table scan: which ordinals to emit, and which one, if
/// any, to compare against a literal.
struct Plan {
    num_columns: usize,
    rowid_alias_column: Option<usize>,
    projection: Vec<usize>,
    filter: Option<(usize, String)>,
}

impl Plan {
    fn build(stmt: &ast::SelectStatement, create: &ast::CreateStatement) -> Result<Plan> {
        let ordinal = |name: &ast::ColName| -> Result<usize> {
            create
                .coldefs
                .iter()
                .position(|cd| cd.colname.name.eq_ignore_ascii_case(&name.name))
                .with_context(|| format!("no such column: {}", name.name))
        };
        let mut projection = vec![];
        for item in &stmt.items {
            match item {
                ast::SelItem::ColName(c) => projection.push(ordinal(c)?),
                ast::SelItem::CountStar => {
                    bail!("COUNT(*) cannot be combined with column selections")
                }
            }
        }
        let filter = match &stmt.filter {
            Some(w) => Some((ordinal(&w.column)?, w.value.clone())),
            None => None,
        };
        Ok(Plan {
            num_columns: create.coldefs.len(),
            rowid_alias_column: create.coldefs.iter().position(|cd| cd.is_rowid_alias()),
            projection,
            filter,
        })
    }

    /// Case-sensitive string equality against the literal.  Integers
    /// compare through their decimal rendering; NULL never matches.
    fn matches(&self, row: &Row) -> bool {
        match &self.filter {
            None => true,
            Some((colidx, literal)) => match &row.items[*colidx] {
                SqlValue::Text(s) => s == literal,
                SqlValue::Int(i) => i.to_string() == *literal,
                _ => false,
            },
        }
    }

    fn project(&self, row: &Row) -> Result<Vec<SqlValue>> {
        self.projection
            .iter()
            .map(|i| match &row.items[*i] {
                SqlValue::Real(_) => bail!("REAL columns cannot be selected"),
                SqlValue::Blob(_) => bail!("BLOB columns cannot be selected"),
                v => Ok(v.clone()),
            })
            .collect()
    }
}

fn btree_start_offset(pgnum: PageNum) -> usize {
    // The first page carries the database file header ahead of its btree
    // content.
    match pgnum {
        1 => 100,
        _ => 0,
    }
}

fn leaf_header(pager: &mut Pager, pgnum: PageNum) -> Result<btree::header::Header> {
    let non_btree = btree_start_offset(pgnum);
    let page = pager.get_page_ro(pgnum)?;
    let hdr = btree::header::parse_header(page, non_btree)
        .with_context(|| format!("decoding header of page {}", pgnum))?;
    if hdr.page_type != btree::PageType::TableLeaf {
        bail!(
            "page {} is a {:?} page; only leaf table roots are supported",
            pgnum,
            hdr.page_type
        );
    }
    Ok(hdr)
}

fn count_rows(pager: &mut Pager, root_page: PageNum) -> Result<u32> {
    Ok(leaf_header(pager, root_page)?.num_cells)
}

fn scan(pager: &mut Pager, root_page: PageNum, plan: &Plan) -> Result<QueryOutput> {
    leaf_header(pager, root_page)?;
    let non_btree = btree_start_offset(root_page);
    let page = pager.get_page_ro(root_page)?;
    let mut rows = vec![];
    for (cellidx, framed) in btree::leaf::Iterator::new(page, non_btree)?.enumerate() {
        let (rowid, payload) = framed
            .with_context(|| format!("framing cell {} of page {}", cellidx, root_page))?;
        let row = typed_row::build_row(rowid, payload, plan.num_columns, plan.rowid_alias_column)
            .with_context(|| format!("decoding cell {} of page {}", cellidx, root_page))?;
        if !plan.matches(&row) {
            continue;
        }
        rows.push(plan.project(&row)?);
    }
    Ok(QueryOutput { rows })
}
