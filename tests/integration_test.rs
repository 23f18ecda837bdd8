use peeklite::pager::Pager;
use peeklite::query;
use peeklite::schema;
use peeklite::sql_value::SqlValue::*;
use pretty_assertions::assert_eq;

use fixture::{build_db, write_temp_db, TableDef, Val};

/// Builds complete database images for the tests: a 100-byte file header,
/// a catalog page, and one leaf page per table.  The layout code here is
/// deliberately independent of the crate's decoder: cell content is
/// allocated downward from the page end while headers and pointers are
/// written from the front, so the builder and the decoder cannot share a
/// bug.
mod fixture {
    pub enum Val<'a> {
        Null,
        Int(i64),
        Text(&'a str),
    }

    pub struct TableDef<'a> {
        pub name: &'a str,
        pub sql: &'a str,
        pub rows: Vec<Vec<Val<'a>>>,
    }

    fn push_varint(out: &mut Vec<u8>, v: u64) {
        assert!(v < 1 << 14, "fixture varints stay small");
        if v < 0x80 {
            out.push(v as u8);
        } else {
            out.push(0x80 | (v >> 7) as u8);
            out.push((v & 0x7f) as u8);
        }
    }

    fn encode_record(values: &[Val]) -> Vec<u8> {
        let mut serials: Vec<u64> = vec![];
        let mut body: Vec<u8> = vec![];
        for v in values {
            match v {
                Val::Null => serials.push(0),
                Val::Int(i) => {
                    if let Ok(b) = i8::try_from(*i) {
                        serials.push(1);
                        body.extend_from_slice(&b.to_be_bytes());
                    } else if let Ok(b) = i16::try_from(*i) {
                        serials.push(2);
                        body.extend_from_slice(&b.to_be_bytes());
                    } else if let Ok(b) = i32::try_from(*i) {
                        serials.push(4);
                        body.extend_from_slice(&b.to_be_bytes());
                    } else {
                        serials.push(6);
                        body.extend_from_slice(&i.to_be_bytes());
                    }
                }
                Val::Text(s) => {
                    serials.push(13 + 2 * s.len() as u64);
                    body.extend_from_slice(s.as_bytes());
                }
            }
        }
        let mut serial_bytes = vec![];
        for s in &serials {
            push_varint(&mut serial_bytes, *s);
        }
        // All fixture headers stay under 128 bytes, so the header-length
        // varint (which counts itself) is a single byte.
        let hdr_len = serial_bytes.len() + 1;
        assert!(hdr_len < 0x80);
        let mut record = vec![hdr_len as u8];
        record.extend_from_slice(&serial_bytes);
        record.extend_from_slice(&body);
        record
    }

    /// Lays out one table leaf page: cells packed against the page end in
    /// the order given, pointer array in the same order.
    fn leaf_page(page_size: usize, first_page: bool, cells: &[(i64, Vec<u8>)]) -> Vec<u8> {
        let mut page = vec![0_u8; page_size];
        let hdr_base = if first_page { 100 } else { 0 };
        let mut content_end = page_size;
        let mut pointers: Vec<u16> = vec![];
        for (rowid, record) in cells {
            let mut cell = vec![];
            push_varint(&mut cell, record.len() as u64);
            push_varint(&mut cell, *rowid as u64);
            cell.extend_from_slice(record);
            content_end -= cell.len();
            page[content_end..content_end + cell.len()].copy_from_slice(&cell);
            pointers.push(content_end as u16);
        }
        assert!(
            content_end >= hdr_base + 8 + 2 * cells.len(),
            "cells collided with the page header"
        );
        page[hdr_base] = 0x0d;
        page[hdr_base + 3..hdr_base + 5].copy_from_slice(&(cells.len() as u16).to_be_bytes());
        // The content-area start field encodes 65536 as 0.
        let content_start = if content_end == 65536 { 0 } else { content_end as u16 };
        page[hdr_base + 5..hdr_base + 7].copy_from_slice(&content_start.to_be_bytes());
        let mut p = hdr_base + 8;
        for ptr in &pointers {
            page[p..p + 2].copy_from_slice(&ptr.to_be_bytes());
            p += 2;
        }
        page
    }

    /// Assembles a database image: page 1 holds the catalog, then one leaf
    /// page per table, in order, so table `i` gets root page `i + 2`.
    pub fn build_db(page_size: usize, tables: &[TableDef]) -> Vec<u8> {
        let mut catalog_cells = vec![];
        for (i, t) in tables.iter().enumerate() {
            let record = encode_record(&[
                Val::Text("table"),
                Val::Text(t.name),
                Val::Text(t.name),
                Val::Int((i + 2) as i64),
                Val::Text(t.sql),
            ]);
            catalog_cells.push(((i + 1) as i64, record));
        }
        let mut image = leaf_page(page_size, true, &catalog_cells);

        image[0..16].copy_from_slice(b"SQLite format 3\0");
        let pagesize_field: u16 = if page_size == 65536 { 1 } else { page_size as u16 };
        image[16..18].copy_from_slice(&pagesize_field.to_be_bytes());
        image[18] = 1; // write format: legacy
        image[19] = 1; // read format: legacy
        image[21] = 64; // max embedded payload fraction
        image[22] = 32; // min embedded payload fraction
        image[23] = 32; // leaf payload fraction
        image[28..32].copy_from_slice(&((1 + tables.len()) as u32).to_be_bytes());
        image[47] = 4; // schema format 4
        image[59] = 1; // text encoding: utf-8

        for t in tables {
            let cells: Vec<(i64, Vec<u8>)> = t
                .rows
                .iter()
                .enumerate()
                .map(|(i, row)| ((i + 1) as i64, encode_record(row)))
                .collect();
            image.extend_from_slice(&leaf_page(page_size, false, &cells));
        }
        image
    }

    pub fn write_temp_db(name: &str, image: &[u8]) -> String {
        let path = std::env::temp_dir().join(format!(
            "peeklite-test-{}-{}.db",
            name,
            std::process::id()
        ));
        std::fs::write(&path, image).expect("Should have written test database");
        path.to_string_lossy().into_owned()
    }
}

/// Catalog order: apples (root page 2), sqlite_sequence (3), oranges (4).
fn sample_image() -> Vec<u8> {
    build_db(
        4096,
        &[
            TableDef {
                name: "apples",
                sql: "CREATE TABLE apples\n(\n\tid integer primary key autoincrement,\n\tname text,\n\tcolor text\n)",
                rows: vec![
                    vec![Val::Null, Val::Text("Granny Smith"), Val::Text("Light Green")],
                    vec![Val::Null, Val::Text("Fuji"), Val::Text("Red")],
                    vec![Val::Null, Val::Text("Honeycrisp"), Val::Text("Blush Red")],
                    vec![Val::Null, Val::Text("Golden Delicious"), Val::Text("Yellow")],
                ],
            },
            TableDef {
                name: "sqlite_sequence",
                sql: "CREATE TABLE sqlite_sequence(name,seq)",
                rows: vec![vec![Val::Text("apples"), Val::Int(4)]],
            },
            TableDef {
                name: "oranges",
                sql: "CREATE TABLE oranges\n(\n\tid integer primary key autoincrement,\n\tname text,\n\tdescription text\n)",
                rows: vec![
                    vec![Val::Null, Val::Text("Mandarin"), Val::Text("great for snacking")],
                    vec![Val::Null, Val::Text("Tangelo"), Val::Text("sweet and tart")],
                    vec![Val::Null, Val::Text("Tangerine"), Val::Text("great for sweeter juice")],
                    vec![Val::Null, Val::Text("Clementine"), Val::Text("usually seedless, great for snacking")],
                    vec![Val::Null, Val::Text("Valencia Orange"), Val::Text("best for juicing")],
                    vec![Val::Null, Val::Text("Navel Orange"), Val::Null],
                ],
            },
        ],
    )
}

fn sample_db(test_name: &str) -> String {
    write_temp_db(test_name, &sample_image())
}

#[test]
fn test_db_info_reports_page_size_and_catalog_cells() {
    let path = sample_db("dbinfo");
    let mut pager = Pager::open(&path).expect("Should have opened db");
    let (page_size, num_tables) = query::db_info(&mut pager).unwrap();
    assert_eq!(page_size, 4096);
    assert_eq!(num_tables, 3);
}

#[test]
fn test_list_tables_excludes_internal_names() {
    let path = sample_db("tables");
    let mut pager = Pager::open(&path).expect("Should have opened db");
    assert_eq!(
        query::list_tables(&mut pager).unwrap(),
        vec!["apples", "oranges"]
    );
}

#[test]
fn test_resolve_table_root_and_creation_sql() {
    let path = sample_db("resolve");
    let mut pager = Pager::open(&path).expect("Should have opened db");
    let catalog = schema::read_catalog(&mut pager).unwrap();
    let expected = vec![("apples", 2), ("sqlite_sequence", 3), ("oranges", 4)];
    for (table, root) in expected {
        let (pgnum, sql) = schema::resolve_table(&catalog, table).unwrap();
        assert_eq!(pgnum, root, "root page of {}", table);
        assert!(
            sql.to_lowercase()
                .starts_with(&format!("create table {}", table)),
            "creation sql of {}",
            table
        );
    }
}

#[test]
fn test_count_star() {
    let path = sample_db("count");
    let mut pager = Pager::open(&path).expect("Should have opened db");
    let out = query::run_query_no_print(&mut pager, "SELECT COUNT(*) FROM apples").unwrap();
    assert_eq!(out.rows, vec![vec![Int(4)]]);
    let out = query::run_query_no_print(&mut pager, "SELECT COUNT(*) FROM oranges").unwrap();
    assert_eq!(out.rows, vec![vec![Int(6)]]);
}

#[test]
fn test_single_column_projection_in_disk_order() {
    let path = sample_db("project1");
    let mut pager = Pager::open(&path).expect("Should have opened db");
    let out = query::run_query_no_print(&mut pager, "SELECT name FROM apples").unwrap();
    assert_eq!(
        out.rows,
        vec![
            vec![Text(String::from("Granny Smith"))],
            vec![Text(String::from("Fuji"))],
            vec![Text(String::from("Honeycrisp"))],
            vec![Text(String::from("Golden Delicious"))],
        ]
    );
}

#[test]
fn test_multi_column_projection_follows_select_order() {
    let path = sample_db("project2");
    let mut pager = Pager::open(&path).expect("Should have opened db");
    let out = query::run_query_no_print(&mut pager, "SELECT color, name FROM apples").unwrap();
    assert_eq!(out.rows[0], vec![
        Text(String::from("Light Green")),
        Text(String::from("Granny Smith")),
    ]);
    assert_eq!(out.rows.len(), 4);
}

#[test]
fn test_where_equality_filters_rows() {
    let path = sample_db("where");
    let mut pager = Pager::open(&path).expect("Should have opened db");
    let out = query::run_query_no_print(
        &mut pager,
        "SELECT name FROM apples WHERE color = 'Yellow'",
    )
    .unwrap();
    assert_eq!(out.rows, vec![vec![Text(String::from("Golden Delicious"))]]);

    let out = query::run_query_no_print(
        &mut pager,
        "SELECT name FROM apples WHERE color = 'Chartreuse'",
    )
    .unwrap();
    assert_eq!(out.rows, Vec::<Vec<peeklite::sql_value::SqlValue>>::new());
}

#[test]
fn test_rowid_alias_column_reads_from_cell_key() {
    let path = sample_db("rowid");
    let mut pager = Pager::open(&path).expect("Should have opened db");
    let out = query::run_query_no_print(&mut pager, "SELECT id, name FROM apples").unwrap();
    assert_eq!(out.rows[0], vec![Int(1), Text(String::from("Granny Smith"))]);
    assert_eq!(out.rows[3], vec![Int(4), Text(String::from("Golden Delicious"))]);
}

#[test]
fn test_where_against_rowid_alias_column() {
    let path = sample_db("whererowid");
    let mut pager = Pager::open(&path).expect("Should have opened db");
    let out =
        query::run_query_no_print(&mut pager, "SELECT name FROM oranges WHERE id = '3'").unwrap();
    assert_eq!(out.rows, vec![vec![Text(String::from("Tangerine"))]]);
}

#[test]
fn test_null_column_projects_as_null() {
    let path = sample_db("null");
    let mut pager = Pager::open(&path).expect("Should have opened db");
    let out = query::run_query_no_print(
        &mut pager,
        "SELECT description FROM oranges WHERE name = 'Navel Orange'",
    )
    .unwrap();
    assert_eq!(out.rows, vec![vec![Null]]);
    // NULL renders as the empty string on output.
    assert_eq!(out.rows[0][0].to_string(), "");
}

#[test]
fn test_queries_are_idempotent() {
    let path = sample_db("idempotent");
    let mut pager = Pager::open(&path).expect("Should have opened db");
    let first = query::run_query_no_print(&mut pager, "SELECT name, color FROM apples").unwrap();
    let second = query::run_query_no_print(&mut pager, "SELECT name, color FROM apples").unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_empty_table_on_512_byte_pages() {
    let image = build_db(
        512,
        &[TableDef {
            name: "melons",
            sql: "CREATE TABLE melons (id integer primary key, name text)",
            rows: vec![],
        }],
    );
    let path = write_temp_db("empty", &image);
    let mut pager = Pager::open(&path).expect("Should have opened db");
    let (page_size, num_tables) = query::db_info(&mut pager).unwrap();
    assert_eq!(page_size, 512);
    assert_eq!(num_tables, 1);

    let out = query::run_query_no_print(&mut pager, "SELECT COUNT(*) FROM melons").unwrap();
    assert_eq!(out.rows, vec![vec![Int(0)]]);
    let out = query::run_query_no_print(&mut pager, "SELECT name FROM melons").unwrap();
    assert!(out.rows.is_empty());
}

#[test]
fn test_unknown_table_and_column_errors() {
    let path = sample_db("unknown");
    let mut pager = Pager::open(&path).expect("Should have opened db");

    let err = query::run_query_no_print(&mut pager, "SELECT name FROM pears").unwrap_err();
    assert!(err.to_string().contains("not found"), "got: {:#}", err);

    let err = query::run_query_no_print(&mut pager, "SELECT flavor FROM apples").unwrap_err();
    assert!(format!("{:#}", err).contains("no such column"), "got: {:#}", err);
}

#[test]
fn test_interior_root_page_is_unsupported() {
    let mut image = sample_image();
    // Flip the root page of `apples` (page 2) to an interior table tag.
    image[4096] = 0x05;
    let path = write_temp_db("interior", &image);
    let mut pager = Pager::open(&path).expect("Should have opened db");
    let err = query::run_query_no_print(&mut pager, "SELECT name FROM apples").unwrap_err();
    assert!(
        format!("{:#}", err).contains("leaf table roots"),
        "got: {:#}",
        err
    );
}

#[test]
fn test_rejects_file_with_wrong_magic() {
    let mut image = sample_image();
    image[0] = b'Z';
    let path = write_temp_db("badmagic", &image);
    assert!(Pager::open(&path).is_err());
}
