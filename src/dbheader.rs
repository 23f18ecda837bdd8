//! dbheader reads the 100-byte header at the start of a database file.

use byteorder::{BigEndian, ReadBytesExt};
use std::io::{Cursor, Read};

#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error("The magic bytes for this file are wrong.")]
    WrongMagic,
    #[error("The pagesize field is not a power of two in 512..=32768, nor the literal 1.")]
    UnsupportedPagesize,
    #[error("Error reading file.")]
    ReadFailed,
}

pub const SQLITE_DB_HEADER_BYTES: usize = 100;
const SQLITE3_MAGIC_STRING: &[u8] = &[
    0x53, 0x51, 0x4c, 0x69, 0x74, 0x65, 0x20, 0x66, 0x6f, 0x72, 0x6d, 0x61, 0x74, 0x20, 0x33, 0x00,
];

/// The database file header.
///
/// Only `pagesize` and `numpages` are interpreted by this crate.  The rest
/// of the fields are decoded so that `{:?}` shows the whole header, but
/// nothing reads them back; validating them would reject files that are
/// perfectly readable.
#[derive(Debug, Clone)]
pub struct DbfileHeader {
    pub pagesize: u32,
    pub numpages: u32,
    pub changecnt: u32,
    pub write_format: u8,
    pub read_format: u8,
    pub reserved_bytes: u8,
    pub max_payload_fraction: u8,
    pub min_payload_fraction: u8,
    pub leaf_payload_fraction: u8,
    pub freelist_trunk_page: u32,
    pub freelist_page_count: u32,
    pub schema_cookie: u32,
    pub schema_format: u32,
    pub default_page_cache: u32,
    pub autovacuum_top_root: u32,
    pub text_encoding: u32,
    pub user_version: u32,
    pub incremental_vacuum: u32,
    pub application_id: u32,
    pub version_valid_for: u32,
    pub sqlite_version: u32,
}

/// Parses the first 100 bytes of a database file.
///
/// Fails when the magic string does not match, or when the pagesize field
/// holds something other than a power of two in 512..=32768 or the literal
/// 1, which the format defines to mean 65536.
pub fn parse_header(h: &[u8]) -> Result<DbfileHeader, Error> {
    if h.len() < SQLITE_DB_HEADER_BYTES {
        return Err(Error::ReadFailed);
    }
    // Offset	Size	Description
    // 0        16	    The header string: "SQLite format 3\000"
    if &h[0..16] != SQLITE3_MAGIC_STRING {
        return Err(Error::WrongMagic);
    }
    let mut c = Cursor::new(h);
    c.set_position(16);

    // 16	    2	    The database page size in bytes.
    // The only u16 powers of two >= 512 are 512..=32768, so the range check
    // folds into is_power_of_two.
    let pagesize: u32 = match c.read_u16::<BigEndian>().map_err(|_| Error::ReadFailed)? {
        1 => 65536,
        x if x >= 512 && x.is_power_of_two() => x as u32,
        _ => return Err(Error::UnsupportedPagesize),
    };

    // 18	1	File format write version. 1 for legacy; 2 for WAL.
    // 19	1	File format read version. 1 for legacy; 2 for WAL.
    // 20	1	Bytes of unused "reserved" space at the end of each page.
    // 21	1	Maximum embedded payload fraction. Must be 64.
    // 22	1	Minimum embedded payload fraction. Must be 32.
    // 23	1	Leaf payload fraction. Must be 32.
    let write_format = c.read_u8().map_err(|_| Error::ReadFailed)?;
    let read_format = c.read_u8().map_err(|_| Error::ReadFailed)?;
    let reserved_bytes = c.read_u8().map_err(|_| Error::ReadFailed)?;
    let max_payload_fraction = c.read_u8().map_err(|_| Error::ReadFailed)?;
    let min_payload_fraction = c.read_u8().map_err(|_| Error::ReadFailed)?;
    let leaf_payload_fraction = c.read_u8().map_err(|_| Error::ReadFailed)?;

    // 24	    4	    File change counter.
    // 28	    4	    Size of the database file in pages. The "in-header database size".
    let changecnt = c.read_u32::<BigEndian>().map_err(|_| Error::ReadFailed)?;
    let numpages = c.read_u32::<BigEndian>().map_err(|_| Error::ReadFailed)?;

    // 32	    4	    Page number of the first freelist trunk page.
    // 36	    4	    Total number of freelist pages.
    // 40	    4	    The schema cookie.
    // 44	    4	    The schema format number.
    // 48	    4	    Default page cache size.
    // 52	    4	    Largest root b-tree page when in auto-vacuum modes.
    // 56	    4	    The database text encoding. 1 means UTF-8.
    // 60	    4	    The "user version".
    // 64	    4	    Non-zero for incremental-vacuum mode.
    // 68	    4	    The "Application ID".
    let freelist_trunk_page = c.read_u32::<BigEndian>().map_err(|_| Error::ReadFailed)?;
    let freelist_page_count = c.read_u32::<BigEndian>().map_err(|_| Error::ReadFailed)?;
    let schema_cookie = c.read_u32::<BigEndian>().map_err(|_| Error::ReadFailed)?;
    let schema_format = c.read_u32::<BigEndian>().map_err(|_| Error::ReadFailed)?;
    let default_page_cache = c.read_u32::<BigEndian>().map_err(|_| Error::ReadFailed)?;
    let autovacuum_top_root = c.read_u32::<BigEndian>().map_err(|_| Error::ReadFailed)?;
    let text_encoding = c.read_u32::<BigEndian>().map_err(|_| Error::ReadFailed)?;
    let user_version = c.read_u32::<BigEndian>().map_err(|_| Error::ReadFailed)?;
    let incremental_vacuum = c.read_u32::<BigEndian>().map_err(|_| Error::ReadFailed)?;
    let application_id = c.read_u32::<BigEndian>().map_err(|_| Error::ReadFailed)?;

    // 72	    20	    Reserved for expansion.
    let mut reserved_buffer = [0; 20];
    c.read_exact(&mut reserved_buffer)
        .map_err(|_| Error::ReadFailed)?;

    // 92	    4	    The version-valid-for number.
    // 96	    4	    SQLITE_VERSION_NUMBER
    let version_valid_for = c.read_u32::<BigEndian>().map_err(|_| Error::ReadFailed)?;
    let sqlite_version = c.read_u32::<BigEndian>().map_err(|_| Error::ReadFailed)?;

    Ok(DbfileHeader {
        pagesize,
        numpages,
        changecnt,
        write_format,
        read_format,
        reserved_bytes,
        max_payload_fraction,
        min_payload_fraction,
        leaf_payload_fraction,
        freelist_trunk_page,
        freelist_page_count,
        schema_cookie,
        schema_format,
        default_page_cache,
        autovacuum_top_root,
        text_encoding,
        user_version,
        incremental_vacuum,
        application_id,
        version_valid_for,
        sqlite_version,
    })
}
