//! header reads the header of a btree page.
//! A b-tree page is divided into regions in the following order
//! 1. The 100-byte database file header (found on page 1 only)
//! 2. The 8 or 12 byte b-tree page header
//! 3. The cell pointer array
//! 4. Unallocated space
//! 5. The cell content area
//! 6. The reserved region

use byteorder::{BigEndian, ReadBytesExt};
use std::io::Cursor;

use super::{Error, PageType};

/// The btree page header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub page_type: PageType,
    pub freeblock_start: u32,
    pub num_cells: u32,
    pub cell_content_start: u32,
    pub num_fragmented_free_bytes: u8,
    pub rightmost_pointer: Option<u32>,
}

/// Parses the page header found `non_btree_header_bytes` into `page`.
/// That offset is 100 on page 1, which opens with the database file
/// header, and 0 everywhere else.
pub fn parse_header(page: &[u8], non_btree_header_bytes: usize) -> Result<Header, Error> {
    let hdr = page
        .get(non_btree_header_bytes..)
        .ok_or(Error::TruncatedPage)?;
    let mut c = Cursor::new(hdr);

    // Offset	Size	Description
    // 0	1	The one-byte flag at offset 0 indicating the b-tree page type.
    let tag = c.read_u8().map_err(|_| Error::TruncatedPage)?;
    let page_type = PageType::from_tag(tag).ok_or(Error::InvalidPageType(tag))?;

    // 1	2	Start of the first freeblock on the page, or zero if none.
    let freeblock_start = c.read_u16::<BigEndian>().map_err(|_| Error::TruncatedPage)? as u32;
    // 3	2	The number of cells on the page.
    let num_cells = c.read_u16::<BigEndian>().map_err(|_| Error::TruncatedPage)? as u32;
    // 5	2	Start of the cell content area. Zero is interpreted as 65536.
    let cell_content_start = match c.read_u16::<BigEndian>().map_err(|_| Error::TruncatedPage)? {
        0 => 65536,
        x => x as u32,
    };
    // 7	1	The number of fragmented free bytes within the cell content area.
    let num_fragmented_free_bytes = c.read_u8().map_err(|_| Error::TruncatedPage)?;
    // 8	4	The right-most pointer. Interior b-tree pages only.
    let rightmost_pointer = match page_type {
        PageType::IndexInterior | PageType::TableInterior => {
            Some(c.read_u32::<BigEndian>().map_err(|_| Error::TruncatedPage)?)
        }
        PageType::IndexLeaf | PageType::TableLeaf => None,
    };

    Ok(Header {
        page_type,
        freeblock_start,
        num_cells,
        cell_content_start,
        num_fragmented_free_bytes,
        rightmost_pointer,
    })
}
