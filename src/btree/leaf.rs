//! leaf frames the cells of a table btree leaf page.

use super::{cell, Error, RowId};
use crate::varint;

/// Iterator over the rows stored on one table leaf page.
///
/// Yields `(rowid, payload)` in cell-pointer order.  The payload is the
/// record bytes; a payload longer than the bytes reachable on the page
/// would continue on an overflow chain, which is not supported.
pub struct Iterator<'a> {
    ci: cell::Iterator<'a>,
}

impl<'a> Iterator<'a> {
    pub fn new(page: &'a [u8], non_btree_header_bytes: usize) -> Result<Iterator<'a>, Error> {
        Ok(Iterator {
            ci: cell::Iterator::new(page, non_btree_header_bytes)?,
        })
    }
}

impl<'a> core::iter::Iterator for Iterator<'a> {
    type Item = Result<(RowId, &'a [u8]), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let cell = self.ci.next()?;
        Some(frame_cell(cell))
    }
}

// Table B-Tree Leaf Cell (header 0x0d):
// A varint which is the total number of bytes of payload, including any overflow
// A varint which is the integer key, a.k.a. "rowid"
// The initial portion of the payload that does not spill to overflow pages.
// A 4-byte big-endian integer page number for the first page of the
// overflow page list - omitted if all payload fits on the b-tree page.
fn frame_cell(cell: &[u8]) -> Result<(RowId, &[u8]), Error> {
    let (payload_size, n1) = varint::read_varint(cell)?;
    let (rowid, n2) = varint::read_varint(&cell[n1..])?;
    let payload_start = n1 + n2;
    let payload_end = payload_start + payload_size as usize;
    if payload_end > cell.len() {
        return Err(Error::PayloadOverflow);
    }
    Ok((rowid as RowId, &cell[payload_start..payload_end]))
}

// A hand-built 64 byte leaf page with two one-column rows:
// rowid 1 holds the two-byte integer 7, rowid 2 the one-byte integer 42.
#[cfg(test)]
const TWO_ROW_PAGE: &str = "0d00 0000 0200 3500 0035 003b 0000 0000
0000 0000 0000 0000 0000 0000 0000 0000
0000 0000 0000 0000 0000 0000 0000 0000
0000 0000 0004 0102 0200 0703 0202 012a";

#[cfg(test)]
fn page_from_hex(s: &str) -> Vec<u8> {
    use hex::FromHex;
    Vec::from_hex(s.replace([' ', '\n'], "")).expect("Invalid hex string")
}

#[test]
fn test_leaf_iterator_frames_rowid_and_payload() {
    let p = page_from_hex(TWO_ROW_PAGE);
    assert_eq!(p.len(), 64);
    let mut li = Iterator::new(&p, 0).unwrap();
    assert_eq!(
        li.next().unwrap().unwrap(),
        (1, &[0x02_u8, 0x02, 0x00, 0x07][..])
    );
    assert_eq!(li.next().unwrap().unwrap(), (2, &[0x02_u8, 0x01, 0x2a][..]));
    assert!(li.next().is_none());
}

#[test]
fn test_leaf_iterator_rejects_spilled_payload() {
    let mut p = page_from_hex(TWO_ROW_PAGE);
    // Claim a payload far larger than the bytes left on the page.
    p[59] = 0x50;
    let results: Vec<_> = Iterator::new(&p, 0).unwrap().collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert_eq!(results[1], Err(Error::PayloadOverflow));
}
