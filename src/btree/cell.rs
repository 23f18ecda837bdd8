//! cell walks the cell pointer array of a btree page.

use byteorder::{BigEndian, ReadBytesExt};
use std::io::Cursor;

use super::Error;

/// Iterator over the cells of one page, without interpreting the cell
/// contents.
///
/// Yields one byte slice per cell pointer, in pointer-array order.  Each
/// slice runs from the cell's start to the end of the page; the cell's own
/// framing says how much of it is meaningful.  Pointer order is key order
/// on disk, but nothing here relies on that.
pub struct Iterator<'a> {
    page: &'a [u8],
    cell_idx: usize,
    cell_offsets: Vec<usize>,
}

impl<'a> Iterator<'a> {
    /// Creates an iterator over the cells of `page`.
    /// `non_btree_header_bytes` is 100 on page 1 and 0 elsewhere; cell
    /// pointers are relative to the page start either way.
    pub fn new(page: &'a [u8], non_btree_header_bytes: usize) -> Result<Iterator<'a>, Error> {
        let hdr = super::header::parse_header(page, non_btree_header_bytes)?;
        let ptr_array_start = non_btree_header_bytes + hdr.page_type.header_len();
        let ptr_array = page.get(ptr_array_start..).ok_or(Error::TruncatedPage)?;
        let mut c = Cursor::new(ptr_array);

        let mut cell_offsets = Vec::with_capacity(hdr.num_cells as usize);
        for _ in 0..hdr.num_cells {
            let off = c.read_u16::<BigEndian>().map_err(|_| Error::TruncatedPage)?;
            if off as usize >= page.len() {
                return Err(Error::CellPointerOutOfPage(off));
            }
            cell_offsets.push(off as usize);
        }
        Ok(Iterator {
            page,
            cell_idx: 0,
            cell_offsets,
        })
    }
}

impl<'a> core::iter::Iterator for Iterator<'a> {
    // The iterator returns a reference to a cell (&[u8]).  The format of
    // the data in the cell depends on the type of the btree page.
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.cell_idx >= self.cell_offsets.len() {
            return None;
        }
        let b = self.cell_offsets[self.cell_idx];
        self.cell_idx += 1;
        Some(&self.page[b..])
    }
}

// A hand-built 64 byte leaf page with two cells: the pointer array names
// offset 60 first, then offset 56.
#[cfg(test)]
const TWO_CELL_PAGE: &str = "0d00 0000 0200 3800 003c 0038 0000 0000
0000 0000 0000 0000 0000 0000 0000 0000
0000 0000 0000 0000 0000 0000 0000 0000
0000 0000 0000 0000 aabb ccdd 1122 3344";

#[cfg(test)]
fn page_from_hex(s: &str) -> Vec<u8> {
    use hex::FromHex;
    Vec::from_hex(s.replace([' ', '\n'], "")).expect("Invalid hex string")
}

#[test]
fn test_cell_iterator_follows_pointer_order() {
    let p = page_from_hex(TWO_CELL_PAGE);
    assert_eq!(p.len(), 64);
    let mut ci = Iterator::new(&p, 0).unwrap();
    // Each yielded slice runs to the end of the page.
    assert_eq!(ci.next().unwrap(), &[0x11_u8, 0x22, 0x33, 0x44][..]);
    assert_eq!(
        ci.next().unwrap(),
        &[0xaa_u8, 0xbb, 0xcc, 0xdd, 0x11, 0x22, 0x33, 0x44][..]
    );
    assert_eq!(ci.next(), None);
}

#[test]
fn test_cell_iterator_rejects_pointer_outside_page() {
    let mut p = page_from_hex(TWO_CELL_PAGE);
    // Rewrite the first cell pointer to land past the end of the page.
    p[8] = 0x01;
    p[9] = 0x00;
    assert_eq!(
        Iterator::new(&p, 0).err(),
        Some(Error::CellPointerOutOfPage(0x0100))
    );
}

#[test]
fn test_cell_iterator_rejects_unknown_page_type() {
    let mut p = page_from_hex(TWO_CELL_PAGE);
    p[0] = 0x0b;
    assert_eq!(Iterator::new(&p, 0).err(), Some(Error::InvalidPageType(0x0b)));
}
