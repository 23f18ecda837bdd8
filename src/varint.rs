//! varint decodes the variable-length integers used throughout the record
//! format, and the fixed-width big-endian twos-complement integers that
//! record bodies store.

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Varint ran past the end of its buffer.")]
    Truncated,
    #[error("{0} is not a valid twos-complement integer width.")]
    UnsupportedWidth(usize),
}

/// Reads a varint from the front of `data`, returning the value and the
/// number of bytes consumed (1..=9).
///
/// Bytes 1..=8 carry seven data bits each, with the high bit signalling
/// continuation; the ninth byte, if reached, contributes all eight of its
/// bits.  The usable bits concatenate left to right into a u64, so the
/// encoding never needs more than 64 bits.
pub fn read_varint(data: &[u8]) -> Result<(u64, usize), Error> {
    let mut value: u64 = 0;
    for (i, b) in data.iter().enumerate().take(9) {
        if i == 8 {
            return Ok(((value << 8) | *b as u64, 9));
        }
        value = (value << 7) | (*b & 0x7f) as u64;
        if *b & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(Error::Truncated)
}

/// Inverse of `read_varint`.  The decoder does not need this, but tests and
/// fixture builders do, and it pins down the codec as a pair.
pub fn write_varint(value: u64) -> Vec<u8> {
    // Values using more than 56 bits only fit the nine-byte form: eight
    // continuation bytes for the top 56 bits, then a full tail byte.
    if value >> 56 != 0 {
        let mut out = Vec::with_capacity(9);
        let high = value >> 8;
        for i in (0..8).rev() {
            out.push(0x80 | ((high >> (7 * i)) as u8 & 0x7f));
        }
        out.push(value as u8);
        return out;
    }
    let mut out = vec![(value & 0x7f) as u8];
    let mut v = value >> 7;
    while v != 0 {
        out.push(0x80 | (v & 0x7f) as u8);
        v >>= 7;
    }
    out.reverse();
    out
}

/// Decodes a big-endian twos-complement integer of one of the widths the
/// record format uses (1, 2, 3, 4, 6 or 8 bytes), sign-extending from the
/// top byte.
pub fn read_twos_complement(data: &[u8]) -> Result<i64, Error> {
    match data.len() {
        1 | 2 | 3 | 4 | 6 | 8 => {}
        n => return Err(Error::UnsupportedWidth(n)),
    }
    let mut v = (data[0] as i8) as i64;
    for b in &data[1..] {
        v = (v << 8) | *b as i64;
    }
    Ok(v)
}
