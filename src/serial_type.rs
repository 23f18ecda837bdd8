//! Serial types are how values are encoded inside stored records.
//! Each column of a record carries a serial type code in the record header
//! which determines the width and interpretation of its body bytes.

use byteorder::{BigEndian, ReadBytesExt};

use crate::sql_value::SqlValue;
use crate::varint;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid or reserved serial type code {0}.")]
    InvalidSerialTypeCode(i64),
    #[error("Bytes were not a valid string encoding: {0}")]
    InvalidStringEncoding(#[from] std::string::FromUtf8Error),
    #[error("Value bytes ran short for serial type {0}.")]
    Truncated(i64),
    #[error("Bad integer bytes: {0}")]
    Int(#[from] varint::Error),
}

/// Number of bytes of record body a value of serial type `t` occupies, or
/// None for codes the format reserves (10 and 11) or does not define.
///
/// From: https://www.sqlite.org/fileformat.html#record_format
/// Serial Type	Content Size	Meaning
/// 0	        0	            Value is a NULL.
/// 1..=6       1,2,3,4,6,8     Big-endian twos-complement integer.
/// 7	        8	            Big-endian IEEE 754-2008 64-bit float.
/// 8	        0	            The integer 0.
/// 9	        0	            The integer 1.
/// 10,11	    -	            Reserved for internal use.
/// N>=12 even	(N-12)/2	    BLOB of that many bytes.
/// N>=13 odd	(N-13)/2	    Text of that many bytes, no nul terminator.
pub fn content_size(t: i64) -> Option<usize> {
    match t {
        0 | 8 | 9 => Some(0),
        1 => Some(1),
        2 => Some(2),
        3 => Some(3),
        4 => Some(4),
        5 => Some(6),
        6 | 7 => Some(8),
        10 | 11 => None,
        x if x >= 12 => Some((x as usize - 12 - (x % 2) as usize) / 2),
        _ => None,
    }
}

/// Deserializes `data`, exactly one value's worth of body bytes, into a
/// `SqlValue` according to `serial_type`.
///
/// Text must be UTF-8; other encodings are not supported.
pub fn to_sql_value(serial_type: i64, data: &[u8]) -> Result<SqlValue, Error> {
    use SqlValue::*;
    match serial_type {
        0 => Ok(Null),
        1..=6 => Ok(Int(varint::read_twos_complement(data)?)),
        7 => {
            let mut c = std::io::Cursor::new(data);
            Ok(Real(c
                .read_f64::<BigEndian>()
                .map_err(|_| Error::Truncated(serial_type))?))
        }
        8 => Ok(Int(0)),
        9 => Ok(Int(1)),
        x if x >= 12 && x % 2 == 0 => Ok(Blob(data.to_vec())),
        x if x >= 13 => Ok(Text(String::from_utf8(data.to_vec())?)),
        x => Err(Error::InvalidSerialTypeCode(x)),
    }
}
