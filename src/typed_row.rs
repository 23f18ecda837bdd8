//! Assembles stored records into rows of typed values.
//! Any failure to decode any column is treated as a failure to decode the
//! whole row.

use crate::record;
use crate::serial_type;
use crate::sql_value::SqlValue;

/// One decoded table row: the cell's rowid and one value per declared
/// column.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub rowid: i64,
    pub items: Vec<SqlValue>,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Bad record: {0}")]
    Record(#[from] record::Error),
    #[error("Record has {got} columns where the table declares {declared}.")]
    ColumnCountMismatch { got: usize, declared: usize },
    #[error("Bad value in column {colidx}: {source}")]
    Value {
        colidx: usize,
        source: serial_type::Error,
    },
}

/// Builds a typed row from a leaf cell's rowid and record payload.
///
/// `num_columns` is the declared column count of the table; a record with
/// any other column count is rejected.  When `rowid_alias_column` names an
/// INTEGER PRIMARY KEY column, a NULL stored there decodes as the rowid:
/// such tables keep the key only in the cell framing.
pub fn build_row(
    rowid: i64,
    record: &[u8],
    num_columns: usize,
    rowid_alias_column: Option<usize>,
) -> Result<Row, Error> {
    let mut items: Vec<SqlValue> = Vec::with_capacity(num_columns);
    for (colidx, (serial_type, bytes)) in record::ValueIterator::new(record)?.enumerate() {
        let v = match serial_type::to_sql_value(serial_type, bytes) {
            Ok(v) => v,
            Err(e) => return Err(Error::Value { colidx, source: e }),
        };
        let v = match v {
            SqlValue::Null if rowid_alias_column == Some(colidx) => SqlValue::Int(rowid),
            other => other,
        };
        items.push(v);
    }
    if items.len() != num_columns {
        return Err(Error::ColumnCountMismatch {
            got: items.len(),
            declared: num_columns,
        });
    }
    Ok(Row { rowid, items })
}

#[cfg(test)]
mod tests {
    use super::*;
    use SqlValue::*;

    // NULL key slot | "Red" | one-byte integer 5
    const RECORD: &[u8] = &[0x04, 0x00, 0x13, 0x01, 0x52, 0x65, 0x64, 0x05];

    #[test]
    fn test_build_row() {
        let row = build_row(7, RECORD, 3, None).unwrap();
        assert_eq!(row.rowid, 7);
        assert_eq!(
            row.items,
            vec![Null, Text(String::from("Red")), Int(5)]
        );
    }

    #[test]
    fn test_build_row_aliases_rowid_into_key_column() {
        let row = build_row(7, RECORD, 3, Some(0)).unwrap();
        assert_eq!(
            row.items,
            vec![Int(7), Text(String::from("Red")), Int(5)]
        );
    }

    #[test]
    fn test_build_row_only_aliases_null_slots() {
        // A stored (non-NULL) value in the key column wins over the rowid.
        let record: &[u8] = &[0x02, 0x01, 0x63];
        let row = build_row(7, record, 1, Some(0)).unwrap();
        assert_eq!(row.items, vec![Int(99)]);
    }

    #[test]
    fn test_build_row_rejects_column_count_mismatch() {
        assert!(matches!(
            build_row(7, RECORD, 4, None),
            Err(Error::ColumnCountMismatch {
                got: 3,
                declared: 4
            })
        ));
    }
}
