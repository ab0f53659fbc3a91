//! CSV decoding.

use crate::error::{ErrorKind, Result};
use crate::record::{Header, RowRecord, Table};
use crate::value::Value;
use csv::{ReaderBuilder, StringRecord};
use exn::ResultExt;
use std::sync::Arc;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode CSV bytes. The first record is the header; fields stay strings.
///
/// Every line of the file is a row, so blank lines (which the CSV reader
/// skips) come back as all-null records to keep later rows on their file row
/// number. A quoted field spanning several lines is still one row.
pub(super) fn decode(bytes: &[u8]) -> Result<Table> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = ReaderBuilder::new().has_headers(false).flexible(true).from_reader(bytes);
    let mut record = StringRecord::new();

    if !reader.read_record(&mut record).or_raise(|| ErrorKind::InvalidContainer)? {
        exn::bail!(ErrorKind::EmptyRange);
    }
    if blank_lines(bytes, 0) > 0 {
        exn::bail!(ErrorKind::MissingHeader);
    }
    let columns: Vec<(usize, String)> = record
        .iter()
        .enumerate()
        .filter(|(_, name)| !name.is_empty())
        .map(|(index, name)| (index, name.to_string()))
        .collect();
    let header = Arc::new(Header::new(columns.iter().map(|(_, name)| name.as_str()))?);

    let mut rows = Vec::new();
    loop {
        let offset = reader.position().byte();
        if !reader.read_record(&mut record).or_raise(|| ErrorKind::InvalidContainer)? {
            break;
        }
        let skipped = usize::try_from(offset).map_or(0, |offset| blank_lines(bytes, offset));
        rows.extend((0..skipped).map(|_| RowRecord::new(header.clone(), Vec::new())));
        rows.push(RowRecord::new(header.clone(), values(&record, &columns)));
    }
    Table::new(header, rows)
}

/// Blank lines the reader passes over before the record starting at `offset`.
///
/// The reader hands back a CRLF-terminated record as soon as it sees the CR,
/// so an LF straight after a CR belongs to the previous record.
fn blank_lines(bytes: &[u8], offset: usize) -> usize {
    let after_cr = offset.checked_sub(1).and_then(|i| bytes.get(i)) == Some(&b'\r');
    let mut rest = bytes.get(offset..).unwrap_or_default();
    if after_cr && rest.first() == Some(&b'\n') {
        rest = &rest[1..];
    }
    rest.iter().take_while(|&&b| matches!(b, b'\r' | b'\n')).filter(|&&b| b == b'\n').count()
}

fn values(record: &StringRecord, columns: &[(usize, String)]) -> Vec<Value> {
    columns
        .iter()
        .map(|(index, _)| match record.get(*index) {
            None | Some("") => Value::Null,
            Some(field) => Value::Text(field.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_pass_through_as_text() {
        let table = decode(b"Plate,Mileage\nAB12,1200\n").unwrap();
        assert_eq!(table.rows()[0].get("Mileage"), Some(&Value::Text("1200".to_string())));
    }

    #[test]
    fn test_ragged_records() {
        let table = decode(b"Plate,VIN,Make\nAB12\nCD34,V2,Fiat,extra\n").unwrap();
        assert_eq!(table.rows()[0].values(), &[Value::Text("AB12".to_string()), Value::Null, Value::Null]);
        assert_eq!(table.rows()[1].values().len(), 3);
    }

    #[test]
    fn test_unnamed_columns_dropped() {
        let table = decode(b"Plate,,VIN\nAB12,junk,V1\n").unwrap();
        assert_eq!(table.header().names(), &["Plate", "VIN"]);
        assert_eq!(table.rows()[0].get("VIN"), Some(&Value::Text("V1".to_string())));
    }

    #[test]
    fn test_blank_lines_keep_file_row_numbers() {
        // File rows: 1 header, 2 quoted empty field, 3 AB12, 4 blank, 5 blank, 6 CD34.
        let table = decode(b"Plate,VIN\n\"\"\nAB12,V1\n\n\r\nCD34,V3\n").unwrap();
        let plates: Vec<_> = table.rows().iter().map(|row| row.get("Plate").cloned()).collect();
        assert_eq!(
            plates,
            [
                Some(Value::Null),
                Some(Value::Text("AB12".to_string())),
                Some(Value::Null),
                Some(Value::Null),
                Some(Value::Text("CD34".to_string())),
            ]
        );
        assert_eq!(table.rows()[2].values(), &[Value::Null, Value::Null]);
    }

    #[test]
    fn test_windows_line_endings() {
        let table = decode(b"Plate\r\nAB12\r\n\r\nCD34\r\nEF56").unwrap();
        let plates: Vec<_> = table.rows().iter().map(|row| row.get("Plate").map(Value::to_string)).collect();
        let expected = ["AB12", "", "CD34", "EF56"].map(|p| Some(p.to_string()));
        assert_eq!(plates, expected);
    }

    #[test]
    fn test_trailing_blank_lines_add_nothing() {
        let table = decode(b"Plate\nAB12\n\n\n").unwrap();
        assert_eq!(table.rows().len(), 1);
    }

    #[test]
    fn test_multiline_field_is_one_row() {
        let table = decode(b"Plate,Notes\nAB12,\"dented\n\nleft door\"\nCD34,\n").unwrap();
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[0].get("Notes"), Some(&Value::Text("dented\n\nleft door".to_string())));
        assert_eq!(table.rows()[1].get("Plate"), Some(&Value::Text("CD34".to_string())));
    }

    #[test]
    fn test_byte_order_mark_stripped() {
        let table = decode(b"\xEF\xBB\xBFPlate\nAB12\n").unwrap();
        assert_eq!(table.header().names(), &["Plate"]);
    }

    #[test]
    fn test_quoted_fields() {
        let table = decode(b"Plate,Notes\nAB12,\"dented, left door\"\n").unwrap();
        assert_eq!(table.rows()[0].get("Notes"), Some(&Value::Text("dented, left door".to_string())));
    }

    #[test]
    fn test_rejections() {
        assert_eq!(*decode(b"").unwrap_err(), ErrorKind::EmptyRange);
        assert_eq!(*decode(b"Plate,VIN\n").unwrap_err(), ErrorKind::NoDataRows);
        assert_eq!(*decode(b",,\nAB12,V1,\n").unwrap_err(), ErrorKind::NoColumns);
        assert_eq!(*decode(b"Plate\n\xFF\xFE\n").unwrap_err(), ErrorKind::InvalidContainer);
        assert_eq!(*decode(b"\n\n").unwrap_err(), ErrorKind::EmptyRange);
        assert_eq!(*decode(b"\nPlate\nAB12\n").unwrap_err(), ErrorKind::MissingHeader);
    }
}
