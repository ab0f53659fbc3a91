//! Workbook (XLSX/XLSB/XLS/ODS) decoding via `calamine`.

use crate::error::{ErrorKind, Result};
use crate::record::{Header, RowRecord, Table};
use crate::value::Value;
use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use exn::OptionExt;
use std::io::Cursor;
use std::sync::Arc;

/// Decode the first sheet of a workbook.
pub(super) fn decode(bytes: &[u8]) -> Result<Table> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| {
        tracing::debug!(error = %e, "Unable to open workbook");
        ErrorKind::InvalidContainer
    })?;
    let range = workbook.worksheet_range_at(0).ok_or_raise(|| ErrorKind::NoSheets)?.map_err(|e| {
        tracing::debug!(error = %e, "Unable to read first sheet");
        ErrorKind::InvalidContainer
    })?;
    from_range(&range)
}

/// Walk a sheet's used range: the header is file row 1 and every later row
/// up to the end of the range becomes a record, blank or not.
pub(super) fn from_range(range: &Range<Data>) -> Result<Table> {
    let (Some((first_row, first_col)), Some((last_row, last_col))) = (range.start(), range.end()) else {
        exn::bail!(ErrorKind::EmptyRange);
    };
    if range.is_empty() {
        exn::bail!(ErrorKind::EmptyRange);
    }
    // Positions handed out to callers assume the header sits on row 1. A
    // range that starts lower has no header where the callers expect one.
    if first_row != 0 {
        exn::bail!(ErrorKind::MissingHeader);
    }

    let columns: Vec<(u32, String)> = (first_col..=last_col)
        .filter_map(|col| {
            let name = range.get_value((0, col)).map(|cell| Value::from(cell).to_string()).unwrap_or_default();
            (!name.is_empty()).then_some((col, name))
        })
        .collect();
    let header = Arc::new(Header::new(columns.iter().map(|(_, name)| name.as_str()))?);

    let rows = (1..=last_row)
        .map(|row| {
            let values = columns
                .iter()
                .map(|(col, _)| range.get_value((row, *col)).map(Value::from).unwrap_or(Value::Null))
                .collect();
            RowRecord::new(header.clone(), values)
        })
        .collect();
    Table::new(header, rows)
}
