//! Spreadsheet decoding.
//!
//! Turns the raw bytes of an uploaded spreadsheet (XLSX, XLS, XLSB, ODS or
//! CSV) into a [`Table`]: one shared [`Header`] and one [`RowRecord`] per data
//! row. There is no fixed schema; whatever columns the header row names are
//! the fields of every record.
//!
//! Row addressing follows the spreadsheet, not the vector: file row 1 is the
//! header, so `table.rows()[i]` is file row `i + 2`.

mod decode;
pub mod error;
mod normalize;
mod record;
mod value;

pub use crate::decode::{SheetFormat, decode};
pub use crate::normalize::{normalize, normalize_str};
pub use crate::record::{Header, RowRecord, Table};
pub use crate::value::Value;
