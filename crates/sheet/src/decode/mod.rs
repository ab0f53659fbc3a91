//! Format detection and the top-level [`decode`] entrypoint.

mod delimited;
mod workbook;

use crate::error::{ErrorKind, Result};
use crate::record::Table;
use derive_more::Display;
use exn::OptionExt;
use tracing::instrument;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE2_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// A supported tabular container.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum SheetFormat {
    /// Office Open XML workbook (.xlsx, .xlsm)
    #[display("xlsx")]
    Xlsx,
    /// Binary Office Open XML workbook (.xlsb)
    #[display("xlsb")]
    Xlsb,
    /// Legacy Excel 97-2003 workbook (.xls)
    #[display("xls")]
    Xls,
    /// OpenDocument spreadsheet (.ods)
    #[display("ods")]
    Ods,
    /// Comma separated values (.csv)
    #[display("csv")]
    Csv,
}

impl SheetFormat {
    /// Detect format from the extension of a source key.
    ///
    /// Source keys are frequently URLs, so any query string or fragment is
    /// ignored before looking at the extension.
    pub fn from_key(key: &str) -> Option<Self> {
        let path = key.split(['?', '#']).next().unwrap_or(key);
        let file_name = path.rsplit('/').next().unwrap_or(path);
        let (_, extension) = file_name.rsplit_once('.')?;
        match extension.to_ascii_lowercase().as_str() {
            "xlsx" | "xlsm" => Some(Self::Xlsx),
            "xlsb" => Some(Self::Xlsb),
            "xls" => Some(Self::Xls),
            "ods" => Some(Self::Ods),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    /// Detect a workbook container from its leading bytes.
    ///
    /// Every ZIP is reported as [`Xlsx`](Self::Xlsx) and every OLE2 compound
    /// file as [`Xls`](Self::Xls); the workbook reader works out the exact
    /// flavour itself. CSV has no magic bytes and is never detected this way.
    pub fn from_magic_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(ZIP_MAGIC) {
            Some(Self::Xlsx)
        } else if bytes.starts_with(OLE2_MAGIC) {
            Some(Self::Xls)
        } else {
            None
        }
    }

    pub fn is_workbook(&self) -> bool {
        !matches!(self, Self::Csv)
    }
}

/// Decode the bytes of one source into a [`Table`].
///
/// The key's extension decides the format; keys without a recognised
/// extension fall back to magic byte sniffing.
///
/// # Errors
///
/// See [`ErrorKind`] for the ways a source can be rejected. Header-less and
/// header-only sources are rejected rather than decoded into something whose
/// row positions would be wrong.
#[instrument(skip(bytes), fields(bytes = bytes.len(), format, rows))]
pub fn decode(source_key: &str, bytes: &[u8]) -> Result<Table> {
    let format = SheetFormat::from_key(source_key)
        .or_else(|| SheetFormat::from_magic_bytes(bytes))
        .ok_or_raise(|| ErrorKind::UnknownFormat(source_key.to_string()))?;
    tracing::Span::current().record("format", tracing::field::display(format));
    let table = match format.is_workbook() {
        true => workbook::decode(bytes)?,
        false => delimited::decode(bytes)?,
    };
    tracing::Span::current().record("rows", table.rows().len());
    Ok(table)
}
