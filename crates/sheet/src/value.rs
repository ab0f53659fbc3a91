//! Cell values.

use calamine::{Data, ExcelDateTime};
use serde::{Serialize, Serializer};
use std::fmt;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Serial day number of 9999-12-31, the last date Excel can display.
const MAX_SERIAL: f64 = 2_958_465.0;

/// A single cell, passed through as literally as the container allows.
///
/// No coercion happens here: a CSV cell is always [`Text`](Self::Text) even
/// when it looks like a number, and a workbook cell keeps whatever type the
/// workbook stored.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Date(PrimitiveDateTime),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            // Rust already prints whole floats without the trailing `.0`.
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Date(dt) => {
                let formatted = dt
                    .format(format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"))
                    .map_err(|_| fmt::Error)?;
                f.write_str(&formatted)
            },
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Date(_) => serializer.collect_str(self),
        }
    }
}

impl From<&Data> for Value {
    fn from(data: &Data) -> Self {
        match data {
            Data::String(s) => Self::Text(s.clone()),
            Data::Float(f) => Self::Number(*f),
            // Precision loss past 2^53 is accepted; spreadsheets store floats anyway.
            Data::Int(i) => Self::Number(*i as f64),
            Data::Bool(b) => Self::Bool(*b),
            Data::DateTime(dt) if dt.is_duration() => Self::Number(dt.as_f64()),
            Data::DateTime(dt) => excel_datetime(dt).map(Self::Date).unwrap_or_else(|| Self::Number(dt.as_f64())),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Self::Text(s.clone()),
            _ => Self::Null,
        }
    }
}

/// Convert a workbook date cell, in whichever date system (1900 or 1904)
/// the workbook uses, into a date-time. Serials outside what Excel itself
/// can display give `None`.
pub(crate) fn excel_datetime(dt: &ExcelDateTime) -> Option<PrimitiveDateTime> {
    if !(0.0..=MAX_SERIAL).contains(&dt.as_f64()) {
        return None;
    }
    let millis = dt.as_datetime()?.and_utc().timestamp_millis();
    let utc = OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()?;
    Some(PrimitiveDateTime::new(utc.date(), utc.time()))
}
