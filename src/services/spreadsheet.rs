//! Tabular upload parsing shared by the bulk imports.
//!
//! A workbook is reduced to its first sheet; the first row is the header.
//! Header names are trimmed, lower-cased and have inner spaces replaced by
//! `_`, so "Course Name" and "course_name" address the same column.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use thiserror::Error;
use time::{Date, Duration, Month};

use crate::core::time::{format_date, parse_iso_date};

#[derive(Debug, Error)]
pub(crate) enum SpreadsheetError {
    #[error("could not read spreadsheet: {0}")]
    Unreadable(String),
    #[error("spreadsheet has no sheets")]
    NoSheets,
    #[error("spreadsheet is empty")]
    Empty,
    #[error("missing required column: {0}")]
    MissingColumn(String),
    #[error("spreadsheet has {rows} data rows, the limit is {limit}")]
    TooManyRows { rows: usize, limit: usize },
}

/// A cell whose content cannot be coerced to the type its column needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CellError {
    pub(crate) column: String,
    pub(crate) value: String,
}

impl CellError {
    pub(crate) fn detail(&self) -> String {
        format!("{}: invalid value {:?}", self.column, self.value)
    }
}

#[derive(Debug)]
pub(crate) struct Sheet {
    columns: HashMap<String, usize>,
    rows: Vec<SheetRow>,
}

#[derive(Debug)]
struct SheetRow {
    number: usize,
    cells: Vec<Data>,
}

impl Sheet {
    pub(crate) fn from_bytes(bytes: Vec<u8>, max_rows: usize) -> Result<Self, SpreadsheetError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|err| SpreadsheetError::Unreadable(err.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(SpreadsheetError::NoSheets)?
            .map_err(|err| SpreadsheetError::Unreadable(err.to_string()))?;

        let rows = range.rows().map(|row| row.to_vec()).collect();
        Self::from_rows(rows, max_rows)
    }

    /// Builds a sheet from raw rows, the first being the header.
    pub(crate) fn from_rows(rows: Vec<Vec<Data>>, max_rows: usize) -> Result<Self, SpreadsheetError> {
        let mut rows = rows.into_iter();
        let header = rows.next().ok_or(SpreadsheetError::Empty)?;

        let mut columns = HashMap::new();
        for (index, cell) in header.iter().enumerate() {
            let name = normalize_header(&cell_text(cell));
            if !name.is_empty() {
                columns.entry(name).or_insert(index);
            }
        }
        if columns.is_empty() {
            return Err(SpreadsheetError::Empty);
        }

        // Row numbers follow the spreadsheet: the header is row 1.
        let rows: Vec<SheetRow> = rows
            .enumerate()
            .filter(|(_, cells)| !is_blank_row(cells))
            .map(|(index, cells)| SheetRow { number: index + 2, cells })
            .collect();

        if rows.len() > max_rows {
            return Err(SpreadsheetError::TooManyRows { rows: rows.len(), limit: max_rows });
        }

        Ok(Self { columns, rows })
    }

    /// Fails on the first required column absent from the header, in the given order.
    pub(crate) fn require(&self, required: &[&str]) -> Result<(), SpreadsheetError> {
        match required.iter().find(|column| !self.columns.contains_key(**column)) {
            Some(missing) => Err(SpreadsheetError::MissingColumn((*missing).to_string())),
            None => Ok(()),
        }
    }

    pub(crate) fn has_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn rows(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(move |row| RowView { sheet: self, row })
    }
}

#[derive(Clone, Copy)]
pub(crate) struct RowView<'a> {
    sheet: &'a Sheet,
    row: &'a SheetRow,
}

impl<'a> RowView<'a> {
    /// 1-based spreadsheet row; the header is row 1.
    pub(crate) fn line(&self) -> usize {
        self.row.number
    }

    fn cell(&self, column: &str) -> Option<&'a Data> {
        let index = *self.sheet.columns.get(column)?;
        self.row.cells.get(index)
    }

    /// Trimmed text of a cell; missing and empty cells read as "".
    pub(crate) fn text(&self, column: &str) -> String {
        self.cell(column).map(cell_text).unwrap_or_default()
    }

    pub(crate) fn optional_text(&self, column: &str) -> Option<String> {
        let value = self.text(column);
        (!value.is_empty()).then_some(value)
    }

    pub(crate) fn number(&self, column: &str) -> Result<Option<f64>, CellError> {
        match self.cell(column) {
            None | Some(Data::Empty) => Ok(None),
            Some(Data::Float(value)) => Ok(Some(*value)),
            Some(Data::Int(value)) => Ok(Some(*value as f64)),
            Some(cell) => {
                let raw = cell_text(cell);
                if raw.is_empty() {
                    return Ok(None);
                }
                raw.parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .map(Some)
                    .ok_or_else(|| self.invalid(column, raw))
            }
        }
    }

    pub(crate) fn integer(&self, column: &str) -> Result<Option<i64>, CellError> {
        let Some(value) = self.number(column)? else {
            return Ok(None);
        };
        if value.fract() != 0.0 || value.abs() > i32::MAX as f64 {
            return Err(self.invalid(column, self.text(column)));
        }
        Ok(Some(value as i64))
    }

    pub(crate) fn date(&self, column: &str) -> Result<Option<Date>, CellError> {
        let Some(cell) = self.cell(column) else {
            return Ok(None);
        };
        if let Some(date) = cell_date(cell) {
            return Ok(Some(date));
        }
        let raw = cell_text(cell);
        if raw.is_empty() {
            return Ok(None);
        }
        parse_iso_date(&raw).map(Some).ok_or_else(|| self.invalid(column, raw))
    }

    fn invalid(&self, column: &str, value: String) -> CellError {
        CellError { column: column.to_string(), value }
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join("_")
}

fn is_blank_row(cells: &[Data]) -> bool {
    cells.iter().all(|cell| cell_text(cell).is_empty())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(value) => value.trim().to_string(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) => {
            if value.fract() == 0.0 && value.abs() < 1e15 {
                format!("{}", *value as i64)
            } else {
                value.to_string()
            }
        }
        Data::Bool(value) => value.to_string(),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell_date(cell) {
            Some(date) => format_date(date),
            None => cell.to_string().trim().to_string(),
        },
        Data::DurationIso(value) => value.trim().to_string(),
    }
}

fn cell_date(cell: &Data) -> Option<Date> {
    match cell {
        Data::DateTime(value) => excel_serial_to_date(value.as_f64()),
        Data::DateTimeIso(value) => parse_iso_date(value.get(..10).unwrap_or(value.as_str())),
        _ => None,
    }
}

/// Serial of 9999-12-31, the last date a workbook can hold.
const MAX_DATE_SERIAL: f64 = 2_958_465.0;

/// Excel stores dates as days since 1899-12-30 (the epoch absorbs the 1900 leap-year bug).
fn excel_serial_to_date(serial: f64) -> Option<Date> {
    if !serial.is_finite() || !(0.0..=MAX_DATE_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = Date::from_calendar_date(1899, Month::December, 30).ok()?;
    epoch.checked_add(Duration::days(serial.floor() as i64))
}
