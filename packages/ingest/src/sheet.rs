// ABOUTME: Spreadsheet reader for the roadmap workbook
// ABOUTME: Yields rows keyed by the literal header text of the first sheet

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{Duration, NaiveDate};
use tracing::{debug, warn};

use crate::error::{IngestError, IngestResult};

/// Largest serial the 1900 date system can express (9999-12-31)
const MAX_DATE_SERIAL: f64 = 2_958_465.0;

/// A single non-empty cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Render the cell the way it would read in the sheet
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    fn from_data(cell: &Data) -> Option<Self> {
        match cell {
            Data::Empty | Data::Error(_) => None,
            Data::String(s) if s.trim().is_empty() => None,
            Data::String(s) => Some(CellValue::Text(s.clone())),
            Data::Int(n) => Some(CellValue::Number(*n as f64)),
            Data::Float(f) => Some(CellValue::Number(*f)),
            Data::Bool(b) => Some(CellValue::Text(b.to_string())),
            Data::DateTime(dt) => excel_serial_to_date(dt.as_f64()).map(CellValue::Date),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
        }
    }
}

/// One data row, keyed by column header exactly as it appears in the sheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRow {
    cells: HashMap<String, CellValue>,
}

impl SheetRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by tests and fixtures
    pub fn with(mut self, header: impl Into<String>, value: CellValue) -> Self {
        self.cells.insert(header.into(), value);
        self
    }

    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.cells.get(header)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }
}

impl FromIterator<(String, CellValue)> for SheetRow {
    fn from_iter<T: IntoIterator<Item = (String, CellValue)>>(iter: T) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

/// Read the first sheet of a workbook.
///
/// Missing or corrupt workbooks produce no rows; the dashboard keeps working
/// without a spreadsheet.
pub fn read_workbook(path: &Path) -> Vec<SheetRow> {
    match try_read_workbook(path) {
        Ok(rows) => rows,
        Err(IngestError::SourceMissing(path)) => {
            debug!("No roadmap workbook at {:?}", path);
            Vec::new()
        }
        Err(e) => {
            warn!("Failed to read roadmap workbook {:?}: {}", path, e);
            Vec::new()
        }
    }
}

/// Read the first sheet of a workbook, surfacing why it could not be read
pub fn try_read_workbook(path: &Path) -> IngestResult<Vec<SheetRow>> {
    if !path.exists() {
        return Err(IngestError::SourceMissing(path.to_path_buf()));
    }

    let mut workbook =
        open_workbook_auto(path).map_err(|e| IngestError::Workbook(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(IngestError::NoSheets)?
        .map_err(|e| IngestError::Workbook(e.to_string()))?;

    Ok(rows_from_range(&range))
}

/// Convert a decoded sheet range into header-keyed rows.
///
/// The first row supplies headers; columns with a blank header and rows with
/// no values are skipped.
pub fn rows_from_range(range: &Range<Data>) -> Vec<SheetRow> {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Vec::new();
    };

    let headers: Vec<Option<String>> = header_row
        .iter()
        .map(|cell| CellValue::from_data(cell).map(|value| value.as_text()))
        .collect();

    rows.filter_map(|row| {
        let cells: SheetRow = row
            .iter()
            .enumerate()
            .filter_map(|(idx, cell)| {
                let header = headers.get(idx)?.as_ref()?;
                let value = CellValue::from_data(cell)?;
                Some((header.clone(), value))
            })
            .collect();

        if cells.is_empty() {
            None
        } else {
            Some(cells)
        }
    })
    .collect()
}

/// Convert a spreadsheet serial day number (1900 date system) into a date.
///
/// Serial 60 is the phantom 1900-02-29, so earlier serials are shifted by one.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=MAX_DATE_SERIAL).contains(&serial) {
        return None;
    }

    let days = serial.floor() as i64;
    let epoch = if days < 61 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };

    epoch.checked_add_signed(Duration::days(days))
}
