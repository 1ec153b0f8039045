use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("unreadable workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("workbook has no sheets")]
    NoSheets,
}

/// Reads `(name, department)` pairs from columns A and B of the first sheet.
///
/// The first row of the sheet is a header and is skipped. Cells that are
/// empty or falsy come back as empty strings so the registry skips the row.
pub fn read_assignment_rows(bytes: &[u8]) -> Result<Vec<(String, String)>, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let first_sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ImportError::NoSheets)?;
    let range = workbook.worksheet_range(&first_sheet)?;

    let (Some((first_row, _)), Some((last_row, _))) = (range.start(), range.end()) else {
        return Ok(Vec::new());
    };

    let rows = (first_row + 1..=last_row)
        .map(|row| {
            let name = range.get_value((row, 0)).and_then(cell_text);
            let code = range.get_value((row, 1)).and_then(cell_text);
            (name.unwrap_or_default(), code.unwrap_or_default())
        })
        .collect();
    Ok(rows)
}

/// Text of a cell, or `None` for empty, zero, false and error cells.
pub fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) | Data::Bool(false) => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            (!s.is_empty()).then(|| s.clone())
        }
        Data::Int(0) => None,
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if *f == 0.0 || f.is_nan() => None,
        Data::Float(f) => Some(format_number(*f)),
        Data::Bool(true) => Some("true".to_owned()),
        Data::DateTime(dt) => Some(format_number(dt.as_f64())),
    }
}

/// Integral floats print without a fractional part (`5.0` → `"5"`).
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
