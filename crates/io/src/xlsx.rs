// Excel/ODS import via calamine, plain grid export via rust_xlsxwriter

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use rostercheck_recon::{Cell, RawGrid};

use crate::xlsx_merges;
use crate::SheetData;

/// Largest row/column index rust_xlsxwriter accepts.
const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;

/// Read the first worksheet of an xlsx/xlsm/xls/xlsb/ods workbook.
///
/// Grid coordinates are absolute from A1 so merge references line up with
/// cell positions. Merge regions are recovered for xlsx/xlsm only.
pub fn import(path: &Path) -> Result<SheetData, String> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let Some(sheet_name) = sheet_names.first() else {
        return Err(format!("{} contains no worksheets", path.display()));
    };

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

    // Range start offset (data may not begin at A1)
    let (data_start_row, data_start_col) = range.start().unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); data_start_row as usize];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; data_start_col as usize];
        cells.extend(row.iter().map(data_to_cell));
        rows.push(cells);
    }
    let grid = RawGrid::new(rows);

    let merges = if is_ooxml(path) {
        xlsx_merges::read_sheet_merges(path, sheet_name)?
    } else {
        Vec::new()
    };

    log::debug!(
        "{}: sheet '{}' {}x{}, {} merge regions",
        path.display(),
        sheet_name,
        grid.row_count(),
        grid.col_count(),
        merges.len()
    );

    Ok(SheetData { grid, merges })
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from(s.as_str()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::Error(e) => Cell::Text(format!("#{:?}", e)),
        // Serial number; the report never reads dates, only keys and labels.
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) => Cell::Text(s.clone()),
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

fn is_ooxml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "xlsx" | "xlsm"))
        .unwrap_or(false)
}

/// Write a grid to a single-sheet xlsx with no formatting.
pub fn write_grid(path: &Path, grid: &RawGrid) -> Result<(), String> {
    check_bounds(grid.row_count(), grid.col_count())?;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let plain = Format::new();

    for (row_idx, row) in grid.rows().iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            if cell.is_blank() {
                continue;
            }
            write_cell(worksheet, row_idx as u32, col_idx as u16, cell, &plain)
                .map_err(|e| format!("Failed to write cell ({}, {}): {}", row_idx, col_idx, e))?;
        }
    }

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save {}: {}", path.display(), e))
}

pub(crate) fn check_bounds(rows: usize, cols: usize) -> Result<(), String> {
    if rows > MAX_ROWS || cols > MAX_COLS {
        return Err(format!(
            "{} rows x {} columns exceeds the xlsx limit of {} x {}",
            rows, cols, MAX_ROWS, MAX_COLS
        ));
    }
    Ok(())
}

/// Write one cell with its native type; blank cells still receive the format.
pub(crate) fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    format: &Format,
) -> Result<(), XlsxError> {
    match cell {
        Cell::Empty => worksheet.write_blank(row, col, format)?,
        Cell::Text(s) => worksheet.write_string_with_format(row, col, s, format)?,
        Cell::Number(n) => worksheet.write_number_with_format(row, col, *n, format)?,
        Cell::Bool(b) => worksheet.write_boolean_with_format(row, col, *b, format)?,
    };
    Ok(())
}
