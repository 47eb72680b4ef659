//! Styled xlsx rendering of a report block sequence.
//!
//! Row 1 carries the global column header. Each block then maps to sheet
//! rows in order: shift separators are orange bars with the label under the
//! `Turno` column, route headers repeat the global header styling, data
//! rows are centred with thin borders and blank rows are left untouched.

use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use rostercheck_recon::{ReportBlock, ROSTER_COLUMNS};

use crate::xlsx::{check_bounds, write_cell};

/// Header columns filled yellow; every other header column is light blue.
const KEY_COLUMNS: [&str; 4] = ["Linha", "Turno", "Itinerário", "Registro"];

const YELLOW: u32 = 0xFFFF00;
const LIGHT_BLUE: u32 = 0xADD8E6;
const ORANGE: u32 = 0xFFA500;

/// Column that carries the shift label on separator rows.
const SHIFT_LABEL_COLUMN: u16 = 1;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReportWriteResult {
    /// Sheet rows including the global header and trailing blank rows.
    pub rows: usize,
    pub data_rows: usize,
    pub shifts: usize,
    pub routes: usize,
}

struct ReportFormats {
    key_header: Format,
    other_header: Format,
    shift: Format,
    data: Format,
}

impl ReportFormats {
    fn new() -> Self {
        let bordered = Format::new()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_border_color(Color::Black);
        let header = bordered.clone().set_bold();

        Self {
            key_header: header.clone().set_background_color(Color::RGB(YELLOW)),
            other_header: header.clone().set_background_color(Color::RGB(LIGHT_BLUE)),
            shift: header.set_background_color(Color::RGB(ORANGE)),
            data: bordered,
        }
    }

    fn header_for(&self, column: &str) -> &Format {
        if KEY_COLUMNS.contains(&column) {
            &self.key_header
        } else {
            &self.other_header
        }
    }
}

/// Render `blocks` to a new workbook at `path` with one sheet named `sheet_name`.
pub fn write_report(
    path: &Path,
    blocks: &[ReportBlock],
    sheet_name: &str,
) -> Result<ReportWriteResult, String> {
    let total_rows = 1 + blocks.iter().map(ReportBlock::row_span).sum::<usize>();
    check_bounds(total_rows, ROSTER_COLUMNS.len())?;

    let mut workbook = Workbook::new();
    let worksheet = workbook
        .add_worksheet()
        .set_name(sheet_name)
        .map_err(|e| format!("Failed to create sheet '{}': {}", sheet_name, e))?;

    let formats = ReportFormats::new();
    let result = render_blocks(worksheet, blocks, &formats)
        .map_err(|e| format!("Failed to write report rows: {}", e))?;

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save {}: {}", path.display(), e))?;

    log::info!(
        "wrote {} ({} rows, {} passengers)",
        path.display(),
        result.rows,
        result.data_rows
    );
    Ok(result)
}

fn render_blocks(
    worksheet: &mut Worksheet,
    blocks: &[ReportBlock],
    formats: &ReportFormats,
) -> Result<ReportWriteResult, rust_xlsxwriter::XlsxError> {
    let mut result = ReportWriteResult::default();

    write_header(worksheet, 0, &ROSTER_COLUMNS, formats)?;
    let mut row: u32 = 1;

    for block in blocks {
        match block {
            ReportBlock::ShiftSeparator { label } => {
                for col in 0..ROSTER_COLUMNS.len() as u16 {
                    if col == SHIFT_LABEL_COLUMN {
                        worksheet.write_string_with_format(row, col, label, &formats.shift)?;
                    } else {
                        worksheet.write_blank(row, col, &formats.shift)?;
                    }
                }
                result.shifts += 1;
            }
            ReportBlock::BlankRow { .. } => {}
            ReportBlock::HeaderRow { columns } => {
                write_header(worksheet, row, columns, formats)?;
                result.routes += 1;
            }
            ReportBlock::DataRows { entries } => {
                for (offset, entry) in entries.iter().enumerate() {
                    let data_row = row + offset as u32;
                    for (col, cell) in entry.cells().into_iter().enumerate() {
                        write_cell(worksheet, data_row, col as u16, cell, &formats.data)?;
                    }
                }
                result.data_rows += entries.len();
            }
        }
        row += block.row_span() as u32;
    }

    result.rows = row as usize;
    Ok(result)
}

fn write_header<S: AsRef<str>>(
    worksheet: &mut Worksheet,
    row: u32,
    columns: &[S],
    formats: &ReportFormats,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    for (col, name) in columns.iter().enumerate() {
        let name = name.as_ref();
        worksheet.write_string_with_format(row, col as u16, name, formats.header_for(name))?;
    }
    Ok(())
}
