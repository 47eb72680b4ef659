// Spreadsheet I/O: grids and merge regions in, flattened grids and styled reports out

pub mod csv;
pub mod report;
pub mod xlsx;
mod xlsx_merges;

use std::path::Path;

use rostercheck_recon::{MergeRegion, RawGrid};

pub use report::{write_report, ReportWriteResult};
pub use xlsx::write_grid;

/// The first worksheet of a file, as the reconciliation core consumes it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetData {
    pub grid: RawGrid,
    pub merges: Vec<MergeRegion>,
}

/// Extensions `read_sheet` accepts.
pub const SUPPORTED_EXTENSIONS: [&str; 8] = ["xlsx", "xlsm", "xls", "xlsb", "ods", "csv", "tsv", "txt"];

/// Read the first worksheet of a spreadsheet file, dispatching on extension.
pub fn read_sheet(path: &Path) -> Result<SheetData, String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => xlsx::import(path),
        "csv" | "txt" => Ok(SheetData {
            grid: csv::import(path)?,
            merges: Vec::new(),
        }),
        "tsv" => Ok(SheetData {
            grid: csv::import_tsv(path)?,
            merges: Vec::new(),
        }),
        _ => Err(format!(
            "{}: unsupported file type (expected one of {})",
            path.display(),
            SUPPORTED_EXTENSIONS.join(", ")
        )),
    }
}
