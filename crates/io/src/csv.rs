// CSV/TSV import

use std::cmp::Reverse;
use std::io::Read;
use std::path::Path;

use rostercheck_recon::{Cell, RawGrid};

pub fn import(path: &Path) -> Result<RawGrid, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter)
}

pub fn import_tsv(path: &Path) -> Result<RawGrid, String> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, b'\t')
}

/// Delimiters tried in order of preference on a tie.
///
/// Spreadsheets saved with a pt-BR locale export `;`-separated files, so comma is not assumed.
const DELIMITERS: [u8; 4] = [b'\t', b';', b',', b'|'];

/// Records sampled when sniffing.
const SNIFF_RECORDS: usize = 10;

/// Pick the delimiter that splits the leading records into the widest
/// consistent table. Falls back to comma when nothing splits.
fn sniff_delimiter(content: &str) -> u8 {
    DELIMITERS
        .iter()
        .enumerate()
        .filter_map(|(rank, &delim)| {
            let widths = record_widths(content, delim);
            let first = *widths.first()?;
            if first < 2 {
                return None;
            }
            let agreeing = widths.iter().filter(|&&w| w == first).count();
            Some(((agreeing * first, Reverse(rank)), delim))
        })
        .max_by_key(|(score, _)| *score)
        .map_or(b',', |(_, delim)| delim)
}

/// Field counts of the first records when split on `delim`.
fn record_widths(content: &str, delim: u8) -> Vec<usize> {
    csv::ReaderBuilder::new()
        .delimiter(delim)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes())
        .records()
        .take(SNIFF_RECORDS)
        .map(|record| record.map_or(1, |r| r.len()))
        .collect()
}

/// Read file and convert to UTF-8, falling back to Windows-1252 for Excel-exported files.
fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            log::debug!("{}: not UTF-8, decoded as Windows-1252", path.display());
            Ok(decoded.into_owned())
        }
    }
}

fn import_from_string(content: &str, delimiter: u8) -> Result<RawGrid, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        // Keep fields as text: "0101" must survive for key normalization.
        rows.push(record.iter().map(Cell::from).collect());
    }

    Ok(RawGrid::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_semicolon() {
        let content = "Reg.;Nome empregado\n0101;Ana\n0202;Bruno\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_defaults_to_comma() {
        assert_eq!(sniff_delimiter(""), b',');
        assert_eq!(sniff_delimiter("single\ncolumn\n"), b',');
    }

    #[test]
    fn test_sniff_prefers_consistent_split() {
        // Commas inside the names would win on width alone.
        let content = "Reg.;Nome\n1;Souza, Ana, M.\n2;Lima, Bruno\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_ignores_delimiters_in_quoted_line_breaks() {
        let content = "Reg.,Obs\n1,\"linha um;\nlinha dois\"\n2,ok\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let grid = import_from_string("a,b,c\n1\n", b',').unwrap();
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.col_count(), 3);
        assert_eq!(grid.get(1, 0), Some(&Cell::Text("1".into())));
        assert_eq!(grid.get(1, 2), Some(&Cell::Empty));
    }

    #[test]
    fn test_leading_zeros_kept_as_text() {
        let grid = import_from_string("0042,Ana\n", b',').unwrap();
        assert_eq!(grid.get(0, 0), Some(&Cell::Text("0042".into())));
    }

    #[test]
    fn test_windows_1252_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        // "Usará" with 0xE1 for á
        std::fs::write(&path, b"Reg.;Usar\xe1 transporte na HE\n1;SIM\n").unwrap();
        let grid = import(&path).unwrap();
        assert_eq!(grid.get(0, 1), Some(&Cell::Text("Usará transporte na HE".into())));
    }
}
