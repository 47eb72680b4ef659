//! Merged-cell ranges from OOXML worksheets.
//!
//! calamine exposes cell values but not the `<mergeCells>` block, so the
//! worksheet part is read straight from the archive.

use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use rostercheck_recon::MergeRegion;

/// Merge regions of the named worksheet, in document order.
///
/// A workbook whose relationships cannot be resolved yields no regions
/// rather than an error; the cell values are still usable unflattened.
pub fn read_sheet_merges(path: &Path, sheet_name: &str) -> Result<Vec<MergeRegion>, String> {
    let file = std::fs::File::open(path)
        .map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| format!("Failed to read {} as ZIP: {}", path.display(), e))?;

    let workbook_xml = read_zip_file(&mut archive, "xl/workbook.xml").unwrap_or_default();
    let rels_xml = read_zip_file(&mut archive, "xl/_rels/workbook.xml.rels").unwrap_or_default();
    let Some(worksheet_path) = resolve_worksheet_path(&workbook_xml, &rels_xml, sheet_name) else {
        log::warn!(
            "{}: worksheet '{}' not found in workbook relationships, merges ignored",
            path.display(),
            sheet_name
        );
        return Ok(Vec::new());
    };

    let xml = read_zip_file(&mut archive, &worksheet_path)?;
    Ok(parse_merge_cells(&xml))
}

/// Collect every `<mergeCell ref="A1:C3"/>` in a worksheet part.
pub fn parse_merge_cells(xml: &str) -> Vec<MergeRegion> {
    let mut regions = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if e.name().as_ref() == b"mergeCell" =>
            {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"ref" {
                        let ref_str = String::from_utf8_lossy(&attr.value);
                        if let Some(region) = parse_merge_ref(&ref_str) {
                            regions.push(region);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    regions
}

/// Parse a merge range reference like "A1:C3".
fn parse_merge_ref(r: &str) -> Option<MergeRegion> {
    let (start, end) = r.split_once(':')?;
    let (sr, sc) = parse_cell_ref(start)?;
    let (er, ec) = parse_cell_ref(end)?;
    Some(MergeRegion::new(sr.min(er), sc.min(ec), sr.max(er), sc.max(ec)))
}

/// Parse a cell reference like "B5" into (row, col) = (4, 1).
fn parse_cell_ref(r: &str) -> Option<(usize, usize)> {
    let r = r.trim_start_matches('$');
    let split = r.find(|c: char| !c.is_ascii_alphabetic())?;
    let (col_part, row_part) = r.split_at(split);
    let row_part = row_part.trim_start_matches('$');
    if col_part.is_empty() || row_part.is_empty() {
        return None;
    }

    let col = col_part.bytes().try_fold(0usize, |acc, b| {
        let digit = usize::from(b.to_ascii_uppercase() - b'A') + 1;
        acc.checked_mul(26)?.checked_add(digit)
    })?;

    let row: usize = row_part.parse().ok()?;
    if row == 0 {
        return None;
    }

    Some((row - 1, col - 1))
}

/// Read a file from a ZIP archive.
fn read_zip_file<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String, String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| format!("File '{}' not found in XLSX: {}", path, e))?;
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| format!("Failed to read '{}': {}", path, e))?;
    Ok(content)
}

/// Resolve the archive path of a worksheet from workbook.xml and its rels.
fn resolve_worksheet_path(workbook_xml: &str, rels_xml: &str, sheet_name: &str) -> Option<String> {
    let rid = find_sheet_rid(workbook_xml, sheet_name)?;

    let mut rid_to_target: HashMap<String, String> = HashMap::new();
    let mut reader = Reader::from_str(rels_xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = Some(String::from_utf8_lossy(&attr.value).to_string()),
                        b"Target" => {
                            target = Some(String::from_utf8_lossy(&attr.value).to_string());
                        }
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    rid_to_target.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    rid_to_target.get(&rid).map(|target| {
        // Targets are relative to xl/ unless absolute within the package.
        match target.strip_prefix('/') {
            Some(absolute) => absolute.to_string(),
            None => format!("xl/{}", target),
        }
    })
}

fn find_sheet_rid(workbook_xml: &str, sheet_name: &str) -> Option<String> {
    let mut reader = Reader::from_str(workbook_xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"sheet" =>
            {
                let mut name = None;
                let mut rid = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"name" => {
                            name = Some(unescape_xml(&String::from_utf8_lossy(&attr.value)));
                        }
                        b"r:id" => {
                            rid = Some(String::from_utf8_lossy(&attr.value).to_string());
                        }
                        _ => {}
                    }
                }
                if name.as_deref() == Some(sheet_name) {
                    return rid;
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    None
}

/// Undo the five predefined XML entities (raw attribute values keep them escaped).
fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1"), Some((0, 0)));
        assert_eq!(parse_cell_ref("B5"), Some((4, 1)));
        assert_eq!(parse_cell_ref("AA10"), Some((9, 26)));
        assert_eq!(parse_cell_ref("$C$3"), Some((2, 2)));
        assert_eq!(parse_cell_ref("A0"), None);
        assert_eq!(parse_cell_ref("12"), None);
        assert_eq!(parse_cell_ref("B"), None);
        assert_eq!(parse_cell_ref("XFD1"), Some((0, 16383)));
    }

    #[test]
    fn test_overlong_column_is_rejected() {
        let letters = "Z".repeat(40);
        assert_eq!(parse_cell_ref(&format!("{letters}1")), None);
        assert_eq!(parse_merge_ref(&format!("A1:{letters}2")), None);
        let xml = format!(r#"<worksheet><mergeCells><mergeCell ref="A1:{letters}2"/><mergeCell ref="B2:C3"/></mergeCells></worksheet>"#);
        assert_eq!(parse_merge_cells(&xml), vec![MergeRegion::new(1, 1, 2, 2)]);
    }

    #[test]
    fn test_parse_merge_cells() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="1"><c r="A1" t="s"><v>0</v></c></row>
  </sheetData>
  <mergeCells count="3">
    <mergeCell ref="A1:I1"/>
    <mergeCell ref="E2:F2"/>
    <mergeCell ref="bogus"/>
  </mergeCells>
</worksheet>"#;

        let regions = parse_merge_cells(xml);
        assert_eq!(
            regions,
            vec![MergeRegion::new(0, 0, 0, 8), MergeRegion::new(1, 4, 1, 5)]
        );
    }

    #[test]
    fn test_resolve_worksheet_path() {
        let workbook = r#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>
    <sheet name="Capa" sheetId="1" r:id="rId2"/>
    <sheet name="P&amp;D" sheetId="2" r:id="rId1"/>
  </sheets>
</workbook>"#;
        let rels = r#"<Relationships>
  <Relationship Id="rId1" Type="worksheet" Target="worksheets/sheet2.xml"/>
  <Relationship Id="rId2" Type="worksheet" Target="/xl/worksheets/sheet1.xml"/>
</Relationships>"#;

        assert_eq!(
            resolve_worksheet_path(workbook, rels, "Capa").as_deref(),
            Some("xl/worksheets/sheet1.xml")
        );
        assert_eq!(
            resolve_worksheet_path(workbook, rels, "P&D").as_deref(),
            Some("xl/worksheets/sheet2.xml")
        );
        assert_eq!(resolve_worksheet_path(workbook, rels, "Outra"), None);
    }
}
