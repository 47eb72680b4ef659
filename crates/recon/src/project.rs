//! Projection of a department sheet onto canonical fields.
//!
//! Columns are discovered by label rather than position: the composite
//! header is matched against the configured vocabulary once per file, which
//! yields a [`ColumnMap`] from canonical field to column index. Rows are then
//! read through that map and filtered by the business rules.

use std::fmt;

use crate::grid::{Cell, RawGrid};
use crate::header::CompositeHeader;
use crate::key::cell_key;

/// Field a kept column is exposed as.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Registro,
    NomeEmpregado,
    OptanteTransporte,
    UsaraTransporteHE,
    /// Any other kept column, under its composite header label
    /// (e.g. `Turno`, `LANCHE`).
    Other(String),
}

impl CanonicalField {
    pub fn name(&self) -> &str {
        match self {
            Self::Registro => "Registro",
            Self::NomeEmpregado => "NomeEmpregado",
            Self::OptanteTransporte => "OptanteTransporte",
            Self::UsaraTransporteHE => "UsaraTransporteHE",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rename rules, checked in order against the lowercased label. The first
/// rule that matches names the column.
const RENAMES: [(&str, CanonicalField); 4] = [
    ("reg.", CanonicalField::Registro),
    ("optante de transporte", CanonicalField::OptanteTransporte),
    ("usará transporte na he", CanonicalField::UsaraTransporteHE),
    ("nome empregado", CanonicalField::NomeEmpregado),
];

/// Canonical field → column index, resolved once per file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: Vec<(CanonicalField, usize)>,
}

impl ColumnMap {
    /// Select the columns whose label contains (case-insensitively) any of
    /// `desired`, and name them.
    ///
    /// A canonical name goes to the first column that earns it; later columns
    /// matching the same rule keep their own label.
    pub fn resolve<S: AsRef<str>>(labels: &[String], desired: &[S]) -> Self {
        let desired: Vec<String> = desired.iter().map(|d| d.as_ref().to_lowercase()).collect();
        let mut columns: Vec<(CanonicalField, usize)> = Vec::new();

        for (idx, label) in labels.iter().enumerate() {
            let lower = label.to_lowercase();
            if !desired.iter().any(|d| lower.contains(d.as_str())) {
                continue;
            }
            let renamed = RENAMES
                .iter()
                .find(|(needle, _)| lower.contains(needle))
                .map(|(_, field)| field.clone())
                .filter(|field| !columns.iter().any(|(f, _)| f == field));
            let field = renamed.unwrap_or_else(|| CanonicalField::Other(label.clone()));
            columns.push((field, idx));
        }

        Self { columns }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn index_of(&self, field: &CanonicalField) -> Option<usize> {
        self.columns.iter().find(|(f, _)| f == field).map(|(_, i)| *i)
    }

    pub fn contains(&self, field: &CanonicalField) -> bool {
        self.index_of(field).is_some()
    }

    pub fn fields(&self) -> impl Iterator<Item = &CanonicalField> {
        self.columns.iter().map(|(f, _)| f)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(CanonicalField, usize)> {
        self.columns.iter()
    }
}

/// One surviving data row, reduced to the kept columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    fields: Vec<(CanonicalField, Cell)>,
}

impl CanonicalRecord {
    pub fn new(fields: Vec<(CanonicalField, Cell)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, field: &CanonicalField) -> Option<&Cell> {
        self.fields.iter().find(|(f, _)| f == field).map(|(_, c)| c)
    }

    pub fn fields(&self) -> &[(CanonicalField, Cell)] {
        &self.fields
    }

    /// Normalized `Registro` key, if the field is present and non-blank.
    pub fn registro_key(&self) -> Option<String> {
        self.get(&CanonicalField::Registro).and_then(cell_key)
    }
}

/// Uppercase + trim, the form opt-in values are compared in.
fn normalize_flag(cell: &Cell) -> String {
    cell.as_text().to_uppercase().trim().to_string()
}

/// Project the rows below the header onto canonical records.
///
/// Returns `None` when no column matches the vocabulary. An empty vector is
/// a valid outcome (every row filtered out); callers decide how to report it.
pub fn project_records<S: AsRef<str>>(
    grid: &RawGrid,
    header: &CompositeHeader,
    desired: &[S],
    accepted: &[S],
) -> Option<Vec<CanonicalRecord>> {
    let map = ColumnMap::resolve(&header.labels, desired);
    if map.is_empty() {
        return None;
    }
    log::debug!(
        "kept {} columns: {}",
        map.len(),
        map.fields().map(|f| f.name()).collect::<Vec<_>>().join(", ")
    );

    let accepted: Vec<String> = accepted
        .iter()
        .map(|a| a.as_ref().to_uppercase().trim().to_string())
        .collect();
    let name_idx = map.index_of(&CanonicalField::NomeEmpregado);
    let gate_both = map.contains(&CanonicalField::OptanteTransporte)
        && map.contains(&CanonicalField::UsaraTransporteHE);

    let mut records = Vec::new();
    for row in grid.rows().iter().skip(header.data_start()) {
        if map.iter().all(|(_, idx)| row[*idx].is_blank()) {
            continue;
        }
        if let Some(idx) = name_idx {
            if row[idx].is_blank() {
                continue;
            }
        }

        let fields: Vec<(CanonicalField, Cell)> = map
            .iter()
            .map(|(field, idx)| {
                let cell = match field {
                    CanonicalField::OptanteTransporte | CanonicalField::UsaraTransporteHE => {
                        Cell::Text(normalize_flag(&row[*idx]))
                    }
                    _ => row[*idx].clone(),
                };
                (field.clone(), cell)
            })
            .collect();
        let record = CanonicalRecord::new(fields);

        if gate_both {
            let opted_in = |field: &CanonicalField| {
                record
                    .get(field)
                    .map(|c| accepted.contains(&c.as_text()))
                    .unwrap_or(false)
            };
            if !(opted_in(&CanonicalField::OptanteTransporte)
                && opted_in(&CanonicalField::UsaraTransporteHE))
            {
                continue;
            }
        }

        records.push(record);
    }

    Some(records)
}
