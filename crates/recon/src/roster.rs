use serde::Serialize;

use crate::error::ReportError;
use crate::grid::{Cell, RawGrid};
use crate::key::cell_key;

/// Master roster columns, in file order.
pub const ROSTER_COLUMNS: [&str; 8] = [
    "Linha",
    "Turno",
    "Itinerário",
    "Registro",
    "Nome dos Passageiros",
    "Endereço",
    "Bairro",
    "Telefone",
];

/// One passenger line of the master roster.
///
/// `registro` holds the normalized key text and `itinerario` its text form;
/// the other cells are kept as read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterEntry {
    pub linha: Cell,
    pub turno: Cell,
    pub itinerario: Cell,
    pub registro: Cell,
    pub nome_dos_passageiros: Cell,
    pub endereco: Cell,
    pub bairro: Cell,
    pub telefone: Cell,
    /// Normalized `registro`; `None` for a blank cell.
    #[serde(skip)]
    pub key: Option<String>,
}

impl RosterEntry {
    /// Build from eight cells in [`ROSTER_COLUMNS`] order.
    pub fn from_cells(cells: [Cell; 8]) -> Self {
        let [linha, turno, itinerario, registro, nome_dos_passageiros, endereco, bairro, telefone] =
            cells;
        let key = cell_key(&registro);
        let registro = match &key {
            Some(key) => Cell::Text(key.clone()),
            None => registro,
        };
        let itinerario = match itinerario {
            Cell::Empty => Cell::Empty,
            other => Cell::Text(other.as_text()),
        };
        Self {
            linha,
            turno,
            itinerario,
            registro,
            nome_dos_passageiros,
            endereco,
            bairro,
            telefone,
            key,
        }
    }

    /// Shift label used for grouping.
    pub fn turno_text(&self) -> String {
        self.turno.as_text()
    }

    /// Route label used for grouping; numeric routes are coerced to text.
    pub fn itinerario_text(&self) -> String {
        self.itinerario.as_text()
    }

    /// Cells in [`ROSTER_COLUMNS`] order.
    pub fn cells(&self) -> [&Cell; 8] {
        [
            &self.linha,
            &self.turno,
            &self.itinerario,
            &self.registro,
            &self.nome_dos_passageiros,
            &self.endereco,
            &self.bairro,
            &self.telefone,
        ]
    }
}

/// Read the roster positionally. The grid must have exactly eight columns.
pub fn load_roster(grid: &RawGrid) -> Result<Vec<RosterEntry>, ReportError> {
    if grid.col_count() != ROSTER_COLUMNS.len() {
        return Err(ReportError::MasterColumnCountMismatch {
            found: grid.col_count(),
        });
    }

    Ok(grid
        .rows()
        .iter()
        .map(|row| {
            let cells: [Cell; 8] = std::array::from_fn(|i| row[i].clone());
            RosterEntry::from_cells(cells)
        })
        .collect())
}
