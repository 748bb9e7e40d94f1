pub use crate::config::*;

/// A builder for assembling a raw worksheet, row by row.
///
/// The readers use it to hand over the content of a file. All the rows
/// are padded with empty cells to the width of the widest row.
///
/// ```
/// use attendance_report::builder::Builder;
/// use attendance_report::Cell;
///
/// let mut builder = Builder::new().header(&["Mes", "Data", "Ministro"]);
/// builder.add_row(vec![Cell::Empty, Cell::Text("2023-03-05".to_string())]);
///
/// let raw = builder.build();
/// assert_eq!(raw.num_columns(), 3);
/// assert_eq!(raw.rows[0].len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    pub(crate) _header: Vec<Cell>,
    pub(crate) _rows: Vec<Vec<Cell>>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    /// Sets the header from plain labels.
    pub fn header(self, labels: &[&str]) -> Builder {
        self.header_cells(labels.iter().map(|s| Cell::Text(s.to_string())).collect())
    }

    pub fn header_cells(self, cells: Vec<Cell>) -> Builder {
        Builder {
            _header: cells,
            _rows: self._rows,
        }
    }

    pub fn add_row(&mut self, cells: Vec<Cell>) {
        self._rows.push(cells);
    }

    pub fn build(self) -> RawTable {
        let width = self
            ._rows
            .iter()
            .map(|r| r.len())
            .chain(std::iter::once(self._header.len()))
            .max()
            .unwrap_or(0);
        let pad = |mut cells: Vec<Cell>| {
            cells.resize(width, Cell::Empty);
            cells
        };
        RawTable {
            header: pad(self._header),
            rows: self._rows.into_iter().map(pad).collect(),
        }
    }
}
