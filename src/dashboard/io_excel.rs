// Primitives for reading Excel files.

use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::{debug, info, warn};
use snafu::prelude::*;
use std::path::Path;

use attendance_report::builder::Builder;

use crate::dashboard::*;

/// Reads a worksheet of the given workbook (the first one if no name is given).
///
/// The first row is the header, all the following rows are returned as is.
/// A worksheet without any row gives an empty table.
pub fn read_attendance_file(path: &str, worksheet: Option<&str>) -> DashboardResult<RawTable> {
    ensure!(Path::new(path).exists(), MissingFileSnafu { path });

    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match worksheet {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { path, name })?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?,
    };

    let mut iter = wrange.rows();
    let header: Vec<Cell> = match iter.next() {
        Some(row) => row.iter().map(read_cell).collect(),
        None => {
            warn!("read_attendance_file: {}: the worksheet is empty", path);
            return Ok(RawTable::default());
        }
    };
    let labels: Vec<String> = header
        .iter()
        .map(|c| c.text().unwrap_or_default())
        .collect();
    info!("read_attendance_file: {}: columns: {:?}", path, labels);

    let mut builder = Builder::new().header_cells(header);
    for (idx, row) in iter.enumerate() {
        debug!("read_attendance_file: idx: {:?} row: {:?}", idx, row);
        builder.add_row(row.iter().map(read_cell).collect());
    }
    Ok(builder.build())
}

#[allow(unreachable_patterns)]
fn read_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::Empty => Cell::Empty,
        DataType::String(s) => Cell::Text(s.clone()),
        DataType::Float(f) => Cell::Number(*f),
        DataType::Int(i) => Cell::Number(*i as f64),
        DataType::Bool(b) => Cell::Bool(*b),
        DataType::DateTime(f) => Cell::DateTime(*f),
        DataType::Error(e) => Cell::Error(format!("{:?}", e)),
        _ => Cell::Error(format!("{:?}", cell)),
    }
}
