mod config;
use log::{debug, info, warn};

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

pub use crate::config::*;
pub use crate::labels::Language;

pub mod builder;
pub mod charts;
pub mod labels;

use crate::charts::Figure;

/// The canonical months of the scaffold.
pub const MONTHS: [u32; 12] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];

static EMPTY_CELL: Cell = Cell::Empty;

/// Day zero of the Excel 1900 date system.
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

// **** Normalization ****

/// Turns a raw worksheet into a table of services.
///
/// The columns are mapped by position following `COLUMN_MAPPING`. Rows that do
/// not have all the `REQUIRED_COLUMNS` filled are dropped. Year and month are
/// derived from the date; a date that cannot be understood leaves both empty.
///
/// Fails if no row has the required columns, or if the worksheet does not have
/// exactly the declared number of columns (trailing blank columns are ignored).
pub fn normalize(raw: &RawTable) -> Result<Table, SchemaError> {
    let raw = trim_trailing_empty_columns(raw);
    let required: Vec<usize> = REQUIRED_COLUMNS.iter().map(|c| c.position()).collect();

    let has_required = raw.num_columns() > required.iter().cloned().max().unwrap_or(0)
        && raw.rows.iter().any(|row| is_valid_row(row, &required));
    if !has_required {
        return Err(SchemaError::MissingColumns {
            missing: REQUIRED_COLUMNS.iter().map(|c| c.name()).collect(),
        });
    }

    if raw.num_columns() != COLUMN_MAPPING.len() {
        return Err(SchemaError::SchemaMismatch {
            expected: COLUMN_MAPPING.len(),
            found: raw.num_columns(),
        });
    }

    let mismatches = positional_mismatches(&raw.header);
    if !mismatches.is_empty() {
        warn!(
            "normalize: header does not match the expected labels, using positional mapping: {}",
            mismatches.join(", ")
        );
    }

    let records: Vec<Record> = raw
        .rows
        .iter()
        .filter(|row| is_valid_row(row, &required))
        .map(|row| read_record(row))
        .collect();

    info!(
        "normalize: kept {} services out of {} rows",
        records.len(),
        raw.rows.len()
    );
    Ok(Table { records })
}

fn is_valid_row(row: &[Cell], required: &[usize]) -> bool {
    required
        .iter()
        .all(|idx| row.get(*idx).map(|c| !c.is_null()).unwrap_or(false))
}

/// Drops the columns at the end of the worksheet that hold no value at all.
fn trim_trailing_empty_columns(raw: &RawTable) -> RawTable {
    let mut width = raw.num_columns();
    while width > 0 {
        let idx = width - 1;
        let header_null = raw.header.get(idx).map(|c| c.is_null()).unwrap_or(true);
        let all_null = raw
            .rows
            .iter()
            .all(|row| row.get(idx).map(|c| c.is_null()).unwrap_or(true));
        if !(header_null && all_null) {
            break;
        }
        width -= 1;
    }
    let cut = |cells: &Vec<Cell>| cells.iter().take(width).cloned().collect::<Vec<Cell>>();
    RawTable {
        header: cut(&raw.header),
        rows: raw.rows.iter().map(cut).collect(),
    }
}

/// Lists the header labels that differ from the declared ones, as `"label" -> Column`.
///
/// The header labels are never used to find the columns, only to report unexpected layouts.
pub fn positional_mismatches(header: &[Cell]) -> Vec<String> {
    COLUMN_MAPPING
        .iter()
        .zip(header.iter())
        .filter_map(|(spec, cell)| {
            let label = cell.text().unwrap_or_default();
            if label == spec.source_label || label == spec.column.name() {
                None
            } else {
                Some(format!("{:?} -> {}", label, spec.column.name()))
            }
        })
        .collect()
}

fn read_record(row: &[Cell]) -> Record {
    let cell = |c: Column| row.get(c.position()).unwrap_or(&EMPTY_CELL);
    let date = parse_date(cell(Column::Date));
    if date.is_none() {
        debug!("read_record: could not read date {:?}", cell(Column::Date));
    }
    Record {
        month: date.map(|d| d.month()),
        date,
        minister: cell(Column::Minister).text(),
        leader: cell(Column::Leader).text(),
        people_count: parse_count(cell(Column::PeopleCount)),
        visitor_count: parse_count(cell(Column::VisitorCount)),
        children_count: parse_count(cell(Column::ChildrenCount)),
        conversion_count: parse_count(cell(Column::ConversionCount)),
        holy_spirit_baptism_count: parse_count(cell(Column::HolySpiritBaptismCount)),
        motorcycle_count: parse_count(cell(Column::MotorcycleCount)),
        car_count: parse_count(cell(Column::CarCount)),
        year: date.map(|d| d.year()),
    }
}

/// Reads a calendar date out of a cell.
///
/// Excel dates and text in the `YYYY-MM-DD` (optionally followed by a time),
/// `MM/DD/YYYY` or `DD/MM/YYYY` formats are understood. Anything else is `None`.
pub fn parse_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::DateTime(serial) => excel_serial_to_date(*serial),
        Cell::Text(s) => parse_date_text(s.trim()),
        _ => None,
    }
}

fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let (y, m, d) = EXCEL_EPOCH;
    NaiveDate::from_ymd_opt(y, m, d)?.checked_add_days(Days::new(serial.floor() as u64))
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    let day = s.split([' ', 'T']).next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .ok()
}

/// Reads a non-negative whole number out of a cell.
pub fn parse_count(cell: &Cell) -> Option<u64> {
    let value = match cell {
        Cell::Number(f) => *f,
        Cell::Text(s) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<u64>() {
                return Some(n);
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
        Some(value as u64)
    } else {
        None
    }
}

// **** Aggregation ****

fn add_counts(acc: Option<u64>, value: Option<u64>) -> Option<u64> {
    match (acc, value) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(0).saturating_add(b.unwrap_or(0))),
    }
}

impl MonthlyRow {
    fn empty(month: u32) -> MonthlyRow {
        MonthlyRow {
            month,
            services: 0,
            people_count: None,
            visitor_count: None,
            children_count: None,
            conversion_count: None,
            holy_spirit_baptism_count: None,
            motorcycle_count: None,
            car_count: None,
        }
    }

    fn absorb(&mut self, record: &Record) {
        self.services += 1;
        self.people_count = add_counts(self.people_count, record.people_count);
        self.visitor_count = add_counts(self.visitor_count, record.visitor_count);
        self.children_count = add_counts(self.children_count, record.children_count);
        self.conversion_count = add_counts(self.conversion_count, record.conversion_count);
        self.holy_spirit_baptism_count = add_counts(
            self.holy_spirit_baptism_count,
            record.holy_spirit_baptism_count,
        );
        self.motorcycle_count = add_counts(self.motorcycle_count, record.motorcycle_count);
        self.car_count = add_counts(self.car_count, record.car_count);
    }
}

/// Left-joins the services of the given year onto the twelve months.
///
/// The result always has one row per month, in calendar order. Months without
/// any service have empty metrics.
pub fn scaffold_join(table: &Table, year: i32) -> Vec<MonthlyRow> {
    let mut rows: Vec<MonthlyRow> = MONTHS.iter().map(|m| MonthlyRow::empty(*m)).collect();
    for record in table.records.iter().filter(|r| r.year == Some(year)) {
        let slot = record
            .month
            .and_then(|m| rows.iter_mut().find(|row| row.month == m));
        if let Some(row) = slot {
            row.absorb(record);
        }
    }
    rows
}

/// The people and visitor counts are needed by every chart: missing values become zero.
pub fn fill_missing_counts(rows: &mut [MonthlyRow]) {
    for row in rows.iter_mut() {
        row.people_count.get_or_insert(0);
        row.visitor_count.get_or_insert(0);
    }
}

/// Mean over all the months of the scaffold, including the months without any service.
pub fn coverage_average(rows: &[MonthlyRow], metric: impl Fn(&MonthlyRow) -> Option<u64>) -> f64 {
    let total: f64 = rows.iter().map(|r| metric(r).unwrap_or(0) as f64).sum();
    total / MONTHS.len() as f64
}

// **** Update ****

/// Everything the dashboard shows after a year has been selected.
#[derive(Serialize, PartialEq, Debug, Clone)]
pub struct DashboardUpdate {
    pub attendance: Figure,
    pub average_people: Figure,
    pub average_visitors: Figure,
    /// Empty when the charts could be computed.
    pub message: String,
}

/// Computes the three charts of the dashboard for the selected year.
///
/// Without a selected year or without data, the charts are empty
/// placeholders and the message explains why.
pub fn update_dashboard(
    table: &Table,
    selected_year: Option<i32>,
    language: Language,
) -> DashboardUpdate {
    let year = match selected_year {
        Some(y) if !table.is_empty() => y,
        _ => {
            debug!(
                "update_dashboard: nothing to show (year: {:?}, {} services)",
                selected_year,
                table.len()
            );
            return DashboardUpdate {
                attendance: Figure::empty(),
                average_people: Figure::empty(),
                average_visitors: Figure::empty(),
                message: language.no_data_message().to_string(),
            };
        }
    };

    let mut rows = scaffold_join(table, year);
    fill_missing_counts(&mut rows);
    debug!("update_dashboard: year {}: monthly rows {:?}", year, rows);

    let average_people = coverage_average(&rows, |r| r.people_count);
    let average_visitors = coverage_average(&rows, |r| r.visitor_count);
    info!(
        "update_dashboard: year {}: average people {:.2}, average visitors {:.2}",
        year, average_people, average_visitors
    );

    DashboardUpdate {
        attendance: charts::attendance_chart(&rows, year, language),
        average_people: charts::average_people_chart(average_people, year, language),
        average_visitors: charts::average_visitors_chart(average_visitors, year, language),
        message: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::builder::Builder;
    use super::charts::Trace;
    use super::*;

    const HEADER: [&str; 11] = [
        "Mes",
        "Data",
        "Ministro",
        "Dirigente",
        "Qtd_Pessoas",
        "Qtd_Visitantes",
        "Qtd_Criancas",
        "Qtd_Conversoes",
        "Qtd_Batismo_Esp_Santo",
        "Qtd_Motos",
        "Qtd_Carros",
    ];

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn service(date: Cell, people: Cell, visitors: Cell) -> Vec<Cell> {
        vec![
            Cell::Empty,
            date,
            text("Pr. Joao"),
            text("Irmao Pedro"),
            people,
            visitors,
            Cell::Number(3.0),
            Cell::Number(1.0),
            Cell::Empty,
            Cell::Number(4.0),
            Cell::Number(7.0),
        ]
    }

    fn single_march_table() -> Table {
        let mut builder = Builder::new().header(&HEADER);
        builder.add_row(service(
            text("2023-03-12"),
            Cell::Number(50.0),
            Cell::Number(5.0),
        ));
        normalize(&builder.build()).unwrap()
    }

    fn people_series(update: &DashboardUpdate) -> Vec<u64> {
        match &update.attendance.data[0] {
            Trace::Scatter(s) => s.y.clone(),
            x => panic!("unexpected trace {:?}", x),
        }
    }

    fn bar_value(fig: &Figure) -> f64 {
        match &fig.data[0] {
            Trace::Bar(b) => b.y[0],
            x => panic!("unexpected trace {:?}", x),
        }
    }

    #[test]
    fn normalize_maps_columns_by_position() {
        init_logger();
        let mut builder = Builder::new().header(&HEADER);
        builder.add_row(service(
            Cell::DateTime(45000.0),
            Cell::Number(80.0),
            text("12"),
        ));
        let table = normalize(&builder.build()).unwrap();
        assert_eq!(table.len(), 1);
        let r = &table.records[0];
        // 45000 is 2023-03-15 in the Excel date system.
        assert_eq!(r.date, NaiveDate::from_ymd_opt(2023, 3, 15));
        assert_eq!(r.year, Some(2023));
        assert_eq!(r.month, Some(3));
        assert_eq!(r.minister, Some("Pr. Joao".to_string()));
        assert_eq!(r.leader, Some("Irmao Pedro".to_string()));
        assert_eq!(r.people_count, Some(80));
        assert_eq!(r.visitor_count, Some(12));
        assert_eq!(r.children_count, Some(3));
        assert_eq!(r.holy_spirit_baptism_count, None);
        assert_eq!(r.car_count, Some(7));
    }

    #[test]
    fn normalize_drops_rows_without_required_columns() {
        init_logger();
        let mut builder = Builder::new().header(&HEADER);
        builder.add_row(service(text("2023-01-08"), Cell::Number(40.0), Cell::Empty));
        // Repeated header inside the sheet.
        builder.add_row(HEADER.iter().map(|s| text(s)).collect());
        builder.add_row(service(Cell::Empty, Cell::Number(40.0), Cell::Empty));
        builder.add_row(service(text("2023-01-15"), Cell::Empty, Cell::Empty));
        builder.add_row(service(text("  "), Cell::Number(40.0), Cell::Empty));
        let raw = builder.build();
        let table = normalize(&raw).unwrap();

        assert!(table.len() <= raw.rows.len());
        assert_eq!(table.len(), 2);
        // The repeated header has both required cells filled, but no usable date.
        assert_eq!(table.records[1].date, None);
        assert_eq!(table.records[1].year, None);
        assert_eq!(table.records[1].month, None);
    }

    #[test]
    fn normalize_overwrites_month_with_date_month() {
        let mut builder = Builder::new().header(&HEADER);
        let mut row = service(text("2024-07-21"), Cell::Number(10.0), Cell::Empty);
        row[0] = Cell::Number(1.0);
        builder.add_row(row);
        let table = normalize(&builder.build()).unwrap();
        assert_eq!(table.records[0].month, Some(7));
        assert_eq!(table.records[0].year, Some(2024));
    }

    #[test]
    fn normalize_requires_columns() {
        init_logger();
        assert_eq!(
            normalize(&RawTable::default()),
            Err(SchemaError::MissingColumns {
                missing: vec!["Date", "PeopleCount"]
            })
        );

        let mut builder = Builder::new().header(&["Mes", "Data", "Ministro"]);
        builder.add_row(vec![Cell::Empty, text("2023-01-01"), text("x")]);
        assert!(matches!(
            normalize(&builder.build()),
            Err(SchemaError::MissingColumns { .. })
        ));

        // Columns are there, but never filled together.
        let mut builder = Builder::new().header(&HEADER);
        builder.add_row(service(Cell::Empty, Cell::Number(3.0), Cell::Empty));
        assert!(matches!(
            normalize(&builder.build()),
            Err(SchemaError::MissingColumns { .. })
        ));
    }

    #[test]
    fn normalize_checks_column_count() {
        init_logger();
        let mut builder = Builder::new().header(&HEADER[..6]);
        builder.add_row(service(text("2023-01-01"), Cell::Number(3.0), Cell::Empty)[..6].to_vec());
        assert_eq!(
            normalize(&builder.build()),
            Err(SchemaError::SchemaMismatch {
                expected: 11,
                found: 6
            })
        );

        let mut builder = Builder::new().header(&HEADER);
        let mut row = service(text("2023-01-01"), Cell::Number(3.0), Cell::Empty);
        row.push(text("extra"));
        builder.add_row(row);
        assert_eq!(
            normalize(&builder.build()),
            Err(SchemaError::SchemaMismatch {
                expected: 11,
                found: 12
            })
        );
    }

    #[test]
    fn normalize_ignores_trailing_blank_columns() {
        let mut labels = HEADER.to_vec();
        labels.push("");
        let mut builder = Builder::new().header(&labels);
        let mut row = service(text("2023-01-01"), Cell::Number(3.0), Cell::Empty);
        row.push(Cell::Empty);
        row.push(Cell::Empty);
        builder.add_row(row);
        let table = normalize(&builder.build()).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn normalize_accepts_any_header_text() {
        init_logger();
        let header: Vec<Cell> = (0..11)
            .map(|i| match i {
                1 | 4 => Cell::Empty,
                _ => text(&format!("Unnamed: {}", i)),
            })
            .collect();
        let mut builder = Builder::new().header_cells(header);
        builder.add_row(service(text("2022-11-06"), Cell::Number(33.0), Cell::Empty));
        let table = normalize(&builder.build()).unwrap();
        assert_eq!(table.records[0].people_count, Some(33));
        assert_eq!(table.records[0].year, Some(2022));
    }

    #[test]
    fn parse_date_formats() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day);
        assert_eq!(parse_date(&text("2023-03-05")), d(2023, 3, 5));
        assert_eq!(parse_date(&text("2023-03-05 00:00:00")), d(2023, 3, 5));
        assert_eq!(parse_date(&text("2023-03-05T10:30:00")), d(2023, 3, 5));
        assert_eq!(parse_date(&text("2023-3-5")), d(2023, 3, 5));
        assert_eq!(parse_date(&text("2023-3-5 18:00")), d(2023, 3, 5));
        assert_eq!(parse_date(&text("03/05/2023")), d(2023, 3, 5));
        assert_eq!(parse_date(&text("25/12/2023")), d(2023, 12, 25));
        assert_eq!(parse_date(&Cell::DateTime(44927.5)), d(2023, 1, 1));
        assert_eq!(parse_date(&text("domingo")), None);
        assert_eq!(parse_date(&text("2023-13-01")), None);
        assert_eq!(parse_date(&Cell::Number(44927.0)), None);
        assert_eq!(parse_date(&Cell::DateTime(-1.0)), None);
        assert_eq!(parse_date(&Cell::Empty), None);
    }

    #[test]
    fn header_mismatches_are_listed() {
        let expected: Vec<Cell> = HEADER.iter().map(|s| text(s)).collect();
        assert!(positional_mismatches(&expected).is_empty());

        let semantic: Vec<Cell> = COLUMN_MAPPING
            .iter()
            .map(|c| text(c.column.name()))
            .collect();
        assert!(positional_mismatches(&semantic).is_empty());

        let mut header = expected.clone();
        header[1] = text("Unnamed: 1");
        header[4] = Cell::Empty;
        assert_eq!(
            positional_mismatches(&header),
            vec![
                "\"Unnamed: 1\" -> Date".to_string(),
                "\"\" -> PeopleCount".to_string()
            ]
        );
    }

    #[test]
    fn parse_count_values() {
        assert_eq!(parse_count(&Cell::Number(12.0)), Some(12));
        assert_eq!(parse_count(&text(" 7 ")), Some(7));
        assert_eq!(parse_count(&text("7.0")), Some(7));
        assert_eq!(parse_count(&Cell::Number(-1.0)), None);
        assert_eq!(parse_count(&Cell::Number(2.5)), None);
        assert_eq!(parse_count(&Cell::Number(f64::NAN)), None);
        assert_eq!(parse_count(&text("many")), None);
        assert_eq!(parse_count(&Cell::Bool(true)), None);
    }

    #[test]
    fn scaffold_has_twelve_months_in_order() {
        let table = single_march_table();
        for year in [2021, 2023, 2030] {
            let rows = scaffold_join(&table, year);
            assert_eq!(rows.len(), 12);
            let months: Vec<u32> = rows.iter().map(|r| r.month).collect();
            assert_eq!(months, MONTHS.to_vec());
        }
        let rows = scaffold_join(&table, 2023);
        assert_eq!(rows[2].people_count, Some(50));
        assert_eq!(rows[2].services, 1);
        assert_eq!(rows[0].people_count, None);
        assert_eq!(rows[0].services, 0);
    }

    #[test]
    fn scaffold_sums_services_of_the_same_month() {
        let mut builder = Builder::new().header(&HEADER);
        builder.add_row(service(text("2023-05-07"), Cell::Number(30.0), Cell::Number(2.0)));
        builder.add_row(service(text("2023-05-14"), Cell::Number(45.0), Cell::Empty));
        builder.add_row(service(text("2022-05-14"), Cell::Number(99.0), Cell::Number(9.0)));
        let table = normalize(&builder.build()).unwrap();
        let rows = scaffold_join(&table, 2023);
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[4].services, 2);
        assert_eq!(rows[4].people_count, Some(75));
        assert_eq!(rows[4].visitor_count, Some(2));
        assert_eq!(rows[4].holy_spirit_baptism_count, None);
    }

    #[test]
    fn huge_counts_in_the_same_month_saturate() {
        let mut builder = Builder::new().header(&HEADER);
        builder.add_row(service(text("2023-03-05"), Cell::Number(1e19), Cell::Number(1e19)));
        builder.add_row(service(text("2023-03-12"), Cell::Number(1e19), Cell::Empty));
        let table = normalize(&builder.build()).unwrap();

        let rows = scaffold_join(&table, 2023);
        assert_eq!(rows[2].people_count, Some(u64::MAX));
        assert_eq!(rows[2].visitor_count, Some(10_000_000_000_000_000_000));

        let update = update_dashboard(&table, Some(2023), Language::English);
        assert_eq!(people_series(&update)[2], u64::MAX);
        let avg = bar_value(&update.average_people);
        assert!((avg - u64::MAX as f64 / 12.0).abs() < 1e6);
    }

    #[test]
    fn fill_only_touches_people_and_visitors() {
        let mut rows = scaffold_join(&Table::default(), 2023);
        fill_missing_counts(&mut rows);
        assert!(rows
            .iter()
            .all(|r| r.people_count == Some(0) && r.visitor_count == Some(0)));
        assert!(rows.iter().all(|r| r.children_count.is_none()));
    }

    #[test]
    fn average_divides_by_twelve() {
        let table = single_march_table();
        let mut rows = scaffold_join(&table, 2023);
        fill_missing_counts(&mut rows);
        assert_eq!(coverage_average(&rows, |r| r.people_count), 50.0 / 12.0);
        assert_eq!(coverage_average(&rows, |r| r.visitor_count), 5.0 / 12.0);
    }

    #[test]
    fn update_single_march_service() {
        init_logger();
        let table = single_march_table();
        let update = update_dashboard(&table, Some(2023), Language::English);
        assert_eq!(update.message, "");
        let mut expected = vec![0u64; 12];
        expected[2] = 50;
        assert_eq!(people_series(&update), expected);
        let avg = bar_value(&update.average_people);
        assert!((avg - 4.1667).abs() < 1e-3);
        assert!((bar_value(&update.average_visitors) - 5.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn update_year_without_services() {
        let table = single_march_table();
        let update = update_dashboard(&table, Some(2024), Language::English);
        assert_eq!(update.message, "");
        assert_eq!(people_series(&update), vec![0u64; 12]);
        assert_eq!(bar_value(&update.average_people), 0.0);
        assert_eq!(bar_value(&update.average_visitors), 0.0);
    }

    #[test]
    fn update_without_data_or_year() {
        init_logger();
        let empty = Table::default();
        for year in [None, Some(2022), Some(2023)] {
            let update = update_dashboard(&empty, year, Language::English);
            assert!(update.attendance.is_empty());
            assert!(update.average_people.is_empty());
            assert!(update.average_visitors.is_empty());
            assert_eq!(update.message, "No data available to display the charts.");
        }

        let update = update_dashboard(&single_march_table(), None, Language::Portuguese);
        assert!(update.attendance.is_empty());
        assert_eq!(
            update.message,
            "Nenhum dado disponível para exibir os gráficos."
        );
    }

    #[test]
    fn default_rules_years() {
        let rules = DashboardRules::DEFAULT_RULES;
        assert_eq!(rules.available_years(), vec![2022, 2023, 2024]);
        assert_eq!(rules.language, Language::English);
    }
}
