// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

use chrono::NaiveDate;

use crate::labels::Language;

/// A value read from a spreadsheet cell, before any interpretation.
///
/// Readers convert whatever their backend produces into this type, so that
/// the normalization does not depend on a particular file format.
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// An Excel serial date: days since 1899-12-30, the fractional part being the time of day.
    DateTime(f64),
    /// A cell holding a spreadsheet error (#N/A, #DIV/0!, ...).
    Error(String),
}

impl Cell {
    /// Empty cells, error cells and blank text all count as missing values.
    pub fn is_null(&self) -> bool {
        match self {
            Cell::Empty | Cell::Error(_) => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(f) | Cell::DateTime(f) => f.is_nan(),
            Cell::Bool(_) => false,
        }
    }

    /// The textual content of a cell, if any.
    pub fn text(&self) -> Option<String> {
        match self {
            Cell::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Cell::Number(f) if f.is_finite() && f.fract() == 0.0 => Some(format!("{}", *f as i64)),
            Cell::Number(f) if f.is_finite() => Some(f.to_string()),
            Cell::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// The content of a worksheet: the first row and all the rows after it.
///
/// Every row has the same number of cells as the header (see `builder::Builder`).
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RawTable {
    pub header: Vec<Cell>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn num_columns(&self) -> usize {
        self.header.len()
    }
}

// ******** Normalized data structures *********

/// One service, after normalization.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Record {
    /// Derived from `date`, the month column of the spreadsheet is not trusted.
    pub month: Option<u32>,
    pub date: Option<NaiveDate>,
    pub minister: Option<String>,
    pub leader: Option<String>,
    pub people_count: Option<u64>,
    pub visitor_count: Option<u64>,
    pub children_count: Option<u64>,
    pub conversion_count: Option<u64>,
    pub holy_spirit_baptism_count: Option<u64>,
    pub motorcycle_count: Option<u64>,
    pub car_count: Option<u64>,
    pub year: Option<i32>,
}

/// All the services loaded at startup. An empty table means that no usable data was found.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Table {
    pub records: Vec<Record>,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// The metrics of one month of the scaffold.
///
/// Multiple services in the same month are summed together.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct MonthlyRow {
    pub month: u32,
    /// Number of services joined onto this month.
    pub services: u32,
    pub people_count: Option<u64>,
    pub visitor_count: Option<u64>,
    pub children_count: Option<u64>,
    pub conversion_count: Option<u64>,
    pub holy_spirit_baptism_count: Option<u64>,
    pub motorcycle_count: Option<u64>,
    pub car_count: Option<u64>,
}

// ********* Schema **********

/// The semantic columns of the attendance spreadsheet, in positional order.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Column {
    Month,
    Date,
    Minister,
    Leader,
    PeopleCount,
    VisitorCount,
    ChildrenCount,
    ConversionCount,
    HolySpiritBaptismCount,
    MotorcycleCount,
    CarCount,
}

/// Declared mapping between a position in the worksheet and a semantic column.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub column: Column,
    /// The header used by the spreadsheets this dashboard was built for.
    pub source_label: &'static str,
}

/// The Nth column of the worksheet is the Nth entry, whatever its header says.
pub const COLUMN_MAPPING: [ColumnSpec; 11] = [
    ColumnSpec {
        column: Column::Month,
        source_label: "Mes",
    },
    ColumnSpec {
        column: Column::Date,
        source_label: "Data",
    },
    ColumnSpec {
        column: Column::Minister,
        source_label: "Ministro",
    },
    ColumnSpec {
        column: Column::Leader,
        source_label: "Dirigente",
    },
    ColumnSpec {
        column: Column::PeopleCount,
        source_label: "Qtd_Pessoas",
    },
    ColumnSpec {
        column: Column::VisitorCount,
        source_label: "Qtd_Visitantes",
    },
    ColumnSpec {
        column: Column::ChildrenCount,
        source_label: "Qtd_Criancas",
    },
    ColumnSpec {
        column: Column::ConversionCount,
        source_label: "Qtd_Conversoes",
    },
    ColumnSpec {
        column: Column::HolySpiritBaptismCount,
        source_label: "Qtd_Batismo_Esp_Santo",
    },
    ColumnSpec {
        column: Column::MotorcycleCount,
        source_label: "Qtd_Motos",
    },
    ColumnSpec {
        column: Column::CarCount,
        source_label: "Qtd_Carros",
    },
];

/// A row is only kept if both of these columns are filled.
pub const REQUIRED_COLUMNS: [Column; 2] = [Column::Date, Column::PeopleCount];

impl Column {
    pub fn position(self) -> usize {
        COLUMN_MAPPING
            .iter()
            .position(|spec| spec.column == self)
            .unwrap_or(COLUMN_MAPPING.len())
    }

    pub fn name(self) -> &'static str {
        match self {
            Column::Month => "Month",
            Column::Date => "Date",
            Column::Minister => "Minister",
            Column::Leader => "Leader",
            Column::PeopleCount => "PeopleCount",
            Column::VisitorCount => "VisitorCount",
            Column::ChildrenCount => "ChildrenCount",
            Column::ConversionCount => "ConversionCount",
            Column::HolySpiritBaptismCount => "HolySpiritBaptismCount",
            Column::MotorcycleCount => "MotorcycleCount",
            Column::CarCount => "CarCount",
        }
    }
}

/// Reasons for which a worksheet cannot be turned into a table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SchemaError {
    /// None of the rows has all the required columns filled.
    MissingColumns { missing: Vec<&'static str> },
    /// The worksheet does not have the declared number of columns.
    SchemaMismatch { expected: usize, found: usize },
}

impl Error for SchemaError {}

impl Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaError::MissingColumns { missing } => {
                write!(f, "required columns not found: {}", missing.join(", "))
            }
            SchemaError::SchemaMismatch { expected, found } => write!(
                f,
                "schema mismatch: expected {} columns, found {}",
                expected, found
            ),
        }
    }
}

// ********* Configuration **********

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct DashboardRules {
    /// First year offered in the selector. The selector defaults to it.
    pub first_year: i32,
    pub last_year: i32,
    pub language: Language,
}

impl DashboardRules {
    pub const DEFAULT_RULES: DashboardRules = DashboardRules {
        first_year: 2022,
        last_year: 2024,
        language: Language::English,
    };

    /// The years offered in the selector, whether or not the data covers them.
    pub fn available_years(&self) -> Vec<i32> {
        (self.first_year..=self.last_year).collect()
    }
}
