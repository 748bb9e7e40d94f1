use log::{debug, info, warn};

use attendance_report::*;
use snafu::{prelude::*, Snafu};

use std::sync::Arc;

use crate::args::Args;

pub mod io_excel;
pub mod page;
pub mod server;

#[derive(Debug, Snafu)]
pub enum DashboardError {
    #[snafu(display("Input file not found: {path}"))]
    MissingFile { path: String },
    #[snafu(display("Error opening file {path}: {source}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The file {path} does not have any worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("The file {path} does not have a worksheet named {name}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display("Cannot use the spreadsheet: {source}"))]
    Schema { source: SchemaError },
    #[snafu(display("Cannot listen on {addr}: {source}"))]
    Bind {
        source: std::io::Error,
        addr: String,
    },
    #[snafu(display("The dashboard server stopped: {source}"))]
    Serve { source: std::io::Error },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashboardResult<T> = Result<T, DashboardError>;

/// Everything the request handlers need. Built once at startup, never modified.
#[derive(Debug, Clone)]
pub struct AppState {
    pub table: Table,
    pub available_years: Vec<i32>,
    pub language: Language,
}

impl AppState {
    /// The year selected when the page is opened.
    pub fn default_year(&self) -> Option<i32> {
        self.available_years.first().cloned()
    }
}

pub type SharedState = Arc<AppState>;

/// Loads and normalizes the attendance file.
///
/// Reading and schema problems are logged and leave the dashboard with an
/// empty table: the page is still served, with a message instead of the charts.
pub fn load_state(path: &str, worksheet: Option<&str>, rules: &DashboardRules) -> AppState {
    let raw = match io_excel::read_attendance_file(path, worksheet) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("load_state: {}", e);
            RawTable::default()
        }
    };
    debug!(
        "load_state: {} columns, {} rows",
        raw.num_columns(),
        raw.rows.len()
    );

    let table = match normalize(&raw).context(SchemaSnafu {}) {
        Ok(table) => table,
        Err(e) => {
            warn!("load_state: {}", e);
            Table::default()
        }
    };
    info!("load_state: {} services available", table.len());

    AppState {
        table,
        available_years: rules.available_years(),
        language: rules.language,
    }
}

fn validate_rules(args: &Args) -> DashboardResult<DashboardRules> {
    let language = match Language::from_code(&args.language) {
        Some(l) => l,
        None => {
            whatever!(
                "Cannot use language {:?}: expected one of en, pt",
                args.language
            )
        }
    };
    Ok(DashboardRules {
        language,
        ..DashboardRules::DEFAULT_RULES
    })
}

pub async fn run_dashboard(args: &Args) -> DashboardResult<()> {
    let rules = validate_rules(args)?;
    info!("rules: {:?}", rules);

    let state = load_state(&args.input, args.worksheet.as_deref(), &rules);
    let app = server::router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(args.bind.as_str())
        .await
        .context(BindSnafu {
            addr: args.bind.clone(),
        })?;
    info!("Dashboard available at http://{}/", args.bind);
    axum::serve(listener, app).await.context(ServeSnafu {})?;
    Ok(())
}
