use askama::Template;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::dashboard::page::PageTemplate;
use crate::dashboard::*;

/// The query of /api/charts. The year is kept as text: anything that is not a number counts as no selection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartsQuery {
    pub year: Option<String>,
}

impl ChartsQuery {
    fn selected_year(&self) -> Option<i32> {
        self.year.as_deref().and_then(|s| s.trim().parse::<i32>().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearsPayload {
    pub years: Vec<i32>,
    pub default: Option<i32>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/charts", get(charts))
        .route("/api/years", get(years))
        .with_state(state)
}

async fn index(State(state): State<SharedState>) -> Result<Html<String>, (StatusCode, String)> {
    let page = PageTemplate::new(
        &state.available_years,
        state.default_year(),
        state.language,
    );
    page.render().map(Html).map_err(|e| {
        warn!("index: could not render the page: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })
}

async fn charts(
    State(state): State<SharedState>,
    Query(query): Query<ChartsQuery>,
) -> Json<DashboardUpdate> {
    let selected = query.selected_year();
    debug!("charts: query: {:?} selected: {:?}", query, selected);
    Json(update_dashboard(&state.table, selected, state.language))
}

async fn years(State(state): State<SharedState>) -> Json<YearsPayload> {
    Json(YearsPayload {
        years: state.available_years.clone(),
        default: state.default_year(),
    })
}
