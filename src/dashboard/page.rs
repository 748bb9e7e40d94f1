// The static page of the dashboard.
//
// Only the selector is filled on the server side, the charts are requested
// by the page from /api/charts.

use askama::Template;

use attendance_report::Language;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearOption {
    pub value: i32,
    pub selected: bool,
}

/// The page: title, year selector (with the default year selected), chart containers
/// and status message container.
#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub lang: &'static str,
    pub title: String,
    pub year_label: String,
    pub options: Vec<YearOption>,
}

impl PageTemplate {
    pub fn new(years: &[i32], selected: Option<i32>, language: Language) -> PageTemplate {
        PageTemplate {
            lang: language.code(),
            title: language.page_title().to_string(),
            year_label: language.year_selector_label().to_string(),
            options: years
                .iter()
                .map(|y| YearOption {
                    value: *y,
                    selected: Some(*y) == selected,
                })
                .collect(),
        }
    }
}
