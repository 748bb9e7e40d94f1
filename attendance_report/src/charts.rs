//! Chart specifications.
//!
//! The structures serialize to the JSON figures understood by plotly.js
//! (`{"data": [...], "layout": {...}}`). An empty figure serializes to `{}`,
//! which plotly draws as a blank placeholder.

use serde::Serialize;

use crate::config::MonthlyRow;
use crate::labels::Language;

const ATTENDANCE_COLOR: &str = "orange";
const AVERAGE_PEOPLE_COLOR: &str = "#636EFA";
const AVERAGE_VISITORS_COLOR: &str = "#EF553B";
const BACKGROUND_COLOR: &str = "white";

#[derive(Serialize, PartialEq, Debug, Clone, Default)]
pub struct Figure {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<Trace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
}

impl Figure {
    pub fn empty() -> Figure {
        Figure::default()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.layout.is_none()
    }
}

#[derive(Serialize, PartialEq, Debug, Clone)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Scatter(ScatterTrace),
    Bar(BarTrace),
}

#[derive(Serialize, PartialEq, Debug, Clone)]
pub struct ScatterTrace {
    pub x: Vec<String>,
    pub y: Vec<u64>,
    pub mode: String,
    pub name: String,
    pub line: LineStyle,
    pub text: Vec<String>,
    pub textposition: String,
}

#[derive(Serialize, PartialEq, Debug, Clone)]
pub struct BarTrace {
    pub x: Vec<String>,
    pub y: Vec<f64>,
    pub text: Vec<String>,
    pub textposition: String,
    pub marker: Marker,
}

#[derive(Serialize, PartialEq, Eq, Debug, Clone)]
pub struct LineStyle {
    pub color: String,
}

#[derive(Serialize, PartialEq, Eq, Debug, Clone)]
pub struct Marker {
    pub color: String,
}

#[derive(Serialize, PartialEq, Eq, Debug, Clone)]
pub struct Title {
    pub text: String,
}

#[derive(Serialize, PartialEq, Eq, Debug, Clone)]
pub struct Axis {
    pub title: Title,
}

#[derive(Serialize, PartialEq, Eq, Debug, Clone)]
pub struct Layout {
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    pub paper_bgcolor: String,
    pub plot_bgcolor: String,
}

impl Layout {
    fn titled(title: String) -> Layout {
        Layout {
            title: Title { text: title },
            xaxis: None,
            yaxis: None,
            paper_bgcolor: BACKGROUND_COLOR.to_string(),
            plot_bgcolor: BACKGROUND_COLOR.to_string(),
        }
    }
}

/// Line chart of the number of people for each month, with the exact value written at each point.
///
/// The rows are expected to be the filled 12-month scaffold.
pub fn attendance_chart(rows: &[MonthlyRow], year: i32, language: Language) -> Figure {
    let month_names = language.month_names();
    let x: Vec<String> = rows
        .iter()
        .map(|r| {
            month_names
                .get((r.month as usize).wrapping_sub(1))
                .map(|s| s.to_string())
                .unwrap_or_else(|| r.month.to_string())
        })
        .collect();
    let y: Vec<u64> = rows.iter().map(|r| r.people_count.unwrap_or(0)).collect();
    let text: Vec<String> = y.iter().map(|v| v.to_string()).collect();

    let mut layout = Layout::titled(language.attendance_title(year));
    layout.xaxis = Some(Axis {
        title: Title {
            text: language.months_axis().to_string(),
        },
    });
    layout.yaxis = Some(Axis {
        title: Title {
            text: language.quantity_axis().to_string(),
        },
    });

    Figure {
        data: vec![Trace::Scatter(ScatterTrace {
            x,
            y,
            mode: "lines+markers+text".to_string(),
            name: language.people_trace_name().to_string(),
            line: LineStyle {
                color: ATTENDANCE_COLOR.to_string(),
            },
            text,
            textposition: "top center".to_string(),
        })],
        layout: Some(layout),
    }
}

/// A single bar showing an average, labelled with two decimals.
pub fn average_chart(label: &str, value: f64, title: String, color: &str) -> Figure {
    Figure {
        data: vec![Trace::Bar(BarTrace {
            x: vec![label.to_string()],
            y: vec![value],
            text: vec![format!("{:.2}", value)],
            textposition: "outside".to_string(),
            marker: Marker {
                color: color.to_string(),
            },
        })],
        layout: Some(Layout::titled(title)),
    }
}

pub fn average_people_chart(value: f64, year: i32, language: Language) -> Figure {
    average_chart(
        language.average_people_label(),
        value,
        language.average_people_title(year),
        AVERAGE_PEOPLE_COLOR,
    )
}

pub fn average_visitors_chart(value: f64, year: i32, language: Language) -> Figure {
    average_chart(
        language.average_visitors_label(),
        value,
        language.average_visitors_title(year),
        AVERAGE_VISITORS_COLOR,
    )
}
