use clap::Parser;

/// An interactive dashboard for the attendance of church services.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, default arquivo.xlsx) The Excel file containing one service per row.
    /// The columns are read by position: month, date, minister, leader, people, visitors,
    /// children, conversions, holy spirit baptisms, motorcycles, cars.
    #[clap(short, long, value_parser, default_value = "arquivo.xlsx")]
    pub input: String,

    /// (default: first worksheet) The name of the worksheet to use in the Excel file.
    #[clap(long, value_parser)]
    pub worksheet: Option<String>,

    /// (default 127.0.0.1:8050) The address the dashboard is served on.
    #[clap(short, long, value_parser, default_value = "127.0.0.1:8050")]
    pub bind: String,

    /// (en or pt, default en) The language of the page and the charts.
    #[clap(long, value_parser, default_value = "en")]
    pub language: String,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
