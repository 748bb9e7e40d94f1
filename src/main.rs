mod args;
mod dashboard;

use clap::Parser;
use env_logger::Env;
use log::debug;
use snafu::ErrorCompat;

use crate::args::Args;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();
    debug!("args: {:?}", args);

    if let Err(e) = dashboard::run_dashboard(&args).await {
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
