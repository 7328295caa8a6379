// src/main.rs

use clap::Parser;
use commit_report::cli::Args;
use commit_report::{logging, pipeline};
use console::style;
use std::process::ExitCode;
use std::time::Instant;
use tracing::info;

fn main() -> ExitCode {
    let args = Args::parse();
    logging::setup_logger(args.verbose);
    let start_time = Instant::now();

    let code = match pipeline::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", style("error:").red().bold(), e);
            ExitCode::FAILURE
        }
    };

    info!("total time: {:.2?}", start_time.elapsed());
    code
}
