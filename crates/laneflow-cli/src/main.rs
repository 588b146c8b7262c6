//! Laneflow CLI - Lay out swimlane process diagrams

mod cli;

use clap::Parser;

fn main() {
    let cli_args = cli::Cli::parse();

    // Logging is configured inside run() from flags and environment
    let mut app = cli::LaneflowApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
