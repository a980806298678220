//! UI harness CLI
//!
//! Runs scenarios against a target application started in harness mode.

use clap::Parser;
use ui_harness::commands::{Commands, GlobalArgs};
use ui_harness::{cli, common::logging};

#[derive(Parser)]
#[command(name = "ui-harness", about = "Black-box UI test harness")]
#[command(version, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

fn main() {
    let cli = Cli::parse();

    logging::init_cli(cli.global.verbose);

    if let Err(e) = cli::dispatch(cli.command, &cli.global) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
