use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use straico::LONG_VERSION;
use straico::commands::complete::{self, CompleteArgs};

#[derive(Debug, Parser)]
#[command(
    name = "straico-complete",
    about = "Execute a single Straico prompt completion",
    version = LONG_VERSION
)]
struct Cli {
    #[command(flatten)]
    complete: CompleteArgs,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = complete::run(cli.complete).await {
        eprintln!("{} {err}", "error:".red().bold());
        process::exit(1);
    }
}
