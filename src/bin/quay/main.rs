//! quay CLI - compiler arguments for GNU and D toolchains

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("quay=debug")
    } else {
        EnvFilter::new("quay=info")
    };

    // stdout carries argument vectors, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Args(args) => commands::args::execute(args),
        Commands::Features(args) => commands::features::execute(args),
        Commands::Translate(args) => commands::translate::execute(args),
        Commands::Absolutize(args) => commands::absolutize::execute(args),
        Commands::Probe(args) => commands::probe::execute(args),
    }
}
