use clap::{Parser, Subcommand};
use std::process;
use tracing::info;

mod config;
mod error;
mod models;
mod run;
mod services;
mod web;

use config::Config;

// Re-exports
pub use error::{Error, Result};

use crate::run::{run, run_once};

#[derive(Parser, Debug)]
#[command(about = "Stores vote tokens and submits one free vote per token every day.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the control panel and the daily scheduler (default)
    Serve,
    /// Submit one vote for every stored token, print the results and exit
    RunOnce,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    if dotenvy::dotenv().is_err() {
        info!("No .env file found, using existing environment variables instead.");
    }

    let cli = Cli::parse();

    let config = match Config::build() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            process::exit(1);
        }
    };

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run(config).await,
        Command::RunOnce => run_once(config).await,
    };

    if let Err(e) = result {
        eprintln!("Application error: {e}");
        process::exit(1);
    }
}
