//! # Interlink Chat - study assistant for the terminal
//!
//! Entry point for the Interlink AI chat client.
//!
//! ## Modes
//! - Single prompt mode with `-p` / `--voice`
//! - Interactive chat (default)
//! - Local subcommands: `commands`, `history`, `config`, `completions`

mod cli;
mod core;
mod repl;
mod run;

use clap::Parser;
use dotenv::dotenv;

use cli::Args;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    if let Some(dir) = core::paths::config_dir() {
        dotenv::from_path(dir.join(".env")).ok();
    }

    let mut args = Args::parse();
    run::init_logger(&args);

    if let Some(command) = args.command.take() {
        let local = core::config::load_local().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
        return run::run_subcommand(command, &local);
    }

    // Print user-friendly message; exit uses Display not Debug
    let config = core::config::load().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if args.is_single_prompt() {
        return run::run_single_prompt(&args, &config).await;
    }

    run::run_interactive(&args, config).await
}
