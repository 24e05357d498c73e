//! Racelab CLI - lost updates, locks and timing for concurrent agents
//!
//! Binary name: `racelab`

use std::process;

mod app;
mod cli;
mod commands;

use cli::error::{format_error, get_exit_code};

#[tokio::main]
async fn main() {
    if let Err(err) = cli::setup::init_tracing() {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("Error: {}", format_error(&err));
        }
        #[allow(clippy::exit)]
        process::exit(2);
    }

    if let Err(err) = app::run_cli().await {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("Error: {}", format_error(&err));
        }
        #[allow(clippy::exit)]
        process::exit(get_exit_code(&err));
    }
}
