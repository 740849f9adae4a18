//! Storefront command-line client

use std::process::ExitCode;

mod cli;

#[tokio::main]
pub async fn main() -> ExitCode {
    match cli::Cli::load().run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");

            ExitCode::FAILURE
        }
    }
}
