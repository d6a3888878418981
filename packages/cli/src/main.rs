//! Main entry point for the sealjwt CLI

use clap::Parser;
use sealjwt_cli::{Cli, Outcome, load_config, logging, run};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let cli = Cli::parse();
    let outcome = match load_config(cli.config.as_deref()) {
        Ok(config) => run(cli.command, config, chrono::Utc::now()).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(Outcome::Issued { token, signed }) => {
            if let Some(signed) = signed {
                eprintln!("signed: {signed}");
            }
            println!("{token}");
            ExitCode::SUCCESS
        }
        Ok(Outcome::Verified(claims)) => {
            println!("{claims}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
