//! # Till Back-office Entry Point
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging to stderr; stdout carries JSON)
//! 2. Parse arguments
//! 3. Load till.toml and RASOI_* overrides
//! 4. Connect to the database & run migrations
//! 5. Wire the till and run one command
//!
//! A failed entry point prints its `ApiError` as JSON and exits non-zero.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use rasoi_db::{Database, DbConfig};
use rasoi_till::cli::{self, Cli};
use rasoi_till::{ApiError, HttpRoomAccount, NetworkPrinter, NoOpNotifier, Till, TillConfig};

#[tokio::main]
async fn main() -> ExitCode {
    rasoi_till::init_tracing();
    let args = Cli::parse();

    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            error!(error = %err, "Till failed to start");
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = TillConfig::load(args.config)?;

    let db_path = config.database_path()?;
    info!(?db_path, "Database path determined");
    let db = Database::new(DbConfig::new(db_path)).await?;

    let printer = NetworkPrinter::from_addr(&config.printer.address)?
        .with_check_timeout(config.printer.check_timeout())
        .with_width(config.printer.paper_width);
    let room = HttpRoomAccount::new(&config.room_account)?;

    let till = Till::new(db.ledger(), printer, room, NoOpNotifier, config);
    let outcome = cli::execute(&till, args.command).await;
    db.close().await;

    match outcome {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            let api = ApiError::from(err);
            println!("{}", serde_json::to_string_pretty(&api)?);
            Ok(ExitCode::FAILURE)
        }
    }
}
