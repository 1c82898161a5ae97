//! # Back-office CLI
//!
//! `till` runs a single entry point against the configured database and
//! prints the result as JSON, for the manager's end-of-day scripts.
//!
//! ```text
//! till next-bill
//! till pending
//! till duplicate R1042-26/27 [--print]
//! till report items|pay-modes|voids [--report-id 7]
//! till clearance
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{Operation, TillError, TillResult};
use crate::notify::Notifier;
use crate::printer::ReceiptPrinter;
use crate::room::RoomAccountGateway;
use crate::state::Till;
use rasoi_db::Ledger;

#[derive(Debug, Parser)]
#[command(name = "till", version, about = "Rasoi POS back-office commands")]
pub struct Cli {
    /// Path to till.toml (defaults to the platform config directory)
    #[arg(long, env = "RASOI_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the number the next bill will get
    NextBill,
    /// List finalized bills awaiting payment
    Pending,
    /// Rebuild a bill receipt marked DUPLICATE
    Duplicate {
        bill_id: String,
        /// Send it to the receipt printer as well
        #[arg(long)]
        print: bool,
    },
    /// End-of-day reports
    Report {
        #[arg(value_enum)]
        kind: ReportKind,
        /// Report period (defaults to the open one)
        #[arg(long)]
        report_id: Option<i64>,
    },
    /// Close the business day
    Clearance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    Items,
    PayModes,
    Voids,
}

/// Runs one command and returns its JSON output.
pub async fn execute<L, P, R, N>(till: &Till<L, P, R, N>, command: Command) -> TillResult<Value>
where
    L: Ledger,
    P: ReceiptPrinter,
    R: RoomAccountGateway,
    N: Notifier,
{
    match command {
        Command::NextBill => Ok(json!({ "nextBillNumber": till.next_bill_number().await? })),
        Command::Pending => to_json(Operation::Lookup, &till.pending_bills().await?),
        Command::Duplicate { bill_id, print } => {
            let receipt = if print {
                till.print_duplicate_bill(&bill_id).await?
            } else {
                till.duplicate_bill(&bill_id).await?
            };
            to_json(Operation::Duplicate, &receipt)
        }
        Command::Report { kind, report_id } => match kind {
            ReportKind::Items => to_json(Operation::Report, &till.item_wise_report(report_id).await?),
            ReportKind::PayModes => {
                to_json(Operation::Report, &till.pay_mode_report(report_id).await?)
            }
            ReportKind::Voids => to_json(Operation::Report, &till.void_report(report_id).await?),
        },
        Command::Clearance => to_json(Operation::Clearance, &till.close_report_period().await?),
    }
}

fn to_json<T: Serialize>(operation: Operation, value: &T) -> TillResult<Value> {
    serde_json::to_value(value).map_err(|e| TillError::Failed {
        operation,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::test_till;
    use rasoi_core::OrderType;

    #[test]
    fn test_parse_report_command() {
        let cli = Cli::try_parse_from(["till", "report", "pay-modes", "--report-id", "7"]).unwrap();
        match cli.command {
            Command::Report { kind, report_id } => {
                assert_eq!(kind, ReportKind::PayModes);
                assert_eq!(report_id, Some(7));
            }
            other => panic!("unexpected command {:?}", other),
        }

        assert!(Cli::try_parse_from(["till", "report", "daily"]).is_err());
    }

    #[test]
    fn test_parse_config_and_duplicate() {
        let cli = Cli::try_parse_from([
            "till",
            "--config",
            "/etc/rasoi/till.toml",
            "duplicate",
            "R12-26/27",
            "--print",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/etc/rasoi/till.toml")));
        assert!(matches!(
            cli.command,
            Command::Duplicate { ref bill_id, print: true } if bill_id == "R12-26/27"
        ));
    }

    #[tokio::test]
    async fn test_execute_prints_json() {
        let till = test_till().await;
        let opened = till
            .add_item_to_new_order("7", "Ravi", OrderType::DineIn, "PNT", 2)
            .await
            .unwrap();
        till.finalize_bill(&opened.order.id, 0, false).await.unwrap();

        let next = execute(&till, Command::NextBill).await.unwrap();
        assert_eq!(next["nextBillNumber"], 2);

        let pending = execute(&till, Command::Pending).await.unwrap();
        assert_eq!(pending.as_array().unwrap().len(), 1);
        assert_eq!(pending[0]["bill_id"].as_str(), Some("R1-26/27"));

        let err = execute(&till, Command::Clearance).await.unwrap_err();
        assert!(matches!(err, TillError::ConflictOrAlreadyProcessed { .. }));
    }
}
