//! Summary CLI commands

use chrono::NaiveDate;
use clap::Subcommand;

use crate::display::{format_daily_summaries, format_monthly_summary};
use crate::error::{PocketbookError, PocketbookResult};
use crate::services::Session;

/// Summary subcommands
#[derive(Subcommand)]
pub enum SummaryCommands {
    /// Per-day income and expense, newest day first
    Daily {
        /// Number of days to show
        #[arg(short, long, default_value = "14")]
        limit: usize,
    },

    /// Income, expense and balance for one month
    Monthly {
        /// Month (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,
    },
}

fn parse_month(s: &str) -> PocketbookResult<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d").map_err(|_| {
        PocketbookError::Config(format!("Invalid month: '{}'. Use YYYY-MM", s))
    })
}

/// Handle a summary command
pub fn handle_summary_command(session: &mut Session, cmd: SummaryCommands) -> PocketbookResult<()> {
    let symbol = session.settings().currency_symbol.clone();
    let date_format = session.settings().date_format.clone();

    match cmd {
        SummaryCommands::Daily { limit } => {
            let days: Vec<_> = session
                .ledger()
                .daily_summaries()
                .into_iter()
                .take(limit)
                .collect();
            print!("{}", format_daily_summaries(&days, &symbol, &date_format));
        }

        SummaryCommands::Monthly { month } => {
            if let Some(month) = month {
                session.set_selected_month(parse_month(&month)?);
            }
            print!(
                "{}",
                format_monthly_summary(session.ledger().monthly_summary(), &symbol)
            );
        }
    }

    Ok(())
}
