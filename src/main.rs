use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pocketbook::cli::{
    handle_category_command, handle_export_command, handle_import_command,
    handle_summary_command, handle_transaction_command, handle_wallet_command, CategoryCommands,
    SummaryCommands, TransactionCommands, WalletCommands,
};
use pocketbook::config::{NameMatchPolicy, PocketbookPaths};
use pocketbook::services::Session;

/// Environment variable holding the log filter
const LOG_ENV: &str = "POCKETBOOK_LOG";

#[derive(Parser)]
#[command(
    name = "pocketbook",
    version,
    about = "Personal finance ledger",
    long_about = "Pocketbook records income and expenses against wallets and \
                  categories, keeps daily and monthly totals, and moves the \
                  whole ledger in and out of xlsx spreadsheets."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Wallet management commands
    #[command(subcommand)]
    Wallet(WalletCommands),

    /// Category management commands
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Transaction commands
    #[command(subcommand, alias = "txn")]
    Transaction(TransactionCommands),

    /// Daily and monthly summaries
    #[command(subcommand)]
    Summary(SummaryCommands),

    /// Export the ledger to an xlsx workbook
    Export {
        /// Output file (defaults to a dated file in the export directory)
        output: Option<PathBuf>,
    },

    /// Import transactions from an xlsx workbook
    Import {
        /// Path to the workbook
        file: PathBuf,
    },

    /// Initialize the data directory with the default wallets and categories
    Init,

    /// Show or change configuration
    Config {
        /// Name matching for reconciliation (exact, trimmed, case_insensitive)
        #[arg(long)]
        name_match_policy: Option<String>,
        /// Wallet used when a transaction names none
        #[arg(long)]
        default_wallet: Option<String>,
        /// strftime pattern for dates in listings (e.g. %d/%m/%Y)
        #[arg(long)]
        date_format: Option<String>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let paths = PocketbookPaths::new()?;
    let mut session = Session::open(paths)?;

    match cli.command {
        Some(Commands::Wallet(cmd)) => handle_wallet_command(&mut session, cmd)?,
        Some(Commands::Category(cmd)) => handle_category_command(&mut session, cmd)?,
        Some(Commands::Transaction(cmd)) => handle_transaction_command(&mut session, cmd)?,
        Some(Commands::Summary(cmd)) => handle_summary_command(&mut session, cmd)?,
        Some(Commands::Export { output }) => handle_export_command(&session, output).await?,
        Some(Commands::Import { file }) => handle_import_command(&mut session, &file).await?,
        Some(Commands::Init) => {
            session.save()?;
            println!(
                "Initialized Pocketbook at: {}",
                session.paths().base_dir().display()
            );
            println!();
            println!("  Wallets:    {}", session.wallets().len());
            println!("  Categories: {}", session.categories().len());
            println!();
            println!("Run 'pocketbook wallet list' to see your wallets.");
        }
        Some(Commands::Config {
            name_match_policy,
            default_wallet,
            date_format,
        }) => {
            if let Some(policy) = name_match_policy {
                let policy = NameMatchPolicy::parse(&policy).ok_or_else(|| {
                    anyhow::anyhow!(
                        "Invalid policy '{}'. Use exact, trimmed or case_insensitive",
                        policy
                    )
                })?;
                session.update_settings(|s| s.name_match_policy = policy)?;
            }
            if let Some(wallet) = default_wallet {
                session.update_settings(|s| s.default_wallet = Some(wallet))?;
            }
            if let Some(pattern) = date_format {
                session.update_settings(|s| s.date_format = pattern)?;
            }

            let settings = session.settings();
            println!("Pocketbook Configuration");
            println!("========================");
            println!("Base directory:   {}", session.paths().base_dir().display());
            println!("Data directory:   {}", session.paths().data_dir().display());
            println!("Export directory: {}", session.paths().export_dir().display());
            println!();
            println!("Settings:");
            println!("  Currency:          {} ({})", settings.currency, settings.currency_symbol);
            println!("  Date format:       {}", settings.date_format);
            println!("  Name matching:     {:?}", settings.name_match_policy);
            println!(
                "  Default wallet:    {}",
                settings.default_wallet.as_deref().unwrap_or("(first wallet)")
            );
        }
        None => {
            println!("Pocketbook - personal finance ledger");
            println!();
            println!("Run 'pocketbook --help' for usage information.");
        }
    }

    Ok(())
}
