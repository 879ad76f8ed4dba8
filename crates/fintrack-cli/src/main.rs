//! CLI application for receipt import and transaction tracking.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{analytics, batch, categories, config, extract, import, transactions, Context};

/// fintrack - Turn receipts into transactions and track your spending
#[derive(Parser)]
#[command(name = "fintrack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the transaction database
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// User whose transactions are read and written
    #[arg(long, global = true, default_value_t = 1)]
    user: i64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract fields from a single receipt
    Extract(extract::ExtractArgs),

    /// Extract fields from many receipts
    Batch(batch::BatchArgs),

    /// Extract a receipt, apply corrections and save it as a transaction
    Import(import::ImportArgs),

    /// Manage transactions
    #[command(name = "tx")]
    Transactions(transactions::TransactionsArgs),

    /// Summaries of income and spending
    Analytics(analytics::AnalyticsArgs),

    /// List transaction categories
    Categories(categories::CategoriesArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let ctx = Context::new(cli.config, cli.db, cli.user);

    match cli.command {
        Commands::Extract(args) => extract::run(args, &ctx).await,
        Commands::Batch(args) => batch::run(args, &ctx).await,
        Commands::Import(args) => import::run(args, &ctx).await,
        Commands::Transactions(args) => transactions::run(args, &ctx).await,
        Commands::Analytics(args) => analytics::run(args, &ctx).await,
        Commands::Categories(args) => categories::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
