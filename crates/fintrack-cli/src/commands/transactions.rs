//! Transaction command - add, list, edit and remove ledger records.

use anyhow::Context as _;
use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};
use console::style;
use rust_decimal::Decimal;
use tracing::info;

use fintrack_core::{
    NewTransaction, Page, PageRequest, Transaction, TransactionFilter, TransactionStore,
    TransactionType,
};

use super::{Context, OutputFormat};

/// Arguments for the tx command.
#[derive(Args)]
pub struct TransactionsArgs {
    #[command(subcommand)]
    command: TxCommand,
}

#[derive(Subcommand)]
enum TxCommand {
    /// Record a transaction by hand
    Add(AddArgs),

    /// List transactions, newest first
    List(ListArgs),

    /// Show one transaction
    Show {
        id: i64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Change fields of a transaction
    Update(UpdateArgs),

    /// Delete a transaction
    Delete { id: i64 },
}

#[derive(Args)]
struct AddArgs {
    /// Transaction type
    #[arg(long = "type", default_value = "expense")]
    transaction_type: TransactionType,

    #[arg(long)]
    amount: Decimal,

    #[arg(long)]
    category: String,

    #[arg(long)]
    description: Option<String>,

    /// Defaults to today (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Args)]
struct UpdateArgs {
    id: i64,

    #[arg(long = "type")]
    transaction_type: Option<TransactionType>,

    #[arg(long)]
    amount: Option<Decimal>,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    date: Option<NaiveDate>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

/// Filters shared by listing and analytics.
#[derive(Args)]
pub struct FilterArgs {
    /// First day to include (needs --end)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last day to include (needs --start)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Only this transaction type
    #[arg(long = "type")]
    transaction_type: Option<TransactionType>,

    /// Only this category
    #[arg(long)]
    category: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> TransactionFilter {
        if self.start.is_some() != self.end.is_some() {
            tracing::warn!("A date range needs both --start and --end; ignoring it");
        }
        TransactionFilter {
            start_date: self.start,
            end_date: self.end,
            transaction_type: self.transaction_type,
            category: self.category.clone(),
        }
    }
}

#[derive(Args)]
struct ListArgs {
    #[command(flatten)]
    filter: FilterArgs,

    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Transactions per page (default from config)
    #[arg(long)]
    limit: Option<u32>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

pub async fn run(args: TransactionsArgs, ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let mut store = ctx.open_store(&config)?;

    match args.command {
        TxCommand::Add(add) => {
            let transaction = NewTransaction {
                transaction_type: add.transaction_type,
                amount: add.amount,
                category: add.category.trim().to_string(),
                description: add.description.filter(|d| !d.trim().is_empty()),
                date: add.date.unwrap_or_else(|| Local::now().date_naive()),
                receipt_path: None,
            };
            transaction.validate()?;

            let created = store.create(ctx.user_id, transaction)?;
            info!("Added transaction {}", created.id);
            println!("{}", format_transaction(&created, add.format)?);
        }
        TxCommand::List(list) => {
            let limit = list.limit.unwrap_or(config.listing.page_size);
            let page = store.list(
                ctx.user_id,
                &list.filter.to_filter(),
                PageRequest::new(list.page, limit),
            )?;
            println!("{}", format_page(&page, list.format)?);
        }
        TxCommand::Show { id, format } => {
            let transaction = store
                .get(ctx.user_id, id)
                .with_context(|| format!("Transaction {}", id))?;
            println!("{}", format_transaction(&transaction, format)?);
        }
        TxCommand::Update(update) => {
            let existing = store
                .get(ctx.user_id, update.id)
                .with_context(|| format!("Transaction {}", update.id))?;

            let description = update.description.or(existing.description);
            let transaction = NewTransaction {
                transaction_type: update.transaction_type.unwrap_or(existing.transaction_type),
                amount: update.amount.unwrap_or(existing.amount),
                category: update.category.unwrap_or(existing.category).trim().to_string(),
                description: description.filter(|d| !d.trim().is_empty()),
                date: update.date.unwrap_or(existing.date),
                receipt_path: existing.receipt_path,
            };
            transaction.validate()?;

            let updated = store.update(ctx.user_id, update.id, transaction)?;
            println!("{}", format_transaction(&updated, update.format)?);
        }
        TxCommand::Delete { id } => {
            store
                .delete(ctx.user_id, id)
                .with_context(|| format!("Transaction {}", id))?;
            println!("{} Deleted transaction {}", style("✓").green(), id);
        }
    }

    Ok(())
}

const CSV_HEADER: [&str; 8] = [
    "id",
    "date",
    "type",
    "amount",
    "category",
    "description",
    "receipt_path",
    "created_at",
];

fn csv_record(transaction: &Transaction) -> [String; 8] {
    [
        transaction.id.to_string(),
        transaction.date.to_string(),
        transaction.transaction_type.to_string(),
        format!("{:.2}", transaction.amount),
        transaction.category.clone(),
        transaction.description.clone().unwrap_or_default(),
        transaction.receipt_path.clone().unwrap_or_default(),
        transaction.created_at.to_string(),
    ]
}

fn text_row(transaction: &Transaction) -> String {
    let sign = match transaction.transaction_type {
        TransactionType::Income => "+",
        TransactionType::Expense => "-",
    };
    let amount = format!("{}{:.2}", sign, transaction.amount);

    format!(
        "{:>5}  {}  {:>12}  {:<20}  {}",
        transaction.id,
        transaction.date,
        amount,
        transaction.category,
        transaction.description.as_deref().unwrap_or("")
    )
}

pub fn format_transaction(transaction: &Transaction, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(transaction)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(CSV_HEADER)?;
            wtr.write_record(csv_record(transaction))?;
            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => {
            let mut output = String::new();
            output.push_str(&format!("Transaction {}\n", transaction.id));
            output.push_str(&format!("  Date:        {}\n", transaction.date));
            output.push_str(&format!("  Type:        {}\n", transaction.transaction_type));
            output.push_str(&format!("  Amount:      {:.2}\n", transaction.amount));
            output.push_str(&format!("  Category:    {}\n", transaction.category));
            if let Some(description) = &transaction.description {
                output.push_str(&format!("  Description: {}\n", description));
            }
            if let Some(path) = &transaction.receipt_path {
                output.push_str(&format!("  Receipt:     {}\n", path));
            }
            output.push_str(&format!("  Created:     {}", transaction.created_at));
            Ok(output)
        }
    }
}

fn format_page(page: &Page<Transaction>, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(page)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(CSV_HEADER)?;
            for transaction in &page.items {
                wtr.write_record(csv_record(transaction))?;
            }
            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => {
            let mut output = String::new();
            if page.items.is_empty() {
                output.push_str("No transactions found.\n");
            }
            for transaction in &page.items {
                output.push_str(&text_row(transaction));
                output.push('\n');
            }
            output.push_str(&format!(
                "Page {} of {} ({} transactions)",
                page.pagination.page,
                page.pagination.total_pages.max(1),
                page.pagination.total
            ));
            Ok(output)
        }
    }
}
