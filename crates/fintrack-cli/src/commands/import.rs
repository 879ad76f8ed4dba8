//! Import command - turn a receipt into a saved transaction.

use std::fs;
use std::path::Path;

use chrono::{NaiveDate, Utc};
use clap::Args;
use console::style;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use fintrack_core::error::ValidationError;
use fintrack_core::{
    CategoryStore, NewTransaction, ReceiptExtractor, ReviewEdits, TextRecognizer,
    TransactionStore, TransactionType,
};

use super::transactions::format_transaction;
use super::{
    clock, load_recognizer, needs_ocr, open_upload, read_receipt_text, resolve_data_path,
    Context, OutputFormat,
};

/// Arguments for the import command.
#[derive(Args)]
pub struct ImportArgs {
    /// Receipt file (PDF, image or text), or `-` for text on stdin
    #[arg(required = true)]
    input: String,

    /// Use this total instead of the extracted one
    #[arg(long)]
    amount: Option<Decimal>,

    /// Use this date instead of the extracted one (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Category to file the transaction under
    #[arg(long)]
    category: Option<String>,

    /// Replace the default description
    #[arg(long)]
    description: Option<String>,

    /// Transaction type
    #[arg(long = "type")]
    transaction_type: Option<TransactionType>,

    /// Date to use when the receipt has none (YYYY-MM-DD)
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Record the receipt where it is instead of copying it
    #[arg(long)]
    no_copy: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

pub async fn run(args: ImportArgs, ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;

    let upload = open_upload(&args.input)?;
    let engine = if needs_ocr(upload.kind) {
        load_recognizer(&config.ocr)
    } else {
        None
    };
    let raw_text = read_receipt_text(
        &upload,
        &config,
        engine.as_ref().map(|e| e as &dyn TextRecognizer),
    )?;

    let clock = clock(args.today);
    let extraction = ReceiptExtractor::with_clock(clock.as_ref()).extract(&raw_text);
    for warning in &extraction.warnings {
        eprintln!("{} {}", style("!").yellow(), warning);
    }

    let edits = ReviewEdits {
        transaction_type: args.transaction_type,
        amount: args.amount,
        category: args.category,
        description: args.description,
        date: args.date,
    };

    let mut transaction = match NewTransaction::from_review(extraction.fields, edits) {
        Ok(transaction) => transaction,
        Err(ValidationError::MissingAmount) => {
            anyhow::bail!("No total found on the receipt; pass --amount to set one")
        }
        Err(ValidationError::MissingCategory) => {
            anyhow::bail!("A category is required; pass --category (see `fintrack categories`)")
        }
        Err(e) => return Err(e.into()),
    };

    let mut store = ctx.open_store(&config)?;

    let known = store.categories(Some(transaction.transaction_type))?;
    if !known.iter().any(|c| c.name == transaction.category) {
        warn!(
            "'{}' is not a known {} category",
            transaction.category, transaction.transaction_type
        );
    }

    if args.input != "-" {
        let receipt_path = if args.no_copy {
            args.input.clone()
        } else {
            keep_receipt(&resolve_data_path(&config.store.receipt_dir), &upload.file_name, &upload.data)?
        };
        transaction = transaction.with_receipt_path(receipt_path);
    }

    let created = store.create(ctx.user_id, transaction)?;
    info!("Imported receipt {} as transaction {}", upload.file_name, created.id);

    if matches!(args.format, OutputFormat::Text) {
        println!("{} Saved transaction {}", style("✓").green(), created.id);
    }
    println!("{}", format_transaction(&created, args.format)?);

    Ok(())
}

/// Copy the receipt into `dir` under a unique name and return its path.
fn keep_receipt(dir: &Path, file_name: &str, data: &[u8]) -> anyhow::Result<String> {
    fs::create_dir_all(dir)?;

    let name = format!("{}-{}", Utc::now().timestamp_millis(), file_name);
    let path = dir.join(name);
    fs::write(&path, data)?;

    debug!("Stored receipt at {}", path.display());
    Ok(path.display().to_string())
}
