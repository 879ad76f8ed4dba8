//! Categories command - list the category catalogue.

use clap::Args;
use console::Style;

use fintrack_core::{CategoryStore, TransactionType};

use super::Context;

/// Arguments for the categories command.
#[derive(Args)]
pub struct CategoriesArgs {
    /// Only categories for this transaction type
    #[arg(long = "type")]
    transaction_type: Option<TransactionType>,

    /// Print JSON instead of a list
    #[arg(long)]
    json: bool,
}

pub async fn run(args: CategoriesArgs, ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let store = ctx.open_store(&config)?;

    let categories = store.categories(args.transaction_type)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
        return Ok(());
    }

    for category in &categories {
        let marker = match category.transaction_type {
            TransactionType::Income => Style::new().green().apply_to("+"),
            TransactionType::Expense => Style::new().red().apply_to("-"),
        };
        println!("{} {:<20} {}", marker, category.name, category.color);
    }

    Ok(())
}
