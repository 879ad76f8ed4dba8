//! Analytics command - income and spending summaries.

use clap::{Args, Subcommand};
use console::style;
use rust_decimal::Decimal;

use fintrack_core::analytics::{by_category, by_date, summarize};
use fintrack_core::TransactionStore;

use super::transactions::FilterArgs;
use super::Context;

/// Arguments for the analytics command.
#[derive(Args)]
pub struct AnalyticsArgs {
    #[command(subcommand)]
    command: AnalyticsCommand,
}

#[derive(Subcommand)]
enum AnalyticsCommand {
    /// Income, expenses and balance
    Summary(ReportArgs),

    /// Totals per category, largest first
    ByCategory(ReportArgs),

    /// Totals per day, oldest first
    ByDate(ReportArgs),
}

#[derive(Args)]
struct ReportArgs {
    #[command(flatten)]
    filter: FilterArgs,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

pub async fn run(args: AnalyticsArgs, ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let store = ctx.open_store(&config)?;

    match args.command {
        AnalyticsCommand::Summary(report) => {
            let transactions = store.matching(ctx.user_id, &report.filter.to_filter())?;
            let summary = summarize(&transactions);

            if report.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "Income:   {:>12}  ({} transactions)",
                    money(summary.income),
                    summary.income_count
                );
                println!(
                    "Expenses: {:>12}  ({} transactions)",
                    money(summary.expenses),
                    summary.expense_count
                );
                let balance = format!("{:>12}", money(summary.balance));
                let balance = if summary.balance.is_sign_negative() {
                    style(balance).red()
                } else {
                    style(balance).green()
                };
                println!("Balance:  {}", balance);
            }
        }
        AnalyticsCommand::ByCategory(report) => {
            let transactions = store.matching(ctx.user_id, &report.filter.to_filter())?;
            let totals = by_category(&transactions);

            if report.json {
                println!("{}", serde_json::to_string_pretty(&totals)?);
            } else if totals.is_empty() {
                println!("No transactions found.");
            } else {
                for total in &totals {
                    println!(
                        "{:<20}  {:>12}  ({})",
                        total.category,
                        money(total.total),
                        total.count
                    );
                }
            }
        }
        AnalyticsCommand::ByDate(report) => {
            let transactions = store.matching(ctx.user_id, &report.filter.to_filter())?;
            let totals = by_date(&transactions);

            if report.json {
                println!("{}", serde_json::to_string_pretty(&totals)?);
            } else if totals.is_empty() {
                println!("No transactions found.");
            } else {
                for total in &totals {
                    println!("{}  {:>12}", total.date, money(total.total));
                }
            }
        }
    }

    Ok(())
}

fn money(amount: Decimal) -> String {
    format!("{:.2}", amount)
}
