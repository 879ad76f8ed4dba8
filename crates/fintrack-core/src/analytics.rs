//! Income and spending summaries over a set of transactions.
//!
//! Amounts are assumed to be within [`MAX_AMOUNT`](crate::models::MAX_AMOUNT),
//! which stored and validated transactions always are. At that cap a ledger
//! would need around 10^20 rows before a total left the `Decimal` range.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Transaction, TransactionType};

/// Totals per transaction type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub income: Decimal,
    pub expenses: Decimal,
    pub income_count: usize,
    pub expense_count: usize,
    /// `income - expenses`.
    pub balance: Decimal,
}

/// Spending or earnings for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
    pub count: usize,
}

/// Sum of one day's transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTotal {
    pub date: NaiveDate,
    pub total: Decimal,
}

pub fn summarize(transactions: &[Transaction]) -> Summary {
    let mut summary = Summary::default();

    for t in transactions {
        match t.transaction_type {
            TransactionType::Income => {
                summary.income += t.amount;
                summary.income_count += 1;
            }
            TransactionType::Expense => {
                summary.expenses += t.amount;
                summary.expense_count += 1;
            }
        }
    }

    summary.balance = summary.income - summary.expenses;
    summary
}

/// Totals per category, largest first. Ties keep name order.
pub fn by_category(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<&str, (Decimal, usize)> = BTreeMap::new();
    for t in transactions {
        let entry = totals.entry(t.category.as_str()).or_default();
        entry.0 += t.amount;
        entry.1 += 1;
    }

    let mut result: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, (total, count))| CategoryTotal {
            category: category.to_string(),
            total,
            count,
        })
        .collect();

    result.sort_by(|a, b| b.total.cmp(&a.total));
    result
}

/// Totals per day, oldest first.
pub fn by_date(transactions: &[Transaction]) -> Vec<DateTotal> {
    let mut totals: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for t in transactions {
        *totals.entry(t.date).or_default() += t.amount;
    }

    totals
        .into_iter()
        .map(|(date, total)| DateTotal { date, total })
        .collect()
}
