//! Transaction categories.

use serde::{Deserialize, Serialize};

use super::fields::TransactionType;

/// A category a transaction can be filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Display colour as `#rrggbb`.
    pub color: String,
}

/// Categories every new ledger starts with.
pub const DEFAULT_CATEGORIES: &[(&str, TransactionType, &str)] = &[
    ("Food & Dining", TransactionType::Expense, "#ff6384"),
    ("Transportation", TransactionType::Expense, "#36a2eb"),
    ("Shopping", TransactionType::Expense, "#cc65fe"),
    ("Entertainment", TransactionType::Expense, "#ffce56"),
    ("Bills & Utilities", TransactionType::Expense, "#ff9f40"),
    ("Healthcare", TransactionType::Expense, "#4bc0c0"),
    ("Education", TransactionType::Expense, "#9966ff"),
    ("Travel", TransactionType::Expense, "#ff6384"),
    ("Salary", TransactionType::Income, "#4caf50"),
    ("Freelance", TransactionType::Income, "#8bc34a"),
    ("Investment", TransactionType::Income, "#cddc39"),
    ("Other Income", TransactionType::Income, "#ffeb3b"),
];

/// Colour used when none is given.
pub const DEFAULT_COLOR: &str = "#007bff";
