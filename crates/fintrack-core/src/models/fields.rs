//! Fields proposed from a receipt, before a human confirms them.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Description stamped on every receipt import.
pub const RECEIPT_DESCRIPTION: &str = "Imported from receipt";

/// Direction of money flow.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    #[default]
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(format!("unknown transaction type: {}", other)),
        }
    }
}

/// Best-effort transaction candidate extracted from receipt text.
///
/// Every field is always populated. A missing total is `None`, never zero,
/// so a form can show an empty input instead of `0.00`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    /// Resolved total, if any dollar amount was found.
    pub total_amount: Option<Decimal>,

    /// Date printed on the receipt, or the extraction day.
    pub transaction_date: NaiveDate,

    /// Left empty for the reviewer to choose.
    pub category: String,

    /// Provenance marker.
    pub description: String,

    /// Receipts are only ever proposed as expenses.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
}

impl ExtractedFields {
    /// Fields with no amount, dated `date`.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            total_amount: None,
            transaction_date: date,
            category: String::new(),
            description: RECEIPT_DESCRIPTION.to_string(),
            transaction_type: TransactionType::Expense,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serialize_camel_case() {
        let fields = ExtractedFields {
            total_amount: Some(Decimal::from_str("23.75").unwrap()),
            ..ExtractedFields::empty(NaiveDate::from_ymd_opt(2024, 4, 5).unwrap())
        };

        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json["totalAmount"], "23.75");
        assert_eq!(json["transactionDate"], "2024-04-05");
        assert_eq!(json["category"], "");
        assert_eq!(json["description"], "Imported from receipt");
        assert_eq!(json["type"], "expense");
    }

    #[test]
    fn test_absent_amount_is_null() {
        let fields = ExtractedFields::empty(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let json = serde_json::to_value(&fields).unwrap();
        assert!(json["totalAmount"].is_null());
    }

    #[test]
    fn test_transaction_type_from_str() {
        assert_eq!("Income".parse::<TransactionType>(), Ok(TransactionType::Income));
        assert_eq!(" expense ".parse::<TransactionType>(), Ok(TransactionType::Expense));
        assert!("transfer".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_transaction_type_defaults_to_expense() {
        assert_eq!(TransactionType::default(), TransactionType::Expense);
    }
}
