//! Ledger records and the query shapes used to list them.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

use super::fields::{ExtractedFields, TransactionType};

/// Largest amount a single transaction may carry.
///
/// Keeps ledger totals far from the `Decimal` range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// A stored transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: NaiveDate,
    /// Where the source receipt was kept, if it was imported from one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_path: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Confirmed values for a transaction that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_path: Option<String>,
}

/// Changes a reviewer made to the extracted fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewEdits {
    pub transaction_type: Option<TransactionType>,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

impl NewTransaction {
    /// Check the values a form would require.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(ValidationError::NegativeAmount);
        }
        if self.amount > MAX_AMOUNT {
            return Err(ValidationError::AmountTooLarge);
        }
        if self.category.trim().is_empty() {
            return Err(ValidationError::MissingCategory);
        }
        Ok(())
    }

    /// Merge reviewer edits over the extracted fields and validate the result.
    pub fn from_review(
        fields: ExtractedFields,
        edits: ReviewEdits,
    ) -> Result<Self, ValidationError> {
        let amount = edits
            .amount
            .or(fields.total_amount)
            .ok_or(ValidationError::MissingAmount)?;

        let description = edits
            .description
            .unwrap_or(fields.description)
            .trim()
            .to_string();

        let transaction = Self {
            transaction_type: edits.transaction_type.unwrap_or(fields.transaction_type),
            amount,
            category: edits.category.unwrap_or(fields.category).trim().to_string(),
            description: (!description.is_empty()).then_some(description),
            date: edits.date.unwrap_or(fields.transaction_date),
            receipt_path: None,
        };

        transaction.validate()?;
        Ok(transaction)
    }

    pub fn with_receipt_path(mut self, path: impl Into<String>) -> Self {
        self.receipt_path = Some(path.into());
        self
    }
}

/// Optional constraints on a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    pub category: Option<String>,
}

impl TransactionFilter {
    /// The inclusive date range, only when both ends are set.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some((start, end)) = self.date_range() {
            if transaction.date < start || transaction.date > end {
                return false;
            }
        }
        if let Some(kind) = self.transaction_type {
            if transaction.transaction_type != kind {
                return false;
            }
        }
        match self.category.as_deref() {
            Some(category) if !category.is_empty() => transaction.category == category,
            _ => true,
        }
    }
}

/// One-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: u32 = 10;

    /// Clamps page and limit to at least one.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.limit.max(1))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_LIMIT)
    }
}

/// Position of a page within the full result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        let limit = u64::from(request.limit.max(1));
        Self {
            page: request.page,
            limit: request.limit,
            total,
            total_pages: total.div_ceil(limit),
        }
    }
}

/// A page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}
