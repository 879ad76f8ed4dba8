//! Data models shared by the extractor, the store and the front ends.

pub mod category;
pub mod config;
pub mod fields;
pub mod transaction;

pub use category::{Category, DEFAULT_CATEGORIES};
pub use config::FintrackConfig;
pub use fields::{ExtractedFields, TransactionType, RECEIPT_DESCRIPTION};
pub use transaction::{
    NewTransaction, Page, PageRequest, Pagination, ReviewEdits, Transaction, TransactionFilter,
    MAX_AMOUNT,
};
