//! Transaction ledger persistence.

#[cfg(feature = "store")]
mod sqlite;

#[cfg(feature = "store")]
pub use sqlite::SqliteStore;

use crate::error::StoreError;
use crate::models::{
    Category, NewTransaction, Page, PageRequest, Transaction, TransactionFilter, TransactionType,
};

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Per-user transaction storage.
///
/// Every operation is scoped to `user_id`; ids belonging to another user
/// behave as if they did not exist.
pub trait TransactionStore {
    /// Save a confirmed transaction.
    fn create(&mut self, user_id: i64, transaction: NewTransaction) -> Result<Transaction>;

    /// Fetch one transaction.
    fn get(&self, user_id: i64, id: i64) -> Result<Transaction>;

    /// One page of matching transactions, newest first.
    fn list(
        &self,
        user_id: i64,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> Result<Page<Transaction>>;

    /// Every matching transaction, newest first.
    fn matching(&self, user_id: i64, filter: &TransactionFilter) -> Result<Vec<Transaction>>;

    /// Replace the editable values of a transaction.
    fn update(&mut self, user_id: i64, id: i64, transaction: NewTransaction)
    -> Result<Transaction>;

    /// Remove a transaction.
    fn delete(&mut self, user_id: i64, id: i64) -> Result<()>;
}

/// The shared category catalogue.
pub trait CategoryStore {
    /// Categories ordered by name, optionally of one type only.
    fn categories(&self, transaction_type: Option<TransactionType>) -> Result<Vec<Category>>;
}
