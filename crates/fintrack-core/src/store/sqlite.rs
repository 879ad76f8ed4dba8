//! SQLite-backed transaction store.

use std::path::Path;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::category::DEFAULT_COLOR;
use crate::models::{
    Category, NewTransaction, Page, PageRequest, Pagination, Transaction, TransactionFilter,
    TransactionType, DEFAULT_CATEGORIES, MAX_AMOUNT,
};

use super::{CategoryStore, Result, TransactionStore};

const TRANSACTION_COLUMNS: &str =
    "id, user_id, type, amount, category, description, date, receipt_path, created_at";

/// Stores transactions and categories in one SQLite database.
pub struct SqliteStore {
    connection: Connection,
}

/// A transaction row before its text columns are decoded.
struct TransactionRow {
    id: i64,
    user_id: i64,
    transaction_type: String,
    amount: String,
    category: String,
    description: Option<String>,
    date: NaiveDate,
    receipt_path: Option<String>,
    created_at: NaiveDateTime,
}

impl TransactionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            transaction_type: row.get(2)?,
            amount: row.get(3)?,
            category: row.get(4)?,
            description: row.get(5)?,
            date: row.get(6)?,
            receipt_path: row.get(7)?,
            created_at: row.get(8)?,
        })
    }
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = StoreError;

    fn try_from(row: TransactionRow) -> Result<Self> {
        let transaction_type = TransactionType::from_str(&row.transaction_type).map_err(|_| {
            StoreError::Corrupt {
                column: "type",
                value: row.transaction_type.clone(),
            }
        })?;
        let amount = Decimal::from_str(&row.amount)
            .ok()
            .filter(|amount| (Decimal::ZERO..=MAX_AMOUNT).contains(amount))
            .ok_or_else(|| StoreError::Corrupt {
                column: "amount",
                value: row.amount.clone(),
            })?;

        Ok(Transaction {
            id: row.id,
            user_id: row.user_id,
            transaction_type,
            amount,
            category: row.category,
            description: row.description,
            date: row.date,
            receipt_path: row.receipt_path,
            created_at: row.created_at,
        })
    }
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let store = Self::from_connection(Connection::open(path)?)?;
        info!("Opened transaction store at {}", path.display());
        Ok(store)
    }

    /// A throwaway database, for tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> Result<Self> {
        let store = Self { connection };
        store.create_tables()?;
        store.seed_categories()?;
        Ok(store)
    }

    fn create_tables(&self) -> Result<()> {
        self.connection.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                amount TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT,
                date TEXT NOT NULL,
                receipt_path TEXT,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_transactions_user_date
                ON transactions (user_id, date);
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                color TEXT NOT NULL DEFAULT '{DEFAULT_COLOR}',
                UNIQUE (name, type)
            );"
        ))?;
        Ok(())
    }

    fn seed_categories(&self) -> Result<()> {
        let mut stmt = self
            .connection
            .prepare("INSERT OR IGNORE INTO categories (name, type, color) VALUES (?1, ?2, ?3)")?;

        let mut inserted = 0;
        for (name, kind, color) in DEFAULT_CATEGORIES {
            inserted += stmt.execute(params![name, kind.as_str(), color])?;
        }

        if inserted > 0 {
            debug!("Seeded {} default categories", inserted);
        }
        Ok(())
    }

    /// Add a category; an existing `(name, type)` pair is left unchanged.
    pub fn add_category(&mut self, category: &Category) -> Result<()> {
        self.connection.execute(
            "INSERT OR IGNORE INTO categories (name, type, color) VALUES (?1, ?2, ?3)",
            params![
                category.name,
                category.transaction_type.as_str(),
                category.color
            ],
        )?;
        Ok(())
    }

    /// WHERE clause and parameters shared by listing and counting.
    fn where_clause(user_id: i64, filter: &TransactionFilter) -> (String, Vec<Value>) {
        let mut clauses = vec!["user_id = ?1".to_string()];
        let mut values = vec![Value::Integer(user_id)];

        if let Some((start, end)) = filter.date_range() {
            clauses.push(format!(
                "date BETWEEN ?{} AND ?{}",
                values.len() + 1,
                values.len() + 2
            ));
            values.push(Value::Text(start.to_string()));
            values.push(Value::Text(end.to_string()));
        }

        if let Some(kind) = filter.transaction_type {
            clauses.push(format!("type = ?{}", values.len() + 1));
            values.push(Value::Text(kind.as_str().to_string()));
        }

        if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
            clauses.push(format!("category = ?{}", values.len() + 1));
            values.push(Value::Text(category.to_string()));
        }

        (format!("WHERE {}", clauses.join(" AND ")), values)
    }

    fn query_transactions(&self, sql: &str, values: &[Value]) -> Result<Vec<Transaction>> {
        let rows = self
            .connection
            .prepare(sql)?
            .query_map(params_from_iter(values.iter()), TransactionRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(Transaction::try_from).collect()
    }
}

fn amount_text(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

impl TransactionStore for SqliteStore {
    fn create(&mut self, user_id: i64, transaction: NewTransaction) -> Result<Transaction> {
        transaction.validate()?;
        let row = self
            .connection
            .prepare(&format!(
                "INSERT INTO transactions
                    (user_id, type, amount, category, description, date, receipt_path)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 RETURNING {TRANSACTION_COLUMNS}"
            ))?
            .query_row(
                params![
                    user_id,
                    transaction.transaction_type.as_str(),
                    amount_text(transaction.amount),
                    transaction.category,
                    transaction.description,
                    transaction.date,
                    transaction.receipt_path,
                ],
                TransactionRow::from_row,
            )?;

        let created = Transaction::try_from(row)?;
        debug!("Created transaction {} for user {}", created.id, user_id);
        Ok(created)
    }

    fn get(&self, user_id: i64, id: i64) -> Result<Transaction> {
        let row = self
            .connection
            .prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1 AND user_id = ?2"
            ))?
            .query_row(params![id, user_id], TransactionRow::from_row)
            .optional()?
            .ok_or(StoreError::NotFound)?;

        Transaction::try_from(row)
    }

    fn list(
        &self,
        user_id: i64,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> Result<Page<Transaction>> {
        let page = PageRequest::new(page.page, page.limit);
        let (where_clause, mut values) = Self::where_clause(user_id, filter);

        let total: i64 = self.connection.query_row(
            &format!("SELECT COUNT(*) FROM transactions {where_clause}"),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )?;

        let limit_index = values.len() + 1;
        values.push(Value::Integer(i64::from(page.limit)));
        values.push(Value::Integer(i64::try_from(page.offset()).unwrap_or(i64::MAX)));

        let items = self.query_transactions(
            &format!(
                "SELECT {TRANSACTION_COLUMNS} FROM transactions {where_clause}
                 ORDER BY date DESC, id DESC
                 LIMIT ?{} OFFSET ?{}",
                limit_index,
                limit_index + 1
            ),
            &values,
        )?;

        Ok(Page {
            items,
            pagination: Pagination::new(page, u64::try_from(total).unwrap_or(0)),
        })
    }

    fn matching(&self, user_id: i64, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let (where_clause, values) = Self::where_clause(user_id, filter);
        self.query_transactions(
            &format!(
                "SELECT {TRANSACTION_COLUMNS} FROM transactions {where_clause}
                 ORDER BY date DESC, id DESC"
            ),
            &values,
        )
    }

    fn update(
        &mut self,
        user_id: i64,
        id: i64,
        transaction: NewTransaction,
    ) -> Result<Transaction> {
        transaction.validate()?;
        let changed = self.connection.execute(
            "UPDATE transactions
             SET type = ?1, amount = ?2, category = ?3, description = ?4, date = ?5
             WHERE id = ?6 AND user_id = ?7",
            params![
                transaction.transaction_type.as_str(),
                amount_text(transaction.amount),
                transaction.category,
                transaction.description,
                transaction.date,
                id,
                user_id,
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound);
        }
        self.get(user_id, id)
    }

    fn delete(&mut self, user_id: i64, id: i64) -> Result<()> {
        let changed = self.connection.execute(
            "DELETE FROM transactions WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound);
        }
        debug!("Deleted transaction {} for user {}", id, user_id);
        Ok(())
    }
}

impl CategoryStore for SqliteStore {
    fn categories(&self, transaction_type: Option<TransactionType>) -> Result<Vec<Category>> {
        let mut stmt = self.connection.prepare(
            "SELECT name, type, color FROM categories
             WHERE ?1 IS NULL OR type = ?1
             ORDER BY name, type",
        )?;

        let rows = stmt
            .query_map(params![transaction_type.map(|t| t.as_str())], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(name, kind, color)| {
                let transaction_type = TransactionType::from_str(&kind)
                    .map_err(|_| StoreError::Corrupt { column: "type", value: kind })?;
                Ok(Category {
                    name,
                    transaction_type,
                    color,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_transaction(kind: TransactionType, amount: &str, category: &str, on: NaiveDate) -> NewTransaction {
        NewTransaction {
            transaction_type: kind,
            amount: Decimal::from_str(amount).unwrap(),
            category: category.to_string(),
            description: None,
            date: on,
            receipt_path: None,
        }
    }

    fn seeded_store() -> SqliteStore {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let rows = [
            (TransactionType::Expense, "12.50", "Food & Dining", date(2024, 1, 5)),
            (TransactionType::Expense, "40.00", "Travel", date(2024, 1, 20)),
            (TransactionType::Income, "2500.00", "Salary", date(2024, 1, 31)),
            (TransactionType::Expense, "7.25", "Food & Dining", date(2024, 2, 2)),
        ];
        for (kind, amount, category, on) in rows {
            store.create(1, new_transaction(kind, amount, category, on)).unwrap();
        }
        store
            .create(2, new_transaction(TransactionType::Expense, "99.00", "Travel", date(2024, 1, 10)))
            .unwrap();
        store
    }

    #[test]
    fn test_create_and_get() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let created = store
            .create(
                1,
                new_transaction(TransactionType::Expense, "23.75", "Shopping", date(2024, 4, 5))
                    .with_receipt_path("uploads/r.pdf"),
            )
            .unwrap();

        let fetched = store.get(1, created.id).unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.amount, Decimal::from_str("23.75").unwrap());
        assert_eq!(fetched.receipt_path.as_deref(), Some("uploads/r.pdf"));
    }

    #[test]
    fn test_other_users_records_are_invisible() {
        let mut store = seeded_store();
        let foreign = store.matching(2, &TransactionFilter::default()).unwrap()[0].id;

        assert!(matches!(store.get(1, foreign), Err(StoreError::NotFound)));
        assert!(matches!(store.delete(1, foreign), Err(StoreError::NotFound)));
        let edit = new_transaction(TransactionType::Expense, "1.00", "Travel", date(2024, 1, 1));
        assert!(matches!(store.update(1, foreign, edit), Err(StoreError::NotFound)));
    }

    #[test]
    fn test_list_newest_first_with_pagination() {
        let store = seeded_store();
        let page = store
            .list(1, &TransactionFilter::default(), PageRequest::new(1, 3))
            .unwrap();

        let dates: Vec<NaiveDate> = page.items.iter().map(|t| t.date).collect();
        assert_eq!(dates, vec![date(2024, 2, 2), date(2024, 1, 31), date(2024, 1, 20)]);
        assert_eq!(page.pagination.total, 4);
        assert_eq!(page.pagination.total_pages, 2);

        let second = store
            .list(1, &TransactionFilter::default(), PageRequest::new(2, 3))
            .unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].date, date(2024, 1, 5));
    }

    #[test]
    fn test_filters() {
        let store = seeded_store();

        let january = TransactionFilter {
            start_date: Some(date(2024, 1, 1)),
            end_date: Some(date(2024, 1, 31)),
            ..Default::default()
        };
        assert_eq!(store.matching(1, &january).unwrap().len(), 3);

        let food = TransactionFilter {
            transaction_type: Some(TransactionType::Expense),
            category: Some("Food & Dining".to_string()),
            ..Default::default()
        };
        let found = store.list(1, &food, PageRequest::default()).unwrap();
        assert_eq!(found.pagination.total, 2);
        assert!(found.items.iter().all(|t| food.matches(t)));

        // A half-open range is ignored.
        let open = TransactionFilter {
            start_date: Some(date(2024, 2, 1)),
            ..Default::default()
        };
        assert_eq!(store.matching(1, &open).unwrap().len(), 4);
    }

    #[test]
    fn test_update_and_delete() {
        let mut store = seeded_store();
        let target = store.matching(1, &TransactionFilter::default()).unwrap()[0].clone();

        let updated = store
            .update(
                1,
                target.id,
                new_transaction(TransactionType::Expense, "8", "Shopping", date(2024, 2, 3)),
            )
            .unwrap();
        assert_eq!(updated.category, "Shopping");
        assert_eq!(updated.amount, Decimal::from(8));
        assert_eq!(updated.created_at, target.created_at);

        store.delete(1, target.id).unwrap();
        assert!(matches!(store.get(1, target.id), Err(StoreError::NotFound)));
    }

    #[test]
    fn test_oversized_amount_is_not_written() {
        let mut store = seeded_store();
        let result = store.create(
            1,
            new_transaction(TransactionType::Income, "100000000", "Salary", date(2024, 3, 1)),
        );
        assert!(matches!(
            result,
            Err(StoreError::Invalid(ValidationError::AmountTooLarge))
        ));
        assert_eq!(store.matching(1, &TransactionFilter::default()).unwrap().len(), 4);
    }

    #[test]
    fn test_out_of_range_stored_amount_is_corrupt() {
        let mut store = seeded_store();
        let target = store.matching(1, &TransactionFilter::default()).unwrap()[0].clone();
        store
            .connection
            .execute(
                "UPDATE transactions SET amount = ?1 WHERE id = ?2",
                params!["79228162514264337593543950335", target.id],
            )
            .unwrap();

        assert!(matches!(
            store.get(1, target.id),
            Err(StoreError::Corrupt { column: "amount", .. })
        ));
    }

    #[test]
    fn test_default_categories_seeded_once() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.seed_categories().unwrap();

        let all = store.categories(None).unwrap();
        assert_eq!(all.len(), DEFAULT_CATEGORIES.len());
        assert_eq!(all[0].name, "Bills & Utilities");

        let income = store.categories(Some(TransactionType::Income)).unwrap();
        let names: Vec<&str> = income.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Freelance", "Investment", "Other Income", "Salary"]);

        store
            .add_category(&Category {
                name: "Pets".to_string(),
                transaction_type: TransactionType::Expense,
                color: DEFAULT_COLOR.to_string(),
            })
            .unwrap();
        assert_eq!(store.categories(None).unwrap().len(), DEFAULT_CATEGORIES.len() + 1);
    }
}
