use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::domain::{
    Cents, NewTransaction, Transaction, TransactionId, TransactionType, DATE_FORMAT,
};

use super::MIGRATION_001_INITIAL;

const TRANSACTION_COLUMNS: &str = "id, amount_cents, type, category, date, description";

/// Per-category aggregate returned by [`Repository::totals_by_category`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: String,
    pub count: i64,
    pub total: Cents,
}

/// Repository for persisting and querying transactions.
/// Every method issues a single SQL statement, so each call is atomic.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the SQLite database file at `path`, creating it if missing.
    /// The pool holds a single connection: one process, one writer.
    pub async fn connect(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        Ok(Self::new(pool))
    }

    /// Create the schema if absent. Existing data is left untouched.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Close the underlying pool, waiting for in-flight queries to finish.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Insert a new transaction and return it with its assigned id.
    pub async fn insert_transaction(&self, new: &NewTransaction) -> Result<Transaction> {
        let row = sqlx::query(
            r#"
            INSERT INTO transactions (amount_cents, type, category, date, description)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(new.amount_cents)
        .bind(new.transaction_type.as_str())
        .bind(&new.category)
        .bind(new.date.format(DATE_FORMAT).to_string())
        .bind(&new.description)
        .fetch_one(&self.pool)
        .await
        .context("Failed to save transaction")?;

        let id: TransactionId = row.get("id");
        Ok(new.clone().into_transaction(id))
    }

    /// List transactions, most recent date first; same-day entries newest id first.
    pub async fn list_transactions(&self, limit: Option<usize>) -> Result<Vec<Transaction>> {
        let mut query = format!(
            "SELECT {} FROM transactions ORDER BY date DESC, id DESC",
            TRANSACTION_COLUMNS
        );
        if let Some(lim) = limit {
            query.push_str(&format!(" LIMIT {}", lim));
        }

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// Delete a transaction by id. Returns whether a row was removed.
    pub async fn delete_transaction(&self, id: TransactionId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete transaction")?;
        Ok(result.rows_affected() > 0)
    }

    /// Total income and total expenses in one statement, so both come from the same snapshot.
    /// Sums over no rows are zero.
    pub async fn totals(&self) -> Result<(Cents, Cents)> {
        let row = sqlx::query(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN type = 'income' THEN amount_cents ELSE 0 END), 0) as income,
                COALESCE(SUM(CASE WHEN type = 'expense' THEN amount_cents ELSE 0 END), 0) as expenses
            FROM transactions
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to compute totals")?;

        Ok((row.get("income"), row.get("expenses")))
    }

    /// Totals per category for one transaction type, largest first.
    pub async fn totals_by_category(
        &self,
        transaction_type: TransactionType,
    ) -> Result<Vec<CategoryTotal>> {
        let rows = sqlx::query(
            r#"
            SELECT category, COUNT(*) as count, SUM(amount_cents) as total
            FROM transactions
            WHERE type = ?
            GROUP BY category
            ORDER BY total DESC, category ASC
            "#,
        )
        .bind(transaction_type.as_str())
        .fetch_all(&self.pool)
        .await
        .context("Failed to aggregate transactions by category")?;

        Ok(rows
            .iter()
            .map(|row| CategoryTotal {
                category: row.get("category"),
                count: row.get("count"),
                total: row.get("total"),
            })
            .collect())
    }

    fn row_to_transaction(row: &SqliteRow) -> Result<Transaction> {
        let type_str: String = row.get("type");
        let date_str: String = row.get("date");

        Ok(Transaction {
            id: row.get("id"),
            amount_cents: row.get("amount_cents"),
            transaction_type: type_str
                .parse::<TransactionType>()
                .with_context(|| format!("Invalid transaction type in database: {}", type_str))?,
            category: row.get("category"),
            date: NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                .with_context(|| format!("Invalid date in database: {}", date_str))?,
            description: row.get("description"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::AppError;
    use crate::domain::parse_date;
    use tempfile::TempDir;

    async fn test_repo() -> Result<(Repository, TempDir)> {
        let temp_dir = TempDir::new()?;
        let repo = Repository::connect(&temp_dir.path().join("test.db")).await?;
        repo.migrate().await?;
        Ok((repo, temp_dir))
    }

    fn new_tx(cents: Cents, t: TransactionType, category: &str, date: &str) -> NewTransaction {
        NewTransaction::new(cents, t, category, parse_date(date).unwrap())
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() -> Result<()> {
        let (repo, _temp) = test_repo().await?;

        let a = repo
            .insert_transaction(&new_tx(100, TransactionType::Income, "Pensja", "2024-01-01"))
            .await?;
        let b = repo
            .insert_transaction(&new_tx(200, TransactionType::Expense, "Inne", "2024-01-01"))
            .await?;
        assert!(b.id > a.id);

        // AUTOINCREMENT: a deleted id is never handed out again
        assert!(repo.delete_transaction(b.id).await?);
        let c = repo
            .insert_transaction(&new_tx(300, TransactionType::Expense, "Inne", "2024-01-01"))
            .await?;
        assert!(c.id > b.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_check_constraint_rejects_unknown_type() -> Result<()> {
        let (repo, _temp) = test_repo().await?;

        let err = sqlx::query(
            "INSERT INTO transactions (amount_cents, type, category, date) VALUES (100, 'transfer', 'Inne', '2024-01-01')",
        )
        .execute(&repo.pool)
        .await
        .context("Failed to save transaction")
        .unwrap_err();

        assert!(matches!(AppError::from(err), AppError::ConstraintViolation(_)));
        assert!(repo.list_transactions(None).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_check_constraint_rejects_non_positive_amount() -> Result<()> {
        let (repo, _temp) = test_repo().await?;

        let err = repo
            .insert_transaction(&new_tx(0, TransactionType::Expense, "Inne", "2024-01-01"))
            .await
            .unwrap_err();
        assert!(matches!(AppError::from(err), AppError::ConstraintViolation(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() -> Result<()> {
        let (repo, _temp) = test_repo().await?;
        repo.insert_transaction(&new_tx(100, TransactionType::Income, "Pensja", "2024-01-01"))
            .await?;

        repo.migrate().await?;
        repo.migrate().await?;

        assert_eq!(repo.list_transactions(None).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_totals_by_category() -> Result<()> {
        let (repo, _temp) = test_repo().await?;
        for (cents, cat) in [(500, "Transport"), (1500, "Jedzenie"), (700, "Jedzenie")] {
            repo.insert_transaction(&new_tx(cents, TransactionType::Expense, cat, "2024-02-01"))
                .await?;
        }
        repo.insert_transaction(&new_tx(9000, TransactionType::Income, "Pensja", "2024-02-01"))
            .await?;

        let totals = repo.totals_by_category(TransactionType::Expense).await?;
        assert_eq!(
            totals,
            vec![
                CategoryTotal { category: "Jedzenie".into(), count: 2, total: 2200 },
                CategoryTotal { category: "Transport".into(), count: 1, total: 500 },
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_closed_pool_is_unavailable() -> Result<()> {
        let (repo, _temp) = test_repo().await?;
        repo.close().await;

        let err = repo.totals().await.unwrap_err();
        assert!(matches!(AppError::from(err), AppError::StorageUnavailable(_)));
        Ok(())
    }
}
