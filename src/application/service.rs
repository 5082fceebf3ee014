use std::path::Path;

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::domain::{NewTransaction, Stats, Transaction, TransactionId, TransactionType};
use crate::storage::Repository;

use super::{AppError, CategoryReport};

/// The ledger store: owns the one open backing-store handle and exposes
/// create, list, delete and stats. This is the primary interface for any
/// client (CLI, bridge, tests).
///
/// A freshly constructed service is uninitialized. [`LedgerService::initialize`]
/// moves it to ready; every operation before that fails with
/// [`AppError::NotInitialized`].
pub struct LedgerService {
    repo: Repository,
    ready: bool,
}

impl LedgerService {
    /// Wrap an already-open repository. The schema is not touched until `initialize`.
    pub fn new(repo: Repository) -> Self {
        Self { repo, ready: false }
    }

    /// Open (creating if needed) the database at `path` and initialize it.
    /// Missing parent directories are created.
    pub async fn open(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory {}", parent.display()))?;
        }

        let repo = Repository::connect(path).await?;
        let mut service = Self::new(repo);
        service.initialize().await?;
        info!(path = %path.display(), "ledger opened");
        Ok(service)
    }

    /// Ensure the schema exists. Idempotent; never removes data.
    pub async fn initialize(&mut self) -> Result<(), AppError> {
        self.repo.migrate().await?;
        if !self.ready {
            debug!("ledger schema ready");
        }
        self.ready = true;
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Release the backing store.
    pub async fn close(self) {
        self.repo.close().await;
        debug!("ledger closed");
    }

    fn ensure_ready(&self) -> Result<(), AppError> {
        if self.ready {
            Ok(())
        } else {
            Err(AppError::NotInitialized)
        }
    }

    // ========================
    // Transaction operations
    // ========================

    /// Record a new transaction and return it with its assigned id.
    pub async fn create_transaction(&self, new: NewTransaction) -> Result<Transaction, AppError> {
        self.ensure_ready()?;

        if let Err(err) = new.validate() {
            warn!(error = %err, "rejected transaction");
            return Err(err.into());
        }

        let transaction = self.repo.insert_transaction(&new).await?;
        info!(
            id = transaction.id,
            transaction_type = %transaction.transaction_type,
            amount_cents = transaction.amount_cents,
            category = %transaction.category,
            "transaction recorded"
        );
        Ok(transaction)
    }

    /// All transactions: newest date first, same-day entries newest first.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        self.ensure_ready()?;
        let transactions = self.repo.list_transactions(None).await?;
        debug!(count = transactions.len(), "listed transactions");
        Ok(transactions)
    }

    /// The first `limit` entries of [`LedgerService::list_transactions`].
    pub async fn recent_transactions(&self, limit: usize) -> Result<Vec<Transaction>, AppError> {
        self.ensure_ready()?;
        Ok(self.repo.list_transactions(Some(limit)).await?)
    }

    /// Delete a transaction. Returns `false` if no transaction had that id.
    pub async fn delete_transaction(&self, id: TransactionId) -> Result<bool, AppError> {
        self.ensure_ready()?;
        let deleted = self.repo.delete_transaction(id).await?;
        if deleted {
            info!(id, "transaction deleted");
        } else {
            debug!(id, "no transaction to delete");
        }
        Ok(deleted)
    }

    // ========================
    // Aggregates
    // ========================

    /// Total income, total expenses and balance over the whole ledger.
    pub async fn stats(&self) -> Result<Stats, AppError> {
        self.ensure_ready()?;
        let (income, expenses) = self.repo.totals().await?;
        Ok(Stats::from_totals(income, expenses))
    }

    /// Totals per category for one transaction type.
    pub async fn category_breakdown(
        &self,
        transaction_type: TransactionType,
    ) -> Result<CategoryReport, AppError> {
        self.ensure_ready()?;
        let totals = self.repo.totals_by_category(transaction_type).await?;
        Ok(CategoryReport::from_totals(transaction_type, totals))
    }
}
