// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use budget_ledger::application::LedgerService;
use budget_ledger::domain::{
    parse_cents, parse_date, NewTransaction, Transaction, TransactionType,
};
use tempfile::TempDir;

/// Helper to create an initialized service on a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("budget.db");
    let service = LedgerService::open(&db_path).await?;
    Ok((service, temp_dir))
}

/// Build a transaction input from human-friendly values
pub fn new_tx(
    amount: &str,
    transaction_type: TransactionType,
    category: &str,
    date: &str,
) -> NewTransaction {
    NewTransaction::new(
        parse_cents(amount).unwrap(),
        transaction_type,
        category,
        parse_date(date).unwrap(),
    )
}

pub async fn income(
    service: &LedgerService,
    amount: &str,
    category: &str,
    date: &str,
) -> Result<Transaction> {
    Ok(service
        .create_transaction(new_tx(amount, TransactionType::Income, category, date))
        .await?)
}

pub async fn expense(
    service: &LedgerService,
    amount: &str,
    category: &str,
    date: &str,
) -> Result<Transaction> {
    Ok(service
        .create_transaction(new_tx(amount, TransactionType::Expense, category, date))
        .await?)
}
