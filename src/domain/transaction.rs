use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{format_cents, Cents, MAX_CENTS};

/// Identifier assigned by the store. Never reused, even after deletion.
pub type TransactionId = i64;

/// Calendar dates are persisted as ISO 8601 text, which sorts chronologically.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in (salary, gifts, ...)
    Income,
    /// Money going out (food, bills, ...)
    Expense,
}

impl TransactionType {
    pub const ALL: [TransactionType; 2] = [TransactionType::Income, TransactionType::Expense];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = TransactionError;

    /// Only the exact wire names are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(TransactionError::InvalidType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("Invalid transaction type '{0}' (expected 'income' or 'expense')")]
    InvalidType(String),

    #[error("Amount must be positive")]
    NonPositiveAmount,

    #[error("Amount must not exceed {0}")]
    AmountTooLarge(String),

    #[error("Category must not be empty")]
    EmptyCategory,

    #[error("Invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

/// Parse an ISO 8601 calendar date (no time of day).
pub fn parse_date(input: &str) -> Result<NaiveDate, TransactionError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| TransactionError::InvalidDate(input.to_string()))
}

/// A persisted income or expense event. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: TransactionId,
    pub amount_cents: Cents,
    pub transaction_type: TransactionType,
    pub category: String,
    pub date: NaiveDate,
    pub description: String,
}

impl Transaction {
    /// Amount with the sign implied by the type: income positive, expense negative.
    pub fn signed_amount(&self) -> Cents {
        match self.transaction_type {
            TransactionType::Income => self.amount_cents,
            TransactionType::Expense => -self.amount_cents,
        }
    }
}

/// Input to the store's create operation; the id is assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub amount_cents: Cents,
    pub transaction_type: TransactionType,
    pub category: String,
    pub date: NaiveDate,
    pub description: String,
}

impl NewTransaction {
    pub fn new(
        amount_cents: Cents,
        transaction_type: TransactionType,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            amount_cents,
            transaction_type,
            category: category.into(),
            date,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn validate(&self) -> Result<(), TransactionError> {
        if self.amount_cents <= 0 {
            return Err(TransactionError::NonPositiveAmount);
        }
        if self.amount_cents > MAX_CENTS {
            return Err(TransactionError::AmountTooLarge(format_cents(MAX_CENTS)));
        }
        if self.category.trim().is_empty() {
            return Err(TransactionError::EmptyCategory);
        }
        Ok(())
    }

    pub fn into_transaction(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            amount_cents: self.amount_cents,
            transaction_type: self.transaction_type,
            category: self.category,
            date: self.date,
            description: self.description,
        }
    }
}
