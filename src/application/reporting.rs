use serde::Serialize;

use crate::domain::{Cents, TransactionType};
use crate::storage::CategoryTotal;

/// Where the money went (or came from), grouped by category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryReport {
    pub transaction_type: TransactionType,
    pub categories: Vec<CategorySummary>,
    pub total: Cents,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub total: Cents,
    pub count: i64,
    pub percentage: f64,
}

impl CategoryReport {
    /// Build a report from repository aggregates, keeping their order.
    pub fn from_totals(transaction_type: TransactionType, totals: Vec<CategoryTotal>) -> Self {
        let total: Cents = totals.iter().map(|t| t.total).sum();
        let categories = totals
            .into_iter()
            .map(|t| CategorySummary {
                percentage: if total > 0 {
                    t.total as f64 / total as f64 * 100.0
                } else {
                    0.0
                },
                category: t.category,
                total: t.total,
                count: t.count,
            })
            .collect();

        Self {
            transaction_type,
            categories,
            total,
        }
    }
}
