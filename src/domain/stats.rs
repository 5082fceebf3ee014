use super::{Cents, Transaction, TransactionType};

/// Aggregate view of the whole ledger. Never persisted; recomputed on request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total_income: Cents,
    pub total_expenses: Cents,
    pub balance: Cents,
}

impl Stats {
    pub fn from_totals(total_income: Cents, total_expenses: Cents) -> Self {
        Self {
            total_income,
            total_expenses,
            balance: total_income.saturating_sub(total_expenses),
        }
    }

    /// Compute stats from a list of transactions.
    /// Matches the SQL aggregation done by the repository; sums saturate instead of overflowing.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let (income, expenses) =
            transactions
                .iter()
                .fold((0, 0), |(income, expenses): (Cents, Cents), tx| match tx.transaction_type {
                    TransactionType::Income => (income.saturating_add(tx.amount_cents), expenses),
                    TransactionType::Expense => (income, expenses.saturating_add(tx.amount_cents)),
                });
        Self::from_totals(income, expenses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{parse_date, NewTransaction};

    #[test]
    fn test_empty_stats_are_zero() {
        assert_eq!(Stats::from_transactions(&[]), Stats::default());
        assert_eq!(Stats::default(), Stats { total_income: 0, total_expenses: 0, balance: 0 });
    }

    #[test]
    fn test_stats_from_transactions() {
        let day = parse_date("2024-01-01").unwrap();
        let txs = vec![
            NewTransaction::new(10000, TransactionType::Income, "Pensja", day).into_transaction(1),
            NewTransaction::new(4000, TransactionType::Expense, "Jedzenie", day).into_transaction(2),
            NewTransaction::new(2500, TransactionType::Expense, "Transport", day).into_transaction(3),
        ];
        let stats = Stats::from_transactions(&txs);
        assert_eq!(stats.total_income, 10000);
        assert_eq!(stats.total_expenses, 6500);
        assert_eq!(stats.balance, 3500);
        assert_eq!(stats.balance, txs.iter().map(|t| t.signed_amount()).sum::<Cents>());
    }

    #[test]
    fn test_stats_saturate_on_huge_totals() {
        let day = parse_date("2024-01-01").unwrap();
        let txs: Vec<_> = (0..3)
            .map(|id| {
                NewTransaction::new(Cents::MAX / 2, TransactionType::Income, "Inwestycje", day)
                    .into_transaction(id)
            })
            .collect();
        let stats = Stats::from_transactions(&txs);
        assert_eq!(stats.total_income, Cents::MAX);
        assert_eq!(stats.balance, Cents::MAX);
    }

    #[test]
    fn test_balance_can_go_negative() {
        let stats = Stats::from_totals(1000, 2500);
        assert_eq!(stats.balance, -1500);
    }
}
