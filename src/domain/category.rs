use super::TransactionType;

const EXPENSE_CATEGORIES: &[&str] = &[
    "Jedzenie", "Transport", "Rozrywka", "Zakupy", "Zdrowie", "Rachunki", "Inne",
];

const INCOME_CATEGORIES: &[&str] = &["Pensja", "Freelance", "Inwestycje", "Prezent", "Inne"];

/// Category labels offered to the user for a transaction type.
/// These are suggestions only: the store accepts any non-empty label.
pub fn suggested_categories(transaction_type: TransactionType) -> &'static [&'static str] {
    match transaction_type {
        TransactionType::Income => INCOME_CATEGORIES,
        TransactionType::Expense => EXPENSE_CATEGORIES,
    }
}
