use thiserror::Error;

/// Amounts are stored as integer cents so that totals and balances are exact.
/// 1 unit = 100 cents, so 40.00 = 4000 cents.
pub type Cents = i64;

/// Largest single amount accepted on any input path (10^13 units).
pub const MAX_CENTS: Cents = 1_000_000_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCentsError {
    #[error("invalid money format: {0}")]
    InvalidFormat(String),

    #[error("amount must be a non-negative magnitude")]
    Negative,

    #[error("amount out of range")]
    OutOfRange,

    #[error("amount {0} is more precise than one cent")]
    SubCent(String),
}

/// Format cents as a plain decimal string.
/// Example: 4000 -> "40.00", 5 -> "0.05"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Parse a decimal magnitude such as "40", "12.5" or ".99" into cents.
/// Digits beyond the second decimal place are truncated.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    if input.starts_with('-') {
        return Err(ParseCentsError::Negative);
    }
    let invalid = || ParseCentsError::InvalidFormat(input.to_string());

    let (units_str, fraction_str) = input.split_once('.').unwrap_or((input, ""));
    if units_str.is_empty() && fraction_str.is_empty() {
        return Err(invalid());
    }
    if !units_str.chars().chain(fraction_str.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str.parse().map_err(|_| ParseCentsError::OutOfRange)?
    };

    let mut fraction: String = fraction_str.chars().take(2).collect();
    while fraction.len() < 2 {
        fraction.push('0');
    }
    let fraction: i64 = fraction.parse().map_err(|_| invalid())?;

    units
        .checked_mul(100)
        .and_then(|c| c.checked_add(fraction))
        .filter(|cents| *cents <= MAX_CENTS)
        .ok_or(ParseCentsError::OutOfRange)
}

/// Convert a decimal amount received from a caller (e.g. a JSON number) into cents.
/// The amount must be a whole number of cents; finer values are rejected, not rounded.
pub fn cents_from_decimal(amount: f64) -> Result<Cents, ParseCentsError> {
    if !amount.is_finite() {
        return Err(ParseCentsError::InvalidFormat(amount.to_string()));
    }
    if amount < 0.0 {
        return Err(ParseCentsError::Negative);
    }
    // Display gives the shortest digits that round-trip, so 19.99 stays "19.99"
    let text = amount.to_string();
    if text.split_once('.').is_some_and(|(_, fraction)| fraction.len() > 2) {
        return Err(ParseCentsError::SubCent(text));
    }
    parse_cents(&text)
}

/// Convert cents back into the decimal amount shown to callers.
pub fn cents_to_decimal(cents: Cents) -> f64 {
    cents as f64 / 100.0
}
