use std::path::PathBuf;

use dirs::data_dir;

/// Directory created under the platform's per-user data directory.
pub const APP_DIR_NAME: &str = "budget-ledger";

/// File name of the ledger database inside [`APP_DIR_NAME`].
pub const DATABASE_FILE: &str = "budget.db";

/// Environment variable that overrides the database location.
pub const DATABASE_ENV: &str = "BUDGET_LEDGER_DB";

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "budget_ledger=info";

/// Returns the default database path, e.g. `~/.local/share/budget-ledger/budget.db`.
/// Falls back to the working directory when the platform has no data directory.
pub fn default_database_path() -> PathBuf {
    match data_dir() {
        Some(dir) => dir.join(APP_DIR_NAME).join(DATABASE_FILE),
        None => PathBuf::from(DATABASE_FILE),
    }
}

/// An explicit path (flag or environment) wins over the default location.
pub fn resolve_database_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(default_database_path)
}
