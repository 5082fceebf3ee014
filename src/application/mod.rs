// Application layer: the ledger store's lifecycle, its operations and reports.
// Every client (CLI, bridge) goes through `LedgerService`.

pub mod error;
pub mod reporting;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;
