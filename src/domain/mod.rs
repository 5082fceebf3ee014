mod category;
mod money;
mod stats;
mod transaction;

pub use category::*;
pub use money::*;
pub use stats::*;
pub use transaction::*;
