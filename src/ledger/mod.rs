//! Ledger access: account resolution, entry construction and the run session

pub mod account;
pub mod session;
pub mod transaction;

pub use account::*;
pub use session::*;
pub use transaction::*;
