//! Local driver for the Covenant engine: a JSON state file holds the
//! engine snapshot plus the reference ledger, reloaded on every CLI
//! invocation and saved back after each operation.

pub mod error;
pub mod store;

pub use store::StateFile;
