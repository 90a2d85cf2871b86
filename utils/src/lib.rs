//! Shared utilities for the poll ledger.

pub mod logging;

pub use logging::{init_logging, LogFormat};
