//! Shared utilities for the X1Coin ledger.

pub mod logging;
pub mod time;
pub mod units;

pub use logging::{init_logging, LogFormat};
pub use time::format_duration;
pub use units::{format_units, parse_units};
