//! Fundamental types for the X1Coin ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! addresses, token amounts, timestamps and the injected clock, and the fixed
//! construction parameters.

pub mod address;
pub mod amount;
pub mod params;
pub mod time;

pub use address::{Address, AddressParseError};
pub use amount::TokenAmount;
pub use params::TokenParams;
pub use time::{Clock, SystemClock, Timestamp, SECS_PER_DAY};
