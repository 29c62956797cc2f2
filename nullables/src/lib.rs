//! Nullable infrastructure for deterministic testing.
//!
//! External capabilities the ledger consumes (current time, event delivery)
//! are abstracted behind traits or callbacks. This crate provides
//! test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the wall clock
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod recorder;

pub use clock::NullClock;
pub use recorder::Recorder;
