//! Library side of the `x1c` binary: configuration and scripted replay.

pub mod config;
pub mod error;
pub mod replay;

pub use config::CliConfig;
pub use error::CliError;
pub use replay::{run_script, ReplayReport, ReplayScript, Step};
