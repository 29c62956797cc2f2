//! X1Coin — a fungible-token ledger with team vesting and staking rewards.
//!
//! Three mechanisms share one consistency domain:
//! - the ledger: balances, allowances, `transfer` / `approve` / `transfer_from`
//! - the vesting releaser: the team's locked allocation, released once after 180 days
//! - the staking engine: escrowed principal returned with a linear 10 % APR reward
//!
//! After every committed operation
//! `Σ balances + Σ locked + Σ staked == total_supply`.
//!
//! [`X1Coin`] is the entry point; the engines are exposed for embedding and tests.

pub mod coin;
pub mod error;
pub mod event;
pub mod genesis;
pub mod ledger;
pub mod metrics;
pub mod reward;
pub mod snapshot;
pub mod staking;
pub mod vesting;

pub use coin::{Receipt, X1Coin};
pub use error::{TokenError, TokenResult};
pub use event::{EventBus, EventLog, EventRecord, LedgerEvent};
pub use genesis::{create_genesis, Genesis, GenesisConfig};
pub use ledger::Ledger;
pub use metrics::TokenMetrics;
pub use reward::calculate_reward;
pub use snapshot::{AccountSnapshot, LedgerSnapshot};
pub use staking::{StakeRecord, StakeState, StakingEngine, Withdrawal};
pub use vesting::{VestingReleaser, VestingState};
