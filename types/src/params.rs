//! Token parameters fixed at construction.
//!
//! None of these are runtime-configurable: a ledger is built from
//! [`TokenParams::x1c_defaults`] and keeps them for its whole life.

use crate::amount::TokenAmount;
use crate::time::SECS_PER_DAY;
use serde::{Deserialize, Serialize};

/// Construction constants for an X1Coin ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenParams {
    // ── Metadata ─────────────────────────────────────────────────────────
    pub name: String,
    pub symbol: String,
    pub decimals: u8,

    // ── Supply & allocation ──────────────────────────────────────────────
    /// Total supply minted at construction (base units).
    pub total_supply: u128,

    /// Share of the supply credited, spendable, to the issuer (percent).
    pub issuer_percent: u128,

    /// Share of the supply held as a locked balance for the team (percent).
    pub team_percent: u128,

    /// Share of the supply credited, spendable, to the community (percent).
    pub community_percent: u128,

    // ── Vesting ──────────────────────────────────────────────────────────
    /// Seconds after construction before the team may release its tokens.
    pub vesting_lock_secs: u64,

    // ── Staking ──────────────────────────────────────────────────────────
    /// Simple annual reward rate (percent).
    pub reward_rate_percent: u128,

    /// Minimum seconds a stake must be held before it can be withdrawn.
    pub min_stake_duration_secs: u64,

    /// Length of the reward year in seconds.
    pub secs_per_year: u64,
}

impl TokenParams {
    /// 1 billion whole tokens.
    pub const X1C_TOTAL_SUPPLY: u128 = 1_000_000_000 * TokenAmount::UNIT;

    /// The X1Coin configuration.
    pub fn x1c_defaults() -> Self {
        Self {
            name: "X1Coin".to_string(),
            symbol: "X1C".to_string(),
            decimals: TokenAmount::DECIMALS,

            total_supply: Self::X1C_TOTAL_SUPPLY,
            issuer_percent: 50,
            team_percent: 30,
            community_percent: 20,

            vesting_lock_secs: 180 * SECS_PER_DAY, // ~6 months

            reward_rate_percent: 10,
            min_stake_duration_secs: 30 * SECS_PER_DAY,
            secs_per_year: 365 * SECS_PER_DAY,
        }
    }

    /// Issuer allocation (spendable at construction).
    pub fn issuer_allocation(&self) -> TokenAmount {
        self.share(self.issuer_percent)
    }

    /// Team allocation (locked at construction).
    pub fn team_allocation(&self) -> TokenAmount {
        self.share(self.team_percent)
    }

    /// Community allocation (spendable at construction).
    pub fn community_allocation(&self) -> TokenAmount {
        self.share(self.community_percent)
    }

    /// `⌊total_supply × percent / 100⌋` without forming the full product.
    fn share(&self, percent: u128) -> TokenAmount {
        let whole = (self.total_supply / 100).saturating_mul(percent);
        let rest = (self.total_supply % 100).saturating_mul(percent) / 100;
        TokenAmount::new(whole.saturating_add(rest))
    }
}

/// Default is the X1Coin configuration.
impl Default for TokenParams {
    fn default() -> Self {
        Self::x1c_defaults()
    }
}
