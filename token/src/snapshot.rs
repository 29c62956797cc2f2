//! Ledger snapshots — a consistent view of every account at one instant.
//!
//! A snapshot is taken under the ledger lock, so it never reflects a
//! partially applied operation. The hash is computed deterministically from
//! the account entries (sorted by address) so two snapshots of the same state
//! compare equal.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{TokenError, TokenResult};
use crate::ledger::Ledger;
use crate::staking::{StakeRecord, StakingEngine};
use crate::vesting::VestingReleaser;
use x1c_types::{Address, Timestamp, TokenAmount};

/// Current snapshot format.
pub const SNAPSHOT_VERSION: u32 = 1;

/// The state of a single account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub address: Address,
    /// Spendable balance.
    pub balance: TokenAmount,
    /// Locked (not yet released) balance.
    pub locked: TokenAmount,
    /// Active stake, if any.
    pub stake: Option<StakeRecord>,
}

/// Every account with a non-zero balance, locked balance or stake.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Blake2b-256 of the content.
    pub hash: [u8; 32],
    pub taken_at: Timestamp,
    pub total_supply: TokenAmount,
    /// Sorted by address.
    pub accounts: Vec<AccountSnapshot>,
    pub version: u32,
}

impl LedgerSnapshot {
    /// Capture the three components. Callers must hold the ledger lock.
    pub fn capture(
        ledger: &Ledger,
        vesting: &VestingReleaser,
        staking: &StakingEngine,
        taken_at: Timestamp,
    ) -> Self {
        let mut accounts: BTreeMap<Address, AccountSnapshot> = BTreeMap::new();
        let entry = |addr: &Address| AccountSnapshot {
            address: *addr,
            balance: TokenAmount::ZERO,
            locked: TokenAmount::ZERO,
            stake: None,
        };
        for (addr, balance) in ledger.balances() {
            accounts.entry(*addr).or_insert_with(|| entry(addr)).balance = *balance;
        }
        for (addr, locked) in vesting.locked_entries() {
            accounts.entry(*addr).or_insert_with(|| entry(addr)).locked = *locked;
        }
        for (addr, record) in staking.stakes() {
            accounts.entry(*addr).or_insert_with(|| entry(addr)).stake = Some(*record);
        }

        let mut snap = Self {
            hash: [0u8; 32],
            taken_at,
            total_supply: ledger.total_supply(),
            accounts: accounts.into_values().collect(),
            version: SNAPSHOT_VERSION,
        };
        snap.hash = snap.compute_hash();
        snap
    }

    /// Compute the Blake2b-256 hash of this snapshot deterministically.
    fn compute_hash(&self) -> [u8; 32] {
        use blake2::digest::consts::U32;
        use blake2::{Blake2b, Digest};

        let mut hasher = Blake2b::<U32>::new();
        hasher.update(self.version.to_le_bytes());
        hasher.update(self.taken_at.as_secs().to_le_bytes());
        hasher.update(self.total_supply.raw().to_le_bytes());
        for account in &self.accounts {
            hasher.update(account.address.as_bytes());
            hasher.update(account.balance.raw().to_le_bytes());
            hasher.update(account.locked.raw().to_le_bytes());
            match &account.stake {
                Some(stake) => {
                    hasher.update([1u8]);
                    hasher.update(stake.amount.raw().to_le_bytes());
                    hasher.update(stake.start.as_secs().to_le_bytes());
                }
                None => hasher.update([0u8]),
            }
        }

        let result = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&result);
        out
    }

    /// Verify the snapshot hash matches the account data.
    pub fn verify(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// `Σ balance + Σ locked + Σ staked`, or `None` on overflow.
    pub fn accounted_supply(&self) -> Option<TokenAmount> {
        self.accounts.iter().try_fold(TokenAmount::ZERO, |acc, a| {
            let staked = a.stake.map(|s| s.amount).unwrap_or(TokenAmount::ZERO);
            acc.checked_add(a.balance)?
                .checked_add(a.locked)?
                .checked_add(staked)
        })
    }

    /// The conservation invariant over this snapshot.
    pub fn conservation_holds(&self) -> bool {
        self.accounted_supply() == Some(self.total_supply)
    }

    pub fn account(&self, address: &Address) -> Option<&AccountSnapshot> {
        self.accounts
            .binary_search_by(|a| a.address.cmp(address))
            .ok()
            .map(|i| &self.accounts[i])
    }

    /// Serialize the snapshot to bytes (bincode).
    pub fn to_bytes(&self) -> TokenResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Deserialize a snapshot from bytes (bincode).
    pub fn from_bytes(bytes: &[u8]) -> TokenResult<Self> {
        bincode::deserialize(bytes).map_err(|e| TokenError::Encoding(e.to_string()))
    }
}
