//! One-time, time-gated release of the team's locked allocation.

use std::collections::HashMap;

use crate::error::{TokenError, TokenResult};
use crate::event::LedgerEvent;
use crate::ledger::{Ledger, MintSource};
use x1c_types::{Address, Timestamp, TokenAmount};

/// Vesting state of an address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VestingState {
    /// Holds a non-zero locked balance.
    Locked,
    /// Had a locked balance that has since been released.
    Released,
    /// Never had a locked balance.
    NotEligible,
}

/// Owns the locked-balance entries.
///
/// An entry is set once at genesis and cleared exactly once on release; it
/// is never re-populated.
#[derive(Clone, Debug)]
pub struct VestingReleaser {
    team: Address,
    locked: HashMap<Address, TokenAmount>,
    /// Addresses whose entry has been released.
    released: Vec<Address>,
    lock_start: Timestamp,
    lock_duration_secs: u64,
}

impl VestingReleaser {
    /// A releaser with no locked entries yet.
    pub fn new(team: Address, lock_start: Timestamp, lock_duration_secs: u64) -> Self {
        Self {
            team,
            locked: HashMap::new(),
            released: Vec::new(),
            lock_start,
            lock_duration_secs,
        }
    }

    /// Lock `amount` for the team address, booking it as reserved supply.
    ///
    /// Only used while building genesis.
    pub(crate) fn lock_team_allocation(
        &mut self,
        amount: TokenAmount,
        ledger: &mut Ledger,
    ) -> TokenResult<()> {
        ledger.reserve(amount)?;
        self.locked.insert(self.team, amount);
        Ok(())
    }

    pub fn locked_balance_of(&self, address: &Address) -> TokenAmount {
        self.locked.get(address).copied().unwrap_or(TokenAmount::ZERO)
    }

    /// Sum of all locked entries.
    pub fn total_locked(&self) -> TokenAmount {
        self.locked
            .values()
            .fold(TokenAmount::ZERO, |acc, v| acc.saturating_add(*v))
    }

    /// Locked entries, in no particular order.
    pub fn locked_entries(&self) -> impl Iterator<Item = (&Address, &TokenAmount)> {
        self.locked.iter()
    }

    /// Earliest time at which a release can succeed.
    pub fn unlock_time(&self) -> Timestamp {
        self.lock_start.plus(self.lock_duration_secs)
    }

    pub fn state_of(&self, address: &Address) -> VestingState {
        if !self.locked_balance_of(address).is_zero() {
            VestingState::Locked
        } else if self.released.contains(address) {
            VestingState::Released
        } else {
            VestingState::NotEligible
        }
    }

    /// Release the caller's whole locked balance into its spendable balance.
    ///
    /// Checks, in order: caller is the team address, the lock has elapsed,
    /// something is still locked.
    pub fn release_team_tokens(
        &mut self,
        caller: &Address,
        now: Timestamp,
        ledger: &mut Ledger,
    ) -> TokenResult<LedgerEvent> {
        if *caller != self.team {
            return Err(TokenError::Unauthorized);
        }
        if !self.lock_start.has_expired(self.lock_duration_secs, now) {
            return Err(TokenError::StillLocked {
                unlock_at: self.unlock_time(),
            });
        }
        let amount = self.locked_balance_of(caller);
        if amount.is_zero() {
            return Err(TokenError::NothingToRelease);
        }

        let event = ledger.mint_credit(caller, amount, MintSource::Reserve)?;
        self.locked.remove(caller);
        self.released.push(*caller);
        tracing::info!(team = %caller, amount = amount.raw(), "team tokens released");
        Ok(event)
    }
}
