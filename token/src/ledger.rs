//! Balance and allowance bookkeeping, plus the supply counters.
//!
//! Total supply is split three ways:
//! - circulating: the sum of all spendable balances,
//! - escrowed: principal held by the staking engine,
//! - reserved: locked allocations held by the vesting releaser.
//!
//! `Σ balances + escrowed + reserved == total_supply` holds after every call.

use std::collections::HashMap;

use crate::error::{TokenError, TokenResult};
use crate::event::LedgerEvent;
use x1c_types::{Address, TokenAmount};

/// Where tokens credited by [`Ledger::mint_credit`] come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MintSource {
    /// Brand-new supply (staking rewards, genesis allocations).
    NewSupply,
    /// Supply booked at construction as reserved (team vesting release).
    Reserve,
}

/// The ledger — balances, allowances and supply.
#[derive(Clone, Debug, Default)]
pub struct Ledger {
    balances: HashMap<Address, TokenAmount>,
    allowances: HashMap<(Address, Address), TokenAmount>,
    total_supply: TokenAmount,
    escrowed: TokenAmount,
    reserved: TokenAmount,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Reads ────────────────────────────────────────────────────────────

    pub fn balance_of(&self, address: &Address) -> TokenAmount {
        self.balances.get(address).copied().unwrap_or(TokenAmount::ZERO)
    }

    pub fn allowance_of(&self, owner: &Address, spender: &Address) -> TokenAmount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(TokenAmount::ZERO)
    }

    pub fn total_supply(&self) -> TokenAmount {
        self.total_supply
    }

    /// Supply that is spendable right now.
    pub fn circulating_supply(&self) -> TokenAmount {
        self.total_supply
            .saturating_sub(self.escrowed)
            .saturating_sub(self.reserved)
    }

    pub fn escrowed(&self) -> TokenAmount {
        self.escrowed
    }

    pub fn reserved(&self) -> TokenAmount {
        self.reserved
    }

    /// All non-zero balances, in no particular order.
    pub fn balances(&self) -> impl Iterator<Item = (&Address, &TokenAmount)> {
        self.balances.iter()
    }

    // ── Public operations ────────────────────────────────────────────────

    /// Move `amount` from `caller` to `to`. A zero amount is allowed.
    pub fn transfer(
        &mut self,
        caller: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> TokenResult<LedgerEvent> {
        self.ensure_balance(caller, amount)?;
        if to.is_zero() {
            return Err(TokenError::InvalidRecipient);
        }
        self.move_balance(caller, to, amount)?;
        tracing::debug!(from = %caller, %to, amount = amount.raw(), "transfer");
        Ok(LedgerEvent::Transferred {
            from: *caller,
            to: *to,
            amount,
        })
    }

    /// Set `allowance[caller][spender] = amount`, overwriting any prior value.
    pub fn approve(
        &mut self,
        caller: &Address,
        spender: &Address,
        amount: TokenAmount,
    ) -> TokenResult<LedgerEvent> {
        self.set_allowance(caller, spender, amount);
        tracing::debug!(owner = %caller, %spender, amount = amount.raw(), "approve");
        Ok(LedgerEvent::Approved {
            owner: *caller,
            spender: *spender,
            amount,
        })
    }

    /// Spend `amount` of `from`'s allowance to `caller`, moving it to `to`.
    pub fn transfer_from(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> TokenResult<LedgerEvent> {
        let allowed = self.allowance_of(from, caller);
        let remaining = allowed
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientAllowance {
                needed: amount.raw(),
                allowed: allowed.raw(),
            })?;
        self.ensure_balance(from, amount)?;
        if to.is_zero() {
            return Err(TokenError::InvalidRecipient);
        }
        self.move_balance(from, to, amount)?;
        self.set_allowance(from, caller, remaining);
        tracing::debug!(spender = %caller, %from, %to, amount = amount.raw(), "transfer_from");
        Ok(LedgerEvent::Transferred {
            from: *from,
            to: *to,
            amount,
        })
    }

    // ── Crate-internal supply operations ─────────────────────────────────

    /// Credit `to` with tokens that were not spendable before.
    ///
    /// `NewSupply` grows the total supply; `Reserve` draws down the reserved
    /// portion so the total stays put.
    pub(crate) fn mint_credit(
        &mut self,
        to: &Address,
        amount: TokenAmount,
        source: MintSource,
    ) -> TokenResult<LedgerEvent> {
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        match source {
            MintSource::NewSupply => {
                let supply = self
                    .total_supply
                    .checked_add(amount)
                    .ok_or(TokenError::Overflow)?;
                self.total_supply = supply;
            }
            MintSource::Reserve => {
                let reserved = self
                    .reserved
                    .checked_sub(amount)
                    .ok_or(TokenError::Overflow)?;
                self.reserved = reserved;
            }
        }
        self.set_balance(to, balance);
        Ok(LedgerEvent::Issued { to: *to, amount })
    }

    /// Book `amount` of new supply as reserved (held outside any balance).
    pub(crate) fn reserve(&mut self, amount: TokenAmount) -> TokenResult<()> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let reserved = self
            .reserved
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.total_supply = supply;
        self.reserved = reserved;
        Ok(())
    }

    /// Move `amount` out of `from`'s balance into escrow. Supply is unchanged.
    pub(crate) fn debit(&mut self, from: &Address, amount: TokenAmount) -> TokenResult<()> {
        let balance = self.ensure_balance(from, amount)?;
        let escrowed = self
            .escrowed
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.set_balance(from, balance);
        self.escrowed = escrowed;
        Ok(())
    }

    /// Return `principal` from escrow to `to` and mint `reward` on top.
    ///
    /// Every counter is computed before any is written, so a failure leaves
    /// the ledger untouched. Yields the `Issued` event for a non-zero reward.
    pub(crate) fn settle_stake(
        &mut self,
        to: &Address,
        principal: TokenAmount,
        reward: TokenAmount,
    ) -> TokenResult<Option<LedgerEvent>> {
        let escrowed = self
            .escrowed
            .checked_sub(principal)
            .ok_or(TokenError::Overflow)?;
        let supply = self
            .total_supply
            .checked_add(reward)
            .ok_or(TokenError::Overflow)?;
        let balance = self
            .balance_of(to)
            .checked_add(principal)
            .and_then(|b| b.checked_add(reward))
            .ok_or(TokenError::Overflow)?;

        self.escrowed = escrowed;
        self.total_supply = supply;
        self.set_balance(to, balance);
        Ok((!reward.is_zero()).then_some(LedgerEvent::Issued { to: *to, amount: reward }))
    }

    // ── Helpers ──────────────────────────────────────────────────────────

    /// Balance of `address` after spending `amount`, or `InsufficientBalance`.
    fn ensure_balance(&self, address: &Address, amount: TokenAmount) -> TokenResult<TokenAmount> {
        let available = self.balance_of(address);
        available
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance {
                needed: amount.raw(),
                available: available.raw(),
            })
    }

    /// Computes both new balances before writing either.
    fn move_balance(&mut self, from: &Address, to: &Address, amount: TokenAmount) -> TokenResult<()> {
        let from_after = self.ensure_balance(from, amount)?;
        if from == to {
            return Ok(());
        }
        let to_after = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.set_balance(from, from_after);
        self.set_balance(to, to_after);
        Ok(())
    }

    fn set_balance(&mut self, address: &Address, amount: TokenAmount) {
        if amount.is_zero() {
            self.balances.remove(address);
        } else {
            self.balances.insert(*address, amount);
        }
    }

    fn set_allowance(&mut self, owner: &Address, spender: &Address, amount: TokenAmount) {
        if amount.is_zero() {
            self.allowances.remove(&(*owner, *spender));
        } else {
            self.allowances.insert((*owner, *spender), amount);
        }
    }
}
