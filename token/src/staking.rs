//! Opt-in staking: lock principal for a minimum duration, withdraw it with a
//! time-proportional reward.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{TokenError, TokenResult};
use crate::event::LedgerEvent;
use crate::ledger::Ledger;
use crate::reward::calculate_reward;
use x1c_types::{Address, Timestamp, TokenAmount, TokenParams};

/// An active stake. At most one per address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeRecord {
    pub amount: TokenAmount,
    pub start: Timestamp,
}

impl StakeRecord {
    /// Earliest time at which the stake can be withdrawn.
    pub fn withdrawable_at(&self, min_duration_secs: u64) -> Timestamp {
        self.start.plus(min_duration_secs)
    }
}

/// Staking state of an address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StakeState {
    Idle,
    Staked,
}

/// Outcome of a successful unstake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Withdrawal {
    pub principal: TokenAmount,
    pub reward: TokenAmount,
}

/// Owns the stake records; moves principal through the ledger's escrow.
#[derive(Clone, Debug, Default)]
pub struct StakingEngine {
    stakes: HashMap<Address, StakeRecord>,
    total_staked: TokenAmount,
}

impl StakingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stake_of(&self, address: &Address) -> Option<StakeRecord> {
        self.stakes.get(address).copied()
    }

    pub fn state_of(&self, address: &Address) -> StakeState {
        if self.stakes.contains_key(address) {
            StakeState::Staked
        } else {
            StakeState::Idle
        }
    }

    /// Principal currently held in escrow across all stakes.
    pub fn total_staked(&self) -> TokenAmount {
        self.total_staked
    }

    /// Active stakes, in no particular order.
    pub fn stakes(&self) -> impl Iterator<Item = (&Address, &StakeRecord)> {
        self.stakes.iter()
    }

    /// Move `amount` of the caller's balance into escrow and open a stake.
    ///
    /// A caller that is already staking is rejected; records are never amended.
    pub fn stake(
        &mut self,
        caller: &Address,
        amount: TokenAmount,
        now: Timestamp,
        ledger: &mut Ledger,
    ) -> TokenResult<LedgerEvent> {
        if amount.is_zero() {
            return Err(TokenError::InvalidAmount);
        }
        if self.stakes.contains_key(caller) {
            return Err(TokenError::AlreadyStaking);
        }
        let total = self
            .total_staked
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        ledger.debit(caller, amount)?;

        self.total_staked = total;
        self.stakes.insert(*caller, StakeRecord { amount, start: now });
        tracing::debug!(staker = %caller, amount = amount.raw(), start = now.as_secs(), "stake opened");
        Ok(LedgerEvent::Staked {
            address: *caller,
            amount,
            start: now,
        })
    }

    /// Close the caller's stake: principal back from escrow plus a freshly
    /// minted reward.
    pub fn unstake(
        &mut self,
        caller: &Address,
        now: Timestamp,
        params: &TokenParams,
        ledger: &mut Ledger,
    ) -> TokenResult<(Withdrawal, Vec<LedgerEvent>)> {
        let record = self.stakes.get(caller).copied().ok_or(TokenError::NoActiveStake)?;
        if !record.start.has_expired(params.min_stake_duration_secs, now) {
            return Err(TokenError::StakingPeriodNotComplete {
                withdrawable_at: record.withdrawable_at(params.min_stake_duration_secs),
            });
        }
        let reward = calculate_reward(record.amount, record.start, now, params)?;
        let total = self
            .total_staked
            .checked_sub(record.amount)
            .ok_or(TokenError::Overflow)?;

        let mut events = Vec::with_capacity(2);
        events.extend(ledger.settle_stake(caller, record.amount, reward)?);

        self.total_staked = total;
        self.stakes.remove(caller);
        events.push(LedgerEvent::Unstaked {
            address: *caller,
            principal: record.amount,
            reward,
        });
        tracing::debug!(
            staker = %caller,
            principal = record.amount.raw(),
            reward = reward.raw(),
            "stake withdrawn"
        );
        Ok((
            Withdrawal {
                principal: record.amount,
                reward,
            },
            events,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MintSource;
    use x1c_types::SECS_PER_DAY;

    const MIN: u64 = 30 * SECS_PER_DAY;

    fn alice() -> Address {
        Address::from_low_u64(1)
    }

    fn funded(raw: u128) -> Ledger {
        let mut ledger = Ledger::new();
        ledger
            .mint_credit(&alice(), TokenAmount::new(raw), MintSource::NewSupply)
            .unwrap();
        ledger
    }

    fn params() -> TokenParams {
        TokenParams::x1c_defaults()
    }

    #[test]
    fn stake_moves_balance_into_escrow() {
        let mut ledger = funded(1_000);
        let mut engine = StakingEngine::new();
        let event = engine
            .stake(&alice(), TokenAmount::new(400), Timestamp::new(10), &mut ledger)
            .unwrap();

        assert_eq!(ledger.balance_of(&alice()), TokenAmount::new(600));
        assert_eq!(ledger.escrowed(), TokenAmount::new(400));
        assert_eq!(engine.total_staked(), TokenAmount::new(400));
        assert_eq!(
            engine.stake_of(&alice()),
            Some(StakeRecord {
                amount: TokenAmount::new(400),
                start: Timestamp::new(10)
            })
        );
        assert_eq!(engine.state_of(&alice()), StakeState::Staked);
        assert!(matches!(event, LedgerEvent::Staked { .. }));
    }

    #[test]
    fn zero_stake_is_invalid() {
        let mut ledger = funded(1_000);
        let mut engine = StakingEngine::new();
        let err = engine
            .stake(&alice(), TokenAmount::ZERO, Timestamp::new(0), &mut ledger)
            .unwrap_err();
        assert_eq!(err, TokenError::InvalidAmount);
        assert_eq!(engine.state_of(&alice()), StakeState::Idle);
    }

    #[test]
    fn stake_beyond_balance_fails() {
        let mut ledger = funded(100);
        let mut engine = StakingEngine::new();
        let err = engine
            .stake(&alice(), TokenAmount::new(101), Timestamp::new(0), &mut ledger)
            .unwrap_err();
        assert_eq!(
            err,
            TokenError::InsufficientBalance {
                needed: 101,
                available: 100
            }
        );
        assert_eq!(engine.stake_of(&alice()), None);
        assert_eq!(ledger.escrowed(), TokenAmount::ZERO);
    }

    #[test]
    fn restake_while_staked_is_rejected() {
        let mut ledger = funded(1_000);
        let mut engine = StakingEngine::new();
        engine
            .stake(&alice(), TokenAmount::new(100), Timestamp::new(0), &mut ledger)
            .unwrap();
        let err = engine
            .stake(&alice(), TokenAmount::new(100), Timestamp::new(5), &mut ledger)
            .unwrap_err();
        assert_eq!(err, TokenError::AlreadyStaking);
        assert_eq!(engine.stake_of(&alice()).unwrap().start, Timestamp::new(0));
        assert_eq!(ledger.balance_of(&alice()), TokenAmount::new(900));
    }

    #[test]
    fn unstake_without_stake_fails() {
        let mut ledger = funded(1_000);
        let mut engine = StakingEngine::new();
        let err = engine
            .unstake(&alice(), Timestamp::new(MIN), &params(), &mut ledger)
            .unwrap_err();
        assert_eq!(err, TokenError::NoActiveStake);
    }

    #[test]
    fn unstake_before_minimum_duration_fails() {
        let mut ledger = funded(1_000);
        let mut engine = StakingEngine::new();
        engine
            .stake(&alice(), TokenAmount::new(500), Timestamp::new(100), &mut ledger)
            .unwrap();
        let err = engine
            .unstake(&alice(), Timestamp::new(100 + MIN - 1), &params(), &mut ledger)
            .unwrap_err();
        assert_eq!(
            err,
            TokenError::StakingPeriodNotComplete {
                withdrawable_at: Timestamp::new(100 + MIN)
            }
        );
        assert_eq!(engine.state_of(&alice()), StakeState::Staked);
    }

    #[test]
    fn unstake_returns_principal_plus_minted_reward() {
        let principal = TokenAmount::from_tokens(500);
        let mut ledger = funded(TokenAmount::from_tokens(1_000).raw());
        let mut engine = StakingEngine::new();
        engine
            .stake(&alice(), principal, Timestamp::new(0), &mut ledger)
            .unwrap();
        let supply_before = ledger.total_supply();

        let (withdrawal, events) = engine
            .unstake(&alice(), Timestamp::new(MIN), &params(), &mut ledger)
            .unwrap();

        let expected_reward = calculate_reward(principal, Timestamp::new(0), Timestamp::new(MIN), &params()).unwrap();
        assert_eq!(withdrawal.principal, principal);
        assert_eq!(withdrawal.reward, expected_reward);
        assert!(!expected_reward.is_zero());
        assert_eq!(
            ledger.balance_of(&alice()),
            TokenAmount::from_tokens(1_000) + expected_reward
        );
        assert_eq!(ledger.total_supply(), supply_before + expected_reward);
        assert_eq!(ledger.escrowed(), TokenAmount::ZERO);
        assert_eq!(engine.state_of(&alice()), StakeState::Idle);
        assert_eq!(engine.total_staked(), TokenAmount::ZERO);

        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            LedgerEvent::Issued {
                to: alice(),
                amount: expected_reward
            }
        );
        assert_eq!(
            events[1],
            LedgerEvent::Unstaked {
                address: alice(),
                principal,
                reward: expected_reward
            }
        );
    }

    #[test]
    fn dust_stake_withdraws_without_issuing() {
        let mut ledger = funded(10);
        let mut engine = StakingEngine::new();
        engine
            .stake(&alice(), TokenAmount::new(1), Timestamp::new(0), &mut ledger)
            .unwrap();
        let (withdrawal, events) = engine
            .unstake(&alice(), Timestamp::new(MIN), &params(), &mut ledger)
            .unwrap();
        assert_eq!(withdrawal.reward, TokenAmount::ZERO);
        assert_eq!(events.len(), 1);
        assert_eq!(ledger.balance_of(&alice()), TokenAmount::new(10));
    }

    #[test]
    fn can_stake_again_after_unstaking() {
        let mut ledger = funded(1_000);
        let mut engine = StakingEngine::new();
        engine
            .stake(&alice(), TokenAmount::new(100), Timestamp::new(0), &mut ledger)
            .unwrap();
        engine
            .unstake(&alice(), Timestamp::new(MIN), &params(), &mut ledger)
            .unwrap();
        engine
            .stake(&alice(), TokenAmount::new(50), Timestamp::new(MIN + 1), &mut ledger)
            .unwrap();
        assert_eq!(engine.stake_of(&alice()).unwrap().start, Timestamp::new(MIN + 1));
    }

    #[test]
    fn unstake_with_unmintable_reward_changes_nothing() {
        let mut ledger = funded(u128::MAX - 10);
        let mut engine = StakingEngine::new();
        let principal = TokenAmount::new(u128::MAX / 2);
        engine
            .stake(&alice(), principal, Timestamp::new(0), &mut ledger)
            .unwrap();
        let balance = ledger.balance_of(&alice());

        let err = engine
            .unstake(&alice(), Timestamp::new(MIN), &params(), &mut ledger)
            .unwrap_err();
        assert_eq!(err, TokenError::Overflow);
        assert_eq!(engine.stake_of(&alice()).unwrap().amount, principal);
        assert_eq!(engine.total_staked(), principal);
        assert_eq!(ledger.escrowed(), principal);
        assert_eq!(ledger.balance_of(&alice()), balance);
        assert_eq!(ledger.total_supply(), TokenAmount::new(u128::MAX - 10));
    }
}
