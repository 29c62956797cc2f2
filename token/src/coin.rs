//! `X1Coin` — the ledger, vesting releaser and staking engine behind one lock.
//!
//! Every state-changing call takes the caller explicitly, reads the clock
//! once, and runs to completion under a single mutex. Its events are appended
//! to the log and fanned out to subscribers before the lock is released, so
//! log order is commit order. A rejected call appends nothing.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{TokenError, TokenResult};
use crate::event::{EventBus, EventLog, EventRecord, LedgerEvent};
use crate::genesis::{create_genesis, GenesisConfig};
use crate::ledger::Ledger;
use crate::metrics::TokenMetrics;
use crate::reward;
use crate::snapshot::LedgerSnapshot;
use crate::staking::{StakeRecord, StakeState, StakingEngine, Withdrawal};
use crate::vesting::{VestingReleaser, VestingState};
use x1c_types::{Address, Clock, Timestamp, TokenAmount, TokenParams};

/// What a committed operation produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt<T = ()> {
    pub output: T,
    /// Records appended to the event log, in order.
    pub events: Vec<EventRecord>,
}

struct CoinState {
    ledger: Ledger,
    vesting: VestingReleaser,
    staking: StakingEngine,
    log: EventLog,
}

/// The X1Coin ledger.
pub struct X1Coin {
    state: Mutex<CoinState>,
    params: TokenParams,
    clock: Arc<dyn Clock>,
    bus: EventBus,
    metrics: TokenMetrics,
}

impl X1Coin {
    /// Construct with the X1Coin parameters.
    pub fn new(config: &GenesisConfig, clock: Arc<dyn Clock>) -> TokenResult<Self> {
        let params = TokenParams::x1c_defaults();
        let genesis = create_genesis(config, &params)?;
        let mut log = EventLog::new();
        log.append(config.genesis_time, genesis.events);

        let metrics = TokenMetrics::new();
        metrics.observe_supply(genesis.ledger.total_supply(), genesis.staking.total_staked());

        Ok(Self {
            state: Mutex::new(CoinState {
                ledger: genesis.ledger,
                vesting: genesis.vesting,
                staking: genesis.staking,
                log,
            }),
            params,
            clock,
            bus: EventBus::new(),
            metrics,
        })
    }

    /// Register a listener for every event committed from now on.
    pub fn subscribe(&mut self, listener: Box<dyn Fn(&EventRecord) + Send + Sync>) {
        self.bus.subscribe(listener);
    }

    // ── State-changing operations ────────────────────────────────────────

    pub fn transfer(
        &self,
        caller: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> TokenResult<Receipt> {
        self.execute("transfer", |s, _| {
            let event = s.ledger.transfer(caller, to, amount)?;
            Ok(((), vec![event]))
        })
        .inspect(|_| self.metrics.transfers.inc())
    }

    pub fn approve(
        &self,
        caller: &Address,
        spender: &Address,
        amount: TokenAmount,
    ) -> TokenResult<Receipt> {
        self.execute("approve", |s, _| {
            let event = s.ledger.approve(caller, spender, amount)?;
            Ok(((), vec![event]))
        })
        .inspect(|_| self.metrics.approvals.inc())
    }

    pub fn transfer_from(
        &self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> TokenResult<Receipt> {
        self.execute("transfer_from", |s, _| {
            let event = s.ledger.transfer_from(caller, from, to, amount)?;
            Ok(((), vec![event]))
        })
        .inspect(|_| self.metrics.transfers.inc())
    }

    /// Release the team's locked allocation; returns the released amount.
    pub fn release_team_tokens(&self, caller: &Address) -> TokenResult<Receipt<TokenAmount>> {
        self.execute("release_team_tokens", |s, now| {
            let amount = s.vesting.locked_balance_of(caller);
            let event = s.vesting.release_team_tokens(caller, now, &mut s.ledger)?;
            Ok((amount, vec![event]))
        })
        .inspect(|_| self.metrics.releases.inc())
    }

    /// Open a stake; returns the new record.
    pub fn stake(&self, caller: &Address, amount: TokenAmount) -> TokenResult<Receipt<StakeRecord>> {
        self.execute("stake", |s, now| {
            let event = s.staking.stake(caller, amount, now, &mut s.ledger)?;
            Ok((StakeRecord { amount, start: now }, vec![event]))
        })
        .inspect(|_| self.metrics.stakes.inc())
    }

    /// Withdraw the caller's stake with its reward.
    pub fn unstake(&self, caller: &Address) -> TokenResult<Receipt<Withdrawal>> {
        let params = &self.params;
        self.execute("unstake", |s, now| {
            s.staking.unstake(caller, now, params, &mut s.ledger)
        })
        .inspect(|_| self.metrics.unstakes.inc())
    }

    // ── Reads ────────────────────────────────────────────────────────────

    pub fn balance_of(&self, address: &Address) -> TokenAmount {
        self.lock().ledger.balance_of(address)
    }

    pub fn allowance_of(&self, owner: &Address, spender: &Address) -> TokenAmount {
        self.lock().ledger.allowance_of(owner, spender)
    }

    pub fn locked_balance_of(&self, address: &Address) -> TokenAmount {
        self.lock().vesting.locked_balance_of(address)
    }

    pub fn stake_of(&self, address: &Address) -> Option<StakeRecord> {
        self.lock().staking.stake_of(address)
    }

    pub fn stake_state(&self, address: &Address) -> StakeState {
        self.lock().staking.state_of(address)
    }

    pub fn vesting_state(&self, address: &Address) -> VestingState {
        self.lock().vesting.state_of(address)
    }

    pub fn unlock_time(&self) -> Timestamp {
        self.lock().vesting.unlock_time()
    }

    /// Reward `amount` staked at `start` would earn as of the current time.
    ///
    /// Pure preview: any inputs, no state involved. `Overflow` when the
    /// reward does not fit in `u128`.
    pub fn calculate_reward(
        &self,
        amount: TokenAmount,
        start: Timestamp,
    ) -> TokenResult<TokenAmount> {
        reward::calculate_reward(amount, start, self.clock.now(), &self.params)
    }

    pub fn total_supply(&self) -> TokenAmount {
        self.lock().ledger.total_supply()
    }

    pub fn circulating_supply(&self) -> TokenAmount {
        self.lock().ledger.circulating_supply()
    }

    pub fn total_staked(&self) -> TokenAmount {
        self.lock().staking.total_staked()
    }

    pub fn name(&self) -> &str {
        &self.params.name
    }

    pub fn symbol(&self) -> &str {
        &self.params.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.params.decimals
    }

    pub fn params(&self) -> &TokenParams {
        &self.params
    }

    pub fn metrics(&self) -> &TokenMetrics {
        &self.metrics
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// The whole event log.
    pub fn events(&self) -> Vec<EventRecord> {
        self.lock().log.records().to_vec()
    }

    /// Log records with `seq >= from`.
    pub fn events_since(&self, from: u64) -> Vec<EventRecord> {
        self.lock().log.since(from).to_vec()
    }

    /// A consistent view of every account.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.lock();
        LedgerSnapshot::capture(&state.ledger, &state.vesting, &state.staking, self.clock.now())
    }

    /// Check `Σ balances + Σ locked + Σ staked == total_supply`, and that the
    /// ledger's escrow and reserve counters agree with the engines owning them.
    pub fn audit(&self) -> TokenResult<()> {
        let state = self.lock();
        let snap =
            LedgerSnapshot::capture(&state.ledger, &state.vesting, &state.staking, self.clock.now());
        let expected = snap.total_supply.raw();
        let actual = snap.accounted_supply().ok_or(TokenError::Overflow)?.raw();
        if expected != actual
            || state.ledger.escrowed() != state.staking.total_staked()
            || state.ledger.reserved() != state.vesting.total_locked()
        {
            return Err(TokenError::ConservationViolated { expected, actual });
        }
        Ok(())
    }

    // ── Internals ────────────────────────────────────────────────────────

    /// Poisoning is ignored: every operation validates before it mutates, so
    /// a panicking listener cannot leave half-applied state behind.
    fn lock(&self) -> MutexGuard<'_, CoinState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `op` under the lock and commit its events, or record the rejection.
    fn execute<T>(
        &self,
        operation: &'static str,
        op: impl FnOnce(&mut CoinState, Timestamp) -> TokenResult<(T, Vec<LedgerEvent>)>,
    ) -> TokenResult<Receipt<T>> {
        let mut state = self.lock();
        let now = self.clock.now();
        match op(&mut *state, now) {
            Ok((output, events)) => {
                let records = state.log.append(now, events).to_vec();
                for record in &records {
                    self.bus.emit(record);
                }
                self.metrics
                    .observe_supply(state.ledger.total_supply(), state.staking.total_staked());
                Ok(Receipt {
                    output,
                    events: records,
                })
            }
            Err(e) => {
                tracing::warn!(operation, error = %e, "operation rejected");
                self.metrics
                    .rejected
                    .with_label_values(&[operation, e.kind()])
                    .inc();
                Err(e)
            }
        }
    }
}
