//! Genesis allocation — the state a freshly constructed ledger starts from.
//!
//! The total supply is split three ways at construction:
//! - issuer: 50 %, spendable
//! - community: 20 %, spendable
//! - team: 30 %, locked until the vesting release
//!
//! The total supply is the sum of the three; there is no separate mint step.

use serde::{Deserialize, Serialize};

use crate::error::{TokenError, TokenResult};
use crate::event::LedgerEvent;
use crate::ledger::{Ledger, MintSource};
use crate::staking::StakingEngine;
use crate::vesting::VestingReleaser;
use x1c_types::{Address, Timestamp, TokenParams};

/// The three designated addresses and the construction time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisConfig {
    /// The deployer; receives the public allocation.
    pub issuer: Address,
    /// Owner of the locked allocation.
    pub team: Address,
    /// Receives the community allocation.
    pub community: Address,
    /// Start of the vesting lock.
    pub genesis_time: Timestamp,
}

impl GenesisConfig {
    /// No zero address, and the three roles are held by distinct addresses.
    pub fn validate(&self) -> TokenResult<()> {
        for (role, addr) in [
            ("issuer", &self.issuer),
            ("team", &self.team),
            ("community", &self.community),
        ] {
            if addr.is_zero() {
                return Err(TokenError::InvalidGenesis(format!(
                    "{role} address must not be the zero address"
                )));
            }
        }
        if self.issuer == self.team || self.issuer == self.community || self.team == self.community {
            return Err(TokenError::InvalidGenesis(
                "issuer, team and community must be distinct addresses".into(),
            ));
        }
        Ok(())
    }
}

/// Fully built initial state.
pub struct Genesis {
    pub ledger: Ledger,
    pub vesting: VestingReleaser,
    pub staking: StakingEngine,
    /// `Issued` events for the spendable allocations.
    pub events: Vec<LedgerEvent>,
}

/// Build the initial ledger, vesting and staking state.
pub fn create_genesis(config: &GenesisConfig, params: &TokenParams) -> TokenResult<Genesis> {
    config.validate()?;
    let percent_total = params
        .issuer_percent
        .checked_add(params.team_percent)
        .and_then(|p| p.checked_add(params.community_percent));
    if percent_total != Some(100) {
        return Err(TokenError::InvalidGenesis(
            "allocation percentages must sum to 100".into(),
        ));
    }

    let mut ledger = Ledger::new();
    let mut events = Vec::with_capacity(2);
    events.push(ledger.mint_credit(
        &config.issuer,
        params.issuer_allocation(),
        MintSource::NewSupply,
    )?);
    events.push(ledger.mint_credit(
        &config.community,
        params.community_allocation(),
        MintSource::NewSupply,
    )?);

    let mut vesting = VestingReleaser::new(config.team, config.genesis_time, params.vesting_lock_secs);
    vesting.lock_team_allocation(params.team_allocation(), &mut ledger)?;

    tracing::info!(
        issuer = %config.issuer,
        team = %config.team,
        community = %config.community,
        total_supply = ledger.total_supply().raw(),
        unlock_at = vesting.unlock_time().as_secs(),
        "genesis allocation created"
    );

    Ok(Genesis {
        ledger,
        vesting,
        staking: StakingEngine::new(),
        events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use x1c_types::TokenAmount;

    fn config() -> GenesisConfig {
        GenesisConfig {
            issuer: Address::from_low_u64(1),
            team: Address::from_low_u64(2),
            community: Address::from_low_u64(3),
            genesis_time: Timestamp::new(1_000),
        }
    }

    #[test]
    fn allocation_matches_fixed_split() {
        let cfg = config();
        let g = create_genesis(&cfg, &TokenParams::x1c_defaults()).unwrap();

        assert_eq!(g.ledger.total_supply(), TokenAmount::from_tokens(1_000_000_000));
        assert_eq!(g.ledger.balance_of(&cfg.issuer), TokenAmount::from_tokens(500_000_000));
        assert_eq!(g.ledger.balance_of(&cfg.community), TokenAmount::from_tokens(200_000_000));
        assert_eq!(g.ledger.balance_of(&cfg.team), TokenAmount::ZERO);
        assert_eq!(g.vesting.locked_balance_of(&cfg.team), TokenAmount::from_tokens(300_000_000));
        assert_eq!(g.ledger.reserved(), TokenAmount::from_tokens(300_000_000));
        assert_eq!(g.staking.total_staked(), TokenAmount::ZERO);
    }

    #[test]
    fn genesis_issues_spendable_allocations_only() {
        let cfg = config();
        let g = create_genesis(&cfg, &TokenParams::x1c_defaults()).unwrap();
        assert_eq!(g.events.len(), 2);
        assert!(g.events.iter().all(|e| !matches!(
            e,
            LedgerEvent::Issued { to, .. } if *to == cfg.team
        )));
    }

    #[test]
    fn unlock_time_is_lock_after_genesis() {
        let cfg = config();
        let params = TokenParams::x1c_defaults();
        let g = create_genesis(&cfg, &params).unwrap();
        assert_eq!(g.vesting.unlock_time(), cfg.genesis_time.plus(params.vesting_lock_secs));
    }

    #[test]
    fn zero_address_is_rejected() {
        let mut cfg = config();
        cfg.community = Address::ZERO;
        assert!(matches!(
            create_genesis(&cfg, &TokenParams::default()),
            Err(TokenError::InvalidGenesis(_))
        ));
    }

    #[test]
    fn shared_roles_are_rejected() {
        let mut cfg = config();
        cfg.team = cfg.issuer;
        assert!(matches!(cfg.validate(), Err(TokenError::InvalidGenesis(_))));
    }

    #[test]
    fn bad_percentages_are_rejected() {
        let mut params = TokenParams::default();
        params.team_percent = 31;
        assert!(matches!(
            create_genesis(&config(), &params),
            Err(TokenError::InvalidGenesis(_))
        ));
    }
}
