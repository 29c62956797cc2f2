//! Scripted replay: drive a fresh ledger through a list of timed operations.
//!
//! Scripts are TOML with one `[[step]]` table per operation:
//!
//! ```toml
//! genesis_time = 1700000000
//!
//! [[step]]
//! op = "transfer"
//! caller = "0x0000000000000000000000000000000000000001"
//! to = "0x00000000000000000000000000000000000000aa"
//! amount = "1000"
//!
//! [[step]]
//! op = "advance"
//! days = 31
//! ```
//!
//! Amounts are decimal X1C (`"1.5"`). Time only moves on `advance`. A
//! rejected step is recorded and the replay carries on.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use x1c_nullables::NullClock;
use x1c_token::{EventRecord, GenesisConfig, TokenError, X1Coin};
use x1c_types::{Address, Clock, Timestamp, TokenAmount, SECS_PER_DAY};
use x1c_utils::parse_units;

use crate::CliError;

/// One scripted operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Transfer {
        caller: Address,
        to: Address,
        amount: String,
    },
    Approve {
        caller: Address,
        spender: Address,
        amount: String,
    },
    TransferFrom {
        caller: Address,
        from: Address,
        to: Address,
        amount: String,
    },
    Stake {
        caller: Address,
        amount: String,
    },
    Unstake {
        caller: Address,
    },
    Release {
        caller: Address,
    },
    Advance {
        #[serde(default)]
        days: u64,
        #[serde(default)]
        secs: u64,
    },
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReplayScript {
    /// Overrides the configured genesis time when set.
    #[serde(default)]
    pub genesis_time: Option<u64>,

    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl ReplayScript {
    pub fn from_toml_file(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::Script(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, CliError> {
        toml::from_str(s).map_err(|e| CliError::Script(e.to_string()))
    }
}

/// A step the ledger refused.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Rejection {
    /// Zero-based index into the script.
    pub step: usize,
    pub kind: &'static str,
    pub message: String,
}

/// Outcome of a replay.
#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub applied: usize,
    pub rejected: Vec<Rejection>,
    pub events: Vec<EventRecord>,
    pub final_time: Timestamp,
    pub total_supply: TokenAmount,
    pub circulating_supply: TokenAmount,
    pub total_staked: TokenAmount,
    /// `None` when conservation holds, otherwise the audit failure.
    pub audit_failure: Option<String>,
    #[serde(skip)]
    pub metrics_text: String,
}

/// Replay `script` against a ledger built from `genesis`.
///
/// Errors only on malformed input (bad amount, invalid genesis); ledger
/// rejections are part of the report.
pub fn run_script(genesis: &GenesisConfig, script: &ReplayScript) -> Result<ReplayReport, CliError> {
    let mut genesis = genesis.clone();
    if let Some(t) = script.genesis_time {
        genesis.genesis_time = Timestamp::new(t);
    }
    let clock = Arc::new(NullClock::new(genesis.genesis_time.as_secs()));
    let coin = X1Coin::new(&genesis, clock.clone() as Arc<dyn Clock>)?;
    let decimals = coin.decimals();

    let mut applied = 0;
    let mut rejected = Vec::new();
    for (i, step) in script.steps.iter().enumerate() {
        match apply(&coin, &clock, step, decimals)? {
            Ok(()) => applied += 1,
            Err(e) => {
                tracing::info!(step = i, error = %e, "step rejected");
                rejected.push(Rejection {
                    step: i,
                    kind: e.kind(),
                    message: e.to_string(),
                });
            }
        }
    }

    let audit_failure = coin.audit().err().map(|e| e.to_string());
    if let Some(ref failure) = audit_failure {
        tracing::error!(%failure, "conservation audit failed");
    }

    Ok(ReplayReport {
        applied,
        rejected,
        events: coin.events(),
        final_time: coin.now(),
        total_supply: coin.total_supply(),
        circulating_supply: coin.circulating_supply(),
        total_staked: coin.total_staked(),
        audit_failure,
        metrics_text: coin.metrics().encode_text(),
    })
}

/// Outer error: malformed step. Inner error: ledger rejection.
fn apply(
    coin: &X1Coin,
    clock: &NullClock,
    step: &Step,
    decimals: u8,
) -> Result<Result<(), TokenError>, CliError> {
    let amount = |s: &str| {
        parse_units(s, decimals).ok_or_else(|| CliError::InvalidAmount(s.to_string()))
    };
    let result = match step {
        Step::Transfer { caller, to, amount: a } => coin.transfer(caller, to, amount(a)?).map(drop),
        Step::Approve { caller, spender, amount: a } => {
            coin.approve(caller, spender, amount(a)?).map(drop)
        }
        Step::TransferFrom { caller, from, to, amount: a } => {
            coin.transfer_from(caller, from, to, amount(a)?).map(drop)
        }
        Step::Stake { caller, amount: a } => coin.stake(caller, amount(a)?).map(drop),
        Step::Unstake { caller } => coin.unstake(caller).map(drop),
        Step::Release { caller } => coin.release_team_tokens(caller).map(drop),
        Step::Advance { days, secs } => {
            let by = days
                .checked_mul(SECS_PER_DAY)
                .and_then(|d| d.checked_add(*secs))
                .ok_or_else(|| CliError::Script("advance overflows".into()))?;
            clock
                .try_advance(by)
                .ok_or_else(|| CliError::Script("advance moves the clock past u64::MAX".into()))?;
            Ok(())
        }
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use x1c_token::LedgerEvent;

    const SCRIPT: &str = r#"
        genesis_time = 1000

        [[step]]
        op = "transfer"
        caller = "0x0000000000000000000000000000000000000001"
        to = "0x00000000000000000000000000000000000000aa"
        amount = "1000"

        [[step]]
        op = "stake"
        caller = "0x00000000000000000000000000000000000000aa"
        amount = "500"

        [[step]]
        op = "release"
        caller = "0x0000000000000000000000000000000000000002"

        [[step]]
        op = "advance"
        days = 181

        [[step]]
        op = "release"
        caller = "0x0000000000000000000000000000000000000002"

        [[step]]
        op = "unstake"
        caller = "0x00000000000000000000000000000000000000aa"
    "#;

    fn genesis() -> GenesisConfig {
        crate::CliConfig::default().genesis(Timestamp::new(0))
    }

    #[test]
    fn parses_tagged_steps() {
        let script = ReplayScript::from_toml_str(SCRIPT).unwrap();
        assert_eq!(script.genesis_time, Some(1000));
        assert_eq!(script.steps.len(), 6);
        assert_eq!(script.steps[3], Step::Advance { days: 181, secs: 0 });
    }

    #[test]
    fn replay_applies_and_records_rejections() {
        let script = ReplayScript::from_toml_str(SCRIPT).unwrap();
        let report = run_script(&genesis(), &script).unwrap();

        assert_eq!(report.applied, 5);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].step, 2);
        assert_eq!(report.rejected[0].kind, "StillLocked");
        assert_eq!(report.audit_failure, None);
        assert_eq!(report.final_time, Timestamp::new(1000 + 181 * SECS_PER_DAY));
        assert_eq!(report.total_staked, TokenAmount::ZERO);
        assert!(report.total_supply > TokenAmount::from_tokens(1_000_000_000));
        assert!(matches!(
            report.events.last().map(|r| &r.event),
            Some(LedgerEvent::Unstaked { .. })
        ));
        assert!(report.metrics_text.contains("x1c_rejected_total"));
    }

    #[test]
    fn bad_amount_aborts_replay() {
        let script = ReplayScript::from_toml_str(
            r#"
            [[step]]
            op = "stake"
            caller = "0x0000000000000000000000000000000000000001"
            amount = "lots"
            "#,
        )
        .unwrap();
        assert!(matches!(
            run_script(&genesis(), &script),
            Err(CliError::InvalidAmount(_))
        ));
    }

    #[test]
    fn unknown_op_is_a_script_error() {
        let err = ReplayScript::from_toml_str(
            r#"
            [[step]]
            op = "mint"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Script(_)));
    }

    #[test]
    fn empty_script_reports_genesis_only() {
        let report = run_script(&genesis(), &ReplayScript::default()).unwrap();
        assert_eq!(report.applied, 0);
        assert_eq!(report.events.len(), 2);
        assert_eq!(report.audit_failure, None);
    }

    #[test]
    fn bundled_demo_script_passes_audit() {
        let script =
            ReplayScript::from_toml_str(include_str!("../../demos/stake_and_release.toml")).unwrap();
        let report = run_script(&genesis(), &script).unwrap();
        assert_eq!(report.audit_failure, None);
        let kinds: Vec<_> = report.rejected.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, ["StakingPeriodNotComplete", "StillLocked"]);
    }

    #[test]
    fn advance_past_end_of_time_aborts_replay() {
        let step = r#"
            [[step]]
            op = "advance"
            days = 106751991167300
        "#;
        let script =
            ReplayScript::from_toml_str(&format!("genesis_time = 1000\n{step}{step}{step}")).unwrap();
        let err = run_script(&genesis(), &script).unwrap_err();
        assert!(matches!(err, CliError::Script(_)));
    }
}
