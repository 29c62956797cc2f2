//! Prometheus metrics for the ledger.
//!
//! [`TokenMetrics`] owns a dedicated [`Registry`] that an embedding service
//! can encode into the Prometheus text exposition format.

use prometheus::{
    register_int_counter_vec_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Encoder, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

use x1c_types::TokenAmount;

/// Ledger-level Prometheus metrics.
pub struct TokenMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Committed transfers (including `transfer_from`).
    pub transfers: IntCounter,
    pub approvals: IntCounter,
    pub stakes: IntCounter,
    pub unstakes: IntCounter,
    pub releases: IntCounter,
    /// Rejected operations, labelled by operation and error kind.
    pub rejected: IntCounterVec,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Total supply in whole tokens.
    pub total_supply_tokens: IntGauge,
    /// Principal held in stake escrow, in whole tokens.
    pub total_staked_tokens: IntGauge,
}

impl TokenMetrics {
    /// Create a fresh set of metrics under a new [`Registry`].
    ///
    /// # Panics
    /// Panics if a metric fails to register, which only happens on a
    /// duplicate name within the fresh registry.
    pub fn new() -> Self {
        let registry = Registry::new();

        let transfers = register_int_counter_with_registry!(
            Opts::new("x1c_transfers_total", "Committed transfers"),
            registry
        )
        .expect("failed to register transfers counter");

        let approvals = register_int_counter_with_registry!(
            Opts::new("x1c_approvals_total", "Committed approvals"),
            registry
        )
        .expect("failed to register approvals counter");

        let stakes = register_int_counter_with_registry!(
            Opts::new("x1c_stakes_total", "Stakes opened"),
            registry
        )
        .expect("failed to register stakes counter");

        let unstakes = register_int_counter_with_registry!(
            Opts::new("x1c_unstakes_total", "Stakes withdrawn"),
            registry
        )
        .expect("failed to register unstakes counter");

        let releases = register_int_counter_with_registry!(
            Opts::new("x1c_team_releases_total", "Team vesting releases"),
            registry
        )
        .expect("failed to register releases counter");

        let rejected = register_int_counter_vec_with_registry!(
            Opts::new("x1c_rejected_total", "Rejected operations"),
            &["operation", "kind"],
            registry
        )
        .expect("failed to register rejected counter");

        let total_supply_tokens = register_int_gauge_with_registry!(
            Opts::new("x1c_total_supply_tokens", "Total supply in whole tokens"),
            registry
        )
        .expect("failed to register total_supply gauge");

        let total_staked_tokens = register_int_gauge_with_registry!(
            Opts::new("x1c_total_staked_tokens", "Principal in stake escrow, whole tokens"),
            registry
        )
        .expect("failed to register total_staked gauge");

        Self {
            registry,
            transfers,
            approvals,
            stakes,
            unstakes,
            releases,
            rejected,
            total_supply_tokens,
            total_staked_tokens,
        }
    }

    /// Refresh the supply gauges.
    pub fn observe_supply(&self, total_supply: TokenAmount, total_staked: TokenAmount) {
        self.total_supply_tokens.set(clamp_i64(total_supply.to_tokens()));
        self.total_staked_tokens.set(clamp_i64(total_staked.to_tokens()));
    }

    /// Encode all metrics in the Prometheus text format.
    pub fn encode_text(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if encoder.encode(&self.registry.gather(), &mut buf).is_err() {
            return String::new();
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}

impl Default for TokenMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_i64(v: u128) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}
