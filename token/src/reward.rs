//! Staking reward arithmetic.
//!
//! `reward = ⌊amount × rate × elapsed / (100 × secs_per_year)⌋`
//!
//! Simple (non-compounding) annualised interest, truncated toward zero.
//! The full product `amount × rate × elapsed` can need ~200 bits, so it is
//! never formed: `amount` is split by the denominator into `q·d + r` and
//!
//! `⌊(q·d + r)·k / d⌋ = q·k + ⌊r·k / d⌋`, with `k = rate × elapsed`.
//!
//! `r < d` keeps `r·k` well inside 128 bits for any `u64` elapsed time, so the
//! only way to overflow is a reward that itself exceeds `u128`.

use crate::error::{TokenError, TokenResult};
use x1c_types::{Timestamp, TokenAmount, TokenParams};

/// Reward accrued by `amount` staked at `start`, evaluated at `now`.
///
/// Zero when `now <= start`.
pub fn calculate_reward(
    amount: TokenAmount,
    start: Timestamp,
    now: Timestamp,
    params: &TokenParams,
) -> TokenResult<TokenAmount> {
    let elapsed = start.elapsed_since(now);
    if elapsed == 0 || amount.is_zero() {
        return Ok(TokenAmount::ZERO);
    }
    let numerator = params
        .reward_rate_percent
        .checked_mul(elapsed as u128)
        .ok_or(TokenError::Overflow)?;
    let denominator = 100u128
        .checked_mul(params.secs_per_year as u128)
        .ok_or(TokenError::Overflow)?;
    mul_div_floor(amount.raw(), numerator, denominator)
        .map(TokenAmount::new)
        .ok_or(TokenError::Overflow)
}

/// `⌊a × k / d⌋` without forming `a × k`, for `d < 2^64` and `k < 2^64·100`.
///
/// Returns `None` if `d == 0` or the result does not fit in `u128`.
pub(crate) fn mul_div_floor(a: u128, k: u128, d: u128) -> Option<u128> {
    if d == 0 {
        return None;
    }
    let q = a / d;
    let r = a % d;
    let high = q.checked_mul(k)?;
    let low = r.checked_mul(k)? / d;
    high.checked_add(low)
}

#[cfg(test)]
mod tests {
    use super::*;
    use x1c_types::SECS_PER_DAY;

    fn params() -> TokenParams {
        TokenParams::x1c_defaults()
    }

    #[test]
    fn thirty_days_on_500_tokens() {
        let amount = TokenAmount::from_tokens(500);
        let start = Timestamp::new(1_000);
        let now = start.plus(30 * SECS_PER_DAY);
        let reward = calculate_reward(amount, start, now, &params()).unwrap();

        let expected = amount.raw() * 10 * (30 * SECS_PER_DAY as u128)
            / (100 * 365 * SECS_PER_DAY as u128);
        assert_eq!(reward.raw(), expected);
        // ≈ 4.109589 X1C
        assert_eq!(reward.raw() / 1_000_000_000_000, 4_109_589);
    }

    #[test]
    fn full_year_pays_the_rate() {
        let amount = TokenAmount::from_tokens(1_000);
        let start = Timestamp::new(0);
        let now = start.plus(365 * SECS_PER_DAY);
        let reward = calculate_reward(amount, start, now, &params()).unwrap();
        assert_eq!(reward, TokenAmount::from_tokens(100));
    }

    #[test]
    fn no_reward_before_or_at_start() {
        let amount = TokenAmount::from_tokens(1_000);
        let start = Timestamp::new(500);
        assert_eq!(
            calculate_reward(amount, start, Timestamp::new(500), &params()).unwrap(),
            TokenAmount::ZERO
        );
        assert_eq!(
            calculate_reward(amount, start, Timestamp::new(10), &params()).unwrap(),
            TokenAmount::ZERO
        );
    }

    #[test]
    fn small_amounts_truncate_to_zero() {
        let reward = calculate_reward(
            TokenAmount::new(1),
            Timestamp::new(0),
            Timestamp::new(1),
            &params(),
        )
        .unwrap();
        assert_eq!(reward, TokenAmount::ZERO);
    }

    #[test]
    fn whole_supply_over_long_horizon_does_not_overflow() {
        let amount = TokenAmount::new(u128::MAX / 1_000);
        let reward = calculate_reward(
            amount,
            Timestamp::new(0),
            Timestamp::new(10 * 365 * SECS_PER_DAY),
            &params(),
        )
        .unwrap();
        // ten years at 10 % is exactly the principal
        assert_eq!(reward, amount);
    }

    #[test]
    fn reward_exceeding_u128_is_overflow() {
        let err = calculate_reward(
            TokenAmount::new(u128::MAX),
            Timestamp::new(0),
            Timestamp::new(u64::MAX),
            &params(),
        )
        .unwrap_err();
        assert_eq!(err, TokenError::Overflow);
    }

    #[test]
    fn mul_div_matches_naive_when_naive_fits() {
        for (a, k, d) in [(7u128, 3u128, 2u128), (1_000, 999, 7), (u64::MAX as u128, 13, 17)] {
            assert_eq!(mul_div_floor(a, k, d), Some(a * k / d));
        }
        assert_eq!(mul_div_floor(1, 1, 0), None);
    }
}
