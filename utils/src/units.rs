//! Base-unit to decimal-string conversion.

use x1c_types::TokenAmount;

/// Render `amount` with `decimals` fractional digits, trimming trailing zeros.
///
/// `format_units(1_500_000_000_000_000_000 raw, 18)` is `"1.5"`; whole
/// amounts render without a decimal point.
pub fn format_units(amount: TokenAmount, decimals: u8) -> String {
    let scale = 10u128.pow(decimals as u32);
    let whole = amount.raw() / scale;
    let frac = amount.raw() % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{:0width$}", frac, width = decimals as usize);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// Parse a decimal string such as `"1.5"` into base units.
///
/// `None` for malformed input, more than `decimals` fractional digits, or a
/// value that does not fit.
pub fn parse_units(s: &str, decimals: u8) -> Option<TokenAmount> {
    let (whole, frac) = match s.trim().split_once('.') {
        Some((w, f)) => (w, f),
        None => (s.trim(), ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if frac.len() > decimals as usize {
        return None;
    }
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(frac) {
        return None;
    }

    let scale = 10u128.checked_pow(decimals as u32)?;
    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let frac: u128 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", frac, width = decimals as usize);
        padded.parse().ok()?
    };
    whole
        .checked_mul(scale)?
        .checked_add(frac)
        .map(TokenAmount::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_tokens_have_no_fraction() {
        let a = TokenAmount::from_tokens(500_000_000);
        assert_eq!(format_units(a, 18), "500000000");
    }

    #[test]
    fn fractional_amounts_trim_zeros() {
        let a = TokenAmount::new(1_500_000_000_000_000_000);
        assert_eq!(format_units(a, 18), "1.5");
        assert_eq!(format_units(TokenAmount::new(1), 18), "0.000000000000000001");
    }

    #[test]
    fn zero_decimals_is_raw() {
        assert_eq!(format_units(TokenAmount::new(42), 0), "42");
    }

    #[test]
    fn parse_whole_and_fractional() {
        assert_eq!(parse_units("500", 18), Some(TokenAmount::from_tokens(500)));
        assert_eq!(
            parse_units("1.5", 18),
            Some(TokenAmount::new(1_500_000_000_000_000_000))
        );
        assert_eq!(parse_units(".000000000000000001", 18), Some(TokenAmount::new(1)));
        assert_eq!(parse_units("42", 0), Some(TokenAmount::new(42)));
    }

    #[test]
    fn parse_rejects_malformed() {
        assert_eq!(parse_units("", 18), None);
        assert_eq!(parse_units(".", 18), None);
        assert_eq!(parse_units("1.2.3", 18), None);
        assert_eq!(parse_units("-1", 18), None);
        assert_eq!(parse_units("1e3", 18), None);
        assert_eq!(parse_units("0.1", 0), None);
        assert_eq!(parse_units("1000000000000000000000000000000000000000000", 18), None);
    }

    #[test]
    fn parse_inverts_format() {
        let a = TokenAmount::new(4_109_589_041_095_890_410);
        assert_eq!(parse_units(&format_units(a, 18), 18), Some(a));
    }
}
