//! Symbol-aware amount formatting
//!
//! `Money` always carries hundredths; currencies with no minor unit (JPY,
//! KRW) are rounded half away from zero when shown.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{CurrencyCode, Money};

/// Format an amount with its currency symbol: `-$1,234.50`, `¥1,235`
pub fn format_amount(amount: Money, currency: CurrencyCode) -> String {
    let (whole, fraction) = split_for_display(amount, currency.decimals());
    let mut out = String::new();
    if amount.is_negative() && (whole != 0 || fraction.bytes().any(|b| b != b'0')) {
        out.push('-');
    }
    out.push_str(&currency.symbol());
    out.push_str(&group_thousands(whole));
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(&fraction);
    }
    out
}

/// Like [`format_amount`] but drops an all-zero fraction: `$12.00` -> `$12`
pub fn format_trimmed(amount: Money, currency: CurrencyCode) -> String {
    let full = format_amount(amount, currency);
    match full.rsplit_once('.') {
        Some((head, tail)) if !tail.is_empty() && tail.bytes().all(|b| b == b'0') => {
            head.to_string()
        }
        _ => full,
    }
}

/// Short form for tight columns: `$999`, `$1.2K`, `-$3.4M`, `$1.5B`
pub fn format_compact(amount: Money, currency: CurrencyCode) -> String {
    const SUFFIXES: [(i64, &str); 3] = [
        (1_000_000_000, "B"),
        (1_000_000, "M"),
        (1_000, "K"),
    ];

    let units = amount.abs().to_decimal();
    if units < Decimal::from(1_000) {
        return format_trimmed(amount, currency);
    }

    let mut chosen = None;
    for (i, (scale, suffix)) in SUFFIXES.iter().enumerate() {
        if units >= Decimal::from(*scale) {
            let mut value = (units / Decimal::from(*scale))
                .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
            let mut suffix = *suffix;
            // 999,950 rounds to 1000.0K; show it as 1M instead
            if value >= Decimal::from(1_000) && i > 0 {
                let (bigger, bigger_suffix) = SUFFIXES[i - 1];
                value = (units / Decimal::from(bigger))
                    .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
                suffix = bigger_suffix;
            }
            chosen = Some((value, suffix));
            break;
        }
    }

    let Some((value, suffix)) = chosen else {
        return format_trimmed(amount, currency);
    };

    let number = value.normalize().to_string();
    let sign = if amount.is_negative() { "-" } else { "" };
    format!("{}{}{}{}", sign, currency.symbol(), number, suffix)
}

/// Plain number with the currency's decimals and no symbol, for CSV output
pub fn format_plain(amount: Money, currency: CurrencyCode) -> String {
    let (whole, fraction) = split_for_display(amount, currency.decimals());
    let sign = if amount.is_negative() && (whole != 0 || fraction.bytes().any(|b| b != b'0')) {
        "-"
    } else {
        ""
    };
    if fraction.is_empty() {
        format!("{}{}", sign, whole)
    } else {
        format!("{}{}.{}", sign, whole, fraction)
    }
}

/// Absolute whole part and fraction digits at the currency's precision
fn split_for_display(amount: Money, decimals: u8) -> (u64, String) {
    let cents = amount.cents().unsigned_abs();
    match decimals {
        0 => ((cents + 50) / 100, String::new()),
        1 => {
            let tenths = (cents + 5) / 10;
            (tenths / 10, format!("{}", tenths % 10))
        }
        _ => (cents / 100, format!("{:02}", cents % 100)),
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    #[test]
    fn test_format_amount_grouping_and_sign() {
        assert_eq!(format_amount(Money::from_cents(123_450), code("USD")), "$1,234.50");
        assert_eq!(format_amount(Money::from_cents(-123_450), code("USD")), "-$1,234.50");
        assert_eq!(format_amount(Money::from_cents(5), code("EUR")), "€0.05");
        assert_eq!(format_amount(Money::zero(), code("GBP")), "£0.00");
        assert_eq!(
            format_amount(Money::from_cents(100_000_000), code("INR")),
            "₹1,000,000.00"
        );
    }

    #[test]
    fn test_zero_decimal_currency_rounds_half_away_from_zero() {
        assert_eq!(format_amount(Money::from_cents(123_450), code("JPY")), "¥1,235");
        assert_eq!(format_amount(Money::from_cents(123_449), code("JPY")), "¥1,234");
        assert_eq!(format_amount(Money::from_cents(-150), code("KRW")), "-₩2");
        // rounds to zero, so no minus sign
        assert_eq!(format_amount(Money::from_cents(-40), code("JPY")), "¥0");
    }

    #[test]
    fn test_unknown_currency_uses_code() {
        assert_eq!(format_amount(Money::from_cents(1_000), code("XYZ")), "XYZ 10.00");
    }

    #[test]
    fn test_format_trimmed() {
        assert_eq!(format_trimmed(Money::from_cents(1_200), code("USD")), "$12");
        assert_eq!(format_trimmed(Money::from_cents(1_250), code("USD")), "$12.50");
        assert_eq!(format_trimmed(Money::from_cents(-100_000), code("USD")), "-$1,000");
        assert_eq!(format_trimmed(Money::from_cents(1_200), code("JPY")), "¥12");
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(Money::from_cents(99_900), code("USD")), "$999");
        assert_eq!(format_compact(Money::from_cents(123_400), code("USD")), "$1.2K");
        assert_eq!(format_compact(Money::from_cents(100_000), code("USD")), "$1K");
        assert_eq!(format_compact(Money::from_cents(-340_000_000), code("USD")), "-$3.4M");
        assert_eq!(format_compact(Money::from_cents(150_000_000_000), code("USD")), "$1.5B");
        assert_eq!(format_compact(Money::from_cents(99_995_000), code("EUR")), "€1M");
    }

    #[test]
    fn test_format_plain() {
        assert_eq!(format_plain(Money::from_cents(-123_456), code("USD")), "-1234.56");
        assert_eq!(format_plain(Money::from_cents(123_456), code("JPY")), "1235");
    }
}
