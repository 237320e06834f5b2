//! Helpers for monetary amounts.
//!
//! Amounts are stored as `f64` pesos and rounded to the nearest centavo
//! (1/100 of a peso) before they are persisted.

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};

/// The largest amount accepted for a single transaction.
pub const MAX_AMOUNT: f64 = 99_999_999_999.99;

/// The currency symbol used when displaying amounts.
pub const CURRENCY_SYMBOL: &str = "₱";

/// The currency code assigned to new accounts when none is given.
pub const DEFAULT_CURRENCY: &str = "PHP";

/// Round `amount` to the nearest centavo, rounding half away from zero.
///
/// The half is judged on `amount * 100` as computed in `f64`, so 150.005
/// (stored as 150.00499...) scales to exactly 15000.5 and rounds to 150.01.
pub fn round_to_centavos(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Format `number` as pesos with two decimal places and thousands separators,
/// e.g. "₱1,234.50" or "-₱12.30".
pub fn format_currency(number: f64) -> String {
    static POSITIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let positive_fmt = POSITIVE_FMT.get_or_init(|| {
        Formatter::currency(CURRENCY_SYMBOL)
            .unwrap()
            .precision(Precision::Decimals(2))
    });

    static NEGATIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let negative_fmt = NEGATIVE_FMT.get_or_init(|| {
        Formatter::currency("-₱")
            .unwrap()
            .precision(Precision::Decimals(2))
    });

    let mut formatted_string = if number < 0.0 {
        negative_fmt.fmt_string(number.abs())
    } else if number > 0.0 {
        positive_fmt.fmt_string(number)
    } else {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        format!("{CURRENCY_SYMBOL}0.00")
    };

    // numfmt omits trailing zeros, e.g. "12.30" is rendered as "12.3" and
    // "200.00" as "200", so pad the fractional part back out.
    match formatted_string.rfind('.') {
        Some(dot) => {
            let decimals = formatted_string.len() - dot - 1;
            for _ in decimals..2 {
                formatted_string.push('0');
            }
        }
        None => formatted_string.push_str(".00"),
    }

    formatted_string
}

#[cfg(test)]
mod round_to_centavos_tests {
    use super::round_to_centavos;

    #[test]
    fn rounds_to_two_decimal_places() {
        assert_eq!(round_to_centavos(12.344), 12.34);
        assert_eq!(round_to_centavos(12.346), 12.35);
        assert_eq!(round_to_centavos(-7.126), -7.13);
    }

    #[test]
    fn half_centavo_rounds_away_from_zero() {
        assert_eq!(round_to_centavos(150.005), 150.01);
        assert_eq!(round_to_centavos(0.125), 0.13);
        assert_eq!(round_to_centavos(-0.125), -0.13);
    }

    #[test]
    fn rounding_is_idempotent() {
        for amount in [0.01, 0.1, 1.005, 19.999, 150.005, 1234.5678, 99_999_999_999.99] {
            let once = round_to_centavos(amount);
            let twice = round_to_centavos(once);

            assert_eq!(once, twice, "rounding {amount} twice changed {once} to {twice}");
        }
    }
}

#[cfg(test)]
mod format_currency_tests {
    use super::format_currency;

    #[test]
    fn formats_zero() {
        assert_eq!(format_currency(0.0), "₱0.00");
    }

    #[test]
    fn pads_to_two_decimal_places() {
        let formatted = format_currency(12.3);

        assert!(formatted.ends_with("12.30"), "got {formatted}");
    }

    #[test]
    fn negative_amounts_have_minus_sign() {
        let formatted = format_currency(-5.5);

        assert!(formatted.starts_with("-₱"), "got {formatted}");
    }
}
