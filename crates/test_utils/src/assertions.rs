//! Domain-aware assertion helpers

use rust_decimal::Decimal;

use core_kernel::Money;

/// Asserts two monetary values match in both amount and currency
#[track_caller]
pub fn assert_money_eq(actual: Money, expected: Money) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "currency mismatch: {actual} vs {expected}"
    );
    assert_eq!(
        actual.amount(),
        expected.amount(),
        "amount mismatch: {actual} vs {expected}"
    );
}

/// Asserts a monetary value carries the expected decimal amount
#[track_caller]
pub fn assert_amount(actual: Money, expected: Decimal) {
    assert_eq!(
        actual.amount(),
        expected,
        "amount mismatch: {actual} vs {expected}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn matching_money_passes() {
        let a = Money::new(dec!(10.50), Currency::USD);
        let b = Money::new(dec!(10.5), Currency::USD);
        assert_money_eq(a, b);
        assert_amount(a, dec!(10.50));
    }

    #[test]
    #[should_panic(expected = "currency mismatch")]
    fn currency_mismatch_panics() {
        assert_money_eq(
            Money::new(dec!(10), Currency::USD),
            Money::new(dec!(10), Currency::EUR),
        );
    }
}
