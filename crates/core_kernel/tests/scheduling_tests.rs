//! Integration tests combining money and calendar arithmetic as the
//! billing domain uses them together.

use chrono::NaiveDate;
use core_kernel::{add_months, days_between, Currency, Money, Rate};
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn monthly_schedule_from_policy_start() {
    let start = date(2024, 1, 1);
    let mut due = start;
    let mut dates = Vec::new();
    for _ in 0..3 {
        due = add_months(due, 1);
        dates.push(due);
    }
    assert_eq!(
        dates,
        vec![date(2024, 2, 1), date(2024, 3, 1), date(2024, 4, 1)]
    );
}

#[test]
fn quarterly_and_annual_steps() {
    let start = date(2024, 1, 31);
    assert_eq!(add_months(start, 3), date(2024, 4, 30));
    assert_eq!(add_months(start, 6), date(2024, 7, 31));
    assert_eq!(add_months(start, 12), date(2025, 1, 31));
}

#[test]
fn late_fee_surcharge_on_base_amount() {
    let base = Money::new(dec!(1000), Currency::USD);
    let fee = Rate::from_percentage(dec!(2)).apply(&base);
    assert_eq!(fee.amount(), dec!(20));
    assert_eq!((base + fee).amount(), dec!(1020));
}

#[test]
fn overdue_day_counting() {
    let filed = date(2024, 3, 1);
    let today = date(2024, 3, 20);
    assert!(days_between(filed, today) > 15);
}
