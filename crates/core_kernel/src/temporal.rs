//! Calendar arithmetic for premium scheduling
//!
//! Due-date calculations add whole calendar months rather than fixed day
//! counts, clamping to the last day of shorter months (Jan 31 + 1 month is
//! Feb 28/29, not Mar 2/3).

use chrono::{Datelike, NaiveDate};

/// Adds whole calendar months to a date, clamping the day to the end of
/// the target month when necessary.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    let zero_based = date.month0() + months;
    let year = date.year() + (zero_based / 12) as i32;
    let month = zero_based % 12 + 1;

    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or(date)
}

/// Number of whole days from `from` to `to` (negative if `to` is earlier)
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match next {
        Some(first_of_next) => first_of_next.pred_opt().map(|d| d.day()).unwrap_or(28),
        None => 28,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn adds_single_month() {
        assert_eq!(add_months(d(2024, 1, 1), 1), d(2024, 2, 1));
    }

    #[test]
    fn clamps_to_end_of_shorter_month() {
        assert_eq!(add_months(d(2024, 1, 31), 1), d(2024, 2, 29));
        assert_eq!(add_months(d(2023, 1, 31), 1), d(2023, 2, 28));
        assert_eq!(add_months(d(2024, 3, 31), 1), d(2024, 4, 30));
    }

    #[test]
    fn crosses_year_boundary() {
        assert_eq!(add_months(d(2024, 11, 15), 3), d(2025, 2, 15));
        assert_eq!(add_months(d(2024, 6, 1), 12), d(2025, 6, 1));
    }

    #[test]
    fn day_difference() {
        assert_eq!(days_between(d(2024, 1, 1), d(2024, 1, 16)), 15);
        assert_eq!(days_between(d(2024, 1, 16), d(2024, 1, 1)), -15);
    }
}
