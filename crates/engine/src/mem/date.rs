//! Month arithmetic for period axes. All periods are month-aligned, so
//! everything reduces to counting months since year zero.

use chrono::{Datelike, NaiveDate};

/// Construct a date from components. Callers only pass month-aligned,
/// in-range values; an out-of-range input collapses to the epoch.
#[must_use]
pub(crate) fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Months since year zero for the month containing `d`.
#[must_use]
pub(crate) fn month_ordinal(d: NaiveDate) -> i32 {
    d.year() * 12 + d.month0() as i32
}

/// First day of the month `ordinal` months after year zero.
#[must_use]
pub(crate) fn month_start(ordinal: i32) -> NaiveDate {
    ymd(ordinal.div_euclid(12), ordinal.rem_euclid(12) as u32 + 1, 1)
}

/// `d` shifted forward by `months`, clamped to the first of the month.
#[must_use]
pub(crate) fn add_months(d: NaiveDate, months: i32) -> NaiveDate {
    month_start(month_ordinal(d) + months)
}

/// Whole months from `a`'s month to `b`'s month.
#[must_use]
pub(crate) fn months_between(a: NaiveDate, b: NaiveDate) -> i32 {
    month_ordinal(b) - month_ordinal(a)
}

/// Last day of the month containing `d`.
#[must_use]
pub(crate) fn month_end(d: NaiveDate) -> NaiveDate {
    add_months(d, 1).pred_opt().unwrap_or_default()
}
