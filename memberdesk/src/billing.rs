//! Billing calendar and pricing.
//!
//! Payment dates are plain calendar dates in the business timezone (KST by default). Month
//! arithmetic clamps to the last valid day of the target month, so the 31st rolled into a 30-day
//! month lands on the 30th and into February on the 28th or 29th.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};

/// Price charged per member per month, in KRW.
pub const PRICE_PER_MEMBER_MONTH: i64 = 4000;

/// Monthly cost of one family slot, in KRW (389 per seat, 16 seats).
pub const ACCOUNT_MONTHLY_COST: i64 = 389 * 16;

/// Last day of the given month.
pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// Build a date, clamping `day` to the length of the month.
pub fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day.min(last_day_of_month(year, month)))
}

/// Add `months` calendar months, clamping to month end. Negative values go backwards.
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let index = date.year() * 12 + date.month0() as i32 + months;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    clamped_date(year, month, date.day()).unwrap_or(date)
}

/// The (year, month) of the calendar month before `date`.
pub fn previous_month(date: NaiveDate) -> (i32, u32) {
    if date.month() == 1 {
        (date.year() - 1, 12)
    } else {
        (date.year(), date.month() - 1)
    }
}

/// Target date for a member caught by the monthly renewal sweep.
///
/// Returns `Some` when `payment_date` lies in the month before `today` and its day, clamped into
/// `today`'s month, has been reached. The returned date is that clamped day in `today`'s month.
pub fn sweep_target(payment_date: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
    let (prev_year, prev_month) = previous_month(today);
    if payment_date.year() != prev_year || payment_date.month() != prev_month {
        return None;
    }

    let target = clamped_date(today.year(), today.month(), payment_date.day())?;
    (target <= today).then_some(target)
}

/// Calendar date of `instant` at a fixed UTC offset in hours.
pub fn date_in_offset(instant: DateTime<Utc>, offset_hours: i32) -> NaiveDate {
    match FixedOffset::east_opt(offset_hours * 3600) {
        Some(offset) => instant.with_timezone(&offset).date_naive(),
        None => (instant + Duration::hours(offset_hours as i64)).date_naive(),
    }
}

/// Today's date at a fixed UTC offset in hours.
pub fn today_in_offset(offset_hours: i32) -> NaiveDate {
    date_in_offset(Utc::now(), offset_hours)
}

/// The UTC instant at which `date` begins at a fixed UTC offset in hours.
pub fn start_of_day_utc(date: NaiveDate, offset_hours: i32) -> DateTime<Utc> {
    let local_midnight = date.and_time(NaiveTime::MIN);
    (local_midnight - Duration::hours(offset_hours as i64)).and_utc()
}

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month before `date`.
pub fn end_of_previous_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = previous_month(date);
    clamped_date(year, month, 31).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2025, 1), 31);
        assert_eq!(last_day_of_month(2025, 2), 28);
        assert_eq!(last_day_of_month(2024, 2), 29);
        assert_eq!(last_day_of_month(2025, 4), 30);
        assert_eq!(last_day_of_month(2025, 12), 31);
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        assert_eq!(add_months(d(2025, 1, 31), 1), d(2025, 2, 28));
        assert_eq!(add_months(d(2024, 1, 31), 1), d(2024, 2, 29));
        assert_eq!(add_months(d(2025, 3, 31), 1), d(2025, 4, 30));
        assert_eq!(add_months(d(2025, 1, 15), 3), d(2025, 4, 15));
    }

    #[test]
    fn test_add_months_crosses_years() {
        assert_eq!(add_months(d(2025, 11, 30), 3), d(2026, 2, 28));
        assert_eq!(add_months(d(2025, 12, 5), 1), d(2026, 1, 5));
        assert_eq!(add_months(d(2025, 1, 5), -1), d(2024, 12, 5));
        assert_eq!(add_months(d(2025, 6, 1), 12), d(2026, 6, 1));
    }

    #[test]
    fn test_previous_month_wraps_january() {
        assert_eq!(previous_month(d(2025, 1, 10)), (2024, 12));
        assert_eq!(previous_month(d(2025, 3, 1)), (2025, 2));
    }

    #[test]
    fn test_sweep_clamps_january_31_into_february() {
        assert_eq!(sweep_target(d(2025, 1, 31), d(2025, 2, 28)), Some(d(2025, 2, 28)));
    }

    #[test]
    fn test_sweep_waits_for_the_day_to_arrive() {
        assert_eq!(sweep_target(d(2025, 1, 20), d(2025, 2, 19)), None);
        assert_eq!(sweep_target(d(2025, 1, 20), d(2025, 2, 20)), Some(d(2025, 2, 20)));
        assert_eq!(sweep_target(d(2025, 1, 31), d(2025, 2, 27)), None);
    }

    #[test]
    fn test_sweep_ignores_other_months() {
        // Current month and two months back are both out of scope
        assert_eq!(sweep_target(d(2025, 2, 1), d(2025, 2, 28)), None);
        assert_eq!(sweep_target(d(2024, 12, 1), d(2025, 2, 28)), None);
        assert_eq!(sweep_target(d(2024, 1, 5), d(2025, 2, 28)), None);
    }

    #[test]
    fn test_sweep_across_year_boundary() {
        assert_eq!(sweep_target(d(2024, 12, 31), d(2025, 1, 31)), Some(d(2025, 1, 31)));
        assert_eq!(sweep_target(d(2024, 12, 10), d(2025, 1, 15)), Some(d(2025, 1, 10)));
    }

    #[test]
    fn test_end_of_previous_month() {
        assert_eq!(end_of_previous_month(d(2025, 3, 1)), d(2025, 2, 28));
        assert_eq!(end_of_previous_month(d(2025, 1, 15)), d(2024, 12, 31));
    }

    #[test]
    fn test_date_in_offset_crosses_midnight() {
        // 16:30 UTC is already the next day in KST
        let instant = d(2025, 1, 31).and_hms_opt(16, 30, 0).unwrap().and_utc();
        assert_eq!(date_in_offset(instant, 9), d(2025, 2, 1));
        assert_eq!(date_in_offset(instant, 0), d(2025, 1, 31));
    }

    #[test]
    fn test_start_of_day_utc() {
        let start = start_of_day_utc(d(2025, 3, 1), 9);
        assert_eq!(start, d(2025, 2, 28).and_hms_opt(15, 0, 0).unwrap().and_utc());
        assert_eq!(date_in_offset(start, 9), d(2025, 3, 1));
    }

    #[test]
    fn test_first_of_month() {
        assert_eq!(first_of_month(d(2025, 2, 28)), d(2025, 2, 1));
    }

    #[test]
    fn test_today_in_offset_is_within_a_day_of_utc() {
        let utc = Utc::now().date_naive();
        let kst = today_in_offset(9);
        assert!((kst - utc).num_days().abs() <= 1);
    }
}
