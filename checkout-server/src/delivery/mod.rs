//! Delivery-date resolution
//!
//! Orders ship on business days only. The resolver either honours an
//! explicit preferred date or seeds a candidate from the current time in
//! the business timezone, then scans forward past weekends and clinic
//! blackout dates.
//!
//! # Seeding rules (no preferred date)
//!
//! | Now | Candidate |
//! |-----|-----------|
//! | Sunday | +3 days |
//! | Saturday | +4 days |
//! | Mon-Fri, at/after cutoff | +5 (Thu/Fri) or +3 days |
//! | Mon-Fri, before cutoff | +4 (Thu/Fri) or +2 days |
//!
//! The cutoff (14:30 by default) is the courier dispatch deadline; Thu/Fri
//! orders skip the weekend the parcel would otherwise sit through.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Weekday};
use std::collections::HashSet;

use crate::orders::error::OrderError;

/// Sentinel the storefront submits when no preferred date was picked
pub const EMPTY_SENTINEL: &str = "empty";

/// Date format accepted for preferred delivery dates
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a preferred-date string, swallowing the sentinel and garbage
///
/// Invalid date strings are treated as absent, not as errors.
pub fn parse_preferred(preferred: Option<&str>) -> Option<NaiveDate> {
    preferred
        .filter(|s| !s.is_empty() && *s != EMPTY_SENTINEL)
        .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
}

/// Whether a date can take deliveries: weekday and not blacked out
pub fn is_deliverable(date: NaiveDate, blackouts: &HashSet<NaiveDate>) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !blackouts.contains(&date)
}

/// Seed the first candidate date from "now" in the business timezone
fn seed_candidate<Tz: TimeZone>(now: &DateTime<Tz>, cutoff: NaiveTime) -> NaiveDate {
    let today = now.date_naive();
    let weekday = now.weekday();
    let offset = match weekday {
        Weekday::Sun => 3,
        Weekday::Sat => 4,
        _ => {
            let late = now.time() >= cutoff;
            let pre_weekend = matches!(weekday, Weekday::Thu | Weekday::Fri);
            match (late, pre_weekend) {
                (true, true) => 5,
                (true, false) => 3,
                (false, true) => 4,
                (false, false) => 2,
            }
        }
    };
    today + Duration::days(offset)
}

/// Resolve the delivery date for an order or item
///
/// `max_scan_days` bounds the forward scan; a calendar where weekends and
/// blackouts cover the whole window yields `NoDeliveryCapacity` instead
/// of scanning forever.
pub fn resolve_delivery_date<Tz: TimeZone>(
    preferred: Option<&str>,
    now: &DateTime<Tz>,
    cutoff: NaiveTime,
    blackouts: &HashSet<NaiveDate>,
    max_scan_days: u32,
) -> Result<NaiveDate, OrderError> {
    let start = match parse_preferred(preferred) {
        Some(date) => date,
        None => seed_candidate(now, cutoff),
    };
    next_deliverable(start, blackouts, max_scan_days)
}

/// First deliverable date at or after `start`
pub fn next_deliverable(
    start: NaiveDate,
    blackouts: &HashSet<NaiveDate>,
    max_scan_days: u32,
) -> Result<NaiveDate, OrderError> {
    let mut candidate = start;
    for _ in 0..=max_scan_days {
        if is_deliverable(candidate, blackouts) {
            return Ok(candidate);
        }
        candidate = candidate
            .succ_opt()
            .ok_or(OrderError::NoDeliveryCapacity(max_scan_days))?;
    }
    Err(OrderError::NoDeliveryCapacity(max_scan_days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use chrono_tz::Pacific::Auckland;

    const MAX_SCAN: u32 = 120;

    fn cutoff() -> NaiveTime {
        NaiveTime::from_hms_opt(14, 30, 0).unwrap()
    }

    fn at(date: &str, time: &str) -> DateTime<chrono_tz::Tz> {
        let naive =
            NaiveDateTime::parse_from_str(&format!("{} {}", date, time), "%Y-%m-%d %H:%M:%S")
                .unwrap();
        naive.and_local_timezone(Auckland).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn resolve(now: DateTime<chrono_tz::Tz>) -> NaiveDate {
        resolve_delivery_date(None, &now, cutoff(), &HashSet::new(), MAX_SCAN).unwrap()
    }

    // 2026-08-03 is a Monday.

    #[test]
    fn test_monday_before_cutoff_is_plus_two() {
        assert_eq!(resolve(at("2026-08-03", "09:00:00")), date("2026-08-05"));
    }

    #[test]
    fn test_monday_after_cutoff_is_plus_three() {
        assert_eq!(resolve(at("2026-08-03", "15:00:00")), date("2026-08-06"));
    }

    #[test]
    fn test_cutoff_boundary_counts_as_late() {
        // Exactly 14:30 is already past the dispatch deadline
        assert_eq!(resolve(at("2026-08-03", "14:30:00")), date("2026-08-06"));
    }

    #[test]
    fn test_thursday_before_cutoff_is_plus_four() {
        // Thu +4 lands on Monday
        assert_eq!(resolve(at("2026-08-06", "09:00:00")), date("2026-08-10"));
    }

    #[test]
    fn test_thursday_after_cutoff_is_plus_five() {
        // Thu +5 lands on Tuesday
        assert_eq!(resolve(at("2026-08-06", "16:00:00")), date("2026-08-11"));
    }

    #[test]
    fn test_friday_before_cutoff_skips_weekend() {
        // Fri +4 = Tuesday
        assert_eq!(resolve(at("2026-08-07", "09:00:00")), date("2026-08-11"));
    }

    #[test]
    fn test_saturday_is_plus_four() {
        // Sat +4 = Wednesday
        assert_eq!(resolve(at("2026-08-08", "11:00:00")), date("2026-08-12"));
    }

    #[test]
    fn test_sunday_is_plus_three() {
        // Sun +3 = Wednesday
        assert_eq!(resolve(at("2026-08-09", "11:00:00")), date("2026-08-12"));
    }

    #[test]
    fn test_tuesday_before_cutoff_lands_on_thursday() {
        // Tue +2 = Thursday, no weekend adjustment needed
        assert_eq!(resolve(at("2026-08-04", "10:00:00")), date("2026-08-06"));
    }

    #[test]
    fn test_wednesday_after_cutoff_skips_weekend() {
        // Wed +3 = Saturday, scan advances to Monday
        assert_eq!(resolve(at("2026-08-05", "16:00:00")), date("2026-08-10"));
    }

    #[test]
    fn test_preferred_date_is_used() {
        let now = at("2026-08-03", "09:00:00");
        let resolved = resolve_delivery_date(
            Some("2026-08-20"),
            &now,
            cutoff(),
            &HashSet::new(),
            MAX_SCAN,
        )
        .unwrap();
        assert_eq!(resolved, date("2026-08-20"));
    }

    #[test]
    fn test_preferred_weekend_advances_to_monday() {
        let now = at("2026-08-03", "09:00:00");
        // 2026-08-15 is a Saturday
        let resolved = resolve_delivery_date(
            Some("2026-08-15"),
            &now,
            cutoff(),
            &HashSet::new(),
            MAX_SCAN,
        )
        .unwrap();
        assert_eq!(resolved, date("2026-08-17"));
    }

    #[test]
    fn test_sentinel_and_garbage_fall_back_to_computed() {
        let now = at("2026-08-03", "09:00:00");
        for preferred in [Some("empty"), Some("not-a-date"), Some(""), None] {
            let resolved =
                resolve_delivery_date(preferred, &now, cutoff(), &HashSet::new(), MAX_SCAN)
                    .unwrap();
            assert_eq!(resolved, date("2026-08-05"));
        }
    }

    #[test]
    fn test_blackout_pushes_past() {
        let now = at("2026-08-03", "09:00:00");
        let blackouts: HashSet<NaiveDate> =
            [date("2026-08-05"), date("2026-08-06")].into_iter().collect();
        let resolved =
            resolve_delivery_date(None, &now, cutoff(), &blackouts, MAX_SCAN).unwrap();
        assert_eq!(resolved, date("2026-08-07"));
    }

    #[test]
    fn test_never_returns_weekend_or_blackout() {
        let blackouts: HashSet<NaiveDate> =
            [date("2026-08-10"), date("2026-08-11")].into_iter().collect();
        let times = ["08:00:00", "14:29:59", "14:30:00", "23:00:00"];
        for day in 3..=9 {
            for time in times {
                let now = at(&format!("2026-08-{:02}", day), time);
                let resolved =
                    resolve_delivery_date(None, &now, cutoff(), &blackouts, MAX_SCAN).unwrap();
                assert!(is_deliverable(resolved, &blackouts), "got {}", resolved);
            }
        }
    }

    #[test]
    fn test_exhausted_scan_is_an_error() {
        // Blackouts cover the whole window
        let start = date("2026-08-03");
        let blackouts: HashSet<NaiveDate> =
            (0..40).map(|i| start + Duration::days(i)).collect();
        let now = at("2026-08-03", "09:00:00");
        let result = resolve_delivery_date(None, &now, cutoff(), &blackouts, 30);
        assert!(matches!(result, Err(OrderError::NoDeliveryCapacity(30))));
    }
}
