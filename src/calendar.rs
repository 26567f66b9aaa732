//! Trading-day anchor resolution.
//!
//! Maps a publication timestamp to the first calendar day whose trading
//! session the news could move. Deterministic, pure logic; the forward
//! search across weekends and holidays happens in the impact calculator's
//! lookahead window, not here.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;

/// Regular close cutoff, local market time. News at or after the cutoff
/// moves price in the next session.
static CLOSE_CUTOFF: Lazy<NaiveTime> =
    Lazy::new(|| NaiveTime::from_hms_opt(15, 30, 0).expect("valid cutoff time"));

/// Calendar day from which the impact calculator starts searching for the
/// first tradable session.
pub fn resolve_anchor(ts: NaiveDateTime) -> NaiveDate {
    if ts.time() >= *CLOSE_CUTOFF {
        ts.date() + Days::new(1)
    } else {
        ts.date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn at_cutoff_advances_to_next_day() {
        assert_eq!(resolve_anchor(ts("2024-03-15 15:30:00")), day("2024-03-16"));
    }

    #[test]
    fn just_before_cutoff_stays_same_day() {
        assert_eq!(resolve_anchor(ts("2024-03-15 15:29:59")), day("2024-03-15"));
    }

    /// The cutoff is a plain time comparison: 16:05 is after close even
    /// though its minute field is below 30.
    #[test]
    fn after_hour_with_low_minutes_still_advances() {
        assert_eq!(resolve_anchor(ts("2024-03-15 16:05:00")), day("2024-03-16"));
    }

    #[test]
    fn morning_news_anchors_on_publication_day() {
        assert_eq!(resolve_anchor(ts("2024-03-15 09:01:00")), day("2024-03-15"));
    }

    #[test]
    fn month_boundary_rolls_over() {
        assert_eq!(resolve_anchor(ts("2024-02-29 17:00:00")), day("2024-03-01"));
    }
}
