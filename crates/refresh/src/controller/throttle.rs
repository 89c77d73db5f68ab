//! Minimum-interval check between refreshes.

use chrono::{DateTime, Utc};

/// Whether a throttled refresh may run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Throttle {
    Due,
    Wait { elapsed_hours: f64 },
}

/// Early-fire allowance for the timer path, in milliseconds.
///
/// `last_updated` is stamped when the callback runs, slightly after its tick,
/// so a timer firing on a steady period can land just short of the interval.
pub(crate) const TIMER_TOLERANCE_MS: i64 = 60_000;

const MS_PER_HOUR: i64 = 3_600_000;

/// Compare the time since `last_updated` against `min_interval_hours`,
/// accepting a refresh up to `tolerance_ms` early.
///
/// With no previous update the refresh is always due. A clock that moved
/// backwards yields a negative elapsed time, which waits.
pub(crate) fn check(
    last_updated: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    min_interval_hours: u32,
    tolerance_ms: i64,
) -> Throttle {
    let Some(last) = last_updated else {
        return Throttle::Due;
    };
    let elapsed_ms = now.signed_duration_since(last).num_milliseconds();
    let required_ms = i64::from(min_interval_hours) * MS_PER_HOUR - tolerance_ms;
    if elapsed_ms >= 0 && elapsed_ms >= required_ms {
        Throttle::Due
    } else {
        Throttle::Wait {
            elapsed_hours: elapsed_ms as f64 / MS_PER_HOUR as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn first_refresh_is_due() {
        assert_eq!(check(None, Utc::now(), 1, 0), Throttle::Due);
    }

    #[test]
    fn exactly_one_interval_is_due() {
        let now = Utc::now();
        assert_eq!(check(Some(now - Duration::hours(2)), now, 2, 0), Throttle::Due);
    }

    #[test]
    fn ten_minutes_waits_for_one_hour() {
        let now = Utc::now();
        match check(Some(now - Duration::minutes(10)), now, 1, TIMER_TOLERANCE_MS) {
            Throttle::Wait { elapsed_hours } => {
                assert!((elapsed_hours - 10.0 / 60.0).abs() < 1e-9);
            }
            Throttle::Due => panic!("10 minutes should not satisfy a 1h interval"),
        }
    }

    #[test]
    fn clock_skew_waits() {
        let now = Utc::now();
        assert!(matches!(
            check(Some(now + Duration::minutes(5)), now, 1, TIMER_TOLERANCE_MS),
            Throttle::Wait { .. }
        ));
    }

    #[test]
    fn tolerance_accepts_slightly_early_tick() {
        let now = Utc::now();
        let last = Some(now - Duration::hours(1) + Duration::milliseconds(2));
        assert_eq!(check(last, now, 1, TIMER_TOLERANCE_MS), Throttle::Due);
        assert!(matches!(check(last, now, 1, 0), Throttle::Wait { .. }));
    }

    #[test]
    fn tolerance_does_not_cover_two_minutes_early() {
        let now = Utc::now();
        let last = Some(now - Duration::minutes(58));
        assert!(matches!(
            check(last, now, 1, TIMER_TOLERANCE_MS),
            Throttle::Wait { .. }
        ));
    }
}
