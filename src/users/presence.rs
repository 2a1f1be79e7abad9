use time::{Duration, OffsetDateTime};

/// How long after the last activity a user still counts as online.
pub const ONLINE_WINDOW: Duration = Duration::minutes(5);

/// A `last_seen` in the future yields a negative elapsed time and counts as online.
pub fn is_online_at(last_seen: OffsetDateTime, now: OffsetDateTime) -> bool {
    now - last_seen < ONLINE_WINDOW
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn online_within_window() {
        let seen = datetime!(2024-03-01 12:00:00 UTC);
        assert!(is_online_at(seen, seen));
        assert!(is_online_at(seen, seen + Duration::minutes(4) + Duration::seconds(59)));
    }

    #[test]
    fn offline_after_window() {
        let seen = datetime!(2024-03-01 12:00:00 UTC);
        assert!(!is_online_at(seen, seen + Duration::minutes(5)));
        assert!(!is_online_at(seen, seen + Duration::minutes(5) + Duration::seconds(1)));
        assert!(!is_online_at(seen, seen + Duration::days(2)));
    }

    #[test]
    fn future_last_seen_counts_as_online() {
        let now = datetime!(2024-03-01 12:00:00 UTC);
        assert!(is_online_at(now + Duration::minutes(1), now));
    }
}
