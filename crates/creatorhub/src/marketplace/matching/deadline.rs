//! Display heuristics for the campaign feed: a coarse time-left label and a
//! single badge chosen by fixed priority.

use chrono::{DateTime, Utc};
use serde::Serialize;

const SECONDS_PER_DAY: i64 = 86_400;

/// Whole days until `deadline`, rounding partial days up. Zero or negative
/// means the deadline has passed.
pub fn days_left(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds = (deadline - now).num_seconds();
    (seconds + SECONDS_PER_DAY - 1).div_euclid(SECONDS_PER_DAY)
}

pub fn deadline_label(days: i64) -> String {
    match days {
        i64::MIN..=0 => "Expired".to_string(),
        1 => "1 day".to_string(),
        2..=7 => format!("{days} days"),
        8..=14 => "2 weeks".to_string(),
        15..=21 => "3 weeks".to_string(),
        _ => format!("{} weeks", (days + 6) / 7),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeKind {
    Featured,
    Urgent,
    New,
    Normal,
}

impl BadgeKind {
    pub const fn label(self) -> &'static str {
        match self {
            BadgeKind::Featured => "Featured",
            BadgeKind::Urgent => "Urgent",
            BadgeKind::New => "New",
            BadgeKind::Normal => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub kind: BadgeKind,
    pub label: &'static str,
}

impl From<BadgeKind> for Badge {
    fn from(kind: BadgeKind) -> Self {
        Self {
            kind,
            label: kind.label(),
        }
    }
}

/// First matching rule wins: featured, then urgent, then new.
pub fn badge_for(is_featured: bool, is_urgent: bool, days: i64) -> Badge {
    let kind = if is_featured {
        BadgeKind::Featured
    } else if is_urgent || days <= 3 {
        BadgeKind::Urgent
    } else if days <= 7 {
        BadgeKind::New
    } else {
        BadgeKind::Normal
    };
    kind.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 9, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn labels_follow_buckets() {
        assert_eq!(deadline_label(0), "Expired");
        assert_eq!(deadline_label(-4), "Expired");
        assert_eq!(deadline_label(1), "1 day");
        assert_eq!(deadline_label(5), "5 days");
        assert_eq!(deadline_label(7), "7 days");
        assert_eq!(deadline_label(8), "2 weeks");
        assert_eq!(deadline_label(10), "2 weeks");
        assert_eq!(deadline_label(21), "3 weeks");
        assert_eq!(deadline_label(22), "4 weeks");
        assert_eq!(deadline_label(30), "5 weeks");
    }

    #[test]
    fn partial_days_round_up() {
        let now = now();
        assert_eq!(days_left(now + Duration::hours(1), now), 1);
        assert_eq!(days_left(now + Duration::days(2), now), 2);
        assert_eq!(days_left(now + Duration::days(2) + Duration::seconds(1), now), 3);
        assert_eq!(days_left(now, now), 0);
        assert_eq!(days_left(now - Duration::hours(30), now), -1);
    }

    #[test]
    fn featured_outranks_urgent() {
        let badge = badge_for(true, true, 1);
        assert_eq!(badge.kind, BadgeKind::Featured);
        assert_eq!(badge.label, "Featured");
    }

    #[test]
    fn proximity_drives_urgent_and_new() {
        assert_eq!(badge_for(false, false, 3).kind, BadgeKind::Urgent);
        assert_eq!(badge_for(false, true, 40).kind, BadgeKind::Urgent);
        assert_eq!(badge_for(false, false, 4).kind, BadgeKind::New);
        assert_eq!(badge_for(false, false, 7).kind, BadgeKind::New);
        let normal = badge_for(false, false, 8);
        assert_eq!(normal.kind, BadgeKind::Normal);
        assert_eq!(normal.label, "");
    }

    #[test]
    fn badge_serializes_kind_and_label() {
        let value = serde_json::to_value(badge_for(false, false, 2)).expect("serializes");
        assert_eq!(value, serde_json::json!({ "kind": "urgent", "label": "Urgent" }));
    }

    proptest! {
        #[test]
        fn week_labels_cover_the_whole_window(days in 22i64..5_000) {
            let weeks = (days + 6) / 7;
            prop_assert_eq!(deadline_label(days), format!("{weeks} weeks"));
            prop_assert!(weeks * 7 >= days);
            prop_assert!((weeks - 1) * 7 < days);
        }

        #[test]
        fn days_left_never_undercounts(seconds in -10_000_000i64..10_000_000) {
            let now = now();
            let days = days_left(now + Duration::seconds(seconds), now);
            prop_assert!(days * SECONDS_PER_DAY >= seconds);
            prop_assert!((days - 1) * SECONDS_PER_DAY < seconds);
        }

        #[test]
        fn featured_always_wins(is_urgent: bool, days in -30i64..400) {
            prop_assert_eq!(badge_for(true, is_urgent, days).kind, BadgeKind::Featured);
        }
    }
}
