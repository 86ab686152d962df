use std::fmt;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

/// Timestamp of the last successful synchronization.
///
/// Rendered as RFC 3339 with millisecond precision and a `Z` suffix, which
/// is both the stored form and the `min_date` query value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SyncCursor(DateTime<Utc>);

impl SyncCursor {
    /// Current time at the precision the cursor is stored with.
    pub fn now() -> Self {
        Self(Utc::now().trunc_subsecs(3))
    }

    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self(timestamp)
    }

    /// Parse a stored cursor. Anything that is not RFC 3339 yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(raw.trim())
            .ok()
            .map(|dt| Self(dt.with_timezone(&Utc)))
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn to_iso(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.0).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew (negative ages)
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

impl fmt::Display for SyncCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso())
    }
}
