//! Timestamp encoding for TEXT columns.
//!
//! Values are written as RFC 3339 in UTC with a fixed nanosecond fraction and a
//! `Z` suffix, so lexical order in SQLite matches chronological order.

use chrono::{DateTime, SecondsFormat, Utc};

use super::{DatabaseError, DatabaseResult};

pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn parse_timestamp(field: &'static str, raw: &str) -> DatabaseResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|error| DatabaseError::decode(field, format!("{raw}: {error}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formatted_timestamps_sort_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2024, 5, 1, 9, 59, 59).unwrap();
        let later = earlier + chrono::Duration::nanoseconds(1_500);

        let a = format_timestamp(&earlier);
        let b = format_timestamp(&later);

        assert!(a < b);
        assert!(a.ends_with('Z'));
        assert_eq!(a.len(), b.len());
    }

    #[test]
    fn parse_rejects_garbage() {
        let error = parse_timestamp("sent_at", "yesterday").unwrap_err();
        assert!(error.to_string().contains("sent_at"));
    }

    #[test]
    fn parse_restores_formatted_value() {
        let now = Utc::now();
        let parsed = parse_timestamp("sent_at", &format_timestamp(&now)).unwrap();
        assert_eq!(parsed, now);
    }
}
