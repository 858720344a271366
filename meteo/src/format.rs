//! Display formatting for weather values

use chrono::{DateTime, NaiveDateTime, Utc};

/// `"moscow"` → `"Moscow"`, `"new york"` → `"New york"`
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The reading as reported, whole degrees without a fraction: `5°C`, `-3.5°C`.
pub fn temperature(celsius: f64) -> String {
    // Adding 0.0 turns -0.0 into 0.0.
    format!("{}°C", celsius + 0.0)
}

/// `"2024-01-01T12:00:00Z"` → `"1 January 2024, 12:00"`.
///
/// Offset timestamps are shown in their own offset. Timestamps without an
/// offset are shown as written; anything unparsable is returned unchanged.
pub fn observed_at(timestamp: &str) -> String {
    const FORMAT: &str = "%-d %B %Y, %H:%M";
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return dt.format(FORMAT).to_string();
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(timestamp, fmt).ok())
        .map(|dt| dt.format(FORMAT).to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

/// `"(N min ago)"` with the elapsed time rounded to the nearest minute;
/// nothing while that rounds to zero.
pub fn updated_ago(last_updated: DateTime<Utc>, now: DateTime<Utc>) -> Option<String> {
    let seconds = (now - last_updated).num_seconds();
    if seconds < 30 {
        return None;
    }
    let minutes = (seconds + 30) / 60;
    Some(format!("({} min ago)", minutes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("moscow"), "Moscow");
        assert_eq!(capitalize("new york"), "New york");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("übersee"), "Übersee");
    }

    #[test]
    fn test_temperature() {
        assert_eq!(temperature(5.0), "5°C");
        assert_eq!(temperature(-3.5), "-3.5°C");
        assert_eq!(temperature(21.349), "21.349°C");
        assert_eq!(temperature(-0.0), "0°C");
    }

    #[test]
    fn test_observed_at() {
        assert_eq!(observed_at("2024-01-01T12:00:00Z"), "1 January 2024, 12:00");
        assert_eq!(
            observed_at("2024-07-15T09:05:00+03:00"),
            "15 July 2024, 09:05"
        );
        assert_eq!(observed_at("2024-03-02T18:30"), "2 March 2024, 18:30");
        assert_eq!(observed_at("yesterday"), "yesterday");
    }

    #[test]
    fn test_updated_ago() {
        let then = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(updated_ago(then, then + Duration::seconds(29)), None);
        assert_eq!(
            updated_ago(then, then + Duration::seconds(30)),
            Some("(1 min ago)".into())
        );
        assert_eq!(
            updated_ago(then, then + Duration::seconds(149)),
            Some("(2 min ago)".into())
        );
        assert_eq!(
            updated_ago(then, then + Duration::minutes(3)),
            Some("(3 min ago)".into())
        );
        assert_eq!(updated_ago(then, then - Duration::minutes(1)), None);
    }
}
