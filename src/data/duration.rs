use anyhow::{bail, Result};
use chrono::{DateTime, TimeDelta, Utc};

/// Suffix to seconds multiplier (order matters: longer suffixes first)
const UNITS: &[(&str, i64)] = &[
    ("mo", 30 * 86_400),
    ("w", 7 * 86_400),
    ("d", 86_400),
    ("h", 3_600),
    ("m", 60),
    ("s", 1),
];

/// Parse window spans like "24h", "5d", "1mo", "90s"
pub fn parse_span(s: &str) -> Result<TimeDelta> {
    let s = s.trim();

    for (suffix, seconds) in UNITS {
        if let Some(val_str) = s.strip_suffix(suffix) {
            let val: i64 = val_str.trim().parse()?;
            if val < 0 {
                bail!("Negative span: {}", s);
            }
            let Some(span) = val.checked_mul(*seconds).and_then(TimeDelta::try_seconds) else {
                bail!("Span out of range: {}", s);
            };
            return Ok(span);
        }
    }

    bail!("Unknown span format: {}", s)
}

/// Format a span for display, using the largest whole unit
pub fn format_span(d: TimeDelta) -> String {
    let secs = d.num_seconds();
    if secs >= 86_400 && secs % 86_400 == 0 {
        format!("{}d", secs / 86_400)
    } else if secs >= 3_600 && secs % 3_600 == 0 {
        format!("{}h", secs / 3_600)
    } else if secs >= 60 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

/// Format how long ago a timestamp was, relative to `now`
pub fn format_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    if secs < 0 {
        "in the future".to_string()
    } else if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3_600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86_400 {
        format!("{}h ago", secs / 3_600)
    } else {
        format!("{}d ago", secs / 86_400)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hours() {
        assert_eq!(parse_span("24h").unwrap(), TimeDelta::hours(24));
    }

    #[test]
    fn test_parse_days_and_months() {
        assert_eq!(parse_span("5d").unwrap(), TimeDelta::days(5));
        assert_eq!(parse_span("1mo").unwrap(), TimeDelta::days(30));
    }

    #[test]
    fn test_minutes_not_confused_with_months() {
        assert_eq!(parse_span("30m").unwrap(), TimeDelta::minutes(30));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_span("soon").is_err());
        assert!(parse_span("-3h").is_err());
    }

    #[test]
    fn test_format_span() {
        assert_eq!(format_span(TimeDelta::days(10)), "10d");
        assert_eq!(format_span(TimeDelta::hours(36)), "36h");
        assert_eq!(format_span(TimeDelta::seconds(90)), "90s");
    }
}
