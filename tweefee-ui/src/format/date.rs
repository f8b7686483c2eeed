//! Tweet timestamps
//!
//! Producers send either RFC 3339 or naive ISO-8601 timestamps. Naive ones
//! are UTC. Cards show the viewer's local time.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use std::fmt;

const DISPLAY_FORMAT: &str = "%-d %b %Y, %H:%M";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Twitter's own `created_at` format
const TWITTER_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, TWITTER_FORMAT) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Local-time rendering, or the raw text if it cannot be parsed
pub fn format_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(dt) => format_in(&dt, &Local),
        None => raw.to_string(),
    }
}

fn format_in<Tz>(dt: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    dt.with_timezone(tz).format(DISPLAY_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_parse_naive_as_utc() {
        assert_eq!(parse_date("2017-02-24T16:36:00"), Some(utc(2017, 2, 24, 16, 36)));
        assert_eq!(
            parse_date("2017-02-24T16:36:00.123456"),
            Some(utc(2017, 2, 24, 16, 36) + chrono::Duration::microseconds(123456))
        );
        assert_eq!(parse_date("2017-02-24 16:36:00"), Some(utc(2017, 2, 24, 16, 36)));
    }

    #[test]
    fn test_parse_with_offset() {
        assert_eq!(
            parse_date("2017-02-24T18:36:00+02:00"),
            Some(utc(2017, 2, 24, 16, 36))
        );
        assert_eq!(
            parse_date("Fri Feb 24 16:36:00 +0000 2017"),
            Some(utc(2017, 2, 24, 16, 36))
        );
    }

    #[test]
    fn test_unparseable_is_shown_verbatim() {
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(format_date("yesterday"), "yesterday");
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn test_format_in_zone() {
        let dt = utc(2017, 2, 24, 16, 36);
        assert_eq!(format_in(&dt, &Utc), "24 Feb 2017, 16:36");

        let cet = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(format_in(&dt, &cet), "24 Feb 2017, 17:36");
    }
}
