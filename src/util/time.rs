use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Calendar date of a Jira timestamp, taken in the offset the timestamp was
/// written in (`2024-01-01T23:30:00.000+0300` is 2024-01-01, not the UTC day).
///
/// Accepts Jira's `+0000` offsets, RFC 3339, offset-less date-times and bare dates.
pub fn parse_jira_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn jira_offset_without_colon() {
        assert_eq!(parse_jira_date("2024-01-01T00:00:00.000+0000"), Some(date(2024, 1, 1)));
    }

    #[test]
    fn keeps_local_calendar_day() {
        assert_eq!(parse_jira_date("2024-03-10T23:30:00.000+0300"), Some(date(2024, 3, 10)));
        assert_eq!(parse_jira_date("2024-03-10T01:15:00.000-0500"), Some(date(2024, 3, 10)));
    }

    #[test]
    fn rfc3339_and_bare_dates() {
        assert_eq!(parse_jira_date("2024-05-06T10:00:00+02:00"), Some(date(2024, 5, 6)));
        assert_eq!(parse_jira_date("2024-05-06"), Some(date(2024, 5, 6)));
        assert_eq!(parse_jira_date("2024-05-06T10:00:00"), Some(date(2024, 5, 6)));
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(parse_jira_date("yesterday"), None);
        assert_eq!(parse_jira_date(""), None);
    }
}
