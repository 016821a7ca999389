use std::fmt;
use std::str::FromStr;

use chrono::TimeDelta;
use sea_orm::sea_query::{ArrayType, ColumnType, Nullable, ValueType, ValueTypeErr};
use sea_orm::{ColIdx, DbErr, QueryResult, TryGetError, TryGetable, Value};

const SECONDS_PER_DAY: i64 = 86_400;
// Same month and year lengths Postgres uses for EXTRACT(EPOCH FROM interval).
const SECONDS_PER_MONTH: i64 = 30 * SECONDS_PER_DAY;
const SECONDS_PER_YEAR: i64 = 31_557_600;

/// Time logged against a worklog, stored in the `hour INTERVAL` column.
///
/// Written as a `'<n> seconds'` literal cast to `interval`, read back as the
/// interval's text form. Postgres renders that as `1 day 02:00:00`; SQLite,
/// which gives the column integer affinity, renders plain seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkDuration(TimeDelta);

impl WorkDuration {
    pub fn from_seconds(seconds: i64) -> Self {
        Self(TimeDelta::seconds(seconds))
    }

    pub fn num_seconds(&self) -> i64 {
        self.0.num_seconds()
    }

    pub fn as_time_delta(&self) -> TimeDelta {
        self.0
    }

    fn to_interval_literal(self) -> String {
        format!("{} seconds", self.num_seconds())
    }
}

impl From<TimeDelta> for WorkDuration {
    fn from(value: TimeDelta) -> Self {
        Self(value)
    }
}

impl fmt::Display for WorkDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.num_seconds())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported interval text {0:?}")]
pub struct ParseDurationError(String);

impl FromStr for WorkDuration {
    type Err = ParseDurationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseDurationError(raw.to_string());
        let text = raw.trim();

        if let Ok(seconds) = text.parse::<i64>() {
            return Ok(Self::from_seconds(seconds));
        }

        let mut total: i64 = 0;
        let mut tokens = text.split_whitespace();
        let mut seen_any = false;
        while let Some(token) = tokens.next() {
            seen_any = true;
            if token.contains(':') {
                total += parse_clock(token).ok_or_else(invalid)?;
                continue;
            }
            let amount: i64 = token.parse().map_err(|_| invalid())?;
            let unit = tokens.next().ok_or_else(invalid)?;
            let scale = match unit.trim_end_matches('s') {
                "year" => SECONDS_PER_YEAR,
                "mon" => SECONDS_PER_MONTH,
                "day" => SECONDS_PER_DAY,
                "hour" => 3600,
                "min" | "minute" => 60,
                "sec" | "second" => 1,
                _ => return Err(invalid()),
            };
            total += amount * scale;
        }

        if !seen_any {
            return Err(invalid());
        }
        Ok(Self::from_seconds(total))
    }
}

/// `[-]HH:MM:SS[.ffffff]`; fractional seconds are dropped.
fn parse_clock(token: &str) -> Option<i64> {
    let (sign, clock) = match token.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, token.strip_prefix('+').unwrap_or(token)),
    };
    let mut parts = clock.split(':');
    let hours: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let seconds: i64 = match parts.next() {
        Some(secs) => secs.split('.').next()?.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() || minutes >= 60 || seconds >= 60 {
        return None;
    }
    Some(sign * (hours * 3600 + minutes * 60 + seconds))
}

impl From<WorkDuration> for Value {
    fn from(value: WorkDuration) -> Self {
        Value::String(Some(Box::new(value.to_interval_literal())))
    }
}

impl TryGetable for WorkDuration {
    fn try_get_by<I: ColIdx>(res: &QueryResult, index: I) -> Result<Self, TryGetError> {
        let text = String::try_get_by(res, index)?;
        text.parse()
            .map_err(|e: ParseDurationError| TryGetError::DbErr(DbErr::Type(e.to_string())))
    }
}

impl ValueType for WorkDuration {
    fn try_from(v: Value) -> Result<Self, ValueTypeErr> {
        match v {
            Value::String(Some(text)) => text.parse().map_err(|_| ValueTypeErr),
            _ => Err(ValueTypeErr),
        }
    }

    fn type_name() -> String {
        "WorkDuration".to_string()
    }

    fn array_type() -> ArrayType {
        ArrayType::String
    }

    fn column_type() -> ColumnType {
        ColumnType::Interval(None, None)
    }
}

impl Nullable for WorkDuration {
    fn null() -> Value {
        Value::String(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> i64 {
        raw.parse::<WorkDuration>().unwrap().num_seconds()
    }

    #[test]
    fn postgres_interval_text() {
        assert_eq!(parse("01:00:00"), 3600);
        assert_eq!(parse("25:30:00"), 91_800);
        assert_eq!(parse("00:00:07.25"), 7);
        assert_eq!(parse("1 day 02:00:00"), 93_600);
        assert_eq!(parse("3 days"), 259_200);
        assert_eq!(parse("1 mon 1 day"), 2_678_400);
        assert_eq!(parse("-00:05:00"), -300);
        assert_eq!(parse("90 seconds"), 90);
    }

    #[test]
    fn sqlite_integer_text() {
        assert_eq!(parse("5400"), 5400);
        assert_eq!(parse("-60"), -60);
    }

    #[test]
    fn rejects_other_styles() {
        assert!("PT1H".parse::<WorkDuration>().is_err());
        assert!("".parse::<WorkDuration>().is_err());
        assert!("2 fortnights".parse::<WorkDuration>().is_err());
        assert!("01:75:00".parse::<WorkDuration>().is_err());
    }

    #[test]
    fn written_as_seconds_literal() {
        let value: Value = WorkDuration::from_seconds(3600).into();
        assert_eq!(value, Value::String(Some(Box::new("3600 seconds".to_string()))));
        assert_eq!(
            <WorkDuration as ValueType>::try_from(value).unwrap(),
            WorkDuration::from(TimeDelta::hours(1))
        );
    }
}
