use std::{error::Error, fmt};

pub const SECONDS_PER_DAY: i64 = 24 * 3600;

/// End of the extended GTFS operating day, `36:00:00`.
pub const EXTENDED_DAY_END: i64 = 36 * 3600;

/// Largest time or duration accepted from input tables, one year.
pub const MAX_TIME_SECONDS: i64 = 366 * SECONDS_PER_DAY;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeParseError {
    pub value: String,
}

impl fmt::Display for TimeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid time '{}', expected HH:MM:SS or D.HH:MM:SS",
            self.value
        )
    }
}

impl Error for TimeParseError {}

/// Parses a clock time into seconds since the start of the service day.
///
/// Accepts `HH:MM:SS`, `H:MM:SS`, `HH:MM` and a day count prefix such as
/// `1.02:30:00`, which is `26:30:00`. Hours may exceed 24.
pub fn parse_time(value: &str) -> Result<i64, TimeParseError> {
    let invalid = || TimeParseError {
        value: value.to_owned(),
    };
    let trimmed = value.trim();
    let (days, clock) = match trimmed.split_once('.') {
        Some((days, clock)) => (days.parse::<i64>().map_err(|_| invalid())?, clock),
        None => (0, trimmed),
    };
    let parts = clock
        .split(':')
        .map(|part| part.parse::<i64>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (*h, *m, *s),
        [h, m] => (*h, *m, 0),
        _ => return Err(invalid()),
    };
    if days < 0 || hours < 0 || !(0..60).contains(&minutes) || !(0..60).contains(&seconds)
    {
        return Err(invalid());
    }
    days.checked_mul(SECONDS_PER_DAY)
        .zip(hours.checked_mul(3600))
        .and_then(|(days, hours)| days.checked_add(hours))
        .and_then(|total| total.checked_add(minutes * 60 + seconds))
        .filter(|total| *total <= MAX_TIME_SECONDS)
        .ok_or_else(invalid)
}

/// Formats seconds as `HH:MM:SS`, letting hours run past 24.
pub fn format_time(total_seconds: i64) -> String {
    let total_seconds = total_seconds.max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_day_prefixed_times() {
        assert_eq!(parse_time("00:00:00"), Ok(0));
        assert_eq!(parse_time("23:50:00"), Ok(85800));
        assert_eq!(parse_time("7:05:09"), Ok(7 * 3600 + 5 * 60 + 9));
        assert_eq!(parse_time("25:35:00"), Ok(25 * 3600 + 35 * 60));
        assert_eq!(parse_time("1.00:10:00"), Ok(86400 + 600));
        assert_eq!(parse_time(" 08:15 "), Ok(8 * 3600 + 15 * 60));
    }

    #[test]
    fn rejects_times_beyond_a_year() {
        assert!(parse_time("200000000000.00:00:00").is_err());
        assert!(parse_time("9999999999999999:00:00").is_err());
        assert!(parse_time("367.00:00:00").is_err());
        assert_eq!(parse_time("365.00:00:00"), Ok(365 * SECONDS_PER_DAY));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_time("").is_err());
        assert!(parse_time("noon").is_err());
        assert!(parse_time("12:61:00").is_err());
        assert!(parse_time("1:2:3:4").is_err());
        assert!(parse_time("x.10:00:00").is_err());
    }

    #[test]
    fn formats_past_midnight() {
        assert_eq!(format_time(3600), "01:00:00");
        assert_eq!(format_time(87000), "24:10:00");
        assert_eq!(format_time(EXTENDED_DAY_END), "36:00:00");
        assert_eq!(parse_time(&format_time(123_456)), Ok(123_456));
    }
}
