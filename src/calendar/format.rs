use std::fmt;

use super::{DateTime, TimeSpan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFormat {
    /// `Year 2, Day 13`
    Date,
    /// `Year 2, Day 13 - 3h, 0m, 0s`
    #[default]
    DateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpanFormat {
    /// `0 Years, 3 Days, 02:00:00`
    #[default]
    IntervalLong,
    /// Like [SpanFormat::IntervalLong], but leading zero years and days are
    /// dropped: `3 Days, 02:00:00`, or just `02:00:00`.
    IntervalLongTrimYears,
}

pub struct FormattedDateTime<'a> {
    value: &'a DateTime,
    format: DateFormat,
}

pub struct FormattedTimeSpan<'a> {
    value: &'a TimeSpan,
    format: SpanFormat,
}

impl DateTime {
    pub fn display(&self, format: DateFormat) -> FormattedDateTime<'_> {
        FormattedDateTime {
            value: self,
            format,
        }
    }
}

impl TimeSpan {
    pub fn display(&self, format: SpanFormat) -> FormattedTimeSpan<'_> {
        FormattedTimeSpan {
            value: self,
            format,
        }
    }
}

impl fmt::Display for FormattedDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dt = self.value;
        write!(f, "Year {}, Day {}", dt.year(), dt.day())?;
        if self.format == DateFormat::DateTime {
            write!(f, " - {}h, {}m, {}s", dt.hour(), dt.minute(), dt.second())?;
        }
        Ok(())
    }
}

impl fmt::Display for FormattedTimeSpan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let span = self.value;
        if span.is_negative() {
            write!(f, "-")?;
        }

        let (years, days) = (span.years(), span.days());
        match self.format {
            SpanFormat::IntervalLong => write!(f, "{} Years, {} Days, ", years, days)?,
            SpanFormat::IntervalLongTrimYears => {
                if years != 0 {
                    write!(f, "{} Years, ", years)?;
                }
                if years != 0 || days != 0 {
                    write!(f, "{} Days, ", days)?;
                }
            }
        }

        write!(
            f,
            "{:02}:{:02}:{:02}",
            span.hours(),
            span.minutes(),
            span.seconds()
        )
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.display(DateFormat::DateTime), f)
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.display(SpanFormat::IntervalLong), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Calendar;

    #[test]
    fn test_date_formats() {
        let calendar = Calendar::kerbin();
        let dt = calendar.date_time(2, 13, 3, 5, 9, 0);

        assert_eq!(dt.display(DateFormat::Date).to_string(), "Year 2, Day 13");
        assert_eq!(
            dt.display(DateFormat::DateTime).to_string(),
            "Year 2, Day 13 - 3h, 5m, 9s"
        );
        assert_eq!(dt.to_string(), "Year 2, Day 13 - 3h, 5m, 9s");
    }

    #[test]
    fn test_span_formats() {
        let calendar = Calendar::kerbin();
        let span = TimeSpan::from_parts(calendar, 3, 2, 0, 7, 0);

        assert_eq!(span.to_string(), "0 Years, 3 Days, 02:00:07");
        assert_eq!(
            span.display(SpanFormat::IntervalLongTrimYears).to_string(),
            "3 Days, 02:00:07"
        );

        let short = TimeSpan::from_seconds(65.0, calendar);
        assert_eq!(
            short.display(SpanFormat::IntervalLongTrimYears).to_string(),
            "00:01:05"
        );
        assert_eq!((-short).to_string(), "-0 Years, 0 Days, 00:01:05");

        // A year with no extra days still shows the day count
        let long = TimeSpan::from_seconds(calendar.year_length() + 1.0, calendar);
        assert_eq!(
            long.display(SpanFormat::IntervalLongTrimYears).to_string(),
            "1 Years, 0 Days, 00:00:01"
        );
    }
}
