//! Universal time expressed in a configurable, non-Gregorian calendar.
//!
//! Every value is backed by a single `f64` of seconds since the epoch; the
//! calendar fields are derived on read. The [Calendar] travels with each
//! value, so two instants built from different calendars still compare by
//! universal time alone.

use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use thiserror::Error;

pub mod format;

pub use format::{DateFormat, SpanFormat};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("{0} must be at least 1")]
    ZeroPeriod(&'static str),
}

/// The lengths of each calendar unit, and where year/day numbering starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    seconds_per_minute: u32,
    minutes_per_hour: u32,
    hours_per_day: u32,
    days_per_year: u32,
    epoch_year: i32,
    epoch_day: i32,
}

impl Calendar {
    pub fn new(
        seconds_per_minute: u32,
        minutes_per_hour: u32,
        hours_per_day: u32,
        days_per_year: u32,
        epoch_year: i32,
        epoch_day: i32,
    ) -> Result<Self, CalendarError> {
        let periods = [
            ("seconds per minute", seconds_per_minute),
            ("minutes per hour", minutes_per_hour),
            ("hours per day", hours_per_day),
            ("days per year", days_per_year),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, value)| *value == 0) {
            return Err(CalendarError::ZeroPeriod(*name));
        }

        Ok(Self {
            seconds_per_minute,
            minutes_per_hour,
            hours_per_day,
            days_per_year,
            epoch_year,
            epoch_day,
        })
    }

    /// Kerbin's stock calendar: 6 hour days, 425 day years.
    pub fn kerbin() -> Self {
        Self {
            seconds_per_minute: 60,
            minutes_per_hour: 60,
            hours_per_day: 6,
            days_per_year: 425,
            epoch_year: 1,
            epoch_day: 1,
        }
    }

    /// 24 hour days, 365 day years, no leap years.
    pub fn earth() -> Self {
        Self {
            hours_per_day: 24,
            days_per_year: 365,
            ..Self::kerbin()
        }
    }

    // Unit lengths, in seconds

    pub fn minute_length(&self) -> f64 {
        self.seconds_per_minute as f64
    }

    pub fn hour_length(&self) -> f64 {
        self.minute_length() * self.minutes_per_hour as f64
    }

    pub fn day_length(&self) -> f64 {
        self.hour_length() * self.hours_per_day as f64
    }

    pub fn year_length(&self) -> f64 {
        self.day_length() * self.days_per_year as f64
    }

    pub fn seconds_per_minute(&self) -> u32 {
        self.seconds_per_minute
    }

    pub fn minutes_per_hour(&self) -> u32 {
        self.minutes_per_hour
    }

    pub fn hours_per_day(&self) -> u32 {
        self.hours_per_day
    }

    pub fn days_per_year(&self) -> u32 {
        self.days_per_year
    }

    pub fn epoch_year(&self) -> i32 {
        self.epoch_year
    }

    pub fn epoch_day(&self) -> i32 {
        self.epoch_day
    }

    /// Composes calendar fields into an instant. Fields outside their usual
    /// ranges simply carry over (e.g. hour 7 of a 6 hour day is hour 1 of
    /// the next).
    pub fn date_time(
        &self,
        year: i32,
        day: i32,
        hour: i32,
        minute: i32,
        second: i32,
        millisecond: i32,
    ) -> DateTime {
        let ut = (year - self.epoch_year) as f64 * self.year_length()
            + (day - self.epoch_day) as f64 * self.day_length()
            + hour as f64 * self.hour_length()
            + minute as f64 * self.minute_length()
            + second as f64
            + millisecond as f64 / 1000.0;
        DateTime::from_ut(ut, *self)
    }

    pub fn date(&self, year: i32, day: i32) -> DateTime {
        self.date_time(year, day, 0, 0, 0, 0)
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::kerbin()
    }
}

/// The host's source of "the current universal time".
pub trait UniversalClock {
    fn universal_time(&self) -> f64;
}

/// A clock stopped at a fixed universal time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock(pub f64);

impl UniversalClock for FixedClock {
    fn universal_time(&self) -> f64 {
        self.0
    }
}

// Breaks a non-negative number of seconds into whole units of `period`, plus
// whatever is left over.
fn whole_units(seconds: f64, period: f64) -> f64 {
    (seconds / period).floor()
}

fn millis_of(seconds: f64) -> i32 {
    let frac = seconds - seconds.floor();
    // Rounding can't be allowed to spill into the next second
    ((frac * 1000.0).round() as i32).min(999)
}

/// An instant, as seconds since the calendar epoch.
#[derive(Debug, Clone, Copy)]
pub struct DateTime {
    ut: f64,
    calendar: Calendar,
}

impl DateTime {
    pub fn from_ut(ut: f64, calendar: Calendar) -> Self {
        Self { ut, calendar }
    }

    pub fn now(clock: &impl UniversalClock, calendar: Calendar) -> Self {
        Self::from_ut(clock.universal_time(), calendar)
    }

    /// The start of the current day.
    pub fn today(clock: &impl UniversalClock, calendar: Calendar) -> Self {
        Self::now(clock, calendar).date()
    }

    pub fn ut(&self) -> f64 {
        self.ut
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    // -- Calendar fields --

    pub fn year(&self) -> i32 {
        self.calendar.epoch_year + whole_units(self.ut, self.calendar.year_length()) as i32
    }

    pub fn day(&self) -> i32 {
        let into_year = self.ut.rem_euclid(self.calendar.year_length());
        self.calendar.epoch_day + whole_units(into_year, self.calendar.day_length()) as i32
    }

    pub fn hour(&self) -> i32 {
        let into_day = self.ut.rem_euclid(self.calendar.day_length());
        whole_units(into_day, self.calendar.hour_length()) as i32
    }

    pub fn minute(&self) -> i32 {
        let into_hour = self.ut.rem_euclid(self.calendar.hour_length());
        whole_units(into_hour, self.calendar.minute_length()) as i32
    }

    pub fn second(&self) -> i32 {
        self.ut.rem_euclid(self.calendar.minute_length()).floor() as i32
    }

    pub fn millisecond(&self) -> i32 {
        millis_of(self.ut)
    }

    // -- Field setters. Each one only touches its own field. --

    pub fn with_year(&self, year: i32) -> Self {
        let delta = (year - self.year()) as f64 * self.calendar.year_length();
        self.shifted(delta)
    }

    pub fn with_day(&self, day: i32) -> Self {
        let delta = (day - self.day()) as f64 * self.calendar.day_length();
        self.shifted(delta)
    }

    pub fn with_hour(&self, hour: i32) -> Self {
        let delta = (hour - self.hour()) as f64 * self.calendar.hour_length();
        self.shifted(delta)
    }

    pub fn with_minute(&self, minute: i32) -> Self {
        let delta = (minute - self.minute()) as f64 * self.calendar.minute_length();
        self.shifted(delta)
    }

    pub fn with_second(&self, second: i32) -> Self {
        self.shifted((second - self.second()) as f64)
    }

    pub fn with_millisecond(&self, millisecond: i32) -> Self {
        self.shifted((millisecond - self.millisecond()) as f64 / 1000.0)
    }

    // -- Arithmetic --

    fn shifted(&self, seconds: f64) -> Self {
        Self::from_ut(self.ut + seconds, self.calendar)
    }

    pub fn add_years(&self, years: f64) -> Self {
        self.shifted(years * self.calendar.year_length())
    }

    pub fn add_days(&self, days: f64) -> Self {
        self.shifted(days * self.calendar.day_length())
    }

    pub fn add_hours(&self, hours: f64) -> Self {
        self.shifted(hours * self.calendar.hour_length())
    }

    pub fn add_minutes(&self, minutes: f64) -> Self {
        self.shifted(minutes * self.calendar.minute_length())
    }

    pub fn add_seconds(&self, seconds: f64) -> Self {
        self.shifted(seconds)
    }

    pub fn add_milliseconds(&self, milliseconds: f64) -> Self {
        self.shifted(milliseconds / 1000.0)
    }

    /// The start of this instant's day.
    pub fn date(&self) -> Self {
        let into_day = self.ut.rem_euclid(self.calendar.day_length());
        Self::from_ut(self.ut - into_day, self.calendar)
    }

    pub fn time_of_day(&self) -> TimeSpan {
        let into_day = self.ut.rem_euclid(self.calendar.day_length());
        TimeSpan::from_seconds(into_day, self.calendar)
    }

    /// Total order on universal time, NaN included.
    pub fn compare(&self, other: &Self) -> Ordering {
        self.ut.total_cmp(&other.ut)
    }
}

impl PartialEq for DateTime {
    fn eq(&self, other: &Self) -> bool {
        self.ut == other.ut
    }
}

impl PartialOrd for DateTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.ut.partial_cmp(&other.ut)
    }
}

/// A signed length of time.
#[derive(Debug, Clone, Copy)]
pub struct TimeSpan {
    seconds: f64,
    calendar: Calendar,
}

impl TimeSpan {
    pub fn from_seconds(seconds: f64, calendar: Calendar) -> Self {
        Self { seconds, calendar }
    }

    pub fn from_parts(
        calendar: Calendar,
        days: i32,
        hours: i32,
        minutes: i32,
        seconds: i32,
        milliseconds: i32,
    ) -> Self {
        let total = days as f64 * calendar.day_length()
            + hours as f64 * calendar.hour_length()
            + minutes as f64 * calendar.minute_length()
            + seconds as f64
            + milliseconds as f64 / 1000.0;
        Self::from_seconds(total, calendar)
    }

    pub fn total_seconds(&self) -> f64 {
        self.seconds
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn is_negative(&self) -> bool {
        self.seconds < 0.0
    }

    pub fn abs(&self) -> Self {
        Self::from_seconds(self.seconds.abs(), self.calendar)
    }

    // Field accessors work on the magnitude; check `is_negative` for the sign.

    pub fn years(&self) -> i32 {
        whole_units(self.seconds.abs(), self.calendar.year_length()) as i32
    }

    pub fn days(&self) -> i32 {
        let into_year = self.seconds.abs() % self.calendar.year_length();
        whole_units(into_year, self.calendar.day_length()) as i32
    }

    pub fn hours(&self) -> i32 {
        let into_day = self.seconds.abs() % self.calendar.day_length();
        whole_units(into_day, self.calendar.hour_length()) as i32
    }

    pub fn minutes(&self) -> i32 {
        let into_hour = self.seconds.abs() % self.calendar.hour_length();
        whole_units(into_hour, self.calendar.minute_length()) as i32
    }

    pub fn seconds(&self) -> i32 {
        (self.seconds.abs() % self.calendar.minute_length()).floor() as i32
    }

    pub fn milliseconds(&self) -> i32 {
        millis_of(self.seconds.abs())
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        self.seconds.total_cmp(&other.seconds)
    }
}

impl PartialEq for TimeSpan {
    fn eq(&self, other: &Self) -> bool {
        self.seconds == other.seconds
    }
}

impl PartialOrd for TimeSpan {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.seconds.partial_cmp(&other.seconds)
    }
}

impl Add<TimeSpan> for DateTime {
    type Output = DateTime;

    fn add(self, rhs: TimeSpan) -> DateTime {
        self.shifted(rhs.seconds)
    }
}

impl AddAssign<TimeSpan> for DateTime {
    fn add_assign(&mut self, rhs: TimeSpan) {
        self.ut += rhs.seconds;
    }
}

impl Sub<TimeSpan> for DateTime {
    type Output = DateTime;

    fn sub(self, rhs: TimeSpan) -> DateTime {
        self.shifted(-rhs.seconds)
    }
}

impl SubAssign<TimeSpan> for DateTime {
    fn sub_assign(&mut self, rhs: TimeSpan) {
        self.ut -= rhs.seconds;
    }
}

impl Sub<DateTime> for DateTime {
    type Output = TimeSpan;

    fn sub(self, rhs: DateTime) -> TimeSpan {
        TimeSpan::from_seconds(self.ut - rhs.ut, self.calendar)
    }
}

impl Add for TimeSpan {
    type Output = TimeSpan;

    fn add(self, rhs: TimeSpan) -> TimeSpan {
        TimeSpan::from_seconds(self.seconds + rhs.seconds, self.calendar)
    }
}

impl Sub for TimeSpan {
    type Output = TimeSpan;

    fn sub(self, rhs: TimeSpan) -> TimeSpan {
        TimeSpan::from_seconds(self.seconds - rhs.seconds, self.calendar)
    }
}

impl Neg for TimeSpan {
    type Output = TimeSpan;

    fn neg(self) -> TimeSpan {
        TimeSpan::from_seconds(-self.seconds, self.calendar)
    }
}
