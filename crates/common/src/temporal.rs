//! Temporal expectations shared across date, date-time and time-only values
//!
//! Every comparison here is written once against [`TemporalAdapter`]. An
//! adapter knows how to obtain a typed value from raw text, how to project it
//! onto a [`Granularity`], and how to compose it onto a single
//! `NaiveDateTime` timeline. Time-only values sit on 1970-01-01 and never wrap
//! around midnight.

use std::fmt;

use chrono::{
    DateTime, Datelike, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime, ParseError,
    TimeDelta, Timelike, Utc, Weekday,
};
use serde::{Deserialize, Serialize};

use crate::expectation::{Expectation, Observed};
use crate::locale::{LocaleFormat, NumberLocale};

/// Unit a temporal value is projected onto before comparing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// Calendar day (date part only)
    Day,
    DayOfWeek,
    HourOfDay,
    MinuteOfHour,
    SecondOfMinute,
    /// Full instant, microsecond precision
    Instant,
}

impl Granularity {
    fn phrase(self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::DayOfWeek => "day of week",
            Granularity::HourOfDay => "hour of day",
            Granularity::MinuteOfHour => "minute of hour",
            Granularity::SecondOfMinute => "second of minute",
            Granularity::Instant => "instant",
        }
    }
}

/// Unit of a `within` window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    Millis,
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

impl DurationUnit {
    pub fn label(self) -> &'static str {
        match self {
            DurationUnit::Millis => "milliseconds",
            DurationUnit::Seconds => "seconds",
            DurationUnit::Minutes => "minutes",
            DurationUnit::Hours => "hours",
            DurationUnit::Days => "days",
            DurationUnit::Weeks => "weeks",
            DurationUnit::Months => "months",
            DurationUnit::Years => "years",
        }
    }

    /// Move `from` by `amount` units. `None` when the result leaves chrono's range.
    pub fn shift(self, from: NaiveDateTime, amount: i64) -> Option<NaiveDateTime> {
        let delta = match self {
            DurationUnit::Millis => TimeDelta::try_milliseconds(amount),
            DurationUnit::Seconds => TimeDelta::try_seconds(amount),
            DurationUnit::Minutes => TimeDelta::try_minutes(amount),
            DurationUnit::Hours => TimeDelta::try_hours(amount),
            DurationUnit::Days => TimeDelta::try_days(amount),
            DurationUnit::Weeks => TimeDelta::try_weeks(amount),
            DurationUnit::Months => return shift_months(from, amount),
            DurationUnit::Years => return shift_months(from, amount.checked_mul(12)?),
        };
        from.checked_add_signed(delta?)
    }
}

fn shift_months(from: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        from.checked_add_months(magnitude)
    } else {
        from.checked_sub_months(magnitude)
    }
}

/// Normalizes one temporal representation for the generic comparisons
pub trait TemporalAdapter: Copy + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Parse raw text (typically read from an element) with a chrono pattern.
    fn convert(raw: &str, pattern: &str) -> Result<Self, ParseError>;

    /// Project onto `granularity`. `None` when the representation does not carry it.
    fn to_unit(&self, granularity: Granularity) -> Option<i64>;

    /// Comparison-ready position on the shared timeline.
    fn compose(&self) -> NaiveDateTime;

    fn render(&self) -> String;
}

fn date_unit(date: NaiveDate, granularity: Granularity) -> Option<i64> {
    match granularity {
        Granularity::Day => Some(i64::from(date.num_days_from_ce())),
        Granularity::DayOfWeek => Some(i64::from(date.weekday().number_from_monday())),
        _ => None,
    }
}

fn clock_unit(time: NaiveTime, granularity: Granularity) -> Option<i64> {
    match granularity {
        Granularity::HourOfDay => Some(i64::from(time.hour())),
        Granularity::MinuteOfHour => Some(i64::from(time.minute())),
        Granularity::SecondOfMinute => Some(i64::from(time.second())),
        _ => None,
    }
}

fn instant_unit(instant: NaiveDateTime) -> i64 {
    instant.and_utc().timestamp_micros()
}

impl TemporalAdapter for NaiveDate {
    fn convert(raw: &str, pattern: &str) -> Result<Self, ParseError> {
        NaiveDate::parse_from_str(raw.trim(), pattern)
    }

    fn to_unit(&self, granularity: Granularity) -> Option<i64> {
        match granularity {
            Granularity::Instant => Some(instant_unit(self.compose())),
            g => date_unit(*self, g),
        }
    }

    fn compose(&self) -> NaiveDateTime {
        self.and_time(NaiveTime::MIN)
    }

    fn render(&self) -> String {
        self.format("%Y-%m-%d").to_string()
    }
}

impl TemporalAdapter for NaiveDateTime {
    fn convert(raw: &str, pattern: &str) -> Result<Self, ParseError> {
        NaiveDateTime::parse_from_str(raw.trim(), pattern)
    }

    fn to_unit(&self, granularity: Granularity) -> Option<i64> {
        match granularity {
            Granularity::Instant => Some(instant_unit(*self)),
            Granularity::Day | Granularity::DayOfWeek => date_unit(self.date(), granularity),
            g => clock_unit(self.time(), g),
        }
    }

    fn compose(&self) -> NaiveDateTime {
        *self
    }

    fn render(&self) -> String {
        self.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
    }
}

impl TemporalAdapter for NaiveTime {
    fn convert(raw: &str, pattern: &str) -> Result<Self, ParseError> {
        NaiveTime::parse_from_str(raw.trim(), pattern)
    }

    fn to_unit(&self, granularity: Granularity) -> Option<i64> {
        match granularity {
            Granularity::Instant => Some(instant_unit(self.compose())),
            g => clock_unit(*self, g),
        }
    }

    fn compose(&self) -> NaiveDateTime {
        NaiveDate::default().and_time(*self)
    }

    fn render(&self) -> String {
        self.format("%H:%M:%S%.f").to_string()
    }
}

impl TemporalAdapter for DateTime<Utc> {
    fn convert(raw: &str, pattern: &str) -> Result<Self, ParseError> {
        let raw = raw.trim();
        DateTime::parse_from_str(raw, pattern)
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|_| NaiveDateTime::parse_from_str(raw, pattern).map(|n| n.and_utc()))
    }

    fn to_unit(&self, granularity: Granularity) -> Option<i64> {
        self.naive_utc().to_unit(granularity)
    }

    fn compose(&self) -> NaiveDateTime {
        self.naive_utc()
    }

    fn render(&self) -> String {
        self.to_rfc3339()
    }
}

/// Ordered on the UTC timeline; calendar and clock fields use the local wall time.
impl TemporalAdapter for DateTime<FixedOffset> {
    fn convert(raw: &str, pattern: &str) -> Result<Self, ParseError> {
        DateTime::parse_from_str(raw.trim(), pattern)
    }

    fn to_unit(&self, granularity: Granularity) -> Option<i64> {
        match granularity {
            Granularity::Instant => Some(instant_unit(self.naive_utc())),
            g => self.naive_local().to_unit(g),
        }
    }

    fn compose(&self) -> NaiveDateTime {
        self.naive_utc()
    }

    fn render(&self) -> String {
        self.to_rfc3339()
    }
}

macro_rules! impl_observed_temporal {
    ($($t:ty),*) => {
        $(
            impl Observed for $t {
                fn observed(&self, _locale: &NumberLocale) -> String {
                    self.render()
                }
            }
        )*
    };
}

impl_observed_temporal!(
    NaiveDate,
    NaiveDateTime,
    NaiveTime,
    DateTime<Utc>,
    DateTime<FixedOffset>
);

// -- Ordering against an instant --

fn ordered<T, F>(label: &'static str, reference: T, accept: F) -> Expectation<T>
where
    T: TemporalAdapter,
    F: Fn(NaiveDateTime, NaiveDateTime) -> bool + Send + Sync + 'static,
{
    let description = format!("{} [{}]", label, reference.render());
    let anchor = reference.compose();
    Expectation::described(move |value: &T| accept(value.compose(), anchor), description)
}

pub fn is_before<T: TemporalAdapter>(reference: T) -> Expectation<T> {
    ordered("is before", reference, |v, r| v < r)
}

pub fn is_after<T: TemporalAdapter>(reference: T) -> Expectation<T> {
    ordered("is after", reference, |v, r| v > r)
}

pub fn is_same_or_before<T: TemporalAdapter>(reference: T) -> Expectation<T> {
    ordered("is same as or before", reference, |v, r| v <= r)
}

pub fn is_same_or_after<T: TemporalAdapter>(reference: T) -> Expectation<T> {
    ordered("is same as or after", reference, |v, r| v >= r)
}

// -- Same unit --

/// Values agree once projected onto `granularity`.
///
/// A representation without that unit (a time has no day, a date has no hour)
/// never matches.
pub fn is_same<T: TemporalAdapter>(granularity: Granularity, reference: T) -> Expectation<T> {
    let description = format!("is same {} as [{}]", granularity.phrase(), reference.render());
    let anchor = reference.to_unit(granularity);
    Expectation::described(
        move |value: &T| {
            matches!((value.to_unit(granularity), anchor), (Some(a), Some(b)) if a == b)
        },
        description,
    )
}

pub fn is_not_same<T: TemporalAdapter>(granularity: Granularity, reference: T) -> Expectation<T> {
    let description = format!(
        "is not same {} as [{}]",
        granularity.phrase(),
        reference.render()
    );
    is_same(granularity, reference).negate(move |_| description.clone())
}

pub fn is_same_as<T: TemporalAdapter>(reference: T) -> Expectation<T> {
    is_same(Granularity::Day, reference)
}

pub fn is_not_same_as<T: TemporalAdapter>(reference: T) -> Expectation<T> {
    is_not_same(Granularity::Day, reference)
}

pub fn is_same_hour_as<T: TemporalAdapter>(reference: T) -> Expectation<T> {
    is_same(Granularity::HourOfDay, reference)
}

pub fn is_not_same_hour_as<T: TemporalAdapter>(reference: T) -> Expectation<T> {
    is_not_same(Granularity::HourOfDay, reference)
}

pub fn is_same_minute_as<T: TemporalAdapter>(reference: T) -> Expectation<T> {
    is_same(Granularity::MinuteOfHour, reference)
}

pub fn is_not_same_minute_as<T: TemporalAdapter>(reference: T) -> Expectation<T> {
    is_not_same(Granularity::MinuteOfHour, reference)
}

pub fn is_same_second_as<T: TemporalAdapter>(reference: T) -> Expectation<T> {
    is_same(Granularity::SecondOfMinute, reference)
}

pub fn is_not_same_second_as<T: TemporalAdapter>(reference: T) -> Expectation<T> {
    is_not_same(Granularity::SecondOfMinute, reference)
}

pub fn is_day_of_week<T: TemporalAdapter>(day: Weekday) -> Expectation<T> {
    let expected = Some(i64::from(day.number_from_monday()));
    Expectation::described(
        move |value: &T| value.to_unit(Granularity::DayOfWeek) == expected,
        format!("is [{}]", day),
    )
}

pub fn is_not_day_of_week<T: TemporalAdapter>(day: Weekday) -> Expectation<T> {
    let description = format!("is not [{}]", day);
    is_day_of_week(day).negate(move |_| description.clone())
}

// -- Windows --

/// True when `value` lies in `[reference - |amount|, reference + |amount|]`.
pub fn within<T: TemporalAdapter>(value: &T, amount: i64, unit: DurationUnit, reference: &T) -> bool {
    let magnitude = amount.checked_abs().unwrap_or(i64::MAX);
    let center = reference.compose();
    let lower = unit.shift(center, -magnitude).unwrap_or(NaiveDateTime::MIN);
    let upper = unit.shift(center, magnitude).unwrap_or(NaiveDateTime::MAX);
    let candidate = value.compose();
    lower <= candidate && candidate <= upper
}

pub fn is_within<T: TemporalAdapter>(amount: i64, unit: DurationUnit, reference: T) -> Expectation<T> {
    let rendered = reference.render();
    Expectation::new(
        move |value: &T| within(value, amount, unit, &reference),
        move |locale| {
            format!(
                "is within [{}] {} of [{}]",
                amount.format_with(locale),
                unit.label(),
                rendered
            )
        },
    )
}

pub fn is_not_within<T: TemporalAdapter>(
    amount: i64,
    unit: DurationUnit,
    reference: T,
) -> Expectation<T> {
    let rendered = reference.render();
    is_within(amount, unit, reference).negate(move |locale| {
        format!(
            "is not within [{}] {} of [{}]",
            amount.format_with(locale),
            unit.label(),
            rendered
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_within_two_days_is_boundary_inclusive() {
        let exp = is_within(2, DurationUnit::Days, date(2015, 8, 6));
        assert!(exp.matches(&date(2015, 8, 4)));
        assert!(exp.matches(&date(2015, 8, 8)));
        assert!(!exp.matches(&date(2015, 8, 3)));
        assert!(!exp.matches(&date(2015, 8, 9)));
        assert_eq!(exp.describe(), "is within [2] days of [2015-08-06]");
    }

    #[test]
    fn test_negative_amount_uses_magnitude() {
        let exp = is_within(-2, DurationUnit::Days, date(2015, 8, 6));
        assert!(exp.matches(&date(2015, 8, 8)));
        assert!(exp.matches(&date(2015, 8, 4)));
    }

    #[test]
    fn test_within_months_uses_calendar_arithmetic() {
        let reference = date(2015, 1, 31).and_time(NaiveTime::MIN);
        let exp = is_within(1, DurationUnit::Months, reference);
        assert!(exp.matches(&date(2015, 2, 28).and_time(NaiveTime::MIN)));
        assert!(!exp.matches(&date(2015, 3, 1).and_time(NaiveTime::MIN)));
    }

    #[test]
    fn test_time_only_window_does_not_wrap() {
        let exp = is_within(2, DurationUnit::Hours, time(0, 30, 0));
        assert!(exp.matches(&time(2, 30, 0)));
        assert!(!exp.matches(&time(23, 30, 0)));
    }

    #[test]
    fn test_same_hour_ignores_minutes_and_seconds() {
        let reference = date(2015, 8, 6).and_hms_opt(10, 0, 0).unwrap();
        let exp = is_same_hour_as(reference);
        assert!(exp.matches(&date(2020, 1, 1).and_hms_opt(10, 59, 59).unwrap()));
        assert!(!exp.matches(&date(2015, 8, 6).and_hms_opt(11, 0, 0).unwrap()));
        assert!(is_not_same_hour_as(reference).matches(&date(2015, 8, 6).and_hms_opt(9, 0, 0).unwrap()));
    }

    #[test]
    fn test_same_day_truncates_time() {
        let reference = date(2015, 8, 6).and_hms_opt(0, 0, 1).unwrap();
        assert!(is_same_as(reference).matches(&date(2015, 8, 6).and_hms_opt(23, 59, 59).unwrap()));
        assert!(is_not_same_as(reference).matches(&date(2015, 8, 7).and_hms_opt(0, 0, 0).unwrap()));
        assert_eq!(
            is_same_as(date(2015, 8, 6)).describe(),
            "is same day as [2015-08-06]"
        );
    }

    #[test]
    fn test_day_of_week() {
        // 2015-08-06 was a Thursday
        assert!(is_day_of_week(Weekday::Thu).matches(&date(2015, 8, 6)));
        assert!(is_not_day_of_week(Weekday::Fri).matches(&date(2015, 8, 6)));
        assert!(!is_day_of_week::<NaiveTime>(Weekday::Thu).matches(&time(1, 0, 0)));
    }

    #[test]
    fn test_ordering() {
        let reference = date(2015, 8, 6);
        assert!(is_before(reference).matches(&date(2015, 8, 5)));
        assert!(!is_before(reference).matches(&reference));
        assert!(is_same_or_before(reference).matches(&reference));
        assert!(is_after(reference).matches(&date(2015, 8, 7)));
        assert!(is_same_or_after(reference).matches(&reference));
    }

    #[test]
    fn test_offset_values_order_on_utc_timeline() {
        let a = DateTime::parse_from_rfc3339("2015-08-06T10:00:00+02:00").unwrap();
        let b = DateTime::parse_from_rfc3339("2015-08-06T09:30:00+00:00").unwrap();
        assert!(is_before(b).matches(&a));
        assert!(is_same_hour_as(b).matches(&DateTime::parse_from_rfc3339("2015-08-06T09:05:00+05:00").unwrap()));
    }

    #[test]
    fn test_convert_with_pattern() {
        assert_eq!(
            NaiveDate::convert(" Aug-06-2015 ", "%b-%d-%Y").unwrap(),
            date(2015, 8, 6)
        );
        let utc = <DateTime<Utc>>::convert("2015-08-06 10:00", "%Y-%m-%d %H:%M").unwrap();
        assert_eq!(utc.to_unit(Granularity::HourOfDay), Some(10));
        assert!(NaiveTime::convert("25:00", "%H:%M").is_err());
    }

    #[test]
    fn test_missing_unit_never_matches() {
        let ten = time(10, 0, 0);
        assert!(!is_same_as(ten).matches(&time(23, 59, 0)));
        assert!(!is_same_as(ten).matches(&ten));
        assert!(is_not_same_as(ten).matches(&time(23, 59, 0)));

        let day = date(2015, 8, 6);
        assert!(!is_same_hour_as(day).matches(&date(1999, 1, 1)));
        assert!(!is_same_minute_as(day).matches(&day));
        assert!(is_not_same_second_as(day).matches(&day));
        assert!(!is_day_of_week(Weekday::Thu).matches(&ten));
    }
}
