//! Within-window arithmetic across temporal representations

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc, Weekday};
use proptest::prelude::*;
use test_case::test_case;

use uiverify_common::temporal::{self, DurationUnit};
use uiverify_common::{BoxError, Condition, NumberLocale, Outcome};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32, s: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, s).unwrap()
}

#[test_case(date(2015, 8, 4) => true ; "two days before is the lower boundary")]
#[test_case(date(2015, 8, 8) => true ; "two days after is the upper boundary")]
#[test_case(date(2015, 8, 6) => true ; "reference itself")]
#[test_case(date(2015, 8, 3) => false ; "three days before")]
#[test_case(date(2015, 8, 9) => false ; "three days after")]
fn within_two_days_of_aug_6(candidate: NaiveDate) -> bool {
    temporal::is_within(2, DurationUnit::Days, date(2015, 8, 6)).matches(&candidate)
}

#[test]
fn parsed_text_inside_window_passes() {
    let condition = Condition::parsed(
        "due date",
        || Ok::<_, BoxError>("Aug-04-2015".to_string()),
        "%b-%d-%Y",
        temporal::is_within(2, DurationUnit::Days, date(2015, 8, 6)),
    );
    assert!(condition.evaluate(&NumberLocale::en_us()).is_pass());
}

#[test]
fn negative_amount_uses_magnitude() {
    let exp = temporal::is_within(-2, DurationUnit::Days, date(2015, 8, 6));
    assert!(exp.matches(&date(2015, 8, 8)));
    assert!(exp.matches(&date(2015, 8, 4)));
}

#[test]
fn months_follow_the_calendar() {
    let exp = temporal::is_within(1, DurationUnit::Months, date(2015, 1, 31));
    assert!(exp.matches(&date(2015, 2, 28)));
    assert!(!exp.matches(&date(2015, 3, 1)));
    assert!(exp.matches(&date(2014, 12, 31)));
}

#[test]
fn time_only_windows_do_not_wrap_midnight() {
    let exp = temporal::is_within(1, DurationUnit::Hours, time(23, 30, 0));
    assert!(exp.matches(&time(22, 30, 0)));
    assert!(!exp.matches(&time(0, 15, 0)));
}

#[test]
fn same_hour_ignores_date() {
    let reference = date(2015, 8, 6).and_time(time(10, 5, 0));
    let exp = temporal::is_same_hour_as(reference);
    assert!(exp.matches(&date(2016, 1, 1).and_time(time(10, 59, 59))));
    assert!(!exp.matches(&date(2015, 8, 6).and_time(time(11, 0, 0))));
}

#[test]
fn day_of_week_on_utc_instant() {
    let instant: DateTime<Utc> = DateTime::parse_from_rfc3339("2015-08-06T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    assert!(temporal::is_day_of_week(Weekday::Thu).matches(&instant));
    assert!(temporal::is_not_day_of_week(Weekday::Fri).matches(&instant));
}

#[test]
fn unparseable_text_is_error() {
    let condition = Condition::parsed(
        "due date",
        || Ok::<_, BoxError>("2015/08/04".to_string()),
        "%b-%d-%Y",
        temporal::is_within(2, DurationUnit::Days, date(2015, 8, 6)),
    );
    match condition.evaluate(&NumberLocale::en_us()) {
        Outcome::Error(err) => assert!(err.to_string().contains("2015/08/04")),
        other => panic!("expected error, got {}", other),
    }
}

fn any_unit() -> impl Strategy<Value = DurationUnit> {
    prop_oneof![
        Just(DurationUnit::Millis),
        Just(DurationUnit::Seconds),
        Just(DurationUnit::Minutes),
        Just(DurationUnit::Hours),
        Just(DurationUnit::Days),
        Just(DurationUnit::Weeks),
        Just(DurationUnit::Months),
        Just(DurationUnit::Years),
    ]
}

fn instant(secs: i64) -> NaiveDateTime {
    DateTime::from_timestamp(secs, 0).unwrap().naive_utc()
}

proptest! {
    #[test]
    fn within_and_not_within_partition_every_candidate(
        reference in -2_000_000_000i64..2_000_000_000,
        offset in -400_000_000i64..400_000_000,
        amount in -24i64..24,
        unit in any_unit(),
    ) {
        let reference = instant(reference);
        let candidate = reference + TimeDelta::seconds(offset);
        let within = temporal::is_within(amount, unit, reference).matches(&candidate);
        let not_within = temporal::is_not_within(amount, unit, reference).matches(&candidate);
        prop_assert!(within != not_within);
    }

    #[test]
    fn window_boundaries_are_within(
        reference in -2_000_000_000i64..2_000_000_000,
        amount in 0i64..24,
        unit in any_unit(),
    ) {
        let reference = instant(reference);
        let upper = unit.shift(reference, amount).unwrap();
        let lower = unit.shift(reference, -amount).unwrap();
        let exp = temporal::is_within(amount, unit, reference);
        prop_assert!(exp.matches(&upper));
        prop_assert!(exp.matches(&lower));
        prop_assert!(!temporal::is_not_within(amount, unit, reference).matches(&upper));
    }
}
