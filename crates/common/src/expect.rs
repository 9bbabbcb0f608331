//! Expectation factories for boolean, numeric and string values
//!
//! Temporal families live in [`crate::temporal`].

use std::cmp::Ordering;

use crate::expectation::Expectation;
use crate::locale::LocaleFormat;

// -- Boolean --

pub fn is_true() -> Expectation<bool> {
    Expectation::described(|v: &bool| *v, "is true")
}

pub fn is_false() -> Expectation<bool> {
    Expectation::described(|v: &bool| !*v, "is false")
}

// -- Numeric --

/// Ordered values rendered through the number locale
pub trait Numeric: PartialOrd + LocaleFormat + Clone + Send + Sync + 'static {}

impl<T> Numeric for T where T: PartialOrd + LocaleFormat + Clone + Send + Sync + 'static {}

fn compare<N, F>(label: &'static str, expected: N, accept: F) -> Expectation<N>
where
    N: Numeric,
    F: Fn(Option<Ordering>) -> bool + Send + Sync + 'static,
{
    let shown = expected.clone();
    Expectation::new(
        move |actual: &N| accept(actual.partial_cmp(&expected)),
        move |locale| format!("{} [{}]", label, shown.format_with(locale)),
    )
}

pub fn is_equal_to<N: Numeric>(expected: N) -> Expectation<N> {
    compare("is equal to", expected, |o| o == Some(Ordering::Equal))
}

pub fn is_not_equal_to<N: Numeric>(expected: N) -> Expectation<N> {
    let shown = expected.clone();
    is_equal_to(expected)
        .negate(move |locale| format!("is not equal to [{}]", shown.format_with(locale)))
}

pub fn is_greater_than<N: Numeric>(expected: N) -> Expectation<N> {
    compare("is greater than", expected, |o| o == Some(Ordering::Greater))
}

pub fn is_greater_than_or_equal_to<N: Numeric>(expected: N) -> Expectation<N> {
    compare("is greater than or equal to", expected, |o| {
        matches!(o, Some(Ordering::Greater | Ordering::Equal))
    })
}

pub fn is_less_than<N: Numeric>(expected: N) -> Expectation<N> {
    compare("is less than", expected, |o| o == Some(Ordering::Less))
}

pub fn is_less_than_or_equal_to<N: Numeric>(expected: N) -> Expectation<N> {
    compare("is less than or equal to", expected, |o| {
        matches!(o, Some(Ordering::Less | Ordering::Equal))
    })
}

// -- String --

/// Values that may carry text; `None` models an absent value (e.g. a missing attribute)
pub trait TextValue {
    fn text(&self) -> Option<&str>;
}

impl TextValue for str {
    fn text(&self) -> Option<&str> {
        Some(self)
    }
}

impl TextValue for String {
    fn text(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

impl TextValue for Option<String> {
    fn text(&self) -> Option<&str> {
        self.as_deref()
    }
}

fn text_expectation<S, F>(description: String, accept: F) -> Expectation<S>
where
    S: TextValue + ?Sized + 'static,
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    Expectation::described(move |value: &S| value.text().is_some_and(&accept), description)
}

pub fn equals<S: TextValue + ?Sized + 'static>(expected: impl Into<String>) -> Expectation<S> {
    let expected = expected.into();
    let description = format!("is equal to [{}]", expected);
    text_expectation(description, move |actual| actual == expected)
}

pub fn not_equals<S: TextValue + ?Sized + 'static>(expected: impl Into<String>) -> Expectation<S> {
    let expected = expected.into();
    let description = format!("is not equal to [{}]", expected);
    equals(expected).negate(move |_| description.clone())
}

pub fn equals_ignore_case<S: TextValue + ?Sized + 'static>(
    expected: impl Into<String>,
) -> Expectation<S> {
    let expected = expected.into();
    let description = format!("is equal to [{}] ignoring case", expected);
    let folded = expected.to_lowercase();
    text_expectation(description, move |actual| actual.to_lowercase() == folded)
}

pub fn contains<S: TextValue + ?Sized + 'static>(fragment: impl Into<String>) -> Expectation<S> {
    let fragment = fragment.into();
    let description = format!("contains [{}]", fragment);
    text_expectation(description, move |actual| actual.contains(fragment.as_str()))
}

pub fn not_contains<S: TextValue + ?Sized + 'static>(fragment: impl Into<String>) -> Expectation<S> {
    let fragment = fragment.into();
    let description = format!("does not contain [{}]", fragment);
    contains(fragment).negate(move |_| description.clone())
}

pub fn starts_with<S: TextValue + ?Sized + 'static>(prefix: impl Into<String>) -> Expectation<S> {
    let prefix = prefix.into();
    let description = format!("starts with [{}]", prefix);
    text_expectation(description, move |actual| actual.starts_with(prefix.as_str()))
}

pub fn not_starts_with<S: TextValue + ?Sized + 'static>(
    prefix: impl Into<String>,
) -> Expectation<S> {
    let prefix = prefix.into();
    let description = format!("does not start with [{}]", prefix);
    starts_with(prefix).negate(move |_| description.clone())
}

pub fn ends_with<S: TextValue + ?Sized + 'static>(suffix: impl Into<String>) -> Expectation<S> {
    let suffix = suffix.into();
    let description = format!("ends with [{}]", suffix);
    text_expectation(description, move |actual| actual.ends_with(suffix.as_str()))
}

pub fn not_ends_with<S: TextValue + ?Sized + 'static>(suffix: impl Into<String>) -> Expectation<S> {
    let suffix = suffix.into();
    let description = format!("does not end with [{}]", suffix);
    ends_with(suffix).negate(move |_| description.clone())
}

pub fn one_of<S, I, V>(candidates: I) -> Expectation<S>
where
    S: TextValue + ?Sized + 'static,
    I: IntoIterator<Item = V>,
    V: Into<String>,
{
    let candidates: Vec<String> = candidates.into_iter().map(Into::into).collect();
    let description = format!("is one of [{}]", candidates.join(", "));
    text_expectation(description, move |actual| {
        candidates.iter().any(|c| c == actual)
    })
}

pub fn is_empty_or_none<S: TextValue + ?Sized + 'static>() -> Expectation<S> {
    Expectation::described(
        |value: &S| value.text().map_or(true, str::is_empty),
        "is empty or null",
    )
}

pub fn is_not_empty_or_none<S: TextValue + ?Sized + 'static>() -> Expectation<S> {
    is_empty_or_none().negate(|_| "is not empty or null".to_string())
}
