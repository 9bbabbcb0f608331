//! Typed predicates paired with human-readable descriptions
//!
//! An [`Expectation`] knows nothing about where a value comes from. It is
//! built once per assertion call site (see [`crate::expect`] and
//! [`crate::temporal`]) and bound to a probe by a
//! [`Condition`](crate::condition::Condition).

use std::fmt;
use std::sync::Arc;

use crate::locale::{LocaleFormat, NumberLocale};

type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
type Describe = Arc<dyn Fn(&NumberLocale) -> String + Send + Sync>;

/// Immutable predicate over `T` plus a description such as `is greater than [5]`
pub struct Expectation<T: ?Sized> {
    predicate: Predicate<T>,
    description: Describe,
}

impl<T: ?Sized + 'static> Expectation<T> {
    /// Build an expectation whose description depends on the number locale.
    pub fn new<P, D>(predicate: P, description: D) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
        D: Fn(&NumberLocale) -> String + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            description: Arc::new(description),
        }
    }

    /// Build an expectation with a fixed description.
    pub fn described<P>(predicate: P, description: impl Into<String>) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let description = description.into();
        Self::new(predicate, move |_| description.clone())
    }

    pub fn matches(&self, value: &T) -> bool {
        (self.predicate)(value)
    }

    /// Description rendered with the default (`en-US`) locale.
    pub fn describe(&self) -> String {
        self.describe_with(&NumberLocale::default())
    }

    pub fn describe_with(&self, locale: &NumberLocale) -> String {
        (self.description)(locale)
    }

    /// Exact boolean negation of this expectation under a new description.
    ///
    /// The negated predicate calls the original one, so the pair always
    /// partitions the domain.
    pub fn negate<D>(&self, description: D) -> Self
    where
        D: Fn(&NumberLocale) -> String + Send + Sync + 'static,
    {
        let inner = Arc::clone(&self.predicate);
        Self {
            predicate: Arc::new(move |value: &T| !inner(value)),
            description: Arc::new(description),
        }
    }

    /// Expectation over `U` that projects onto `T` first.
    pub fn map<U, F>(&self, project: F) -> Expectation<U>
    where
        U: ?Sized + 'static,
        F: Fn(&U) -> &T + Send + Sync + 'static,
    {
        let inner = Arc::clone(&self.predicate);
        Expectation {
            predicate: Arc::new(move |value: &U| inner(project(value))),
            description: Arc::clone(&self.description),
        }
    }
}

impl<T: ?Sized> Clone for Expectation<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
            description: Arc::clone(&self.description),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Expectation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expectation")
            .field("description", &(self.description)(&NumberLocale::default()))
            .finish()
    }
}

/// Renders an actually-observed value for diagnostics
pub trait Observed {
    fn observed(&self, locale: &NumberLocale) -> String;
}

macro_rules! impl_observed_number {
    ($($t:ty),*) => {
        $(
            impl Observed for $t {
                fn observed(&self, locale: &NumberLocale) -> String {
                    self.format_with(locale)
                }
            }
        )*
    };
}

impl_observed_number!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

impl Observed for bool {
    fn observed(&self, _locale: &NumberLocale) -> String {
        self.to_string()
    }
}

impl Observed for str {
    fn observed(&self, _locale: &NumberLocale) -> String {
        self.to_string()
    }
}

impl Observed for String {
    fn observed(&self, _locale: &NumberLocale) -> String {
        self.clone()
    }
}

impl<T: Observed> Observed for Option<T> {
    fn observed(&self, locale: &NumberLocale) -> String {
        match self {
            Some(value) => value.observed(locale),
            None => "null".to_string(),
        }
    }
}

impl<T: Observed> Observed for Vec<T> {
    fn observed(&self, locale: &NumberLocale) -> String {
        let items: Vec<String> = self.iter().map(|v| v.observed(locale)).collect();
        items.join(", ")
    }
}
