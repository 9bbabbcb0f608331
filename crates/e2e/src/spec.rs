//! Declarative YAML check specification
//!
//! A spec names one test: the page to open, whether groups run under `check`
//! (accumulate) or `verify` (fail at the end of each group), and the checks
//! themselves. Each check is validated while parsing, so a matcher that does
//! not fit its property is a parse error rather than a runtime surprise.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::Deserialize;

use uiverify_common::element::{self, ElementRef, Inspector, Property};
use uiverify_common::expect::{self, TextValue};
use uiverify_common::temporal::{self, DurationUnit, TemporalAdapter};
use uiverify_common::{BoxError, Condition, Expectation, Verifiable};

use crate::error::{E2eError, E2eResult};
use crate::visual::VisualTester;

/// Writes a full-page screenshot to the given path
pub type PageCapture = Arc<dyn Fn(&Path) -> Result<(), BoxError> + Send + Sync>;

/// A complete check specification parsed from YAML
#[derive(Debug, Clone, Deserialize)]
pub struct CheckSpec {
    /// Test method name
    pub name: String,

    /// Test class the outcome is grouped under
    #[serde(default = "default_class")]
    pub class: String,

    #[serde(default)]
    pub description: String,

    /// Tags for filtering tests
    #[serde(default)]
    pub tags: Vec<String>,

    /// Page path, relative to the configured base URL
    #[serde(default = "default_path")]
    pub path: String,

    #[serde(default)]
    pub mode: Mode,

    /// Overrides the configured screenshot default for this spec
    #[serde(default)]
    pub capture_diagnostics: Option<bool>,

    #[serde(default)]
    pub skip: bool,

    /// Extra attempts after a failed one
    #[serde(default)]
    pub retries: u32,

    pub groups: Vec<CheckGroup>,
}

fn default_class() -> String {
    "UiChecks".to_string()
}

fn default_path() -> String {
    "/".to_string()
}

/// How failures inside a group are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Record failures and continue; the test fails when it flushes at the end
    #[default]
    Check,
    /// Fail at the end of the group
    Verify,
}

/// One batch of checks handed to a single check/verify call
#[derive(Debug, Clone, Deserialize)]
pub struct CheckGroup {
    #[serde(default)]
    pub name: String,
    pub checks: Vec<Check>,
}

/// A validated check: an element plus what to read and how to judge it
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawCheck")]
pub struct Check {
    pub element: ElementRef,
    pub kind: CheckKind,
}

#[derive(Debug, Clone)]
pub enum CheckKind {
    Text {
        property: Property,
        each: bool,
        matcher: TextMatcher,
    },
    Date {
        property: Property,
        pattern: String,
        expectation: DateExpectation,
    },
    Count(CountMatcher),
    Flag {
        property: Property,
        each: bool,
        expected: bool,
    },
    Screenshot {
        baseline: String,
        threshold: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextMatcher {
    Equals(String),
    EqualsIgnoreCase(String),
    Contains(String),
    NotContains(String),
    StartsWith(String),
    NotStartsWith(String),
    EndsWith(String),
    NotEndsWith(String),
    OneOf(Vec<String>),
    Empty,
    NotEmpty,
}

impl TextMatcher {
    pub fn expectation<S: TextValue + ?Sized + 'static>(&self) -> Expectation<S> {
        match self {
            TextMatcher::Equals(v) => expect::equals(v.as_str()),
            TextMatcher::EqualsIgnoreCase(v) => expect::equals_ignore_case(v.as_str()),
            TextMatcher::Contains(v) => expect::contains(v.as_str()),
            TextMatcher::NotContains(v) => expect::not_contains(v.as_str()),
            TextMatcher::StartsWith(v) => expect::starts_with(v.as_str()),
            TextMatcher::NotStartsWith(v) => expect::not_starts_with(v.as_str()),
            TextMatcher::EndsWith(v) => expect::ends_with(v.as_str()),
            TextMatcher::NotEndsWith(v) => expect::not_ends_with(v.as_str()),
            TextMatcher::OneOf(values) => expect::one_of(values.clone()),
            TextMatcher::Empty => expect::is_empty_or_none(),
            TextMatcher::NotEmpty => expect::is_not_empty_or_none(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CountMatcher {
    EqualTo(usize),
    NotEqualTo(usize),
    GreaterThan(usize),
    AtLeast(usize),
    LessThan(usize),
    AtMost(usize),
}

impl CountMatcher {
    pub fn expectation(&self) -> Expectation<usize> {
        match *self {
            CountMatcher::EqualTo(n) => expect::is_equal_to(n),
            CountMatcher::NotEqualTo(n) => expect::is_not_equal_to(n),
            CountMatcher::GreaterThan(n) => expect::is_greater_than(n),
            CountMatcher::AtLeast(n) => expect::is_greater_than_or_equal_to(n),
            CountMatcher::LessThan(n) => expect::is_less_than(n),
            CountMatcher::AtMost(n) => expect::is_less_than_or_equal_to(n),
        }
    }
}

/// Temporal expectation, already bound to its parsed reference value
#[derive(Debug, Clone)]
pub enum DateExpectation {
    Date(Expectation<NaiveDate>),
    DateTime(Expectation<NaiveDateTime>),
    Time(Expectation<NaiveTime>),
}

impl Check {
    /// Build the condition for this check. Probes run only when the batch evaluates it.
    pub fn condition(
        &self,
        inspector: &Arc<dyn Inspector>,
        visual: &VisualTester,
        page: &PageCapture,
    ) -> Box<dyn Verifiable> {
        let el = &self.element;
        match &self.kind {
            CheckKind::Text {
                property: Property::Attribute(name),
                matcher,
                ..
            } => element::attribute(inspector, el, name.clone(), matcher.expectation()).boxed(),
            CheckKind::Text {
                each: true,
                matcher,
                ..
            } => element::each_text(inspector, el, matcher.expectation()).boxed(),
            CheckKind::Text {
                property: Property::Value,
                matcher,
                ..
            } => element::value(inspector, el, matcher.expectation()).boxed(),
            CheckKind::Text { matcher, .. } => {
                element::text(inspector, el, matcher.expectation()).boxed()
            }
            CheckKind::Date {
                property,
                pattern,
                expectation,
            } => {
                let description = format!("{} {}", el, property);
                let probe = element::text_probe(inspector, el, property.clone());
                match expectation {
                    DateExpectation::Date(exp) => {
                        Condition::parsed(description, probe, pattern.clone(), exp.clone()).boxed()
                    }
                    DateExpectation::DateTime(exp) => {
                        Condition::parsed(description, probe, pattern.clone(), exp.clone()).boxed()
                    }
                    DateExpectation::Time(exp) => {
                        Condition::parsed(description, probe, pattern.clone(), exp.clone()).boxed()
                    }
                }
            }
            CheckKind::Count(matcher) => element::count(inspector, el, matcher.expectation()).boxed(),
            CheckKind::Flag {
                property,
                each: true,
                expected,
            } => element::each_flag(inspector, el, property.clone(), flag_expectation(*expected))
                .boxed(),
            CheckKind::Flag {
                property, expected, ..
            } => element::flag(inspector, el, property.clone(), flag_expectation(*expected)).boxed(),
            CheckKind::Screenshot {
                baseline,
                threshold,
            } => {
                let page = Arc::clone(page);
                visual
                    .capture_condition(baseline, *threshold, move |path: &Path| page(path))
                    .boxed()
            }
        }
    }
}

fn flag_expectation(expected: bool) -> Expectation<bool> {
    if expected {
        expect::is_true()
    } else {
        expect::is_false()
    }
}

// -- Raw YAML shape --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PropertyKind {
    Text,
    Attribute,
    Value,
    Count,
    Enabled,
    Selected,
    Visible,
    Screenshot,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyKind::Text => "text",
            PropertyKind::Attribute => "attribute",
            PropertyKind::Value => "value",
            PropertyKind::Count => "count",
            PropertyKind::Enabled => "enabled",
            PropertyKind::Selected => "selected",
            PropertyKind::Visible => "visible",
            PropertyKind::Screenshot => "screenshot",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCheck {
    #[serde(default)]
    selector: Option<String>,
    #[serde(default)]
    label: Option<String>,
    property: Option<PropertyKind>,
    /// Attribute name, for `property: attribute`
    #[serde(default)]
    attribute: Option<String>,
    /// Baseline name, for `property: screenshot`
    #[serde(default)]
    baseline: Option<String>,
    #[serde(default)]
    threshold: Option<f64>,
    #[serde(default)]
    each: bool,

    #[serde(default)]
    equals: Option<String>,
    #[serde(default)]
    equals_ignore_case: Option<String>,
    #[serde(default)]
    contains: Option<String>,
    #[serde(default)]
    not_contains: Option<String>,
    #[serde(default)]
    starts_with: Option<String>,
    #[serde(default)]
    not_starts_with: Option<String>,
    #[serde(default)]
    ends_with: Option<String>,
    #[serde(default)]
    not_ends_with: Option<String>,
    #[serde(default)]
    one_of: Option<Vec<String>>,
    #[serde(default)]
    empty: Option<bool>,

    #[serde(default)]
    is_true: bool,
    #[serde(default)]
    is_false: bool,

    #[serde(default)]
    equal_to: Option<usize>,
    #[serde(default)]
    not_equal_to: Option<usize>,
    #[serde(default)]
    greater_than: Option<usize>,
    #[serde(default)]
    at_least: Option<usize>,
    #[serde(default)]
    less_than: Option<usize>,
    #[serde(default)]
    at_most: Option<usize>,

    #[serde(default)]
    date: Option<RawDateCheck>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TemporalKind {
    #[default]
    Date,
    DateTime,
    Time,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDateCheck {
    /// chrono format pattern for both the observed text and the references
    pattern: String,
    #[serde(default)]
    kind: TemporalKind,
    #[serde(default)]
    before: Option<String>,
    #[serde(default)]
    after: Option<String>,
    #[serde(default)]
    same_or_before: Option<String>,
    #[serde(default)]
    same_or_after: Option<String>,
    #[serde(default)]
    same_as: Option<String>,
    #[serde(default)]
    not_same_as: Option<String>,
    #[serde(default)]
    same_hour_as: Option<String>,
    #[serde(default)]
    not_same_hour_as: Option<String>,
    #[serde(default)]
    same_minute_as: Option<String>,
    #[serde(default)]
    not_same_minute_as: Option<String>,
    #[serde(default)]
    same_second_as: Option<String>,
    #[serde(default)]
    not_same_second_as: Option<String>,
    #[serde(default)]
    day_of_week: Option<Weekday>,
    #[serde(default)]
    not_day_of_week: Option<Weekday>,
    #[serde(default)]
    within: Option<RawWindow>,
    #[serde(default)]
    not_within: Option<RawWindow>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawWindow {
    amount: i64,
    unit: DurationUnit,
    of: String,
}

impl RawCheck {
    fn text_matcher(&self) -> Vec<TextMatcher> {
        let mut found = Vec::new();
        let strings: [(&Option<String>, fn(String) -> TextMatcher); 8] = [
            (&self.equals, TextMatcher::Equals),
            (&self.equals_ignore_case, TextMatcher::EqualsIgnoreCase),
            (&self.contains, TextMatcher::Contains),
            (&self.not_contains, TextMatcher::NotContains),
            (&self.starts_with, TextMatcher::StartsWith),
            (&self.not_starts_with, TextMatcher::NotStartsWith),
            (&self.ends_with, TextMatcher::EndsWith),
            (&self.not_ends_with, TextMatcher::NotEndsWith),
        ];
        for (value, make) in strings {
            if let Some(value) = value {
                found.push(make(value.clone()));
            }
        }
        if let Some(values) = &self.one_of {
            found.push(TextMatcher::OneOf(values.clone()));
        }
        match self.empty {
            Some(true) => found.push(TextMatcher::Empty),
            Some(false) => found.push(TextMatcher::NotEmpty),
            None => {}
        }
        found
    }

    fn count_matcher(&self) -> Vec<CountMatcher> {
        let numbers: [(Option<usize>, fn(usize) -> CountMatcher); 6] = [
            (self.equal_to, CountMatcher::EqualTo),
            (self.not_equal_to, CountMatcher::NotEqualTo),
            (self.greater_than, CountMatcher::GreaterThan),
            (self.at_least, CountMatcher::AtLeast),
            (self.less_than, CountMatcher::LessThan),
            (self.at_most, CountMatcher::AtMost),
        ];
        numbers
            .into_iter()
            .filter_map(|(value, make)| value.map(make))
            .collect()
    }

    fn flag_matcher(&self) -> Option<bool> {
        match (self.is_true, self.is_false) {
            (true, false) => Some(true),
            (false, true) => Some(false),
            _ => None,
        }
    }

    fn matcher_count(&self) -> usize {
        self.text_matcher().len()
            + self.count_matcher().len()
            + usize::from(self.is_true)
            + usize::from(self.is_false)
            + usize::from(self.date.is_some())
    }
}

impl TryFrom<RawCheck> for Check {
    type Error = String;

    fn try_from(raw: RawCheck) -> Result<Self, Self::Error> {
        let property = raw
            .property
            .ok_or_else(|| "check is missing `property`".to_string())?;

        if property == PropertyKind::Screenshot {
            let baseline = raw
                .baseline
                .clone()
                .ok_or_else(|| "screenshot check requires `baseline`".to_string())?;
            if raw.matcher_count() > 0 || raw.each {
                return Err("screenshot check only accepts `baseline` and `threshold`".to_string());
            }
            return Ok(Check {
                element: ElementRef {
                    selector: raw.selector.unwrap_or_else(|| "page".to_string()),
                    label: raw.label.or_else(|| Some(format!("screenshot {}", baseline))),
                },
                kind: CheckKind::Screenshot {
                    baseline,
                    threshold: raw.threshold,
                },
            });
        }

        let selector = raw
            .selector
            .clone()
            .ok_or_else(|| format!("{} check requires `selector`", property))?;
        if raw.baseline.is_some() || raw.threshold.is_some() {
            return Err(format!(
                "`baseline` and `threshold` only apply to screenshot checks, not {}",
                property
            ));
        }
        if property == PropertyKind::Attribute && raw.attribute.is_none() {
            return Err("attribute check requires `attribute` (the attribute name)".to_string());
        }
        if property != PropertyKind::Attribute && raw.attribute.is_some() {
            return Err(format!("`attribute` does not apply to {} checks", property));
        }

        let element = ElementRef {
            selector: selector.clone(),
            label: raw.label.clone(),
        };
        let matchers = raw.matcher_count();
        if matchers > 1 {
            return Err(format!(
                "check on `{}` has {} matchers; exactly one is allowed",
                selector, matchers
            ));
        }

        let kind = match property {
            PropertyKind::Text | PropertyKind::Value | PropertyKind::Attribute => {
                let property = match property {
                    PropertyKind::Text => Property::Text,
                    PropertyKind::Value => Property::Value,
                    _ => Property::Attribute(raw.attribute.clone().unwrap_or_default()),
                };
                if raw.each && property != Property::Text {
                    return Err(format!("`each` is only supported for text, not {}", property));
                }
                if let Some(date) = &raw.date {
                    if raw.each {
                        return Err("`each` cannot be combined with `date`".to_string());
                    }
                    CheckKind::Date {
                        property,
                        pattern: date.pattern.clone(),
                        expectation: date.expectation()?,
                    }
                } else {
                    let matcher = raw.text_matcher().into_iter().next().ok_or_else(|| {
                        format!("{} check on `{}` needs a text or date matcher", property, selector)
                    })?;
                    CheckKind::Text {
                        property,
                        each: raw.each,
                        matcher,
                    }
                }
            }
            PropertyKind::Count => {
                if raw.each {
                    return Err("`each` does not apply to count".to_string());
                }
                let matcher = raw.count_matcher().into_iter().next().ok_or_else(|| {
                    format!("count check on `{}` needs a numeric matcher", selector)
                })?;
                CheckKind::Count(matcher)
            }
            PropertyKind::Enabled | PropertyKind::Selected | PropertyKind::Visible => {
                let property = match property {
                    PropertyKind::Enabled => Property::Enabled,
                    PropertyKind::Selected => Property::Selected,
                    _ => Property::Visible,
                };
                // A bare flag property means "is true".
                let expected = if matchers == 0 {
                    true
                } else {
                    raw.flag_matcher().ok_or_else(|| {
                        format!("{} check only accepts `is_true` or `is_false`", property)
                    })?
                };
                CheckKind::Flag {
                    property,
                    each: raw.each,
                    expected,
                }
            }
            PropertyKind::Screenshot => {
                return Err("screenshot check requires `baseline`".to_string())
            }
        };

        Ok(Check { element, kind })
    }
}

impl RawDateCheck {
    fn expectation(&self) -> Result<DateExpectation, String> {
        self.check_units()?;
        match self.kind {
            TemporalKind::Date => self.build::<NaiveDate>().map(DateExpectation::Date),
            TemporalKind::DateTime => self.build::<NaiveDateTime>().map(DateExpectation::DateTime),
            TemporalKind::Time => self.build::<NaiveTime>().map(DateExpectation::Time),
        }
    }

    /// A date has no clock and a time has no calendar day.
    fn check_units(&self) -> Result<(), String> {
        let (unit, used) = match self.kind {
            TemporalKind::DateTime => return Ok(()),
            TemporalKind::Date => (
                "clock",
                [
                    ("same_hour_as", self.same_hour_as.is_some()),
                    ("not_same_hour_as", self.not_same_hour_as.is_some()),
                    ("same_minute_as", self.same_minute_as.is_some()),
                    ("not_same_minute_as", self.not_same_minute_as.is_some()),
                    ("same_second_as", self.same_second_as.is_some()),
                    ("not_same_second_as", self.not_same_second_as.is_some()),
                ]
                .to_vec(),
            ),
            TemporalKind::Time => (
                "day",
                [
                    ("same_as", self.same_as.is_some()),
                    ("not_same_as", self.not_same_as.is_some()),
                    ("day_of_week", self.day_of_week.is_some()),
                    ("not_day_of_week", self.not_day_of_week.is_some()),
                ]
                .to_vec(),
            ),
        };
        match used.iter().find(|(_, set)| *set) {
            Some((field, _)) => Err(format!(
                "`{}` compares {} units, which a {:?} value does not have",
                field, unit, self.kind
            )),
            None => Ok(()),
        }
    }

    fn parse<T: TemporalAdapter>(&self, raw: &str) -> Result<T, String> {
        T::convert(raw, &self.pattern)
            .map_err(|err| format!("cannot parse [{}] with pattern [{}]: {}", raw, self.pattern, err))
    }

    fn build<T: TemporalAdapter>(&self) -> Result<Expectation<T>, String> {
        let mut found: Vec<Expectation<T>> = Vec::new();
        if let Some(r) = &self.before {
            found.push(temporal::is_before(self.parse(r)?));
        }
        if let Some(r) = &self.after {
            found.push(temporal::is_after(self.parse(r)?));
        }
        if let Some(r) = &self.same_or_before {
            found.push(temporal::is_same_or_before(self.parse(r)?));
        }
        if let Some(r) = &self.same_or_after {
            found.push(temporal::is_same_or_after(self.parse(r)?));
        }
        if let Some(r) = &self.same_as {
            found.push(temporal::is_same_as(self.parse(r)?));
        }
        if let Some(r) = &self.not_same_as {
            found.push(temporal::is_not_same_as(self.parse(r)?));
        }
        if let Some(r) = &self.same_hour_as {
            found.push(temporal::is_same_hour_as(self.parse(r)?));
        }
        if let Some(r) = &self.not_same_hour_as {
            found.push(temporal::is_not_same_hour_as(self.parse(r)?));
        }
        if let Some(r) = &self.same_minute_as {
            found.push(temporal::is_same_minute_as(self.parse(r)?));
        }
        if let Some(r) = &self.not_same_minute_as {
            found.push(temporal::is_not_same_minute_as(self.parse(r)?));
        }
        if let Some(r) = &self.same_second_as {
            found.push(temporal::is_same_second_as(self.parse(r)?));
        }
        if let Some(r) = &self.not_same_second_as {
            found.push(temporal::is_not_same_second_as(self.parse(r)?));
        }
        if let Some(day) = self.day_of_week {
            found.push(temporal::is_day_of_week(day));
        }
        if let Some(day) = self.not_day_of_week {
            found.push(temporal::is_not_day_of_week(day));
        }
        if let Some(w) = &self.within {
            found.push(temporal::is_within(w.amount, w.unit, self.parse(&w.of)?));
        }
        if let Some(w) = &self.not_within {
            found.push(temporal::is_not_within(w.amount, w.unit, self.parse(&w.of)?));
        }
        match found.len() {
            1 => Ok(found.remove(0)),
            0 => Err("date check needs a comparison".to_string()),
            n => Err(format!("date check has {} comparisons; exactly one is allowed", n)),
        }
    }
}

impl CheckSpec {
    /// Parse a check spec from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let spec: Self = serde_yaml::from_str(yaml)?;
        if spec.name.trim().is_empty() {
            return Err(E2eError::SpecParse("spec `name` must not be empty".to_string()));
        }
        Ok(spec)
    }

    /// Parse a check spec from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|err| E2eError::SpecParse(format!("{}: {}", path.display(), err)))
    }

    /// `Class.method` name used for screenshots and logs.
    pub fn test_name(&self) -> String {
        format!("{}.{}", self.class, self.name)
    }

    /// Whether the spec passes the optional tag and name filters.
    pub fn selected_by(&self, tag: Option<&str>, name: Option<&str>) -> bool {
        tag.map_or(true, |tag| self.tags.iter().any(|t| t == tag))
            && name.map_or(true, |name| self.name == name)
    }

    pub fn check_count(&self) -> usize {
        self.groups.iter().map(|g| g.checks.len()).sum()
    }
}

/// All `*.yaml` / `*.yml` files under `dir`, sorted by path
pub fn discover(dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| ext == "yaml" || ext == "yml")
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect();
    paths.sort();
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_spec() {
        let yaml = r#"
name: totals
class: Checkout
tags: [smoke]
path: /checkout
mode: verify
retries: 1
groups:
  - name: summary
    checks:
      - selector: '#total'
        label: order total
        property: text
        equals: "$12.00"
      - selector: '.line-item'
        property: count
        at_least: 3
      - selector: '#place-order'
        property: enabled
"#;
        let spec = CheckSpec::from_yaml(yaml).unwrap();
        assert_eq!(spec.test_name(), "Checkout.totals");
        assert_eq!(spec.mode, Mode::Verify);
        assert_eq!(spec.check_count(), 3);
        let checks = &spec.groups[0].checks;
        assert!(matches!(
            &checks[0].kind,
            CheckKind::Text { matcher: TextMatcher::Equals(v), .. } if v == "$12.00"
        ));
        assert!(matches!(checks[1].kind, CheckKind::Count(CountMatcher::AtLeast(3))));
        assert!(matches!(checks[2].kind, CheckKind::Flag { expected: true, .. }));
    }

    #[test]
    fn test_defaults() {
        let spec = CheckSpec::from_yaml("name: bare\ngroups: []\n").unwrap();
        assert_eq!(spec.class, "UiChecks");
        assert_eq!(spec.path, "/");
        assert_eq!(spec.mode, Mode::Check);
        assert_eq!(spec.retries, 0);
        assert!(spec.capture_diagnostics.is_none());
    }

    #[test]
    fn test_matcher_must_fit_property() {
        let yaml = r#"
name: bad
groups:
  - checks:
      - selector: '#rows'
        property: count
        equals: "three"
"#;
        let err = CheckSpec::from_yaml(yaml).unwrap_err().to_string();
        assert!(err.contains("numeric matcher"), "{}", err);
    }

    #[test]
    fn test_two_matchers_rejected() {
        let yaml = r#"
name: bad
groups:
  - checks:
      - selector: h1
        property: text
        equals: a
        contains: b
"#;
        assert!(CheckSpec::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_date_check_parses_reference() {
        let yaml = r#"
name: due
groups:
  - checks:
      - selector: '#due'
        property: text
        date:
          pattern: '%b-%d-%Y'
          within: { amount: 2, unit: days, of: Aug-06-2015 }
"#;
        let spec = CheckSpec::from_yaml(yaml).unwrap();
        match &spec.groups[0].checks[0].kind {
            CheckKind::Date {
                expectation: DateExpectation::Date(exp),
                ..
            } => {
                assert!(exp.matches(&NaiveDate::from_ymd_opt(2015, 8, 4).unwrap()));
                assert_eq!(exp.describe(), "is within [2] days of [2015-08-06]");
            }
            other => panic!("unexpected kind {:?}", other),
        }

        let bad_reference = yaml.replace("Aug-06-2015", "tomorrow");
        assert!(CheckSpec::from_yaml(&bad_reference).is_err());
    }

    fn date_check(fields: &str) -> String {
        format!(
            r#"
name: clock
groups:
  - checks:
      - selector: '#at'
        property: text
        date: {{ {} }}
"#,
            fields
        )
    }

    #[test]
    fn test_day_matchers_rejected_for_time_values() {
        for fields in [
            "pattern: '%H:%M', kind: time, same_as: '10:00'",
            "pattern: '%H:%M', kind: time, not_same_as: '10:00'",
            "pattern: '%H:%M', kind: time, day_of_week: Thu",
            "pattern: '%H:%M', kind: time, not_day_of_week: Thu",
            "pattern: '%Y-%m-%d', same_hour_as: '2015-08-06'",
            "pattern: '%Y-%m-%d', not_same_second_as: '2015-08-06'",
        ] {
            assert!(CheckSpec::from_yaml(&date_check(fields)).is_err(), "{}", fields);
        }
    }

    #[test]
    fn test_clock_matchers() {
        let yaml = date_check("pattern: '%H:%M', kind: time, same_hour_as: '10:00'");
        let spec = CheckSpec::from_yaml(&yaml).unwrap();
        match &spec.groups[0].checks[0].kind {
            CheckKind::Date {
                expectation: DateExpectation::Time(exp),
                ..
            } => {
                assert!(exp.matches(&NaiveTime::from_hms_opt(10, 59, 0).unwrap()));
                assert!(!exp.matches(&NaiveTime::from_hms_opt(11, 0, 0).unwrap()));
            }
            other => panic!("unexpected kind {:?}", other),
        }

        let yaml = date_check("pattern: '%Y-%m-%d', not_day_of_week: Thu");
        let spec = CheckSpec::from_yaml(&yaml).unwrap();
        match &spec.groups[0].checks[0].kind {
            CheckKind::Date {
                expectation: DateExpectation::Date(exp),
                ..
            } => {
                assert!(!exp.matches(&NaiveDate::from_ymd_opt(2015, 8, 6).unwrap()));
                assert!(exp.matches(&NaiveDate::from_ymd_opt(2015, 8, 7).unwrap()));
            }
            other => panic!("unexpected kind {:?}", other),
        }

        let yaml = date_check(
            "pattern: '%Y-%m-%d %H:%M:%S', kind: date_time, not_same_minute_as: '2015-08-06 10:30:00'",
        );
        assert!(CheckSpec::from_yaml(&yaml).is_ok());
    }

    #[test]
    fn test_screenshot_check() {
        let yaml = r#"
name: visual
groups:
  - checks:
      - property: screenshot
        baseline: home
        threshold: 0.25
"#;
        let spec = CheckSpec::from_yaml(yaml).unwrap();
        let check = &spec.groups[0].checks[0];
        assert_eq!(check.element.name(), "screenshot home");
        assert!(matches!(
            &check.kind,
            CheckKind::Screenshot { baseline, threshold: Some(t) } if baseline == "home" && *t == 0.25
        ));
    }

    #[test]
    fn test_selection_filters() {
        let spec = CheckSpec::from_yaml("name: a\ntags: [smoke]\ngroups: []\n").unwrap();
        assert!(spec.selected_by(None, None));
        assert!(spec.selected_by(Some("smoke"), Some("a")));
        assert!(!spec.selected_by(Some("nightly"), None));
        assert!(!spec.selected_by(None, Some("b")));
    }

    #[test]
    fn test_discover_sorts_yaml_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.yaml"), "").unwrap();
        std::fs::write(dir.path().join("nested/a.yml"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        let found = discover(dir.path());
        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("b.yaml"));
        assert!(found[1].ends_with("nested/a.yml"));
    }
}
