//! Conditions probing UI elements through an [`Inspector`]
//!
//! Locating and waiting for elements belongs to the inspector. These factories
//! only wrap an inspector query in a [`Condition`]; a query that matches no
//! instance is an error, except for `count`.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::condition::Condition;
use crate::error::BoxError;
use crate::expect;
use crate::expectation::Expectation;

/// A located UI element, identified by selector
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    pub selector: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl ElementRef {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            label: None,
        }
    }

    pub fn labeled(selector: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            label: Some(label.into()),
        }
    }

    /// Human-readable name: the label if present, else the selector.
    pub fn name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.selector)
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What to read from each matched instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Text,
    Attribute(String),
    /// Current value of a form control
    Value,
    Enabled,
    Selected,
    Visible,
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Text => f.write_str("text"),
            Property::Attribute(name) => write!(f, "attribute [{}]", name),
            Property::Value => f.write_str("value"),
            Property::Enabled => f.write_str("enabled"),
            Property::Selected => f.write_str("selected"),
            Property::Visible => f.write_str("visible"),
        }
    }
}

/// Raw value read from one instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Flag(bool),
    Text(String),
    Null,
}

impl PropertyValue {
    pub fn into_text(self) -> Result<Option<String>, BoxError> {
        match self {
            PropertyValue::Text(text) => Ok(Some(text)),
            PropertyValue::Null => Ok(None),
            PropertyValue::Flag(flag) => Err(format!("expected text, found flag [{}]", flag).into()),
        }
    }

    pub fn into_flag(self) -> Result<bool, BoxError> {
        match self {
            PropertyValue::Flag(flag) => Ok(flag),
            other => Err(format!("expected a flag, found {:?}", other).into()),
        }
    }
}

/// Source of actual values for element conditions
pub trait Inspector: Send + Sync {
    /// Number of instances currently matching the element's selector.
    fn count(&self, element: &ElementRef) -> Result<usize, BoxError>;

    /// One value per matched instance, in document order.
    fn inspect(&self, element: &ElementRef, property: &Property) -> Result<Vec<PropertyValue>, BoxError>;
}

/// No instance matched the selector
#[derive(Debug, Clone, Error)]
#[error("element not found: {selector}")]
pub struct ElementNotFound {
    pub selector: String,
}

fn first_instance(
    inspector: &dyn Inspector,
    element: &ElementRef,
    property: &Property,
) -> Result<PropertyValue, BoxError> {
    inspector
        .inspect(element, property)?
        .into_iter()
        .next()
        .ok_or_else(|| {
            ElementNotFound {
                selector: element.selector.clone(),
            }
            .into()
        })
}

fn all_instances(
    inspector: &dyn Inspector,
    element: &ElementRef,
    property: &Property,
) -> Result<Vec<PropertyValue>, BoxError> {
    let values = inspector.inspect(element, property)?;
    if values.is_empty() {
        return Err(ElementNotFound {
            selector: element.selector.clone(),
        }
        .into());
    }
    Ok(values)
}

/// Probe reading `property` of the first instance as text; null reads as empty.
pub fn text_probe(
    inspector: &Arc<dyn Inspector>,
    element: &ElementRef,
    property: Property,
) -> impl FnOnce() -> Result<String, BoxError> + Send + 'static {
    let inspector = Arc::clone(inspector);
    let element = element.clone();
    move || -> Result<String, BoxError> {
        Ok(first_instance(inspector.as_ref(), &element, &property)?
            .into_text()?
            .unwrap_or_default())
    }
}

fn text_of(
    inspector: &Arc<dyn Inspector>,
    element: &ElementRef,
    property: Property,
    expectation: Expectation<String>,
) -> Condition<String> {
    let description = format!("{} {}", element, property);
    Condition::new(description, text_probe(inspector, element, property), expectation)
}

fn flag_of(
    inspector: Arc<dyn Inspector>,
    element: ElementRef,
    property: Property,
    expectation: Expectation<bool>,
) -> Condition<bool> {
    let description = format!("{} {}", element, property);
    Condition::new(
        description,
        move || -> Result<bool, BoxError> {
            first_instance(inspector.as_ref(), &element, &property)?.into_flag()
        },
        expectation,
    )
}

/// Text content of the first matched instance.
pub fn text(
    inspector: &Arc<dyn Inspector>,
    element: &ElementRef,
    expectation: Expectation<String>,
) -> Condition<String> {
    text_of(inspector, element, Property::Text, expectation)
}

/// Current value of the first matched form control.
pub fn value(
    inspector: &Arc<dyn Inspector>,
    element: &ElementRef,
    expectation: Expectation<String>,
) -> Condition<String> {
    text_of(inspector, element, Property::Value, expectation)
}

/// Text content of every matched instance.
pub fn each_text(
    inspector: &Arc<dyn Inspector>,
    element: &ElementRef,
    expectation: Expectation<String>,
) -> Condition<Vec<String>> {
    let inspector = Arc::clone(inspector);
    let element = element.clone();
    let description = format!("each {} text", element);
    Condition::each(
        description,
        move || -> Result<Vec<String>, BoxError> {
            all_instances(inspector.as_ref(), &element, &Property::Text)?
                .into_iter()
                .map(|value| value.into_text().map(Option::unwrap_or_default))
                .collect()
        },
        expectation,
    )
}

/// Attribute of the first matched instance; an absent attribute is observed as `None`.
pub fn attribute(
    inspector: &Arc<dyn Inspector>,
    element: &ElementRef,
    name: impl Into<String>,
    expectation: Expectation<Option<String>>,
) -> Condition<Option<String>> {
    let inspector = Arc::clone(inspector);
    let element = element.clone();
    let property = Property::Attribute(name.into());
    let description = format!("{} {}", element, property);
    Condition::new(
        description,
        move || -> Result<Option<String>, BoxError> {
            first_instance(inspector.as_ref(), &element, &property)?.into_text()
        },
        expectation,
    )
}

/// Number of matched instances; zero is a value here, not an error.
pub fn count(
    inspector: &Arc<dyn Inspector>,
    element: &ElementRef,
    expectation: Expectation<usize>,
) -> Condition<usize> {
    let inspector = Arc::clone(inspector);
    let element = element.clone();
    let description = format!("{} count", element);
    Condition::new(description, move || inspector.count(&element), expectation)
}

pub fn enabled(inspector: &Arc<dyn Inspector>, element: &ElementRef) -> Condition<bool> {
    flag_of(Arc::clone(inspector), element.clone(), Property::Enabled, expect::is_true())
}

pub fn selected(inspector: &Arc<dyn Inspector>, element: &ElementRef) -> Condition<bool> {
    flag_of(Arc::clone(inspector), element.clone(), Property::Selected, expect::is_true())
}

pub fn visible(inspector: &Arc<dyn Inspector>, element: &ElementRef) -> Condition<bool> {
    flag_of(Arc::clone(inspector), element.clone(), Property::Visible, expect::is_true())
}

/// Any boolean property of the first instance against an explicit expectation.
pub fn flag(
    inspector: &Arc<dyn Inspector>,
    element: &ElementRef,
    property: Property,
    expectation: Expectation<bool>,
) -> Condition<bool> {
    flag_of(Arc::clone(inspector), element.clone(), property, expectation)
}

/// Visibility of every matched instance.
pub fn each_visible(inspector: &Arc<dyn Inspector>, element: &ElementRef) -> Condition<Vec<bool>> {
    each_flag(inspector, element, Property::Visible, expect::is_true())
}

pub fn each_flag(
    inspector: &Arc<dyn Inspector>,
    element: &ElementRef,
    property: Property,
    expectation: Expectation<bool>,
) -> Condition<Vec<bool>> {
    let inspector = Arc::clone(inspector);
    let element = element.clone();
    let description = format!("each {} {}", element, property);
    Condition::each(
        description,
        move || -> Result<Vec<bool>, BoxError> {
            all_instances(inspector.as_ref(), &element, &property)?
                .into_iter()
                .map(PropertyValue::into_flag)
                .collect()
        },
        expectation,
    )
}
