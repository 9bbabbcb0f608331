//! Locale-aware number formatting for descriptions and diagnostics

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Maximum fraction digits rendered for floating point values
const MAX_FRACTION_DIGITS: usize = 3;

/// Number formatting conventions for one locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NumberLocale {
    tag: String,
    grouping: Option<char>,
    decimal: char,
    group_size: usize,
}

impl NumberLocale {
    pub fn new(tag: impl Into<String>, grouping: Option<char>, decimal: char) -> Self {
        Self {
            tag: tag.into(),
            grouping,
            decimal,
            group_size: 3,
        }
    }

    pub fn en_us() -> Self {
        Self::new("en-US", Some(','), '.')
    }

    pub fn de_de() -> Self {
        Self::new("de-DE", Some('.'), ',')
    }

    /// Narrow no-break space grouping
    pub fn fr_fr() -> Self {
        Self::new("fr-FR", Some('\u{202f}'), ',')
    }

    /// No grouping, `.` as decimal separator
    pub fn posix() -> Self {
        Self::new("C", None, '.')
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Format an integer rendered in base 10, e.g. `-1234567`.
    pub fn format_integer(&self, digits: &str) -> String {
        let (sign, digits) = match digits.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", digits),
        };
        format!("{}{}", sign, self.group(digits))
    }

    /// Format a float with at most three fraction digits, rounding half to even.
    pub fn format_float(&self, value: f64) -> String {
        if value.is_nan() {
            return "NaN".to_string();
        }
        if value.is_infinite() {
            let symbol = if value > 0.0 { "∞" } else { "-∞" };
            return symbol.to_string();
        }

        // Above this magnitude f64 carries no sub-millesimal digits and the
        // scaled value could overflow to infinity.
        let magnitude = if value.abs() >= 1e15 {
            value.abs()
        } else {
            let scale = 10f64.powi(MAX_FRACTION_DIGITS as i32);
            round_half_even(value.abs() * scale) / scale
        };
        let negative = value < 0.0 && magnitude != 0.0;

        let rendered = format!("{:.*}", MAX_FRACTION_DIGITS, magnitude);
        let (int_part, frac_part) = rendered
            .split_once('.')
            .unwrap_or((rendered.as_str(), ""));
        let frac_part = frac_part.trim_end_matches('0');

        let mut out = String::new();
        if negative {
            out.push('-');
        }
        out.push_str(&self.group(int_part));
        if !frac_part.is_empty() {
            out.push(self.decimal);
            out.push_str(frac_part);
        }
        out
    }

    fn group(&self, digits: &str) -> String {
        let Some(sep) = self.grouping else {
            return digits.to_string();
        };
        let len = digits.len();
        let mut out = String::with_capacity(len + len / self.group_size);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (len - i) % self.group_size == 0 {
                out.push(sep);
            }
            out.push(ch);
        }
        out
    }
}

fn round_half_even(x: f64) -> f64 {
    let floor = x.floor();
    let diff = x - floor;
    if diff > 0.5 {
        floor + 1.0
    } else if diff < 0.5 {
        floor
    } else if floor % 2.0 == 0.0 {
        floor
    } else {
        floor + 1.0
    }
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self::en_us()
    }
}

impl FromStr for NumberLocale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('_', "-");
        let locale = match normalized.to_ascii_lowercase().as_str() {
            "en-us" | "en" => Self::en_us(),
            "en-gb" => Self::new("en-GB", Some(','), '.'),
            "ja-jp" | "ja" => Self::new("ja-JP", Some(','), '.'),
            "de-de" | "de" => Self::de_de(),
            "es-es" | "es" => Self::new("es-ES", Some('.'), ','),
            "it-it" | "it" => Self::new("it-IT", Some('.'), ','),
            "pt-br" => Self::new("pt-BR", Some('.'), ','),
            "fr-fr" | "fr" => Self::fr_fr(),
            "de-ch" => Self::new("de-CH", Some('\u{2019}'), '.'),
            "c" | "posix" => Self::posix(),
            _ => {
                return Err(Error::InvalidConfig(format!(
                    "unsupported number locale: {}",
                    s
                )))
            }
        };
        Ok(locale)
    }
}

impl TryFrom<String> for NumberLocale {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NumberLocale> for String {
    fn from(locale: NumberLocale) -> Self {
        locale.tag
    }
}

impl fmt::Display for NumberLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

/// Numbers that can be rendered through a [`NumberLocale`]
pub trait LocaleFormat {
    fn format_with(&self, locale: &NumberLocale) -> String;
}

macro_rules! impl_integer_format {
    ($($t:ty),*) => {
        $(
            impl LocaleFormat for $t {
                fn format_with(&self, locale: &NumberLocale) -> String {
                    locale.format_integer(&self.to_string())
                }
            }
        )*
    };
}

impl_integer_format!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl LocaleFormat for f64 {
    fn format_with(&self, locale: &NumberLocale) -> String {
        locale.format_float(*self)
    }
}

impl LocaleFormat for f32 {
    fn format_with(&self, locale: &NumberLocale) -> String {
        locale.format_float(f64::from(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_grouping() {
        let en = NumberLocale::en_us();
        assert_eq!(5i32.format_with(&en), "5");
        assert_eq!(1234i32.format_with(&en), "1,234");
        assert_eq!((-1234567i64).format_with(&en), "-1,234,567");
        assert_eq!(123456u32.format_with(&NumberLocale::de_de()), "123.456");
        assert_eq!(123456u32.format_with(&NumberLocale::posix()), "123456");
    }

    #[test]
    fn test_float_fraction_digits() {
        let en = NumberLocale::en_us();
        assert_eq!(2.5f64.format_with(&en), "2.5");
        assert_eq!(3.0f64.format_with(&en), "3");
        assert_eq!(1234.5678f64.format_with(&en), "1,234.568");
        assert_eq!((-0.0001f64).format_with(&en), "0");
        assert_eq!(1234.5f64.format_with(&NumberLocale::de_de()), "1.234,5");
        assert_eq!(f64::NAN.format_with(&en), "NaN");
        assert_eq!(f64::NEG_INFINITY.format_with(&en), "-∞");
    }

    #[test]
    fn test_huge_floats_stay_finite() {
        let en = NumberLocale::en_us();
        assert_eq!(4e15f64.format_with(&en), "4,000,000,000,000,000");
        let huge = 1e306f64.format_with(&en);
        assert!(!huge.contains('∞'));
        assert!(!huge.contains("inf"));
        assert!(huge.chars().all(|c| c.is_ascii_digit() || c == ','));
        assert!((-f64::MAX).format_with(&en).starts_with("-179,"));
    }

    #[test]
    fn test_half_even_rounding() {
        assert_eq!(round_half_even(2.5), 2.0);
        assert_eq!(round_half_even(3.5), 4.0);
        assert_eq!(round_half_even(3.4), 3.0);
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!("de_DE".parse::<NumberLocale>().unwrap(), NumberLocale::de_de());
        assert_eq!("en".parse::<NumberLocale>().unwrap().tag(), "en-US");
        assert!("xx-YY".parse::<NumberLocale>().is_err());
    }
}
