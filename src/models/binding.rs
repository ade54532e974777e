// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SPARQL result bindings and their decoding into native values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Placeholder the station queries bind when a value is missing.
pub const MISSING_SENTINEL: &str = "?";

/// One cell of a SPARQL JSON result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBinding {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl RawBinding {
    /// Plain literal without a datatype.
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            kind: Some("literal".to_string()),
        }
    }

    /// Literal tagged with an XML Schema datatype (e.g. `"integer"`).
    pub fn typed(value: impl Into<String>, xsd_type: &str) -> Self {
        Self {
            value: value.into(),
            datatype: Some(format!("http://www.w3.org/2001/XMLSchema#{}", xsd_type)),
            kind: Some("literal".to_string()),
        }
    }

    /// IRI cell.
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            kind: Some("uri".to_string()),
        }
    }
}

/// A result row: variable name to cell. Unbound variables are absent.
pub type BindingRow = HashMap<String, RawBinding>;

/// SPARQL 1.1 JSON results document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SparqlResponse {
    pub head: SparqlHead,
    pub results: SparqlResults,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SparqlHead {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SparqlResults {
    #[serde(default)]
    pub bindings: Vec<BindingRow>,
}

/// A decoded binding value.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    /// Integer, float or double. Malformed input decodes to NaN.
    Number(f64),
    /// Date or dateTime. `None` is an unparseable date.
    Date(Option<DateTime<Utc>>),
    Text(String),
}

impl DecodedValue {
    /// The empty string, used for absent cells and the `?` sentinel.
    pub fn empty() -> Self {
        DecodedValue::Text(String::new())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecodedValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness: non-empty text, non-zero non-NaN number, valid date.
    pub fn is_truthy(&self) -> bool {
        match self {
            DecodedValue::Number(n) => *n != 0.0 && !n.is_nan(),
            DecodedValue::Date(d) => d.is_some(),
            DecodedValue::Text(s) => !s.is_empty(),
        }
    }

    /// Value usable as a coordinate: a finite number, or text that parses
    /// as an integer and as a finite float.
    pub fn as_coordinate(&self) -> Option<f64> {
        match self {
            DecodedValue::Number(n) if n.is_finite() => Some(*n),
            DecodedValue::Text(s) => {
                let trimmed = s.trim();
                if parse_int(trimmed).is_nan() {
                    return None;
                }
                trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
            }
            _ => None,
        }
    }
}

impl From<&str> for DecodedValue {
    fn from(value: &str) -> Self {
        DecodedValue::Text(value.to_string())
    }
}

impl From<String> for DecodedValue {
    fn from(value: String) -> Self {
        DecodedValue::Text(value)
    }
}

impl From<f64> for DecodedValue {
    fn from(value: f64) -> Self {
        DecodedValue::Number(value)
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Number(n) => write!(f, "{}", n),
            DecodedValue::Date(Some(d)) => write!(f, "{}", format_utc_rfc3339(*d)),
            DecodedValue::Date(None) => write!(f, "Invalid Date"),
            DecodedValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl Serialize for DecodedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DecodedValue::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            DecodedValue::Number(_) => serializer.serialize_none(),
            DecodedValue::Date(Some(d)) => serializer.serialize_str(&format_utc_rfc3339(*d)),
            DecodedValue::Date(None) => serializer.serialize_none(),
            DecodedValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Decode one binding cell against its datatype.
pub fn decode(binding: Option<&RawBinding>) -> DecodedValue {
    let Some(binding) = binding else {
        return DecodedValue::empty();
    };
    if binding.value == MISSING_SENTINEL {
        return DecodedValue::empty();
    }

    let datatype = binding.datatype.as_deref().unwrap_or("");
    if datatype.ends_with("#integer") {
        DecodedValue::Number(parse_int(&binding.value))
    } else if datatype.ends_with("#float") || datatype.ends_with("#double") {
        DecodedValue::Number(parse_float(&binding.value))
    } else if datatype.ends_with("#dateTime") || datatype.ends_with("#date") {
        DecodedValue::Date(parse_date(&binding.value))
    } else {
        DecodedValue::Text(binding.value.clone())
    }
}

static INT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+").expect("valid integer regex"));

static FLOAT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(Infinity|(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?)").expect("valid float regex")
});

/// Leading-digits integer parse; NaN when no digits lead the string.
fn parse_int(value: &str) -> f64 {
    INT_PREFIX
        .find(value.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(f64::trunc)
        .unwrap_or(f64::NAN)
}

/// Longest-valid-prefix float parse; NaN when nothing parses.
fn parse_float(value: &str) -> f64 {
    let Some(m) = FLOAT_PREFIX.find(value.trim_start()) else {
        return f64::NAN;
    };
    let text = m.as_str();
    match text.trim_start_matches(['+', '-']) {
        "Infinity" if text.starts_with('-') => f64::NEG_INFINITY,
        "Infinity" => f64::INFINITY,
        _ => text.parse::<f64>().unwrap_or(f64::NAN),
    }
}

/// Dates without a time are midnight UTC; dateTimes without an offset are UTC.
fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
