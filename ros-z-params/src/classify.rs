//! Type inference for YAML scalars.
//!
//! Only canonical forms are recognised. The rules follow YAML 1.1 for
//! booleans and C `strtol`/`strtod` semantics for numbers, so that files
//! written for other ROS 2 client libraries resolve to the same types.

use crate::event::ScalarStyle;
use crate::types::ParameterValue;

/// Resolved form of the `!!str` tag.
pub const YAML_STR_TAG: &str = "tag:yaml.org,2002:str";
const YAML_STR_TAG_SHORTHAND: &str = "!!str";

const TRUE_LITERALS: [&str; 11] = [
    "Y", "y", "yes", "Yes", "YES", "true", "True", "TRUE", "on", "On", "ON",
];
const FALSE_LITERALS: [&str; 11] = [
    "N", "n", "no", "No", "NO", "false", "False", "FALSE", "off", "Off", "OFF",
];

/// Scalar types a YAML value can be inferred as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum ValueType {
    #[strum(serialize = "bool")]
    Bool,
    #[strum(serialize = "integer")]
    Integer,
    #[strum(serialize = "double")]
    Double,
    #[strum(serialize = "string")]
    String,
}

/// A classified scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(String),
}

impl ScalarValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Integer(_) => ValueType::Integer,
            Self::Double(_) => ValueType::Double,
            Self::String(_) => ValueType::String,
        }
    }
}

impl From<ScalarValue> for ParameterValue {
    fn from(v: ScalarValue) -> Self {
        match v {
            ScalarValue::Bool(b) => Self::Bool(b),
            ScalarValue::Integer(i) => Self::Integer(i),
            ScalarValue::Double(d) => Self::Double(d),
            ScalarValue::String(s) => Self::String(s),
        }
    }
}

fn is_str_tag(tag: &str) -> bool {
    tag == YAML_STR_TAG || tag == YAML_STR_TAG_SHORTHAND
}

/// Infer the type of `value` and convert it.
///
/// An explicit `!!str` tag wins over everything else. Quoted scalars are
/// always strings. Unquoted scalars are tried as bool, then integer, then
/// double, and fall back to string.
pub fn classify(value: &str, style: ScalarStyle, tag: Option<&str>) -> ScalarValue {
    if tag.is_some_and(is_str_tag) || style.is_quoted() {
        return ScalarValue::String(value.to_string());
    }

    if TRUE_LITERALS.contains(&value) {
        return ScalarValue::Bool(true);
    }
    if FALSE_LITERALS.contains(&value) {
        return ScalarValue::Bool(false);
    }

    if let Some(i) = parse_integer(value) {
        return ScalarValue::Integer(i);
    }

    if let Some(d) = parse_double(value) {
        return ScalarValue::Double(d);
    }

    ScalarValue::String(value.to_string())
}

fn is_c_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r')
}

/// `strtol(value, &end, 0)` that must consume the whole input.
fn parse_integer(value: &str) -> Option<i64> {
    let s = value.trim_start_matches(is_c_space);
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, digits) = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        (16, hex)
    } else if s.len() > 1 && s.starts_with('0') {
        (8, &s[1..])
    } else {
        (10, s)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    // Out of range is not an integer; the caller then tries a double.
    let magnitude = i128::from(u64::from_str_radix(digits, radix).ok()?);
    i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}

/// `strtod(value, &end)` that must consume the whole input, plus the YAML
/// special float literals.
fn parse_double(value: &str) -> Option<f64> {
    match value {
        ".nan" | ".NaN" | ".NAN" => return Some(f64::NAN),
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => return Some(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    let s = value.trim_start_matches(is_c_space);
    if s.is_empty() {
        return None;
    }
    let d: f64 = s.parse().ok()?;
    // A finite literal that overflows is a range error, not a double.
    if d.is_infinite() && !s.to_ascii_lowercase().contains("inf") {
        return None;
    }
    Some(d)
}
