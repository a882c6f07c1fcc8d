//! Parameter value types.
//!
//! A [`ParameterValue`] holds exactly one payload: a scalar, a homogeneous
//! array, or nothing at all when a parameter was named in a file but never
//! given a value (for instance `empty: []`).

use serde::{Deserialize, Serialize};

/// The type of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, Serialize, Deserialize)]
pub enum ParameterType {
    #[strum(serialize = "not set")]
    NotSet,
    #[strum(serialize = "bool")]
    Bool,
    #[strum(serialize = "integer")]
    Integer,
    #[strum(serialize = "double")]
    Double,
    #[strum(serialize = "string")]
    String,
    #[strum(serialize = "bool array")]
    BoolArray,
    #[strum(serialize = "integer array")]
    IntegerArray,
    #[strum(serialize = "double array")]
    DoubleArray,
    #[strum(serialize = "string array")]
    StringArray,
}

/// A typed parameter value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    #[default]
    NotSet,
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(std::string::String),
    BoolArray(Vec<bool>),
    IntegerArray(Vec<i64>),
    DoubleArray(Vec<f64>),
    StringArray(Vec<std::string::String>),
}

impl ParameterValue {
    /// Returns the parameter type of this value.
    pub fn parameter_type(&self) -> ParameterType {
        match self {
            Self::NotSet => ParameterType::NotSet,
            Self::Bool(_) => ParameterType::Bool,
            Self::Integer(_) => ParameterType::Integer,
            Self::Double(_) => ParameterType::Double,
            Self::String(_) => ParameterType::String,
            Self::BoolArray(_) => ParameterType::BoolArray,
            Self::IntegerArray(_) => ParameterType::IntegerArray,
            Self::DoubleArray(_) => ParameterType::DoubleArray,
            Self::StringArray(_) => ParameterType::StringArray,
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, Self::NotSet)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool_array(&self) -> Option<&[bool]> {
        match self {
            Self::BoolArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_integer_array(&self) -> Option<&[i64]> {
        match self {
            Self::IntegerArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_double_array(&self) -> Option<&[f64]> {
        match self {
            Self::DoubleArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_string_array(&self) -> Option<&[std::string::String]> {
        match self {
            Self::StringArray(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for ParameterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ParameterValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<std::string::String> for ParameterValue {
    fn from(v: std::string::String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<bool>> for ParameterValue {
    fn from(v: Vec<bool>) -> Self {
        Self::BoolArray(v)
    }
}

impl From<Vec<i64>> for ParameterValue {
    fn from(v: Vec<i64>) -> Self {
        Self::IntegerArray(v)
    }
}

impl From<Vec<f64>> for ParameterValue {
    fn from(v: Vec<f64>) -> Self {
        Self::DoubleArray(v)
    }
}

impl From<Vec<std::string::String>> for ParameterValue {
    fn from(v: Vec<std::string::String>) -> Self {
        Self::StringArray(v)
    }
}

fn write_list<T>(
    f: &mut std::fmt::Formatter<'_>,
    items: &[T],
    mut each: impl FnMut(&mut std::fmt::Formatter<'_>, &T) -> std::fmt::Result,
) -> std::fmt::Result {
    for item in items {
        each(f, item)?;
        f.write_str(", ")?;
    }
    Ok(())
}

/// Renders values the way the table dump prints them: doubles with six
/// decimals, arrays as `a, b, ` with a trailing separator.
impl std::fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotSet => Ok(()),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Integer(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{:.6}", v),
            Self::String(v) => f.write_str(v),
            Self::BoolArray(v) => write_list(f, v, |f, b| write!(f, "{}", b)),
            Self::IntegerArray(v) => write_list(f, v, |f, i| write!(f, "{}", i)),
            Self::DoubleArray(v) => write_list(f, v, |f, d| write!(f, "{:.6}", d)),
            Self::StringArray(v) => write_list(f, v, |f, s| f.write_str(s)),
        }
    }
}
