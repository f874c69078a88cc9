//! Deserializers for engine fields whose JSON type varies
//!
//! The engine encodes numbers as strings in most views but not all of them,
//! and uses an empty string for absent optional text.

use serde::{Deserialize, Deserializer};

/// A JSON scalar that may arrive as either a string or a number
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StringOrNumber {
    Int(i64),
    Float(f64),
    Str(String),
}

impl StringOrNumber {
    /// Integer value, parsing strings; `None` when blank or not numeric
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            StringOrNumber::Int(n) => Some(*n),
            StringOrNumber::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            StringOrNumber::Float(_) => None,
            StringOrNumber::Str(s) => s.trim().parse().ok(),
        }
    }

    /// Textual value, rendering numbers without decoration
    pub fn into_string(self) -> String {
        match self {
            StringOrNumber::Int(n) => n.to_string(),
            StringOrNumber::Float(f) => f.to_string(),
            StringOrNumber::Str(s) => s,
        }
    }
}

/// `Option<String>` where an empty string means absent
pub fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// `String` accepting a number in its place
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<StringOrNumber> = Option::deserialize(deserializer)?;
    Ok(value.map(StringOrNumber::into_string).unwrap_or_default())
}

/// `Option<i32>` accepting `"79"`, `79`, `""` or `null`
pub fn optional_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<StringOrNumber> = Option::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| v.as_i64())
        .and_then(|n| i32::try_from(n).ok()))
}
