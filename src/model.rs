use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One listing as returned by the remote API.
///
/// The payload shape drifts between releases of the job board, so every
/// field is optional and a value of the wrong JSON type reads as absent
/// instead of failing the whole page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawJob {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub location_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub locations: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub date: Option<RawDate>,
    #[serde(default, deserialize_with = "lenient")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub featured: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub uri: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
}

impl RawJob {
    /// Reads one element of the `jobs` array. Anything that is not an
    /// object becomes an all-absent record.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

/// The raw `date` field: either a plain string, or an object carrying the
/// string under its own `date` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawDate {
    Plain(String),
    Nested(String),
    Unrecognized,
}

impl<'de> Deserialize<'de> for RawDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => RawDate::Plain(s),
            Value::Object(mut map) => match map.remove("date") {
                Some(Value::String(s)) => RawDate::Nested(s),
                _ => RawDate::Unrecognized,
            },
            _ => RawDate::Unrecognized,
        })
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// The flat record written to the snapshot. Absent pass-through fields
/// serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedJob {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub date: String,
    pub language: Option<String>,
    pub featured: Option<bool>,
    pub url: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// The output document of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    #[serde(rename = "last_updated", default)]
    pub generated_at: String,
    #[serde(default)]
    pub jobs: Vec<NormalizedJob>,
}

// ── Tests ──
