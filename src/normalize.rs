use std::collections::BTreeMap;

use itertools::Itertools;
use serde_json::Value;

use crate::model::{NormalizedJob, RawDate, RawJob};

pub const PROVINCE_KEY: &str = "4";
pub const REGION_KEY: &str = "5";

/// Flatten one raw listing. Total: every input produces exactly one record.
pub fn normalize(raw: RawJob) -> NormalizedJob {
    let (province, region) = match &raw.locations {
        Some(map) => (location_entry(map, PROVINCE_KEY), location_entry(map, REGION_KEY)),
        None => (String::new(), String::new()),
    };

    NormalizedJob {
        date: extract_date(raw.date.as_ref()),
        description: raw
            .description
            .as_deref()
            .map(collapse_whitespace)
            .unwrap_or_default(),
        title: raw.title,
        company: raw.company,
        location: raw.location_name,
        province,
        region,
        language: raw.language,
        featured: raw.featured,
        url: raw.uri,
    }
}

/// Date part of a `YYYY-MM-DD HH:MM:SS` style value: everything before the
/// first space.
pub fn extract_date(raw: Option<&RawDate>) -> String {
    match raw {
        Some(RawDate::Plain(s)) | Some(RawDate::Nested(s)) => {
            s.split(' ').next().unwrap_or_default().to_string()
        }
        Some(RawDate::Unrecognized) | None => String::new(),
    }
}

/// Collapse every whitespace run (newlines and tabs included) to one space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().join(" ")
}

pub fn location_entry(locations: &BTreeMap<String, Value>, key: &str) -> String {
    locations
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

// ── Tests ──
