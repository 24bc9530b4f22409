//! Offline views over a saved snapshot: search and CSV export.

use chrono::NaiveDate;
use itertools::Itertools;

use crate::model::NormalizedJob;

const CSV_HEADERS: [&str; 6] = ["Title", "Company", "Location", "Description", "Date", "URL"];

/// Case-insensitive substring match on title, company, location and
/// description. A blank query matches everything.
pub fn matches(job: &NormalizedJob, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }

    [
        job.title.as_deref(),
        job.company.as_deref(),
        job.location.as_deref(),
        Some(job.description.as_str()),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&query))
}

pub fn filter<'a>(jobs: &'a [NormalizedJob], query: &str) -> Vec<&'a NormalizedJob> {
    jobs.iter().filter(|job| matches(job, query)).collect()
}

pub fn summary(shown: usize, total: usize, last_updated: &str) -> String {
    let updated = if last_updated.is_empty() { "Unknown" } else { last_updated };
    format!("Showing {} of {} jobs (Updated: {})", shown, total, updated)
}

/// Every cell quoted, inner quotes doubled, absent values as empty cells.
pub fn to_csv(jobs: &[&NormalizedJob]) -> String {
    let header = CSV_HEADERS.iter().join(",");
    let rows = jobs.iter().map(|job| {
        [
            job.title.as_deref().unwrap_or_default(),
            job.company.as_deref().unwrap_or_default(),
            job.location.as_deref().unwrap_or_default(),
            job.description.as_str(),
            job.date.as_str(),
            job.url.as_deref().unwrap_or_default(),
        ]
        .iter()
        .map(|cell| quote(cell))
        .join(",")
    });

    std::iter::once(header).chain(rows).join("\n")
}

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

pub fn default_export_name(date: NaiveDate) -> String {
    format!("brainport_jobs_export_{}.csv", date.format("%Y-%m-%d"))
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

// ── Tests ──
