use std::thread;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::model::{NormalizedJob, RawJob};
use crate::normalize::normalize;
use crate::settings::Settings;

const PAGE_PARAM: &str = "tx_brainportjobs_jobslist[page]";
const USER_AGENT: &str = concat!("brainport_jobs/", env!("CARGO_PKG_VERSION"));

/// Anything that ends a run early. None of these are retried.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for page {page} failed: {source}")]
    Request {
        page: u32,
        #[source]
        source: reqwest::Error,
    },
    #[error("page {page} returned HTTP {status}")]
    Status { page: u32, status: u16 },
    #[error("page {page} body is not JSON (blocked or format changed): {source}")]
    Decode {
        page: u32,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn page(&self) -> u32 {
        match self {
            FetchError::Request { page, .. }
            | FetchError::Status { page, .. }
            | FetchError::Decode { page, .. } => *page,
        }
    }
}

/// One page of listings per call, pages numbered from 1.
pub trait PageSource {
    fn fetch_page(&self, page: u32) -> Result<Vec<RawJob>, FetchError>;
}

/// The live job board over blocking HTTP.
pub struct HttpPageSource {
    client: reqwest::blocking::Client,
    endpoint: String,
    params: Vec<(&'static str, String)>,
}

impl HttpPageSource {
    pub fn new(settings: &Settings) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(settings.timeout())
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            params: query_template(settings),
        })
    }
}

impl PageSource for HttpPageSource {
    fn fetch_page(&self, page: u32) -> Result<Vec<RawJob>, FetchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.params)
            .query(&[(PAGE_PARAM, page)])
            .send()
            .map_err(|source| FetchError::Request { page, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                page,
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .map_err(|source| FetchError::Request { page, source })?;
        parse_page(page, &body)
    }
}

/// The fixed query shared by every request; only the page index is added
/// per call.
pub fn query_template(settings: &Settings) -> Vec<(&'static str, String)> {
    vec![
        ("tx_brainportjobs_joblist[action]", "list".to_string()),
        ("tx_brainportjobs_joblist[controller]", "JobAjax".to_string()),
        ("type", settings.type_tag.clone()),
        ("cHash", settings.cache_hash.clone()),
        ("tx_brainportjobs_jobslist[pageLimit]", settings.page_limit.to_string()),
        (
            "tx_brainportjobs_jobslist[location_filter][]",
            settings.location_filter.clone(),
        ),
        ("tx_brainportjobs_jobslist[language_filter]", settings.language.clone()),
    ]
}

/// Decode a response body. A body without a `jobs` list is an empty page.
pub fn parse_page(page: u32, body: &str) -> Result<Vec<RawJob>, FetchError> {
    let mut doc: Value =
        serde_json::from_str(body).map_err(|source| FetchError::Decode { page, source })?;

    let jobs = match doc.get_mut("jobs").map(Value::take) {
        Some(Value::Array(items)) => items,
        other => {
            debug!(page, jobs = ?other, "no jobs list in response");
            Vec::new()
        }
    };
    Ok(jobs.into_iter().map(RawJob::from_value).collect())
}

/// Lazy producer of pages. Ends after the first empty page, or after
/// yielding the first error.
pub struct Pages<'a, S: PageSource + ?Sized, P: FnMut(Duration)> {
    source: &'a S,
    delay: Duration,
    pause: P,
    next_page: u32,
    done: bool,
}

impl<'a, S: PageSource + ?Sized, P: FnMut(Duration)> Pages<'a, S, P> {
    pub fn new(source: &'a S, delay: Duration, pause: P) -> Self {
        Self {
            source,
            delay,
            pause,
            next_page: 1,
            done: false,
        }
    }
}

impl<S: PageSource + ?Sized, P: FnMut(Duration)> Iterator for Pages<'_, S, P> {
    type Item = (u32, Result<Vec<RawJob>, FetchError>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let page = self.next_page;
        // Only reached after a non-empty page, so the pause sits between
        // successful fetches.
        if page > 1 && !self.delay.is_zero() {
            (self.pause)(self.delay);
        }

        match self.source.fetch_page(page) {
            Ok(jobs) if jobs.is_empty() => {
                self.done = true;
                info!(page, "no more jobs, finishing");
                None
            }
            Ok(jobs) => {
                self.next_page += 1;
                Some((page, Ok(jobs)))
            }
            Err(e) => {
                self.done = true;
                Some((page, Err(e)))
            }
        }
    }
}

/// Everything one run collected.
#[derive(Debug, Default)]
pub struct Harvest {
    pub jobs: Vec<NormalizedJob>,
    /// Non-empty pages fetched.
    pub pages: u32,
    pub failure: Option<FetchError>,
}

/// Walk every page, normalizing as it goes. A failure stops the walk but
/// keeps what was already collected.
pub fn harvest<S: PageSource + ?Sized>(source: &S, delay: Duration) -> Harvest {
    harvest_paced(source, delay, thread::sleep)
}

/// `harvest` with the inter-page wait supplied by the caller.
pub fn harvest_paced<S, P>(source: &S, delay: Duration, pause: P) -> Harvest
where
    S: PageSource + ?Sized,
    P: FnMut(Duration),
{
    let mut out = Harvest::default();

    for (page, result) in Pages::new(source, delay, pause) {
        match result {
            Ok(raw) => {
                let count = raw.len();
                out.jobs.extend(raw.into_iter().map(normalize));
                out.pages += 1;
                println!(
                    "Downloaded and processed page {} ({} jobs). Total: {}",
                    page,
                    count,
                    out.jobs.len()
                );
            }
            Err(e) => {
                error!(page = e.page(), error = %e, "fetch failed, stopping");
                out.failure = Some(e);
            }
        }
    }

    if out.failure.is_none() {
        info!(pages = out.pages, jobs = out.jobs.len(), "all pages fetched");
    }
    out
}

// ── Tests ──
