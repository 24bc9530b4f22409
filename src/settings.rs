use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

pub const DEFAULT_ENDPOINT: &str =
    "https://brainporteindhoven.com/en/discover-brainport/work/current-tech-it-vacancies-in-brainport-eindhoven";
pub const DEFAULT_OUTPUT_PATH: &str = "jobs.json";

/// Run settings. Endpoint, query and output path are fixed; only the pacing
/// knobs read `BRAINPORT_DELAY_MS` and `BRAINPORT_TIMEOUT_SECS`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub endpoint: String,
    pub output_path: PathBuf,
    pub type_tag: String,
    pub cache_hash: String,
    pub page_limit: u32,
    pub location_filter: String,
    pub language: String,
    /// Pause between successful page requests.
    pub delay_ms: u64,
    /// Per-request timeout (connect + body).
    pub timeout_secs: u64,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_sources(Environment::with_prefix("BRAINPORT"))
    }

    fn from_sources(env: Environment) -> Result<Self, ConfigError> {
        let env = Config::builder().add_source(env).build()?;

        Config::builder()
            .set_default("endpoint", DEFAULT_ENDPOINT)?
            .set_default("output_path", DEFAULT_OUTPUT_PATH)?
            .set_default("type_tag", "1594717109")?
            .set_default("cache_hash", "8d5dd4d6a85579669ba415290168cc20")?
            .set_default("page_limit", 15)?
            .set_default("location_filter", "5")?
            .set_default("language", "en")?
            .set_default("delay_ms", 500)?
            .set_default("timeout_secs", 30)?
            .set_override_option("delay_ms", tuning(&env, "delay_ms")?)?
            .set_override_option("timeout_secs", tuning(&env, "timeout_secs")?)?
            .build()?
            .try_deserialize()
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn tuning(env: &Config, key: &str) -> Result<Option<u64>, ConfigError> {
    match env.get::<u64>(key) {
        Ok(v) => Ok(Some(v)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_job_board_query() {
        let s = Settings::from_sources(env(&[])).unwrap();
        assert_eq!(s.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(s.output_path, PathBuf::from("jobs.json"));
        assert_eq!(s.page_limit, 15);
        assert_eq!(s.location_filter, "5");
        assert_eq!(s.language, "en");
        assert_eq!(s.delay(), Duration::from_millis(500));
        assert_eq!(s.timeout(), Duration::from_secs(30));
    }

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix("BRAINPORT").source(Some(map))
    }

    #[test]
    fn only_pacing_is_overridable() {
        let s = Settings::from_sources(env(&[
            ("BRAINPORT_DELAY_MS", "1000"),
            ("BRAINPORT_TIMEOUT_SECS", "5"),
            ("BRAINPORT_ENDPOINT", "http://elsewhere.invalid/"),
            ("BRAINPORT_OUTPUT_PATH", "/tmp/other.json"),
            ("BRAINPORT_PAGE_LIMIT", "100"),
        ]))
        .unwrap();
        assert_eq!(s.delay(), Duration::from_millis(1000));
        assert_eq!(s.timeout(), Duration::from_secs(5));
        assert_eq!(s.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(s.output_path, PathBuf::from(DEFAULT_OUTPUT_PATH));
        assert_eq!(s.page_limit, 15);
    }

    #[test]
    fn bad_pacing_value_is_an_error() {
        assert!(Settings::from_sources(env(&[("BRAINPORT_DELAY_MS", "soon")])).is_err());
    }
}
