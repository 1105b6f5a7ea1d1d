//! Configuration loaded from the environment

use actions_lib::bounded::DEFAULT_CONCURRENCY;
use actions_lib::{Credentials, SearchQuery};
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Report path used when `OUTPUT_FILENAME` is unset or empty
pub const DEFAULT_OUTPUT_FILENAME: &str = "container-actions.json";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Invalid or incomplete configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("The following required environment variables were missing: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("{0} should be a valid JSON string.")]
    InvalidJson(&'static str),

    #[error("POD_SEARCH_QUERY should be a JSON object of search parameters.")]
    SearchQueryShape,

    #[error("POD_GROUPS_TO_EXCLUDE should be a JSON array of strings.")]
    ExclusionShape,

    #[error("TURBO_URL is not a valid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("{name} should be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("Failed to read environment: {0}")]
    Source(#[from] config::ConfigError),
}

/// Raw environment values, keyed by lowercased variable name
#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    turbo_url: Option<String>,
    turbo_username: Option<String>,
    turbo_password: Option<String>,
    pod_search_query: Option<String>,
    pod_groups_to_exclude: Option<String>,
    output_filename: Option<String>,
    debug: Option<String>,
    group_concurrency: Option<String>,
    request_timeout_secs: Option<String>,
}

/// Validated run configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub credentials: Credentials,
    pub search_query: SearchQuery,
    pub excluded_groups: Vec<String>,
    pub output_path: PathBuf,
    pub debug: bool,
    pub group_concurrency: usize,
    pub request_timeout: Duration,
}

impl Settings {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;
        Self::from_config(config)
    }

    /// Validate an already assembled configuration
    pub fn from_config(config: config::Config) -> Result<Self, ConfigError> {
        let raw: RawSettings = config.try_deserialize()?;
        raw.validate()
    }
}

impl RawSettings {
    fn validate(self) -> Result<Settings, ConfigError> {
        let mut missing = Vec::new();
        let mut require = |name: &'static str, value: Option<String>| match non_empty(value) {
            Some(value) => value,
            None => {
                missing.push(name);
                String::new()
            }
        };

        let username = require("TURBO_USERNAME", self.turbo_username);
        let password = require("TURBO_PASSWORD", self.turbo_password);
        let base_url = require("TURBO_URL", self.turbo_url);
        let search_query = require("POD_SEARCH_QUERY", self.pod_search_query);
        let excluded_groups = require("POD_GROUPS_TO_EXCLUDE", self.pod_groups_to_exclude);
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let search_query = match parse_json("POD_SEARCH_QUERY", &search_query)? {
            Value::Object(params) => SearchQuery(params),
            _ => return Err(ConfigError::SearchQueryShape),
        };
        let excluded_groups: Vec<String> =
            serde_json::from_value(parse_json("POD_GROUPS_TO_EXCLUDE", &excluded_groups)?)
                .map_err(|_| ConfigError::ExclusionShape)?;

        url::Url::parse(&base_url)?;

        let output_path = non_empty(self.output_filename)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILENAME));

        let group_concurrency = match non_empty(self.group_concurrency) {
            Some(value) => parse_positive("GROUP_CONCURRENCY", &value)? as usize,
            None => DEFAULT_CONCURRENCY,
        };
        let request_timeout_secs = match non_empty(self.request_timeout_secs) {
            Some(value) => parse_positive("REQUEST_TIMEOUT_SECS", &value)?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Ok(Settings {
            base_url,
            credentials: Credentials::new(username, password),
            search_query,
            excluded_groups,
            output_path,
            debug: non_empty(self.debug).is_some(),
            group_concurrency,
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_json(name: &'static str, raw: &str) -> Result<Value, ConfigError> {
    serde_json::from_str(raw).map_err(|_| ConfigError::InvalidJson(name))
}

fn parse_positive(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidNumber {
            name,
            value: raw.to_string(),
        }),
    }
}
