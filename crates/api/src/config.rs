//! Process configuration.
//!
//! Everything is read once from the environment at startup. Missing
//! credentials are the only fatal condition in the server, so
//! [`AdminConfig::from_env`] reports every missing variable at once.

use std::env;
use std::time::Duration;

use atladmin_types::ReportDetail;
use thiserror::Error;
use url::Url;

use crate::credential::Credential;

pub const ENV_API_EMAIL: &str = "ATLASSIAN_API_EMAIL";
pub const ENV_API_TOKEN: &str = "ATLASSIAN_API_TOKEN";
pub const ENV_CLOUD_ID: &str = "ATLASSIAN_CLOUD_ID";
pub const ENV_API_BASE: &str = "ATLASSIAN_API_BASE";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "ATLASSIAN_HTTP_TIMEOUT_SECS";
pub const ENV_SEARCH_PAGE_SIZE: &str = "ATLASSIAN_SEARCH_PAGE_SIZE";
pub const ENV_REPORT_DETAIL: &str = "ATLASSIAN_ADMIN_REPORT_DETAIL";

pub const DEFAULT_API_BASE: &str = "https://api.atlassian.com";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SEARCH_PAGE_SIZE: u32 = 50;
/// Largest page size the issue search endpoint honours.
pub const MAX_SEARCH_PAGE_SIZE: u32 = 100;

/// Allowed hostnames or base domains for non-local values of
/// `ATLASSIAN_API_BASE`. Subdomains of these domains are also allowed.
const ALLOWED_ATLASSIAN_DOMAINS: &[&str] = &["atlassian.com", "atlassian.net"];
/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingVariables(Vec<String>),
    #[error("invalid ATLASSIAN_API_BASE '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("invalid {name} '{value}': expected a positive integer")]
    InvalidNumber { name: &'static str, value: String },
    #[error("invalid ATLASSIAN_ADMIN_REPORT_DETAIL: {0}")]
    InvalidReportDetail(String),
    #[error("failed to build http client: {0}")]
    HttpClient(String),
}

/// Immutable process configuration shared by every tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    pub credential: Credential,
    pub cloud_id: String,
    pub base_url: String,
    pub timeout: Duration,
    pub search_page_size: u32,
    pub report_detail: ReportDetail,
}

impl AdminConfig {
    /// Configuration with default base URL, timeout, page size and report detail.
    pub fn new(credential: Credential, cloud_id: impl Into<String>) -> Self {
        Self {
            credential,
            cloud_id: cloud_id.into(),
            base_url: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            search_page_size: DEFAULT_SEARCH_PAGE_SIZE,
            report_detail: ReportDetail::default(),
        }
    }

    /// Load configuration from the process environment.
    ///
    /// Empty values count as missing. The base URL must use https on an
    /// Atlassian domain unless it points at localhost.
    pub fn from_env() -> Result<Self, ConfigError> {
        let email = non_empty_var(ENV_API_EMAIL);
        let api_token = non_empty_var(ENV_API_TOKEN);
        let cloud_id = non_empty_var(ENV_CLOUD_ID);

        let missing: Vec<String> = [
            (ENV_API_EMAIL, email.is_none()),
            (ENV_API_TOKEN, api_token.is_none()),
            (ENV_CLOUD_ID, cloud_id.is_none()),
        ]
        .into_iter()
        .filter(|(_, is_missing)| *is_missing)
        .map(|(name, _)| name.to_string())
        .collect();

        let (Some(email), Some(api_token), Some(cloud_id)) = (email, api_token, cloud_id) else {
            return Err(ConfigError::MissingVariables(missing));
        };

        let mut config = AdminConfig::new(Credential::new(email, api_token), cloud_id);

        if let Some(base_url) = non_empty_var(ENV_API_BASE) {
            config = config.with_base_url(base_url)?;
        }
        if let Some(raw) = non_empty_var(ENV_HTTP_TIMEOUT_SECS) {
            config.timeout = Duration::from_secs(parse_positive(ENV_HTTP_TIMEOUT_SECS, &raw)?);
        }
        if let Some(raw) = non_empty_var(ENV_SEARCH_PAGE_SIZE) {
            let requested = parse_positive(ENV_SEARCH_PAGE_SIZE, &raw)?;
            config.search_page_size = clamp_page_size(requested);
        }
        if let Some(raw) = non_empty_var(ENV_REPORT_DETAIL) {
            config.report_detail = raw.parse().map_err(ConfigError::InvalidReportDetail)?;
        }

        Ok(config)
    }

    /// Replace the base URL after validating it. A trailing slash is dropped.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        validate_base_url(&base_url)?;
        self.base_url = base_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn with_report_detail(mut self, report_detail: ReportDetail) -> Self {
        self.report_detail = report_detail;
        self
    }

    pub fn with_search_page_size(mut self, page_size: u32) -> Self {
        self.search_page_size = clamp_page_size(u64::from(page_size));
        self
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_positive(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidNumber {
            name,
            value: raw.to_string(),
        }),
    }
}

fn clamp_page_size(requested: u64) -> u32 {
    requested.clamp(1, u64::from(MAX_SEARCH_PAGE_SIZE)) as u32
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS, and host must be one of the allowed
///   Atlassian domains or a subdomain thereof
pub fn validate_base_url(base: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: base.to_string(),
        reason,
    };

    let parsed_base_url = Url::parse(base).map_err(|error| invalid(error.to_string()))?;
    let host_name = parsed_base_url
        .host_str()
        .ok_or_else(|| invalid("URL must include a host".to_string()))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(());
    }

    if parsed_base_url.scheme() != "https" {
        return Err(invalid(format!(
            "must use https for non-localhost hosts; got '{}://'",
            parsed_base_url.scheme()
        )));
    }

    let is_allowed_domain = ALLOWED_ATLASSIAN_DOMAINS.iter().any(|&allowed_domain| {
        host_name.eq_ignore_ascii_case(allowed_domain) || host_name.ends_with(&format!(".{allowed_domain}"))
    });
    if !is_allowed_domain {
        return Err(invalid(format!(
            "host '{host_name}' is not allowed; must be one of {ALLOWED_ATLASSIAN_DOMAINS:?} or a subdomain, or localhost"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_VARS: [&str; 7] = [
        ENV_API_EMAIL,
        ENV_API_TOKEN,
        ENV_CLOUD_ID,
        ENV_API_BASE,
        ENV_HTTP_TIMEOUT_SECS,
        ENV_SEARCH_PAGE_SIZE,
        ENV_REPORT_DETAIL,
    ];

    fn with_env<R>(values: &[(&str, &str)], test: impl FnOnce() -> R) -> R {
        let vars: Vec<(&str, Option<&str>)> = ALL_VARS
            .iter()
            .map(|name| {
                let value = values.iter().find(|(key, _)| key == name).map(|(_, value)| *value);
                (*name, value)
            })
            .collect();
        temp_env::with_vars(vars, test)
    }

    const REQUIRED: [(&str, &str); 3] = [
        (ENV_API_EMAIL, "admin@example.com"),
        (ENV_API_TOKEN, "token"),
        (ENV_CLOUD_ID, "cloud-123"),
    ];

    #[test]
    fn from_env_applies_defaults() {
        let config = with_env(&REQUIRED, AdminConfig::from_env).expect("config");
        assert_eq!(config.cloud_id, "cloud-123");
        assert_eq!(config.base_url, DEFAULT_API_BASE);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.search_page_size, 50);
        assert_eq!(config.report_detail, ReportDetail::Compact);
        assert_eq!(config.credential.email(), "admin@example.com");
    }

    #[test]
    fn from_env_lists_every_missing_variable() {
        let error = with_env(&[(ENV_API_EMAIL, "admin@example.com"), (ENV_API_TOKEN, "  ")], AdminConfig::from_env)
            .unwrap_err();
        assert_eq!(
            error,
            ConfigError::MissingVariables(vec![ENV_API_TOKEN.to_string(), ENV_CLOUD_ID.to_string()])
        );
        assert_eq!(
            error.to_string(),
            "missing required environment variables: ATLASSIAN_API_TOKEN, ATLASSIAN_CLOUD_ID"
        );
    }

    #[test]
    fn from_env_reads_optional_overrides() {
        let mut values = REQUIRED.to_vec();
        values.extend([
            (ENV_API_BASE, "https://example.atlassian.net/"),
            (ENV_HTTP_TIMEOUT_SECS, "5"),
            (ENV_SEARCH_PAGE_SIZE, "500"),
            (ENV_REPORT_DETAIL, "Detailed"),
        ]);
        let config = with_env(&values, AdminConfig::from_env).expect("config");
        assert_eq!(config.base_url, "https://example.atlassian.net");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.search_page_size, MAX_SEARCH_PAGE_SIZE);
        assert_eq!(config.report_detail, ReportDetail::Detailed);
    }

    #[test]
    fn from_env_rejects_bad_numbers_and_detail() {
        let mut values = REQUIRED.to_vec();
        values.push((ENV_HTTP_TIMEOUT_SECS, "0"));
        let error = with_env(&values, AdminConfig::from_env).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidNumber { name: ENV_HTTP_TIMEOUT_SECS, .. }));

        let mut values = REQUIRED.to_vec();
        values.push((ENV_REPORT_DETAIL, "verbose"));
        let error = with_env(&values, AdminConfig::from_env).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidReportDetail(_)));
    }

    #[test]
    fn validate_base_url_rules() {
        assert!(validate_base_url("https://api.atlassian.com").is_ok());
        assert!(validate_base_url("https://acme.atlassian.net").is_ok());
        assert!(validate_base_url("http://localhost:8080").is_ok());
        assert!(validate_base_url("http://127.0.0.1:3000").is_ok());
        assert!(validate_base_url("http://api.atlassian.com").is_err());
        assert!(validate_base_url("https://evil-atlassian.com").is_err());
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn page_size_is_clamped() {
        let config = AdminConfig::new(Credential::new("a", "b"), "c").with_search_page_size(0);
        assert_eq!(config.search_page_size, 1);
    }
}
