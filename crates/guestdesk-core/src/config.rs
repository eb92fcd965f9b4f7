use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::policy::LanguagePolicy;
use crate::providers::HttpConfig;
use crate::{Error, Result};

const ENV_PREFIX: &str = "GUESTDESK_";

/// Default upload limit for a single document photo (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const DEFAULT_TRANSLATOR_ENDPOINT: &str = "https://api.cognitive.microsofttranslator.com";

pub const DEFAULT_OPENAI_DEPLOYMENT: &str = "gpt-35-turbo";

/// Base URL and key for one cloud service.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderEndpoint {
    pub endpoint: String,
    pub api_key: String,
}

impl ProviderEndpoint {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    /// Endpoint with any trailing slash removed, ready for path joining.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }

    #[must_use]
    pub fn host(&self) -> Option<String> {
        Url::parse(&self.endpoint)
            .ok()
            .and_then(|u| u.host_str().map(String::from))
    }

    fn validate(&self, name: &str) -> Result<()> {
        let parsed = Url::parse(&self.endpoint)
            .map_err(|e| Error::InvalidConfig(format!("{name}: {e}")))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| Error::InvalidConfig(format!("{name}: no host in URL")))?;

        match parsed.scheme() {
            "https" => Ok(()),
            "http" if is_local_host(host) => Ok(()),
            scheme => Err(Error::InvalidConfig(format!(
                "{name}: scheme {scheme} is only allowed for localhost"
            ))),
        }
    }
}

impl std::fmt::Debug for ProviderEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderEndpoint")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Service configuration, built once at startup and shared read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub document_intelligence: ProviderEndpoint,
    pub computer_vision: ProviderEndpoint,
    pub text_analytics: ProviderEndpoint,
    pub translator: ProviderEndpoint,
    pub translator_region: String,
    pub openai: ProviderEndpoint,
    #[serde(default = "default_deployment")]
    pub openai_deployment: String,
    #[serde(default = "default_database")]
    pub database_path: String,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub language_policy: LanguagePolicy,
    #[serde(default = "default_max_upload")]
    pub max_upload_bytes: usize,
}

fn default_deployment() -> String {
    DEFAULT_OPENAI_DEPLOYMENT.to_string()
}

fn default_database() -> String {
    "guestdesk.db".to_string()
}

const fn default_max_upload() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

impl Config {
    /// Reads `GUESTDESK_*` variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds a config from any key lookup; `from_env` passes the environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}")).filter(|v| !v.is_empty());
        let require = |name: &str| {
            get(name).ok_or_else(|| Error::MissingConfig(format!("{ENV_PREFIX}{name}")))
        };
        let endpoint = |service: &str| -> Result<ProviderEndpoint> {
            Ok(ProviderEndpoint::new(
                require(&format!("{service}_ENDPOINT"))?,
                require(&format!("{service}_KEY"))?,
            ))
        };

        let mut http = HttpConfig::default();
        if let Some(v) = get("CONNECT_TIMEOUT_SECONDS") {
            http.connect_timeout_seconds = parse_number("CONNECT_TIMEOUT_SECONDS", &v)?;
        }
        if let Some(v) = get("CALL_TIMEOUT_SECONDS") {
            http.call_timeout_seconds = parse_number("CALL_TIMEOUT_SECONDS", &v)?;
        }
        if let Some(v) = get("POLL_INTERVAL_MS") {
            http.poll_interval_ms = parse_number("POLL_INTERVAL_MS", &v)?;
        }
        if let Some(v) = get("MAX_POLLS") {
            http.max_polls = parse_number("MAX_POLLS", &v)?;
        }
        if let Some(v) = get("USER_AGENT") {
            http.user_agent = Some(v);
        }

        let language_policy = match (get("TRANSLATE_LANGUAGES"), get("FALLBACK_LANGUAGES")) {
            (None, None) => LanguagePolicy::default(),
            (translate, fallback) => {
                let translate = translate.unwrap_or_else(|| "ru".to_string());
                let fallback = fallback.unwrap_or_else(|| "ja".to_string());
                LanguagePolicy::from_lists(split_list(&translate), split_list(&fallback))
                    .map_err(|code| {
                        Error::InvalidConfig(format!(
                            "language {code} is listed for both translation and fallback"
                        ))
                    })?
            }
        };

        let config = Self {
            document_intelligence: endpoint("DOCUMENT_INTELLIGENCE")?,
            computer_vision: endpoint("COMPUTER_VISION")?,
            text_analytics: endpoint("TEXT_ANALYTICS")?,
            translator: ProviderEndpoint::new(
                get("TRANSLATOR_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_TRANSLATOR_ENDPOINT.to_string()),
                require("TRANSLATOR_KEY")?,
            ),
            translator_region: require("TRANSLATOR_REGION")?,
            openai: endpoint("OPENAI")?,
            openai_deployment: get("OPENAI_DEPLOYMENT").unwrap_or_else(default_deployment),
            database_path: get("DATABASE").unwrap_or_else(default_database),
            http,
            language_policy,
            max_upload_bytes: match get("MAX_UPLOAD_BYTES") {
                Some(v) => parse_number("MAX_UPLOAD_BYTES", &v)?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.document_intelligence.validate("document_intelligence")?;
        self.computer_vision.validate("computer_vision")?;
        self.text_analytics.validate("text_analytics")?;
        self.translator.validate("translator")?;
        self.openai.validate("openai")?;

        if self.translator_region.trim().is_empty() {
            return Err(Error::InvalidConfig("translator_region is empty".into()));
        }

        if self.max_upload_bytes == 0 {
            return Err(Error::InvalidConfig("max_upload_bytes must be positive".into()));
        }

        Ok(())
    }
}

pub(crate) fn is_local_host(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1" | "::1" | "[::1]")
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidConfig(format!("{ENV_PREFIX}{name}: not a number: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<String, String> {
        [
            ("DOCUMENT_INTELLIGENCE_ENDPOINT", "https://di.example.com/"),
            ("DOCUMENT_INTELLIGENCE_KEY", "di-key"),
            ("COMPUTER_VISION_ENDPOINT", "https://cv.example.com"),
            ("COMPUTER_VISION_KEY", "cv-key"),
            ("TEXT_ANALYTICS_ENDPOINT", "https://ta.example.com"),
            ("TEXT_ANALYTICS_KEY", "ta-key"),
            ("TRANSLATOR_KEY", "tr-key"),
            ("TRANSLATOR_REGION", "westeurope"),
            ("OPENAI_ENDPOINT", "https://oai.example.com"),
            ("OPENAI_KEY", "oai-key"),
        ]
        .into_iter()
        .map(|(k, v)| (format!("{ENV_PREFIX}{k}"), v.to_string()))
        .collect()
    }

    fn load(env: &HashMap<String, String>) -> Result<Config> {
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = load(&base_env()).unwrap();

        assert_eq!(config.translator.endpoint, DEFAULT_TRANSLATOR_ENDPOINT);
        assert_eq!(config.openai_deployment, "gpt-35-turbo");
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.language_policy, LanguagePolicy::default());
        assert_eq!(config.document_intelligence.base_url(), "https://di.example.com");
    }

    #[test]
    fn test_missing_key_is_named() {
        let mut env = base_env();
        env.remove("GUESTDESK_OPENAI_KEY");

        match load(&env) {
            Err(Error::MissingConfig(name)) => assert_eq!(name, "GUESTDESK_OPENAI_KEY"),
            other => panic!("expected MissingConfig, got {other:?}"),
        }
    }

    #[test]
    fn test_language_lists() {
        let mut env = base_env();
        env.insert("GUESTDESK_FALLBACK_LANGUAGES".into(), "ja, zh,ko".into());

        let config = load(&env).unwrap();

        assert_eq!(config.language_policy.route_for("ru"), crate::Route::Translate);
        assert_eq!(config.language_policy.route_for("ko"), crate::Route::Fallback);
    }

    #[test]
    fn test_overlapping_language_lists_rejected() {
        let mut env = base_env();
        env.insert("GUESTDESK_TRANSLATE_LANGUAGES".into(), "ru,ja".into());

        assert!(matches!(load(&env), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_plain_http_only_for_localhost() {
        let mut env = base_env();
        env.insert("GUESTDESK_OPENAI_ENDPOINT".into(), "http://localhost:8080".into());
        assert!(load(&env).is_ok());

        env.insert("GUESTDESK_OPENAI_ENDPOINT".into(), "http://oai.example.com".into());
        assert!(matches!(load(&env), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_bad_number() {
        let mut env = base_env();
        env.insert("GUESTDESK_CALL_TIMEOUT_SECONDS".into(), "soon".into());

        assert!(matches!(load(&env), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = load(&base_env()).unwrap();
        let debug = format!("{config:?}");

        assert!(!debug.contains("oai-key"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_config_serialization() {
        let config = load(&base_env()).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.translator_region, config.translator_region);
        assert_eq!(parsed.language_policy, config.language_policy);
    }
}
