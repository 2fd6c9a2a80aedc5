use anyhow::{Context, Result};
use url::Url;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const API_URL_ENV: &str = "TODO_API_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: Url,
}

impl ClientConfig {
    /// Explicit override, then `TODO_API_URL`, then the local default.
    pub fn resolve(api_url_override: Option<&str>) -> Result<Self> {
        let env_value = std::env::var(API_URL_ENV).ok();
        Self::resolve_from(api_url_override, env_value.as_deref())
    }

    pub fn resolve_from(api_url_override: Option<&str>, env_value: Option<&str>) -> Result<Self> {
        let raw = url_setting(api_url_override)
            .or_else(|| url_setting(env_value))
            .unwrap_or(DEFAULT_API_URL);
        let api_url = Url::parse(raw).with_context(|| format!("invalid API url '{raw}'"))?;
        if !matches!(api_url.scheme(), "http" | "https") {
            anyhow::bail!("API url '{raw}' must use http or https");
        }
        Ok(Self { api_url })
    }
}

/// A URL setting counts only when it holds something besides whitespace.
pub fn url_setting(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_local_default() {
        let config = ClientConfig::resolve_from(None, None).expect("config");
        assert_eq!(config.api_url.as_str(), "http://127.0.0.1:8000/");
    }

    #[test]
    fn override_beats_environment() {
        let config = ClientConfig::resolve_from(
            Some("https://lists.example.org"),
            Some("http://ignored:1"),
        )
        .expect("config");
        assert_eq!(config.api_url.host_str(), Some("lists.example.org"));

        let from_env = ClientConfig::resolve_from(None, Some(" http://10.0.0.2:8000 "))
            .expect("config");
        assert_eq!(from_env.api_url.host_str(), Some("10.0.0.2"));
    }

    #[test]
    fn blank_settings_fall_through() {
        assert_eq!(url_setting(Some("  ")), None);
        assert_eq!(url_setting(Some(" http://h ")), Some("http://h"));

        let config =
            ClientConfig::resolve_from(Some(""), Some("http://10.0.0.2:8000")).expect("config");
        assert_eq!(config.api_url.host_str(), Some("10.0.0.2"));
        let config = ClientConfig::resolve_from(None, Some("   ")).expect("config");
        assert_eq!(config.api_url.as_str(), "http://127.0.0.1:8000/");
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(ClientConfig::resolve_from(Some("ftp://host"), None).is_err());
        assert!(ClientConfig::resolve_from(Some("not a url"), None).is_err());
    }
}
