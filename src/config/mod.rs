use std::env;
use std::path::PathBuf;

/// Process configuration, built once at startup and passed into each
/// component constructor. No handler reads the environment after this.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub ckan: CkanConfig,
    pub stories_path: Option<PathBuf>,
    pub session_secret: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Remote content API settings. All fields are optional: handlers resolve
/// them at call time and answer with a config error when one is missing.
#[derive(Debug, Clone, Default)]
pub struct CkanConfig {
    /// Server-side base URL of the CKAN API.
    pub api_url: Option<String>,
    /// Public-facing base URL, used as a fallback when `api_url` is unset.
    pub public_url: Option<String>,
    /// Service-level API key for non-login actions.
    pub api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = Environment::parse(env::var("APP_ENV").ok().as_deref());

        let ckan = CkanConfig {
            api_url: base_url_var("CKAN_API_URL"),
            public_url: base_url_var("CKAN_PUBLIC_URL"),
            api_key: non_empty_var("CKAN_API_KEY"),
        };

        let stories_path = non_empty_var("PORTALJS_STORIES_PATH").map(PathBuf::from);
        let session_secret = env::var("SESSION_SECRET").unwrap_or_default();

        let port = env::var("PORTAL_ADMIN_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(3000);

        Self { environment, ckan, stories_path, session_secret, port }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Reads a base URL variable, rejecting values `url::Url` cannot parse and
/// trimming any trailing slash so action paths can be appended verbatim.
fn base_url_var(name: &str) -> Option<String> {
    let raw = non_empty_var(name)?;
    match url::Url::parse(&raw) {
        Ok(_) => Some(normalize_base_url(&raw)),
        Err(e) => {
            tracing::warn!("ignoring {}: not a valid URL: {}", name, e);
            None
        }
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse(Some("production")), Environment::Production);
        assert_eq!(Environment::parse(Some("prod")), Environment::Production);
        assert_eq!(Environment::parse(Some("staging")), Environment::Staging);
        assert_eq!(Environment::parse(Some("anything-else")), Environment::Development);
        assert_eq!(Environment::parse(None), Environment::Development);
    }

    #[test]
    fn test_only_production_is_production() {
        assert!(Environment::Production.is_production());
        assert!(!Environment::Staging.is_production());
        assert!(!Environment::Development.is_production());
    }

    #[test]
    fn test_normalize_base_url_trims_trailing_slash() {
        assert_eq!(normalize_base_url("http://ckan.example.org/"), "http://ckan.example.org");
        assert_eq!(normalize_base_url("http://ckan.example.org"), "http://ckan.example.org");
    }
}
