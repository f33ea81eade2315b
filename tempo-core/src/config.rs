use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fmt,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use crate::error::DashboardError;

pub const SECRETS_SECTION: &str = "WEATHER";
pub const SECRETS_KEY: &str = "API_KEY";
pub const ENV_API_KEY: &str = "WEATHER_API_KEY";
pub const ENV_BASE_URL: &str = "WEATHER_API_BASE_URL";

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";
pub const DEFAULT_LANG: &str = "pt";
pub const CACHE_TTL: Duration = Duration::from_secs(3600);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// `[WEATHER]` section of the secrets file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherSecrets {
    #[serde(rename = "API_KEY")]
    pub api_key: Option<String>,
}

/// Structured secrets store.
///
/// Example TOML:
/// [WEATHER]
/// API_KEY = "..."
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(rename = "WEATHER")]
    pub weather: Option<WeatherSecrets>,
}

impl Secrets {
    /// Load secrets from disk. A missing file is not an error, it yields `None`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read secrets file: {}", path.display()))?;

        let secrets: Secrets = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse secrets file: {}", path.display()))?;

        Ok(Some(secrets))
    }

    /// Returns `WEATHER.API_KEY`, if present.
    pub fn api_key(&self) -> Option<&str> {
        self.weather.as_ref().and_then(|w| w.api_key.as_deref())
    }

    /// Candidate secrets files in lookup order: project-local first, then the
    /// platform config directory.
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".tempo").join("secrets.toml")];

        if let Some(dirs) = ProjectDirs::from("dev", "tempo", "tempo") {
            paths.push(dirs.config_dir().join("secrets.toml"));
        }

        paths
    }
}

/// The weather API key. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(Arc<str>);

impl ApiKey {
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    SecretsFile(PathBuf),
    Environment,
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::SecretsFile(path) => write!(f, "secrets file {}", path.display()),
            KeySource::Environment => write!(f, "environment variable {ENV_API_KEY}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedApiKey {
    pub key: ApiKey,
    pub source: KeySource,
    /// Non-fatal problems met while probing the secrets store.
    pub warnings: Vec<String>,
}

/// Resolve the API key from the secrets store, then from `WEATHER_API_KEY`.
pub fn resolve_api_key(secrets_paths: &[PathBuf]) -> Result<ResolvedApiKey, DashboardError> {
    resolve_api_key_with(secrets_paths, |name| std::env::var(name).ok())
}

/// Same as [`resolve_api_key`] with an injectable environment lookup.
pub fn resolve_api_key_with<F>(
    secrets_paths: &[PathBuf],
    env: F,
) -> Result<ResolvedApiKey, DashboardError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut warnings = Vec::new();

    for path in secrets_paths {
        match Secrets::load(path) {
            Ok(Some(secrets)) => match secrets.api_key().map(str::trim) {
                Some(key) if !key.is_empty() => {
                    tracing::debug!(path = %path.display(), "API key found in secrets file");
                    return Ok(ResolvedApiKey {
                        key: ApiKey::new(key),
                        source: KeySource::SecretsFile(path.clone()),
                        warnings,
                    });
                }
                Some(_) => {
                    warnings.push(format!(
                        "{SECRETS_SECTION}.{SECRETS_KEY} is empty in {}",
                        path.display()
                    ));
                }
                None => {}
            },
            Ok(None) => {}
            Err(err) => warnings.push(format!("{err:#}")),
        }
    }

    for warning in &warnings {
        tracing::warn!("Secrets store warning: {warning}");
    }

    match env(ENV_API_KEY).map(|v| v.trim().to_string()) {
        Some(key) if !key.is_empty() => {
            tracing::debug!("API key taken from environment");
            Ok(ResolvedApiKey { key: ApiKey::new(key), source: KeySource::Environment, warnings })
        }
        _ => Err(DashboardError::MissingCredential),
    }
}

/// HTTP client settings for the weather API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub lang: String,
    pub cache_ttl: Duration,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            lang: DEFAULT_LANG.to_string(),
            cache_ttl: CACHE_TTL,
            timeout: REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Defaults, with the base URL overridable through `WEATHER_API_BASE_URL`.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            if !url.trim().is_empty() {
                cfg.base_url = url.trim().trim_end_matches('/').to_string();
            }
        }
        cfg
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_secrets(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("secrets.toml");
        let mut file = fs::File::create(&path).expect("create secrets file");
        file.write_all(contents.as_bytes()).expect("write secrets file");
        path
    }

    #[test]
    fn secrets_file_takes_priority_over_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_secrets(&dir, "[WEATHER]\nAPI_KEY = \"from-file\"\n");

        let resolved = resolve_api_key_with(&[path.clone()], |_| Some("from-env".into())).unwrap();

        assert_eq!(resolved.key.as_str(), "from-file");
        assert_eq!(resolved.source, KeySource::SecretsFile(path));
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn falls_back_to_env_when_secrets_absent() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        let resolved = resolve_api_key_with(&[missing], |name| {
            (name == ENV_API_KEY).then(|| "abc123".to_string())
        })
        .unwrap();

        assert_eq!(resolved.key.as_str(), "abc123");
        assert_eq!(resolved.source, KeySource::Environment);
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn broken_secrets_file_is_a_warning_not_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_secrets(&dir, "this is [not toml");

        let resolved = resolve_api_key_with(&[path], |_| Some("abc123".into())).unwrap();

        assert_eq!(resolved.key.as_str(), "abc123");
        assert_eq!(resolved.warnings.len(), 1);
        assert!(resolved.warnings[0].contains("Failed to parse secrets file"));
    }

    #[test]
    fn section_without_key_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_secrets(&dir, "[WEATHER]\nOTHER = 1\n");

        let resolved = resolve_api_key_with(&[path], |_| Some("abc123".into())).unwrap();
        assert_eq!(resolved.source, KeySource::Environment);
    }

    #[test]
    fn missing_everywhere_is_missing_credential() {
        let err = resolve_api_key_with(&[], |_| None).unwrap_err();
        assert!(matches!(err, DashboardError::MissingCredential));

        let err = resolve_api_key_with(&[], |_| Some("   ".into())).unwrap_err();
        assert!(matches!(err, DashboardError::MissingCredential));
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("super-secret");
        assert!(!format!("{key:?}").contains("super-secret"));
    }
}
