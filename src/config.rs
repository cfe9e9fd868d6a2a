//! Configuration loading for the `huginn` binary.
//!
//! Configuration is loaded from TOML with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.huginn/config.toml` (user)
//! 3. `/etc/huginn/config.toml` (system)
//! 4. built-in defaults
//!
//! Credentials never live in the config file. They come from
//! `~/.huginn/secrets.toml` (must be 0600) or the environment:
//! `GITHUB_TOKEN` and `HUGINN_ANALYSIS_KEY`.
//!
//! ```toml
//! [github]
//! base_url = "https://api.github.com"
//!
//! [cache]
//! max_entries = 1000
//!
//! [retry]
//! max_attempts = 3
//! delay_ms = 2000
//! backoff = "fixed"
//!
//! [recommend]
//! default_count = 5
//! max_count = 10
//! workers = 10
//! deadline_secs = 60
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::engine::RecommendConfig;
use crate::gateway::HuginnBuilder;
use crate::providers::{Backoff, RetryConfig};
use crate::{CacheConfig, HuginnError, Result};

/// Service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: EndpointConfig,
    #[serde(default)]
    pub opendigger: EndpointConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub retry: RetrySection,
    #[serde(default)]
    pub recommend: RecommendSection,
}

/// A remote endpoint; the built-in URL when unset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndpointConfig {
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Chat-completions service used by `analyze`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Per-call timeout in seconds (default: 10).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Maximum cached entries (default: 1000).
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

fn default_max_entries() -> u64 {
    1_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrySection {
    /// Attempts per remote call, the first included (default: 3).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before a retry in milliseconds (default: 2000).
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default)]
    pub backoff: Backoff,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
            backoff: Backoff::default(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    2_000
}

/// Recommendation tuning. Unset fields keep the library defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendSection {
    #[serde(default)]
    pub default_count: Option<usize>,
    #[serde(default)]
    pub max_count: Option<usize>,
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default)]
    pub max_candidates: Option<usize>,
    #[serde(default)]
    pub active_user_pool: Option<usize>,
    #[serde(default)]
    pub trending_page_size: Option<usize>,
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

impl RecommendSection {
    fn to_config(&self) -> RecommendConfig {
        let mut config = RecommendConfig::new();
        if let Some(n) = self.default_count {
            config = config.default_count(n);
        }
        if let Some(n) = self.max_count {
            config = config.max_count(n);
        }
        if let Some(n) = self.workers {
            config = config.workers(n);
        }
        if let Some(n) = self.max_candidates {
            config = config.max_candidates(n);
        }
        if let Some(n) = self.active_user_pool {
            config = config.active_user_pool(n);
        }
        if let Some(n) = self.trending_page_size {
            config = config.trending_page_size(n);
        }
        if let Some(secs) = self.deadline_secs {
            config = config.deadline(Duration::from_secs(secs));
        }
        config
    }
}

/// Credentials.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub github: Option<ApiKeySecret>,
    #[serde(default)]
    pub analysis: Option<ApiKeySecret>,
}

/// A single API key secret.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeySecret {
    pub api_key: String,
}

/// Secret name → environment variable name mapping.
const SECRET_ENV_VARS: &[(&str, &str)] = &[
    ("github", "GITHUB_TOKEN"),
    ("analysis", "HUGINN_ANALYSIS_KEY"),
];

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// An explicit path must exist. Without one, the first existing standard
    /// location is used, or the defaults when there is none.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            HuginnError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            HuginnError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(HuginnError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".huginn").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = PathBuf::from("/etc/huginn/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Feed the configuration and credentials into a builder.
    pub fn apply(&self, builder: HuginnBuilder, secrets: &Secrets) -> HuginnBuilder {
        let mut builder = builder
            .timeout(Duration::from_secs(self.http.timeout_secs))
            .cache(CacheConfig::new().max_entries(self.cache.max_entries))
            .retry(
                RetryConfig::new()
                    .max_attempts(self.retry.max_attempts)
                    .initial_delay(Duration::from_millis(self.retry.delay_ms))
                    .backoff(self.retry.backoff),
            )
            .recommend(self.recommend.to_config());

        if let Some(url) = &self.github.base_url {
            builder = builder.github_url(url);
        }
        if let Some(url) = &self.opendigger.base_url {
            builder = builder.opendigger_url(url);
        }
        if let Some(url) = &self.analysis.base_url {
            builder = builder.analysis_url(url);
        }
        if let Some(model) = &self.analysis.model {
            builder = builder.analysis_model(model);
        }
        if let Some(token) = secrets.api_key("github") {
            builder = builder.github_token(token);
        }
        if let Some(key) = secrets.api_key("analysis") {
            builder = builder.analysis_key(key);
        }
        builder
    }
}

impl Secrets {
    /// Load secrets from `~/.huginn/secrets.toml`, then
    /// `/etc/huginn/secrets.toml`, with permission checks.
    ///
    /// Returns empty secrets if no file exists (keys may come from env vars).
    pub fn load() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".huginn").join("secrets.toml");
            if user_secrets.exists() {
                Self::check_permissions(&user_secrets)?;
                return Self::load_from_file(&user_secrets);
            }
        }

        let system_secrets = PathBuf::from("/etc/huginn/secrets.toml");
        if system_secrets.exists() {
            Self::check_permissions(&system_secrets)?;
            return Self::load_from_file(&system_secrets);
        }

        Ok(Secrets::default())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            HuginnError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            HuginnError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Reject files readable by group or others.
    #[cfg(unix)]
    pub fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            HuginnError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        if mode & 0o077 != 0 {
            return Err(HuginnError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    pub fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// Key for `name` ("github" or "analysis"), falling back to the
    /// corresponding environment variable. Empty values count as unset.
    pub fn api_key(&self, name: &str) -> Option<String> {
        let from_file = match name {
            "github" => self.github.as_ref(),
            "analysis" => self.analysis.as_ref(),
            _ => None,
        }
        .map(|s| s.api_key.clone());

        from_file
            .or_else(|| {
                SECRET_ENV_VARS
                    .iter()
                    .find(|(secret, _)| *secret == name)
                    .and_then(|(_, env_var)| std::env::var(env_var).ok())
            })
            .filter(|key| !key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.http.timeout_secs, 10);
        assert_eq!(config.cache.max_entries, 1_000);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay_ms, 2_000);
        assert_eq!(config.retry.backoff, Backoff::Fixed);
        assert!(config.github.base_url.is_none());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [github]
            base_url = "https://ghe.example.com/api/v3"

            [analysis]
            model = "gpt-4o-mini"

            [retry]
            max_attempts = 5
            backoff = "exponential"

            [recommend]
            max_count = 20
            deadline_secs = 15
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.github.base_url.as_deref(),
            Some("https://ghe.example.com/api/v3")
        );
        assert_eq!(config.analysis.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.backoff, Backoff::Exponential);

        let recommend = config.recommend.to_config();
        assert_eq!(recommend.max_count, 20);
        assert_eq!(recommend.deadline, Duration::from_secs(15));
        assert_eq!(recommend.default_count, 5);
    }

    #[test]
    fn secrets_from_file_win() {
        let secrets: Secrets = toml::from_str(
            r#"
            [github]
            api_key = "ghp_from_file"
        "#,
        )
        .unwrap();
        assert_eq!(secrets.api_key("github"), Some("ghp_from_file".to_string()));
        assert_eq!(secrets.api_key("unknown"), None);
    }

    #[test]
    fn blank_secret_is_unset() {
        let secrets = Secrets {
            analysis: Some(ApiKeySecret {
                api_key: "  ".into(),
            }),
            ..Default::default()
        };
        assert_eq!(secrets.api_key("analysis"), None);
    }
}
