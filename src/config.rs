use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::{Endpoint, NaumenClient};

/// Prefix for environment overrides (e.g. `HD_NAUMEN_BACKEND__ACCESS_KEY`)
pub const ENV_PREFIX: &str = "HD_NAUMEN";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Service desk base URL (e.g. "https://sd.example.com")
    #[serde(default)]
    pub base_url: String,
    /// Shared access key sent as the `accessKey` query parameter
    #[serde(default)]
    pub access_key: String,
    /// Whole-request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            access_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url)
            .field("access_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl BackendConfig {
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            bail!("backend.base_url is not configured (set {}_BACKEND__BASE_URL)", ENV_PREFIX);
        }
        if self.access_key.trim().is_empty() {
            bail!(
                "backend.access_key is not configured (set {}_BACKEND__ACCESS_KEY)",
                ENV_PREFIX
            );
        }
        Ok(())
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.base_url.trim(), self.access_key.trim())
    }

    /// Blocking HTTP client carrying the transport settings
    pub fn http_client(&self) -> Result<reqwest::blocking::Client> {
        reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .context("Failed to create HTTP client")
    }

    /// Validated service desk client for this backend
    pub fn client(&self) -> Result<NaumenClient> {
        self.validate()?;
        Ok(NaumenClient::new(self.http_client()?, self.endpoint()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write logs to this file instead of stderr
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Config {
    /// User config in ~/.config/hd-naumen/config.toml
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hd-naumen").join("config.toml"))
    }

    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        Self::load_sources(Self::user_config_path(), config_path, Self::environment())
    }

    /// Environment overrides: `HD_NAUMEN_BACKEND__ACCESS_KEY` -> `backend.access_key`
    ///
    /// Values stay strings so access keys like `0012345` reach the backend
    /// unchanged; numeric fields are converted during deserialization.
    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
    }

    fn load_sources(
        user_config: Option<PathBuf>,
        config_path: Option<&Path>,
        environment: config::Environment,
    ) -> Result<Self> {
        // Start with embedded defaults so the client works without config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        if let Some(user_config) = user_config {
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::from(path.to_path_buf()));
        }

        builder = builder.add_source(environment);

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Environment layer fed from a fixed map instead of the process
    fn env_from(vars: &[(&str, &str)]) -> config::Environment {
        let source: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::environment().source(Some(source))
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
        assert!(config.backend.validate().is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hd-naumen.toml");
        fs::write(
            &path,
            r#"
[backend]
base_url = "https://sd.example.com/"
access_key = "abc123"
timeout_secs = 5

[logging]
level = "debug"
"#,
        )
        .unwrap();

        let config = Config::load_sources(None, Some(path.as_path()), env_from(&[])).unwrap();
        assert_eq!(config.backend.base_url, "https://sd.example.com/");
        assert_eq!(config.backend.timeout_secs, 5);
        assert_eq!(config.logging.level, "debug");
        assert!(config.backend.validate().is_ok());
        assert_eq!(config.backend.endpoint().base_url(), "https://sd.example.com");
    }

    #[test]
    fn test_explicit_file_overrides_user_file() {
        let dir = TempDir::new().unwrap();
        let user = dir.path().join("user.toml");
        let explicit = dir.path().join("explicit.toml");
        fs::write(
            &user,
            "[backend]\nbase_url = \"https://user.example.com\"\naccess_key = \"user\"\n",
        )
        .unwrap();
        fs::write(&explicit, "[backend]\naccess_key = \"explicit\"\n").unwrap();

        let config = Config::load_sources(Some(user), Some(explicit.as_path()), env_from(&[])).unwrap();
        assert_eq!(config.backend.base_url, "https://user.example.com");
        assert_eq!(config.backend.access_key, "explicit");
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(Config::load_sources(None, Some(missing.as_path()), env_from(&[])).is_err());
    }

    #[test]
    fn test_env_overrides_use_single_underscore_after_prefix() {
        let env = env_from(&[
            ("HD_NAUMEN_BACKEND__BASE_URL", "https://env.example.com"),
            ("HD_NAUMEN_BACKEND__ACCESS_KEY", "env-key"),
            ("HD_NAUMEN_BACKEND__TIMEOUT_SECS", "12"),
            ("HD_NAUMEN_LOGGING__LEVEL", "trace"),
        ]);

        let config = Config::load_sources(None, None, env).unwrap();
        assert_eq!(config.backend.base_url, "https://env.example.com");
        assert_eq!(config.backend.access_key, "env-key");
        assert_eq!(config.backend.timeout_secs, 12);
        assert_eq!(config.logging.level, "trace");
        assert!(config.backend.validate().is_ok());
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hd-naumen.toml");
        fs::write(
            &path,
            "[backend]\nbase_url = \"https://file.example.com\"\naccess_key = \"file\"\n",
        )
        .unwrap();

        let env = env_from(&[("HD_NAUMEN_BACKEND__ACCESS_KEY", "from-env")]);
        let config = Config::load_sources(None, Some(path.as_path()), env).unwrap();
        assert_eq!(config.backend.base_url, "https://file.example.com");
        assert_eq!(config.backend.access_key, "from-env");
    }

    #[test]
    fn test_numeric_access_key_kept_verbatim() {
        let env = env_from(&[
            ("HD_NAUMEN_BACKEND__BASE_URL", "https://sd.example.com"),
            ("HD_NAUMEN_BACKEND__ACCESS_KEY", "0012345"),
        ]);
        let config = Config::load_sources(None, None, env).unwrap();
        assert_eq!(config.backend.access_key, "0012345");

        let env = env_from(&[("HD_NAUMEN_BACKEND__ACCESS_KEY", "1e5")]);
        let config = Config::load_sources(None, None, env).unwrap();
        assert_eq!(config.backend.access_key, "1e5");
    }

    #[test]
    fn test_double_underscore_after_prefix_is_ignored() {
        let env = env_from(&[("HD_NAUMEN__BACKEND__ACCESS_KEY", "wrong-form")]);
        let config = Config::load_sources(None, None, env).unwrap();
        assert_eq!(config.backend.access_key, "");
    }

    #[test]
    fn test_validate_requires_access_key() {
        let backend = BackendConfig {
            base_url: "https://sd.example.com".to_string(),
            access_key: "   ".to_string(),
            timeout_secs: 30,
        };
        let err = backend.validate().unwrap_err();
        assert!(err.to_string().contains("access_key"));
    }

    #[test]
    fn test_debug_redacts_access_key() {
        let backend = BackendConfig {
            base_url: "https://sd.example.com".to_string(),
            access_key: "super-secret".to_string(),
            timeout_secs: 30,
        };
        assert!(!format!("{:?}", backend).contains("super-secret"));
    }
}
