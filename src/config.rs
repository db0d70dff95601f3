use serde::{Deserialize, Serialize, Serializer};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_SUPABASE_URL: &str = "SHOPMINDER_SUPABASE_URL";
pub const ENV_SUPABASE_ANON_KEY: &str = "SHOPMINDER_SUPABASE_ANON_KEY";
pub const ENV_DATA_DIR: &str = "SHOPMINDER_DATA_DIR";
pub const ENV_REQUEST_TIMEOUT: &str = "SHOPMINDER_REQUEST_TIMEOUT";

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Project URL of the hosted backend (e.g. "https://xyz.supabase.co")
    pub supabase_url: ConfigValue<Option<String>>,
    /// Public (anon) API key of the project
    #[serde(serialize_with = "serialize_masked_key")]
    pub supabase_anon_key: ConfigValue<Option<String>>,
    /// Directory holding the persisted session
    pub data_dir: ConfigValue<PathBuf>,
    /// Per-request timeout; requests wait indefinitely when unset
    pub request_timeout_secs: ConfigValue<Option<u64>>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    supabase_url: Option<String>,
    supabase_anon_key: Option<String>,
    data_dir: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`], reading environment values through `env`.
    pub fn load_with_env<F>(config_path: Option<PathBuf>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut supabase_url = ConfigValue::new(None, ConfigSource::Default);
        let mut supabase_anon_key = ConfigValue::new(None, ConfigSource::Default);
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut request_timeout_secs = ConfigValue::new(None, ConfigSource::Default);
        let mut config_file = None;

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(url) = non_empty(file_config.supabase_url) {
                supabase_url = ConfigValue::new(Some(url), ConfigSource::File);
            }
            if let Some(key) = non_empty(file_config.supabase_anon_key) {
                supabase_anon_key = ConfigValue::new(Some(key), ConfigSource::File);
            }
            if let Some(dir) = file_config.data_dir {
                // Resolve relative paths against config file's directory
                let resolved = if dir.is_relative() {
                    path.parent().map(|p| p.join(&dir)).unwrap_or(dir)
                } else {
                    dir
                };
                data_dir = ConfigValue::new(resolved, ConfigSource::File);
            }
            if let Some(secs) = file_config.request_timeout_secs {
                request_timeout_secs = ConfigValue::new(Some(secs), ConfigSource::File);
            }
        }

        // Apply environment variable overrides
        if let Some(url) = non_empty(env(ENV_SUPABASE_URL)) {
            supabase_url = ConfigValue::new(Some(url), ConfigSource::Environment);
        }
        if let Some(key) = non_empty(env(ENV_SUPABASE_ANON_KEY)) {
            supabase_anon_key = ConfigValue::new(Some(key), ConfigSource::Environment);
        }
        if let Some(dir) = non_empty(env(ENV_DATA_DIR)) {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Some(raw) = non_empty(env(ENV_REQUEST_TIMEOUT)) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue(ENV_REQUEST_TIMEOUT, raw.clone()))?;
            request_timeout_secs = ConfigValue::new(Some(secs), ConfigSource::Environment);
        }

        Ok(Self {
            supabase_url,
            supabase_anon_key,
            data_dir,
            request_timeout_secs,
            config_file,
        })
    }

    /// Names of the required backend settings that are missing.
    pub fn missing_backend_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.supabase_url.value.is_none() {
            missing.push(ENV_SUPABASE_URL);
        }
        if self.supabase_anon_key.value.is_none() {
            missing.push(ENV_SUPABASE_ANON_KEY);
        }
        missing
    }

    /// Returns true if both the backend URL and API key are set.
    pub fn is_backend_configured(&self) -> bool {
        self.missing_backend_settings().is_empty()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.value.map(Duration::from_secs)
    }

    /// Path of the persisted session file.
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.value.join("session.json")
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/shopminder/
    /// - macOS: ~/Library/Application Support/shopminder/
    /// - Windows: %APPDATA%/shopminder/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shopminder")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/shopminder/
    /// - macOS: ~/Library/Application Support/shopminder/
    /// - Windows: %APPDATA%/shopminder/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shopminder")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Shows only the first characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let prefix: String = secret.chars().take(6).collect();
    format!("{}…", prefix)
}

fn serialize_masked_key<S>(key: &ConfigValue<Option<String>>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let masked = ConfigValue::new(key.value.as_deref().map(mask_secret), key.source.clone());
    masked.serialize(s)
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(name, value) => {
                write!(f, "Invalid value for {}: '{}'", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::tempdir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load_with_env(Some(config_path), no_env).unwrap();
        assert!(config.supabase_url.value.is_none());
        assert_eq!(config.supabase_url.source, ConfigSource::Default);
        assert!(config.data_dir.value.ends_with("shopminder"));
        assert!(config.request_timeout().is_none());
        assert!(config.config_file.is_none());
        assert!(!config.is_backend_configured());
        assert_eq!(
            config.missing_backend_settings(),
            vec![ENV_SUPABASE_URL, ENV_SUPABASE_ANON_KEY]
        );
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "supabase_url: https://demo.supabase.co").unwrap();
        writeln!(file, "supabase_anon_key: anon-key-123").unwrap();
        writeln!(file, "data_dir: /custom/data").unwrap();
        writeln!(file, "request_timeout_secs: 15").unwrap();

        let config = Config::load_with_env(Some(config_path.clone()), no_env).unwrap();
        assert_eq!(
            config.supabase_url.value.as_deref(),
            Some("https://demo.supabase.co")
        );
        assert_eq!(config.supabase_url.source, ConfigSource::File);
        assert_eq!(config.data_dir.value, PathBuf::from("/custom/data"));
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.config_file, Some(config_path));
        assert!(config.is_backend_configured());
        assert_eq!(config.session_path(), PathBuf::from("/custom/data/session.json"));
    }

    #[test]
    fn test_relative_data_dir_resolves_against_config_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "data_dir: state\n").unwrap();

        let config = Config::load_with_env(Some(config_path), no_env).unwrap();
        assert_eq!(config.data_dir.value, temp_dir.path().join("state"));
    }

    #[test]
    fn test_env_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "supabase_url: https://file.supabase.co\n").unwrap();

        let env: HashMap<&str, &str> = [
            (ENV_SUPABASE_URL, "https://env.supabase.co"),
            (ENV_SUPABASE_ANON_KEY, "env-key"),
            (ENV_REQUEST_TIMEOUT, "30"),
        ]
        .into_iter()
        .collect();

        let config = Config::load_with_env(Some(config_path), |k| {
            env.get(k).map(|v| v.to_string())
        })
        .unwrap();
        assert_eq!(
            config.supabase_url.value.as_deref(),
            Some("https://env.supabase.co")
        );
        assert_eq!(config.supabase_url.source, ConfigSource::Environment);
        assert_eq!(config.supabase_anon_key.source, ConfigSource::Environment);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "supabase_url: \"\"\nsupabase_anon_key: key\n").unwrap();

        let config = Config::load_with_env(Some(config_path), |k| {
            (k == ENV_SUPABASE_ANON_KEY).then(|| "  ".to_string())
        })
        .unwrap();
        assert_eq!(config.missing_backend_settings(), vec![ENV_SUPABASE_URL]);
        assert_eq!(config.supabase_anon_key.source, ConfigSource::File);
    }

    #[test]
    fn test_invalid_timeout_env() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let result = Config::load_with_env(Some(config_path), |k| {
            (k == ENV_REQUEST_TIMEOUT).then(|| "soon".to_string())
        });
        let err = result.unwrap_err();
        assert!(err.to_string().contains(ENV_REQUEST_TIMEOUT));
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load_with_env(Some(config_path), no_env);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_json_output_masks_key() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "supabase_anon_key: abcdefghijklmnop\n").unwrap();

        let config = Config::load_with_env(Some(config_path), no_env).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("abcdef…"));
        assert!(!json.contains("abcdefghijklmnop"));
    }
}
