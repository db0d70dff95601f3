//! Handle on the hosted backend project.
//!
//! One `SupabaseClient` is built at start-up and shared (behind an `Arc`)
//! by the data store and the session provider. It carries the project URL,
//! the public API key and the access token of the signed-in user, which the
//! session provider updates whenever the session changes.

use reqwest::{Method, RequestBuilder};
use std::sync::RwLock;
use std::time::Duration;

use crate::config::Config;

/// Errors that can occur while building the client.
#[derive(Debug)]
pub enum ClientError {
    /// URL or API key missing from configuration
    NotConfigured(Vec<&'static str>),
    /// The HTTP client could not be built
    Http(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::NotConfigured(missing) => {
                write!(f, "Backend not configured. Missing: {}", missing.join(", "))
            }
            ClientError::Http(e) => write!(f, "Failed to build HTTP client: {}", e),
        }
    }
}

impl std::error::Error for ClientError {}

pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    access_token: RwLock<Option<String>>,
}

impl SupabaseClient {
    /// Creates a client for the project at `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            access_token: RwLock::new(None),
        })
    }

    /// Creates a client from config.
    ///
    /// Returns an error if the URL or API key is missing.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        match (
            config.supabase_url.value.as_ref(),
            config.supabase_anon_key.value.as_ref(),
        ) {
            (Some(url), Some(key)) => Self::new(url.clone(), key.clone(), config.request_timeout()),
            _ => Err(ClientError::NotConfigured(config.missing_backend_settings())),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path below the project URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Replaces the access token used for subsequent requests.
    pub fn set_access_token(&self, token: Option<String>) {
        match self.access_token.write() {
            Ok(mut guard) => *guard = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }

    pub fn access_token(&self) -> Option<String> {
        match self.access_token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Bearer credential: the user's access token, or the API key when
    /// nobody is signed in.
    fn bearer(&self) -> String {
        self.access_token()
            .unwrap_or_else(|| self.api_key.clone())
    }

    /// Starts a request with the project's auth headers set.
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigSource, ConfigValue};
    use std::path::PathBuf;

    fn client() -> SupabaseClient {
        SupabaseClient::new("https://demo.supabase.co/", "anon", None).unwrap()
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let client = client();
        assert_eq!(client.base_url(), "https://demo.supabase.co");
        assert_eq!(
            client.endpoint("/rest/v1/shopping_lists"),
            "https://demo.supabase.co/rest/v1/shopping_lists"
        );
        assert_eq!(
            client.endpoint("auth/v1/signup"),
            "https://demo.supabase.co/auth/v1/signup"
        );
    }

    #[test]
    fn test_bearer_prefers_access_token() {
        let client = client();
        assert_eq!(client.bearer(), "anon");

        client.set_access_token(Some("user-jwt".to_string()));
        assert_eq!(client.bearer(), "user-jwt");

        client.set_access_token(None);
        assert_eq!(client.bearer(), "anon");
    }

    #[test]
    fn test_from_config_requires_url_and_key() {
        let config = Config {
            supabase_url: ConfigValue::new(
                Some("https://demo.supabase.co".to_string()),
                ConfigSource::File,
            ),
            supabase_anon_key: ConfigValue::new(None, ConfigSource::Default),
            data_dir: ConfigValue::new(PathBuf::from("/tmp"), ConfigSource::Default),
            request_timeout_secs: ConfigValue::new(None, ConfigSource::Default),
            config_file: None,
        };

        match SupabaseClient::from_config(&config) {
            Err(ClientError::NotConfigured(missing)) => {
                assert_eq!(missing, vec!["SHOPMINDER_SUPABASE_ANON_KEY"]);
            }
            _ => panic!("expected NotConfigured"),
        }
    }
}
