//! Client configuration loaded via OrthoConfig.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::ApiClientConfig;

const DEFAULT_API_URL: &str = "https://api.findmyjob.com";

fn default_storage_path() -> PathBuf {
    PathBuf::from(".findmyjob").join("store.json")
}

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A URL setting could not be parsed.
    #[error("{field} is not a valid URL: {message}")]
    InvalidUrl {
        /// Setting name.
        field: &'static str,
        /// Parser message.
        message: String,
    },
    /// A setting required by the requested operation is absent.
    #[error("{field} is not configured")]
    Missing {
        /// Setting name.
        field: &'static str,
    },
}

/// Connection, retry, storage and media settings for the client.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FINDMYJOB")]
pub struct ClientSettings {
    /// Base URL of the REST API.
    pub api_url: Option<String>,
    /// Per-request timeout in milliseconds.
    #[ortho_config(default = 15_000)]
    pub request_timeout_ms: u64,
    /// Retries after the first attempt.
    #[ortho_config(default = 3)]
    pub max_retries: u32,
    /// Base delay between retries in milliseconds.
    #[ortho_config(default = 1_000)]
    pub retry_delay_ms: u64,
    /// Lifetime of cached GET responses in milliseconds.
    #[ortho_config(default = 300_000)]
    pub api_cache_ttl_ms: u64,
    /// Path of the local key-value document.
    pub storage_path: Option<PathBuf>,
    /// Image upload endpoint.
    pub media_upload_url: Option<String>,
    /// Unsigned upload preset sent with every image.
    pub media_upload_preset: Option<String>,
    /// Record analytics events.
    #[ortho_config(default = true)]
    pub analytics_enabled: bool,
}

impl ClientSettings {
    /// Parsed API base URL, falling back to the production host.
    pub fn api_url(&self) -> Result<Url, SettingsError> {
        parse_url("api_url", self.api_url.as_deref().unwrap_or(DEFAULT_API_URL))
    }

    /// Per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Storage path, falling back to `.findmyjob/store.json`.
    #[must_use]
    pub fn storage_path(&self) -> PathBuf {
        self.storage_path
            .clone()
            .unwrap_or_else(default_storage_path)
    }

    /// Retry and caching settings for the API client.
    #[must_use]
    pub fn api_client_config(&self) -> ApiClientConfig {
        ApiClientConfig {
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            cache_ttl: Duration::from_millis(self.api_cache_ttl_ms),
        }
    }

    /// Upload endpoint and preset; both must be set.
    pub fn media_upload(&self) -> Result<(Url, String), SettingsError> {
        let raw_url = self
            .media_upload_url
            .as_deref()
            .ok_or(SettingsError::Missing {
                field: "media_upload_url",
            })?;
        let preset = self
            .media_upload_preset
            .clone()
            .filter(|preset| !preset.trim().is_empty())
            .ok_or(SettingsError::Missing {
                field: "media_upload_preset",
            })?;
        Ok((parse_url("media_upload_url", raw_url)?, preset))
    }
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, SettingsError> {
    Url::parse(raw).map_err(|err| SettingsError::InvalidUrl {
        field,
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    //! Unit tests for client configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 9] = [
        "FINDMYJOB_API_URL",
        "FINDMYJOB_REQUEST_TIMEOUT_MS",
        "FINDMYJOB_MAX_RETRIES",
        "FINDMYJOB_RETRY_DELAY_MS",
        "FINDMYJOB_API_CACHE_TTL_MS",
        "FINDMYJOB_STORAGE_PATH",
        "FINDMYJOB_MEDIA_UPLOAD_URL",
        "FINDMYJOB_MEDIA_UPLOAD_PRESET",
        "FINDMYJOB_ANALYTICS_ENABLED",
    ];

    fn load_from_empty_args() -> ClientSettings {
        ClientSettings::load_from_iter([OsString::from("findmyjob")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.request_timeout_ms, 15_000);
        assert_eq!(settings.max_retries, 3);
        assert!(settings.analytics_enabled);
        assert_eq!(
            settings.api_url().expect("default url parses").as_str(),
            "https://api.findmyjob.com/"
        );
        assert_eq!(settings.request_timeout(), Duration::from_secs(15));
        assert_eq!(settings.storage_path(), default_storage_path());
        assert_eq!(settings.api_client_config(), ApiClientConfig::default());
        assert_eq!(
            settings.media_upload(),
            Err(SettingsError::Missing {
                field: "media_upload_url"
            })
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("FINDMYJOB_API_URL", Some("http://localhost:3000/api".to_owned())),
            ("FINDMYJOB_REQUEST_TIMEOUT_MS", Some("2500".to_owned())),
            ("FINDMYJOB_MAX_RETRIES", Some("1".to_owned())),
            ("FINDMYJOB_RETRY_DELAY_MS", Some("250".to_owned())),
            ("FINDMYJOB_API_CACHE_TTL_MS", Some("60000".to_owned())),
            ("FINDMYJOB_STORAGE_PATH", Some("/tmp/findmyjob.json".to_owned())),
            (
                "FINDMYJOB_MEDIA_UPLOAD_URL",
                Some("https://media.example.com/upload".to_owned()),
            ),
            ("FINDMYJOB_MEDIA_UPLOAD_PRESET", Some("avatars".to_owned())),
            ("FINDMYJOB_ANALYTICS_ENABLED", Some("false".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.api_url().expect("url parses").as_str(),
            "http://localhost:3000/api"
        );
        assert_eq!(settings.request_timeout(), Duration::from_millis(2_500));
        assert_eq!(settings.storage_path(), PathBuf::from("/tmp/findmyjob.json"));
        assert_eq!(
            settings.api_client_config(),
            ApiClientConfig {
                max_retries: 1,
                retry_delay: Duration::from_millis(250),
                cache_ttl: Duration::from_secs(60),
            }
        );
        let (url, preset) = settings.media_upload().expect("media settings present");
        assert_eq!(url.as_str(), "https://media.example.com/upload");
        assert_eq!(preset, "avatars");
        assert!(!settings.analytics_enabled);
    }

    #[rstest]
    fn malformed_api_url_is_reported() {
        let _guard = lock_env([("FINDMYJOB_API_URL", Some("not a url".to_owned()))]);

        let settings = load_from_empty_args();
        assert!(matches!(
            settings.api_url(),
            Err(SettingsError::InvalidUrl { field: "api_url", .. })
        ));
    }

    #[rstest]
    fn blank_upload_preset_counts_as_missing() {
        let _guard = lock_env([
            (
                "FINDMYJOB_MEDIA_UPLOAD_URL",
                Some("https://media.example.com/upload".to_owned()),
            ),
            ("FINDMYJOB_MEDIA_UPLOAD_PRESET", Some("  ".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.media_upload(),
            Err(SettingsError::Missing {
                field: "media_upload_preset"
            })
        );
    }
}
