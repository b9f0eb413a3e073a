use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use serde::{Deserialize, Deserializer, Serialize};
use snafu::{ResultExt, Snafu};
use sportmate_api::{DEFAULT_REQUEST_TIMEOUT, Session, UserId};
use sportmate_chat::{DEFAULT_FOLLOW_THRESHOLD, DEFAULT_POLL_INTERVAL, RoomConfig};

pub const CONFIG_DIRECTORY_NAME: &str = "sportmate";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const ENV_PREFIX: &str = "SPORTMATE_";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(deserialize_with = "scalar_text")]
    pub base_url: String,
    /// Bearer token of the logged-in user.
    #[serde(deserialize_with = "optional_scalar_text")]
    pub auth_token: Option<String>,
    pub user_id: Option<UserId>,
    pub request_timeout_ms: u64,
    pub poll_interval_ms: u64,
    /// Pixels from the bottom within which the chat keeps following new messages.
    pub scroll_threshold: f32,
    #[serde(deserialize_with = "scalar_text")]
    pub log_level: String,
}

/// Environment values arrive typed, so `SPORTMATE_AUTH_TOKEN=123456` is a number
/// by the time it reaches a string field. Leading zeros do not survive; quote them.
#[derive(Deserialize)]
#[serde(untagged)]
enum EnvScalar {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Flag(bool),
}

impl From<EnvScalar> for String {
    fn from(value: EnvScalar) -> Self {
        match value {
            EnvScalar::Text(text) => text,
            EnvScalar::Unsigned(number) => number.to_string(),
            EnvScalar::Signed(number) => number.to_string(),
            EnvScalar::Float(number) => number.to_string(),
            EnvScalar::Flag(flag) => flag.to_string(),
        }
    }
}

fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    EnvScalar::deserialize(deserializer).map(String::from)
}

fn optional_scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<EnvScalar>::deserialize(deserializer).map(|value| value.map(String::from))
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_token: None,
            user_id: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            scroll_threshold: DEFAULT_FOLLOW_THRESHOLD,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(CONFIG_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".sportmate"))
    }

    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join(CONFIG_FILE_NAME)
    }

    /// Defaults, then the JSON file at `path` if present, then `SPORTMATE_*` variables.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
        if path.exists() {
            figment = figment.merge(Json::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract::<AppConfig>()
            .map(Self::normalized)
            .context(ExtractSnafu {
                stage: "extract-config",
                path: path.to_path_buf(),
            })
    }

    pub fn normalized(mut self) -> Self {
        let base_url = self.base_url.trim();
        self.base_url = if base_url.is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        self.auth_token = self
            .auth_token
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        let defaults = Self::default();
        if self.request_timeout_ms == 0 {
            self.request_timeout_ms = defaults.request_timeout_ms;
        }
        if self.poll_interval_ms == 0 {
            self.poll_interval_ms = defaults.poll_interval_ms;
        }
        if !self.scroll_threshold.is_finite() || self.scroll_threshold < 0.0 {
            self.scroll_threshold = defaults.scroll_threshold;
        }
        self.log_level = match self.log_level.trim() {
            "" => defaults.log_level,
            level => level.to_string(),
        };

        self
    }

    /// Replaces the base URL when one was given on the command line.
    pub fn with_base_url(mut self, base_url: Option<&str>) -> Self {
        if let Some(base_url) = base_url {
            self.base_url = base_url.to_string();
        }
        self.normalized()
    }

    pub fn session(&self) -> Session {
        Session::new(self.user_id, self.auth_token.clone())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn room_config(&self) -> RoomConfig {
        RoomConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            follow_threshold: self.scroll_threshold,
        }
    }

    /// Copy that is safe to print.
    pub fn masked(&self) -> Self {
        Self {
            auth_token: self.auth_token.as_ref().map(|_| "********".to_string()),
            ..self.clone()
        }
    }

    /// Writes the normalized config next to `path` and renames it into place.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).context(CreateDirSnafu {
                stage: "create-config-directory",
                path: parent.to_path_buf(),
            })?;
        }

        let content =
            serde_json::to_string_pretty(&self.clone().normalized()).context(SerializeConfigSnafu {
                stage: "serialize-config-json",
            })?;

        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, content).context(WriteFileSnafu {
            stage: "write-temporary-config-file",
            path: temp_path.clone(),
        })?;

        std::fs::rename(&temp_path, path).context(RenameTempFileSnafu {
            stage: "rename-temporary-config-file",
            from: temp_path,
            to: path.to_path_buf(),
        })?;

        tracing::info!(path = ?path, "saved config");
        Ok(())
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("failed to load config from {path:?} on `{stage}`: {source}"))]
    Extract {
        stage: &'static str,
        path: PathBuf,
        #[snafu(source(from(figment::Error, Box::new)))]
        source: Box<figment::Error>,
    },
    #[snafu(display("failed to create config directory at {path:?} on `{stage}`: {source}"))]
    CreateDir {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to serialize config on `{stage}`: {source}"))]
    SerializeConfig {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("failed to write config file at {path:?} on `{stage}`: {source}"))]
    WriteFile {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display(
        "failed to replace config file from {from:?} to {to:?} on `{stage}`: {source}"
    ))]
    RenameTempFile {
        stage: &'static str,
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_repairs_blank_and_zero_values() {
        let config = AppConfig {
            base_url: "  https://sportmate.example/api ".to_string(),
            auth_token: Some("   ".to_string()),
            request_timeout_ms: 0,
            poll_interval_ms: 0,
            scroll_threshold: f32::NAN,
            log_level: " ".to_string(),
            ..AppConfig::default()
        }
        .normalized();

        assert_eq!(config.base_url, "https://sportmate.example/api/");
        assert_eq!(config.auth_token, None);
        assert_eq!(config.request_timeout(), DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.room_config(), RoomConfig::default());
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn masked_hides_the_token() {
        let config = AppConfig {
            auth_token: Some("secret".to_string()),
            ..AppConfig::default()
        };

        assert_eq!(config.masked().auth_token.as_deref(), Some("********"));
        assert_eq!(AppConfig::default().masked().auth_token, None);
    }
}
