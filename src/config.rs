use crate::constants::*;
use crate::errors::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub const BASE_URL_ENV: &str = "WEBCHAT_BASE_URL";

/// What a login/registration form shows when the server answers non-2xx.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionPolicy {
    /// The server's reason is logged and the generic catch-all alert is shown.
    #[default]
    Swallow,
    /// The server's reason is shown as the alert.
    Surface,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatFailurePolicy {
    /// Failures are only returned to the caller.
    #[default]
    Propagate,
    /// Failures are returned and also shown as an alert.
    Alert,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// A second trigger while a request is outstanding fails with `Busy`.
    #[default]
    Reject,
    /// Every trigger sends its own request.
    Allow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub chat: String,
    pub login: String,
    pub register: String,
    pub logout: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            chat: CHAT_ENDPOINT.to_string(),
            login: LOGIN_ENDPOINT.to_string(),
            register: REGISTER_ENDPOINT.to_string(),
            logout: LOGOUT_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub endpoints: Endpoints,
    pub landing_route: String,
    pub request_timeout_secs: Option<u64>,
    pub rejection_policy: RejectionPolicy,
    pub chat_failure_policy: ChatFailurePolicy,
    pub overlap_policy: OverlapPolicy,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoints: Endpoints::default(),
            landing_route: LANDING_ROUTE.to_string(),
            request_timeout_secs: None,
            rejection_policy: RejectionPolicy::default(),
            chat_failure_policy: ChatFailurePolicy::default(),
            overlap_policy: OverlapPolicy::default(),
            log_level: "info".to_string(),
        }
    }
}

/// Loads the config file at `path` (or the default location), writing the
/// defaults there first if it does not exist. `WEBCHAT_BASE_URL` from the
/// environment or a `.env` file overrides `base_url`.
pub fn load_config(path: Option<&Path>) -> ClientResult<Config> {
    dotenv::dotenv().ok();

    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => get_config_path()?,
    };

    let mut config = if config_path.exists() {
        let config_str = fs::read_to_string(&config_path).map_err(|e| {
            ClientError::config_error(format!("Failed to read config file: {}", e))
        })?;

        serde_json::from_str(&config_str)
            .map_err(|e| ClientError::config_error(format!("Failed to parse config: {}", e)))?
    } else {
        let config = Config::default();
        save_config(&config_path, &config)?;
        config
    };

    if let Ok(url) = env::var(BASE_URL_ENV) {
        config.base_url = url;
    }

    validate_config(&config)?;
    Ok(config)
}

pub fn save_config(path: &Path, config: &Config) -> ClientResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ClientError::config_error(format!("Failed to create config directory: {}", e))
        })?;
    }

    let config_str = serde_json::to_string_pretty(config)
        .map_err(|e| ClientError::config_error(format!("Failed to serialize config: {}", e)))?;

    fs::write(path, config_str)
        .map_err(|e| ClientError::config_error(format!("Failed to write config file: {}", e)))?;

    Ok(())
}

pub fn get_config_path() -> ClientResult<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| ClientError::config_error("Could not determine home directory"))?;

    Ok(home_dir
        .join(".config")
        .join("webchat-client")
        .join("config.json"))
}

pub fn validate_config(config: &Config) -> ClientResult<()> {
    if !(config.base_url.starts_with("http://") || config.base_url.starts_with("https://")) {
        return Err(ClientError::config_error(format!(
            "base_url must be an http(s) URL, got '{}'",
            config.base_url
        )));
    }

    let routes = [
        ("chat", &config.endpoints.chat),
        ("login", &config.endpoints.login),
        ("register", &config.endpoints.register),
        ("logout", &config.endpoints.logout),
        ("landing_route", &config.landing_route),
    ];
    for (name, route) in routes {
        if !route.starts_with('/') {
            return Err(ClientError::config_error(format!(
                "{} must start with '/', got '{}'",
                name, route
            )));
        }
    }

    if config.request_timeout_secs == Some(0) {
        return Err(ClientError::config_error(
            "request_timeout_secs must be greater than 0",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_validate_config_valid() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_config_invalid_base_url() {
        let mut config = Config::default();
        config.base_url = "localhost:5000".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_invalid_route() {
        let mut config = Config::default();
        config.endpoints.login = "login".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_zero_timeout() {
        let mut config = Config::default();
        config.request_timeout_secs = Some(0);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = load_config(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(config.endpoints, Endpoints::default());
        assert_eq!(config.landing_route, "/index");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "rejection_policy": "surface" }"#).unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.rejection_policy, RejectionPolicy::Surface);
        assert_eq!(config.overlap_policy, OverlapPolicy::Reject);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = Config::default();
        config.chat_failure_policy = ChatFailurePolicy::Alert;
        config.request_timeout_secs = Some(30);
        save_config(&path, &config).unwrap();

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded.chat_failure_policy, ChatFailurePolicy::Alert);
        assert_eq!(loaded.request_timeout_secs, Some(30));
    }

    #[test]
    fn test_garbage_file_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ nope").unwrap();
        assert!(matches!(load_config(Some(&path)), Err(ClientError::Config(_))));
    }
}
