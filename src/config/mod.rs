mod types;

pub use types::*;

use crate::{Error, Result};
use std::{env, io::ErrorKind};
use tracing::{debug, info};

pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
    load_from(&config_path).await
}

/// Reads `config_path` (optional), applies environment overrides and
/// validates the result.
pub async fn load_from(config_path: &str) -> Result<Config> {
    debug!("Loading configuration from: {}", config_path);

    let mut config = match tokio::fs::read_to_string(config_path).await {
        Ok(config_str) => serde_yaml::from_str(&config_str)?,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(
                "No config file at {}, using defaults and environment",
                config_path
            );
            Config::default()
        }
        Err(e) => return Err(e.into()),
    };

    apply_env_overrides(&mut config, |key| env::var(key).ok());
    validate(&config)?;

    Ok(config)
}

/// Overlays `DIFY_*` environment variables onto the file configuration.
///
/// `lookup` is injected so tests do not have to mutate the process
/// environment.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let dify = &mut config.dify;
    if let Some(url) = lookup("DIFY_URL") {
        dify.base_url = url;
    }
    if let Some(key) = lookup("DIFY_API_CHAT") {
        dify.chat_api_key = key;
    }
    if let Some(key) = lookup("DIFY_API_WORK") {
        dify.workflow_api_key = key;
    }
    if let Some(url) = lookup("DIFY_UPLOAD_URL") {
        dify.upload_url = Some(url);
    }
}

pub fn validate(config: &Config) -> Result<()> {
    let dify = &config.dify;
    if dify.base_url.trim().is_empty() {
        return Err(Error::config("dify.base_url (DIFY_URL) is required"));
    }
    if dify.chat_api_key.trim().is_empty() {
        return Err(Error::config("dify.chat_api_key (DIFY_API_CHAT) is required"));
    }
    if dify.workflow_api_key.trim().is_empty() {
        return Err(Error::config(
            "dify.workflow_api_key (DIFY_API_WORK) is required",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn complete_config() -> Config {
        let mut config = Config::default();
        config.dify.base_url = "https://api.dify.ai/v1".to_string();
        config.dify.chat_api_key = "app-chat".to_string();
        config.dify.workflow_api_key = "app-work".to_string();
        config
    }

    #[test]
    fn test_env_overrides_replace_file_values() {
        let mut config = complete_config();
        let env: HashMap<&str, &str> = [
            ("DIFY_URL", "http://localhost:5001/v1"),
            ("DIFY_API_WORK", "app-other"),
        ]
        .into_iter()
        .collect();

        apply_env_overrides(&mut config, |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.dify.base_url, "http://localhost:5001/v1");
        assert_eq!(config.dify.chat_api_key, "app-chat");
        assert_eq!(config.dify.workflow_api_key, "app-other");
        assert_eq!(config.dify.upload_url, None);
    }

    #[test]
    fn test_endpoints_are_derived_from_base_url() {
        let mut config = complete_config();
        config.dify.base_url = "https://api.dify.ai/v1/".to_string();

        assert_eq!(config.dify.chat_url(), "https://api.dify.ai/v1/chat-messages");
        assert_eq!(
            config.dify.workflow_url(),
            "https://api.dify.ai/v1/workflows/run"
        );
        assert_eq!(
            config.dify.file_upload_url(),
            "https://api.dify.ai/v1/files/upload"
        );

        config.dify.upload_url = Some("https://files.example.com/upload".to_string());
        assert_eq!(
            config.dify.file_upload_url(),
            "https://files.example.com/upload"
        );
    }

    #[test]
    fn test_validate_requires_tokens() {
        assert!(validate(&complete_config()).is_ok());

        let mut config = complete_config();
        config.dify.workflow_api_key = "  ".to_string();
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("DIFY_API_WORK"));
    }

    #[test]
    fn test_yaml_defaults() {
        let yaml = r#"
dify:
  base_url: "https://api.dify.ai/v1"
  chat_api_key: "app-chat"
  workflow_api_key: "app-work"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.dify.chat_user, "siu");
        assert_eq!(config.dify.workflow_user, "user");
        assert_eq!(config.dify.timeout_secs, 120);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.logs.level, "info");
        assert_eq!(config.server.max_upload_bytes, 15 * 1024 * 1024);
    }
}
