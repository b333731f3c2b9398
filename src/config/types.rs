use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dify: DifyConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Connection settings for the Dify platform.
///
/// The chat app and the workflow app are separate Dify applications, each
/// with its own API key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifyConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub chat_api_key: String,
    #[serde(default)]
    pub workflow_api_key: String,
    #[serde(default)]
    pub upload_url: Option<String>,
    #[serde(default = "default_chat_user")]
    pub chat_user: String,
    #[serde(default = "default_workflow_user")]
    pub workflow_user: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl DifyConfig {
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn chat_url(&self) -> String {
        self.endpoint("chat-messages")
    }

    pub fn workflow_url(&self) -> String {
        self.endpoint("workflows/run")
    }

    pub fn file_upload_url(&self) -> String {
        match &self.upload_url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => self.endpoint("files/upload"),
        }
    }
}

impl Default for DifyConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            chat_api_key: String::new(),
            workflow_api_key: String::new(),
            upload_url: None,
            chat_user: default_chat_user(),
            workflow_user: default_workflow_user(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_chat_user() -> String {
    "siu".to_string()
}

fn default_workflow_user() -> String {
    "user".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

// Dify's document upload limit
fn default_max_upload_bytes() -> usize {
    15 * 1024 * 1024
}
