//! Chat transport configuration parsed from environment variables.

use crate::types::ChatError;

pub const DEFAULT_CHAT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_CHAT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CHAT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CHAT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for ChatTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_CHAT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CHAT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatClientConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeouts: ChatTimeouts,
    pub history_limit: usize,
}

impl Default for ChatClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CHAT_API_BASE_URL.to_string(),
            api_token: None,
            timeouts: ChatTimeouts::default(),
            history_limit: DEFAULT_CHAT_HISTORY_LIMIT,
        }
    }
}

impl ChatClientConfig {
    /// Build typed chat config from environment variables.
    ///
    /// Optional:
    /// - `CHAT_API_BASE_URL`: default `http://127.0.0.1:8000/api`
    /// - `CHAT_API_TOKEN`: bearer token sent with every request
    /// - `CHAT_REQUEST_TIMEOUT_SECS`: default 120
    /// - `CHAT_CONNECT_TIMEOUT_SECS`: default 10
    /// - `CHAT_HISTORY_LIMIT`: default 50
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::ConfigParse`] if the base URL is not http(s).
    pub fn from_env() -> Result<Self, ChatError> {
        let base_url = parse_base_url(std::env::var("CHAT_API_BASE_URL").ok().as_deref())?;
        let api_token = std::env::var("CHAT_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        let timeouts = ChatTimeouts {
            request_secs: env_parse("CHAT_REQUEST_TIMEOUT_SECS", DEFAULT_CHAT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("CHAT_CONNECT_TIMEOUT_SECS", DEFAULT_CHAT_CONNECT_TIMEOUT_SECS),
        };
        let history_limit = env_parse("CHAT_HISTORY_LIMIT", DEFAULT_CHAT_HISTORY_LIMIT);

        Ok(Self { base_url, api_token, timeouts, history_limit })
    }

    /// Replace the base URL, applying the same validation as [`Self::from_env`].
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::ConfigParse`] if the URL is not http(s).
    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ChatError> {
        self.base_url = parse_base_url(Some(raw))?;
        Ok(self)
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_base_url(raw: Option<&str>) -> Result<String, ChatError> {
    let url = raw.unwrap_or(DEFAULT_CHAT_API_BASE_URL).trim().trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ChatError::ConfigParse(format!("CHAT_API_BASE_URL must be http(s), got '{url}'")));
    }
    Ok(url.to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
