use std::env;
use std::path::PathBuf;

use eyre::{eyre, Result, WrapErr};
use url::Url;

use crate::gemini_client::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use crate::search_client::DEFAULT_TAVILY_BASE_URL;

/// Settings read from the environment (and `.env`) at start-up.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub tavily_api_key: Option<String>,
    pub tavily_base_url: String,
    /// `None` keeps history in memory only.
    pub history_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let gemini_api_key = get("GEMINI_API_KEY")
            .or_else(|| get("GEMINI_PRO_API_KEY"))
            .ok_or_else(|| eyre!("GEMINI_API_KEY environment variable not set"))?;

        let gemini_base_url = validated_url(
            "GEMINI_BASE_URL",
            get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
        )?;
        let tavily_base_url = validated_url(
            "TAVILY_BASE_URL",
            get("TAVILY_BASE_URL").unwrap_or_else(|| DEFAULT_TAVILY_BASE_URL.to_string()),
        )?;

        let history_path = match get("CHAT_HISTORY_PATH") {
            Some(value) if value.eq_ignore_ascii_case("none") => None,
            Some(value) => Some(PathBuf::from(value)),
            None => default_history_path(),
        };

        Ok(Self {
            gemini_api_key,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url,
            tavily_api_key: get("TAVILY_API_KEY"),
            tavily_base_url,
            history_path,
        })
    }
}

fn validated_url(key: &str, value: String) -> Result<String> {
    Url::parse(&value).wrap_err_with(|| format!("{} is not a valid URL: {}", key, value))?;
    Ok(value)
}

fn default_history_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("gemini-chat").join("history.jsonl"))
}
