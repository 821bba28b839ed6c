use thiserror::Error;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_BASE_URL: &str = "http://localhost:1337";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4";
pub const DEFAULT_IMAGE_MODEL: &str = "flux";
pub const DEFAULT_PREFIX: &str = "!";
/// Attachment limit for non-boosted servers.
pub const DEFAULT_SIZE_CEILING: usize = 8 * 1024 * 1024;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("DISCORD_BOT_TOKEN environment variable not set")]
    MissingToken,
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub port: u16,
    pub external_url: Option<String>,
    pub aggregator_url: String,
    pub chat_model: String,
    pub default_image_model: String,
    pub size_ceiling: usize,
    pub prefix: String,
    pub tmdb_api_key: Option<String>,
    pub speech_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let discord_token = get("DISCORD_BOT_TOKEN").ok_or(ConfigError::MissingToken)?;

        let port = match get("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let size_ceiling = match get("IMAGE_SIZE_CEILING") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "IMAGE_SIZE_CEILING",
                        value: raw,
                    })
                }
            },
            None => DEFAULT_SIZE_CEILING,
        };

        Ok(Self {
            discord_token,
            port,
            external_url: get("RENDER_EXTERNAL_URL").map(|u| u.trim_end_matches('/').to_string()),
            aggregator_url: get("G4F_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            chat_model: get("CHAT_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            default_image_model: get("DEFAULT_IMAGE_MODEL")
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            size_ceiling,
            prefix: get("COMMAND_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            tmdb_api_key: get("TMDB_API_KEY"),
            speech_api_key: get("SPEECH_API_KEY"),
        })
    }
}
