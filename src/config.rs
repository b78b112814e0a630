use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global reddish configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub oauth: OAuthConfig,
    #[serde(default)]
    pub repl: ReplConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// OAuth application client id (basic-auth user with empty secret)
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// Redirect target registered with the OAuth application
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// Authorization endpoint the user agent is sent to
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    /// Token exchange endpoint
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// Base URL for authenticated API calls (identity, listing, vote)
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplConfig {
    /// Persist readline history across sessions
    #[serde(default = "default_true")]
    pub save_history: bool,
}

fn default_client_id() -> String {
    // Overridable via REDDISH_CLIENT_ID for people running their own app.
    std::env::var("REDDISH_CLIENT_ID").unwrap_or_else(|_| "HzCZkMPPYm-nYPYHlfyQPw".to_string())
}

fn default_redirect_uri() -> String {
    "http://localhost:3000".to_string()
}

fn default_auth_url() -> String {
    "https://www.reddit.com/api/v1/authorize".to_string()
}

fn default_token_url() -> String {
    "https://www.reddit.com/api/v1/access_token".to_string()
}

fn default_api_base() -> String {
    "https://oauth.reddit.com".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            redirect_uri: default_redirect_uri(),
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            api_base: default_api_base(),
        }
    }
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            save_history: true,
        }
    }
}

/// Returns the reddish config directory (~/.config/reddish/)
pub fn config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("reddish");
    Ok(config_dir)
}

/// Returns the config file path (~/.config/reddish/config.toml)
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Ensures the config directory exists
pub fn ensure_config_dir() -> Result<()> {
    let config = config_dir()?;
    std::fs::create_dir_all(&config)
        .with_context(|| format!("Failed to create config directory: {:?}", config))?;
    Ok(())
}

/// Loads the config, falling back to defaults if the file doesn't exist
pub fn load_config() -> Result<Config> {
    let config_path = config_file()?;

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file")?;
        Ok(config)
    } else {
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.oauth.redirect_uri, "http://localhost:3000");
        assert_eq!(config.oauth.api_base, "https://oauth.reddit.com");
        assert!(config.repl.save_history);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.oauth.token_url, config.oauth.token_url);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str("[oauth]\nclient_id = \"my-app\"\n").unwrap();
        assert_eq!(config.oauth.client_id, "my-app");
        assert_eq!(config.oauth.auth_url, "https://www.reddit.com/api/v1/authorize");
    }
}
