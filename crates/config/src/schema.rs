//! Config schema: OAuth client registration, API endpoint and token file.

use std::path::PathBuf;

use {
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
};

use crate::ConfigError;

pub const DEFAULT_AUTHORIZE_URL: &str = "https://api.nibeuplink.com/oauth/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://api.nibeuplink.com/oauth/token";
pub const DEFAULT_REDIRECT_URL: &str =
    "https://www.marshflattsfarm.org.uk/nibeuplink/oauth2callback/index.php";
pub const DEFAULT_SCOPE: &str = "READSYSTEM";
pub const DEFAULT_API_BASE_URL: &str = "https://api.nibeuplink.com";

/// Prefix of the placeholder text shipped in sample configs.
const PLACEHOLDER_PREFIX: &str = "Replace this";

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NibeConfig {
    pub oauth: OAuthSettings,
    pub api: ApiSettings,
    /// Token file location. Defaults to `~/.NIBE_Uplink_API_Token.json`.
    pub token_file: Option<PathBuf>,
}

/// Application registration issued by the Uplink developer portal.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OAuthSettings {
    /// The "Identifier" of the registered application (32 hex digits).
    pub client_id: String,
    /// The "Secret" of the registered application (44 characters).
    pub client_secret: Option<Secret<String>>,
    pub authorize_url: String,
    pub token_url: String,
    pub redirect_url: String,
    /// `READSYSTEM` and/or `WRITESYSTEM`.
    pub scopes: Vec<String>,
    /// Fixed anti-forgery state. A random one is generated when unset.
    pub state: Option<String>,
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: None,
            authorize_url: DEFAULT_AUTHORIZE_URL.into(),
            token_url: DEFAULT_TOKEN_URL.into(),
            redirect_url: DEFAULT_REDIRECT_URL.into(),
            scopes: vec![DEFAULT_SCOPE.into()],
            state: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    /// Per-request timeout. No timeout when unset.
    pub timeout_secs: Option<u64>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.into(),
            timeout_secs: None,
        }
    }
}

impl NibeConfig {
    /// Apply `NIBE_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply `NIBE_*` overrides using an explicit lookup.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("NIBE_CLIENT_ID") {
            self.oauth.client_id = v;
        }
        if let Some(v) = lookup("NIBE_CLIENT_SECRET") {
            self.oauth.client_secret = Some(Secret::new(v));
        }
        if let Some(v) = lookup("NIBE_REDIRECT_URL") {
            self.oauth.redirect_url = v;
        }
        if let Some(v) = lookup("NIBE_TOKEN_FILE") {
            self.token_file = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("NIBE_API_BASE_URL") {
            self.api.base_url = v;
        }
    }

    /// Check that the client registration has been filled in.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if is_unset(&self.oauth.client_id) {
            return Err(ConfigError::MissingCredential("client_id"));
        }
        match &self.oauth.client_secret {
            Some(secret) if !is_unset(secret.expose_secret()) => Ok(()),
            _ => Err(ConfigError::MissingCredential("client_secret")),
        }
    }
}

fn is_unset(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.starts_with(PLACEHOLDER_PREFIX)
}
