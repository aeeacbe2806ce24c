use std::path::PathBuf;

use nibe_config::{ConfigError, NibeConfig, OAuthSettings};

use crate::types::OAuthConfig;

/// File name of the token store inside the home directory.
pub const TOKEN_FILENAME: &str = ".NIBE_Uplink_API_Token.json";

/// Build the OAuth client config from the operator's settings.
///
/// Fails when the client id or secret has not been filled in.
pub fn load_oauth_config(config: &NibeConfig) -> Result<OAuthConfig, ConfigError> {
    config.validate()?;
    let OAuthSettings {
        client_id,
        client_secret,
        authorize_url,
        token_url,
        redirect_url,
        scopes,
        state,
    } = config.oauth.clone();
    let client_secret = client_secret.ok_or(ConfigError::MissingCredential("client_secret"))?;

    Ok(OAuthConfig {
        client_id,
        client_secret,
        auth_url: authorize_url,
        token_url,
        redirect_uri: redirect_url,
        scopes,
        state,
    })
}

/// Token file location: configured path, or `~/.NIBE_Uplink_API_Token.json`.
pub fn token_path(config: &NibeConfig) -> PathBuf {
    config.token_file.clone().unwrap_or_else(default_token_path)
}

pub fn default_token_path() -> PathBuf {
    nibe_config::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(TOKEN_FILENAME)
}

#[cfg(test)]
mod tests {
    use {super::*, secrecy::Secret};

    #[test]
    fn builds_config_from_settings() {
        let mut config = NibeConfig::default();
        config.oauth.client_id = "0123456789abcdef0123456789abcdef".into();
        config.oauth.client_secret = Some(Secret::new("secret".into()));
        config.oauth.state = Some("STATESTRING".into());

        let oauth = load_oauth_config(&config).unwrap();
        assert_eq!(oauth.client_id, "0123456789abcdef0123456789abcdef");
        assert_eq!(oauth.auth_url, "https://api.nibeuplink.com/oauth/authorize");
        assert_eq!(oauth.token_url, "https://api.nibeuplink.com/oauth/token");
        assert_eq!(oauth.scopes, vec!["READSYSTEM".to_string()]);
        assert_eq!(oauth.state.as_deref(), Some("STATESTRING"));
    }

    #[test]
    fn missing_secret_is_a_config_error() {
        let mut config = NibeConfig::default();
        config.oauth.client_id = "id".into();
        assert!(matches!(
            load_oauth_config(&config),
            Err(ConfigError::MissingCredential("client_secret"))
        ));
    }

    #[test]
    fn token_path_prefers_configured_file() {
        let mut config = NibeConfig::default();
        assert!(token_path(&config).ends_with(TOKEN_FILENAME));

        config.token_file = Some(PathBuf::from("/srv/nibe/token.json"));
        assert_eq!(token_path(&config), PathBuf::from("/srv/nibe/token.json"));
    }
}
