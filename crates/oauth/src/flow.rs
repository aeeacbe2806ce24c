//! Authorization-Code grant (RFC 6749 §4.1) and the refresh grant.

use {
    reqwest::{Client, header::ACCEPT},
    secrecy::{ExposeSecret, Secret},
    tracing::{debug, info},
    url::Url,
};

use crate::{
    error::OAuthError,
    state::generate_state,
    storage::TokenPersister,
    types::{OAuthConfig, OAuthTokens, now_secs},
};

/// Codes issued by the Uplink authorization server are well over this length;
/// anything shorter is a copy-paste mistake.
pub const MIN_AUTHORIZATION_CODE_LEN: usize = 99;

const EXPECTED_TOKEN_TYPE: &str = "bearer";

#[derive(Debug, Clone)]
pub struct OAuthFlow {
    config: OAuthConfig,
    client: Client,
}

impl OAuthFlow {
    pub fn new(config: OAuthConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Use a preconfigured HTTP client (e.g. with a timeout).
    pub fn with_client(config: OAuthConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// The configured state, or a fresh random one.
    pub fn state(&self) -> String {
        self.config.state.clone().unwrap_or_else(generate_state)
    }

    /// URL the operator opens in a browser to grant access.
    pub fn authorization_url(&self, state: &str) -> Result<Url, OAuthError> {
        let mut url = Url::parse(&self.config.auth_url)?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", self.config.client_id.as_str())
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("redirect_uri", self.config.redirect_uri.as_str())
            .append_pair("state", state);
        Ok(url)
    }

    /// Exchange an authorization code for a bearer token.
    ///
    /// The code is checked before any request is made, and the returned
    /// token must be of type `bearer`.
    pub async fn exchange(&self, code: &str) -> Result<OAuthTokens, OAuthError> {
        let code = validate_authorization_code(code)?;

        let tokens = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.expose_secret().as_str()),
            ])
            .await?;

        if tokens.token_type != EXPECTED_TOKEN_TYPE {
            return Err(OAuthError::UnexpectedTokenType(tokens.token_type));
        }
        Ok(tokens)
    }

    /// Exchange the code and hand the token to `persister`.
    pub async fn acquire(
        &self,
        code: &str,
        persister: &impl TokenPersister,
    ) -> Result<OAuthTokens, OAuthError> {
        let tokens = self.exchange(code).await?;
        persister.persist(&tokens)?;
        info!(expires_at = ?tokens.expires_at, "acquired oauth token");
        Ok(tokens)
    }

    /// Mint a new access token from a refresh token.
    ///
    /// When the server does not rotate refresh tokens the previous one is
    /// carried over.
    pub async fn refresh(&self, refresh_token: &Secret<String>) -> Result<OAuthTokens, OAuthError> {
        let mut tokens = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.expose_secret().as_str()),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.expose_secret().as_str()),
            ])
            .await?;

        if tokens.refresh_token.is_none() {
            tokens.refresh_token = Some(refresh_token.clone());
        }
        Ok(tokens)
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<OAuthTokens, OAuthError> {
        debug!(token_url = %self.config.token_url, "requesting token");
        let response = self
            .client
            .post(&self.config.token_url)
            .header(ACCEPT, "application/json")
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(OAuthError::TokenEndpoint {
                status: status.as_u16(),
                body,
            });
        }

        let mut tokens: OAuthTokens =
            serde_json::from_str(&body).map_err(OAuthError::InvalidTokenResponse)?;
        tokens.stamp_expiry(now_secs());
        Ok(tokens)
    }
}

/// Trim the pasted code and reject implausibly short input.
pub fn validate_authorization_code(code: &str) -> Result<&str, OAuthError> {
    let code = code.trim();
    let len = code.chars().count();
    if len < MIN_AUTHORIZATION_CODE_LEN {
        return Err(OAuthError::InvalidAuthorizationCode {
            len,
            min: MIN_AUTHORIZATION_CODE_LEN,
        });
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use {
        super::*,
        crate::{error::StoreError, storage::TokenStore},
        mockito::{Matcher, Server},
        serde_json::Value,
    };

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Value>>);

    impl TokenPersister for Recorder {
        fn persist(&self, tokens: &OAuthTokens) -> Result<(), StoreError> {
            let value = serde_json::to_value(tokens).map_err(StoreError::Serialize)?;
            self.0.lock().unwrap().push(value);
            Ok(())
        }
    }

    fn config(server_url: &str) -> OAuthConfig {
        OAuthConfig {
            client_id: "client-id".into(),
            client_secret: Secret::new("client-secret".into()),
            auth_url: format!("{server_url}/oauth/authorize"),
            token_url: format!("{server_url}/oauth/token"),
            redirect_uri: "https://example.com/callback".into(),
            scopes: vec!["READSYSTEM".into()],
            state: Some("STATESTRING".into()),
        }
    }

    fn code(len: usize) -> String {
        "c".repeat(len)
    }

    #[test]
    fn authorization_url_embeds_grant_parameters() {
        let mut cfg = config("https://api.nibeuplink.com");
        cfg.scopes = vec!["READSYSTEM".into(), "WRITESYSTEM".into()];
        let flow = OAuthFlow::new(cfg);
        let url = flow.authorization_url("STATESTRING").unwrap();

        assert_eq!(url.path(), "/oauth/authorize");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![
            ("response_type".into(), "code".into()),
            ("client_id".into(), "client-id".into()),
            ("scope".into(), "READSYSTEM WRITESYSTEM".into()),
            ("redirect_uri".into(), "https://example.com/callback".into()),
            ("state".into(), "STATESTRING".into()),
        ]);
    }

    #[test]
    fn configured_state_wins_over_random() {
        let flow = OAuthFlow::new(config("https://api.nibeuplink.com"));
        assert_eq!(flow.state(), "STATESTRING");

        let mut cfg = config("https://api.nibeuplink.com");
        cfg.state = None;
        let flow = OAuthFlow::new(cfg);
        assert_ne!(flow.state(), flow.state());
    }

    #[test]
    fn code_length_boundary() {
        assert!(validate_authorization_code(&code(98)).is_err());
        assert_eq!(validate_authorization_code(&code(99)).unwrap().len(), 99);
        let padded = format!("  {}\n", code(120));
        assert_eq!(validate_authorization_code(&padded).unwrap(), code(120));
    }

    #[tokio::test]
    async fn short_code_never_reaches_token_endpoint() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/token")
            .expect(0)
            .create_async()
            .await;

        let flow = OAuthFlow::new(config(&server.url()));
        let recorder = Recorder::default();
        let err = flow.acquire(&code(98), &recorder).await.unwrap_err();

        assert!(matches!(err, OAuthError::InvalidAuthorizationCode {
            len: 98,
            min: 99
        }));
        assert!(recorder.0.lock().unwrap().is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn acquire_persists_exchanged_token() {
        let mut server = Server::new_async().await;
        let the_code = code(120);
        let mock = server
            .mock("POST", "/oauth/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded("code".into(), the_code.clone()),
                Matcher::UrlEncoded("client_id".into(), "client-id".into()),
                Matcher::UrlEncoded("client_secret".into(), "client-secret".into()),
                Matcher::UrlEncoded("redirect_uri".into(), "https://example.com/callback".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"access_token":"A","refresh_token":"R","token_type":"bearer","expires_in":3600}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let flow = OAuthFlow::new(config(&server.url()));
        let recorder = Recorder::default();
        let before = now_secs();
        flow.acquire(&the_code, &recorder).await.unwrap();
        mock.assert_async().await;

        let saved = recorder.0.lock().unwrap();
        assert_eq!(saved.len(), 1);
        let token = &saved[0];
        assert_eq!(token["access_token"], "A");
        assert_eq!(token["refresh_token"], "R");
        assert_eq!(token["token_type"], "bearer");
        assert_eq!(token["expires_in"], 3600);
        let expires_at = token["expires_at"].as_f64().unwrap();
        assert!(expires_at >= before + 3600.0);
        assert!(expires_at <= now_secs() + 3600.0);
    }

    #[tokio::test]
    async fn acquire_writes_token_file() {
        let mut server = Server::new_async().await;
        let issued = serde_json::json!({
            "access_token": "A",
            "refresh_token": "R",
            "token_type": "bearer",
            "expires_in": 3600,
            "scope": "READSYSTEM"
        });
        let _mock = server
            .mock("POST", "/oauth/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(issued.to_string())
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        let flow = OAuthFlow::new(config(&server.url()));
        let before = now_secs();
        flow.acquire(&code(120), &store).await.unwrap();
        let after = now_secs();

        let mut on_disk: Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        let expires_at = on_disk
            .as_object_mut()
            .and_then(|map| map.remove("expires_at"))
            .and_then(|v| v.as_f64())
            .unwrap();
        assert!(expires_at >= before + 3600.0);
        assert!(expires_at <= after + 3600.0);
        assert_eq!(on_disk, issued);
    }

    #[tokio::test]
    async fn non_bearer_token_is_not_persisted() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth/token")
            .with_status(200)
            .with_body(r#"{"access_token":"A","refresh_token":"R","token_type":"mac"}"#)
            .create_async()
            .await;

        let flow = OAuthFlow::new(config(&server.url()));
        let recorder = Recorder::default();
        let err = flow.acquire(&code(120), &recorder).await.unwrap_err();

        assert!(matches!(err, OAuthError::UnexpectedTokenType(ref t) if t == "mac"));
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn token_endpoint_error_is_reported_with_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant"}"#)
            .create_async()
            .await;

        let flow = OAuthFlow::new(config(&server.url()));
        let err = flow.exchange(&code(120)).await.unwrap_err();
        match err {
            OAuthError::TokenEndpoint { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("invalid_grant"));
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn garbage_token_response_is_rejected() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth/token")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let flow = OAuthFlow::new(config(&server.url()));
        assert!(matches!(
            flow.exchange(&code(120)).await,
            Err(OAuthError::InvalidTokenResponse(_))
        ));
    }

    #[tokio::test]
    async fn refresh_keeps_refresh_token_when_not_rotated() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                Matcher::UrlEncoded("refresh_token".into(), "R".into()),
                Matcher::UrlEncoded("client_id".into(), "client-id".into()),
                Matcher::UrlEncoded("client_secret".into(), "client-secret".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"access_token":"A2","token_type":"bearer","expires_in":1800}"#)
            .expect(1)
            .create_async()
            .await;

        let flow = OAuthFlow::new(config(&server.url()));
        let tokens = flow.refresh(&Secret::new("R".into())).await.unwrap();
        mock.assert_async().await;

        assert_eq!(tokens.access_token.expose_secret(), "A2");
        assert_eq!(
            tokens.refresh_token.as_ref().map(|t| t.expose_secret().as_str()),
            Some("R")
        );
        assert!(tokens.expires_at.is_some());
    }
}
