//! HTTP client that keeps its bearer token fresh.

use {
    reqwest::{Client, header::ACCEPT},
    secrecy::ExposeSecret,
    serde::de::DeserializeOwned,
    tracing::{debug, info, warn},
};

use crate::{
    error::OAuthError,
    flow::OAuthFlow,
    storage::TokenPersister,
    types::{OAuthTokens, now_secs},
};

/// Refresh this many seconds before the server-side expiry.
pub const EXPIRY_LEEWAY_SECS: f64 = 30.0;

/// Status and body of an API response, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, OAuthError> {
        serde_json::from_str(&self.body).map_err(OAuthError::Decode)
    }

    /// Turn a non-2xx response into [`OAuthError::Api`].
    pub fn error_for_status(self) -> Result<Self, OAuthError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(OAuthError::Api {
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// Issues authenticated GET requests, refreshing an expired access token
/// first and handing the new token to `persister` before it is used.
pub struct AuthorizedClient<P> {
    flow: OAuthFlow,
    http: Client,
    tokens: OAuthTokens,
    persister: P,
}

impl<P: TokenPersister> AuthorizedClient<P> {
    pub fn new(flow: OAuthFlow, tokens: OAuthTokens, persister: P) -> Self {
        Self {
            flow,
            http: Client::new(),
            tokens,
            persister,
        }
    }

    /// Use a preconfigured HTTP client for API calls (e.g. with a timeout).
    #[must_use]
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn tokens(&self) -> &OAuthTokens {
        &self.tokens
    }

    pub fn persister(&self) -> &P {
        &self.persister
    }

    /// Authenticated GET. Non-2xx statuses are returned, not raised.
    pub async fn get(&mut self, url: &str, query: &[(&str, &str)]) -> Result<ApiResponse, OAuthError> {
        self.ensure_fresh().await?;

        debug!(url, "GET");
        let response = self
            .http
            .get(url)
            .bearer_auth(self.tokens.access_token.expose_secret())
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        let response = ApiResponse { status, body };
        if !response.is_success() {
            warn!(url, status, "API call not successful");
        }
        Ok(response)
    }

    /// Authenticated GET decoding a JSON body; non-2xx is an [`OAuthError::Api`].
    pub async fn get_json<T: DeserializeOwned>(
        &mut self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, OAuthError> {
        self.get(url, query).await?.error_for_status()?.json()
    }

    async fn ensure_fresh(&mut self) -> Result<(), OAuthError> {
        if !self.tokens.is_expired(now_secs(), EXPIRY_LEEWAY_SECS) {
            return Ok(());
        }
        let refresh_token = self
            .tokens
            .refresh_token
            .clone()
            .ok_or(OAuthError::MissingRefreshToken)?;

        info!("access token expired, refreshing");
        let tokens = self.flow.refresh(&refresh_token).await?;
        self.persister.persist(&tokens)?;
        self.tokens = tokens;
        Ok(())
    }
}
