use std::time::Duration;

use {
    anyhow::{Context, Result},
    nibe_config::NibeConfig,
    nibe_oauth::{AuthorizedClient, OAuthFlow, TokenStore, load_oauth_config, token_path},
    nibe_uplink::UplinkClient,
};

pub fn token_store(config: &NibeConfig) -> TokenStore {
    TokenStore::new(token_path(config))
}

/// HTTP client shared by token and API calls; no timeout unless configured.
pub fn http_client(config: &NibeConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = config.api.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().context("failed to build HTTP client")
}

pub fn oauth_flow(config: &NibeConfig, http: reqwest::Client) -> Result<OAuthFlow> {
    let oauth = load_oauth_config(config)?;
    Ok(OAuthFlow::with_client(oauth, http))
}

/// Load the stored token and wrap it in a self-refreshing API client.
pub fn uplink_client(config: &NibeConfig) -> Result<UplinkClient<TokenStore>> {
    let store = token_store(config);
    let tokens = store.load()?;
    let http = http_client(config)?;
    let flow = oauth_flow(config, http.clone())?;
    let client = AuthorizedClient::new(flow, tokens, store).with_http_client(http);
    Ok(UplinkClient::new(client, config.api.base_url.clone()))
}
