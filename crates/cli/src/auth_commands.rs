use std::io::Write;

use {
    anyhow::{Context, Result},
    clap::Subcommand,
    nibe_config::NibeConfig,
    nibe_oauth::{OAuthTokens, StoreError, now_secs},
    tokio::io::{AsyncBufReadExt, BufReader},
    tracing::debug,
};

use crate::session::{http_client, oauth_flow, token_store};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Request a token with the Authorization-Code grant and save it.
    Login {
        /// Authorization code shown by the redirect page; prompted for when omitted.
        #[arg(long)]
        code: Option<String>,
        /// Also try to open the authorization URL in a browser.
        #[arg(long, default_value_t = false)]
        open: bool,
    },
    /// Show whether a token is stored and when it expires.
    Status,
    /// Delete the stored token.
    Logout,
}

pub async fn handle_auth(action: AuthAction, config: &NibeConfig) -> Result<()> {
    match action {
        AuthAction::Login { code, open } => login(config, code, open).await,
        AuthAction::Status => status(config),
        AuthAction::Logout => logout(config),
    }
}

async fn login(config: &NibeConfig, code: Option<String>, open_browser: bool) -> Result<()> {
    let flow = oauth_flow(config, http_client(config)?)?;
    let state = flow.state();
    let url = flow.authorization_url(&state)?;

    println!("Use a web browser to connect to:  {url}");
    if open_browser && open::that(url.as_str()).is_err() {
        println!("Could not open browser, please visit the URL above.");
    }

    let code = match code {
        Some(code) => code,
        None => prompt_for_code().await?,
    };

    let store = token_store(config);
    debug!(path = %store.path().display(), "exchanging authorization code");
    flow.acquire(&code, &store).await?;

    println!("Token saved to file {}", store.path().display());
    Ok(())
}

async fn prompt_for_code() -> Result<String> {
    print!("Enter (copy-and-paste) the authorization code printed in the web browser:  ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read authorization code")?;
    Ok(line)
}

fn status(config: &NibeConfig) -> Result<()> {
    let store = token_store(config);
    match store.load() {
        Ok(tokens) => {
            println!(
                "{} [{}]",
                store.path().display(),
                describe_expiry(&tokens, now_secs())
            );
            Ok(())
        },
        Err(StoreError::NotFound { path }) => {
            println!("No token stored at {}.", path.display());
            Ok(())
        },
        Err(e) => Err(e.into()),
    }
}

fn logout(config: &NibeConfig) -> Result<()> {
    let store = token_store(config);
    store.delete()?;
    println!("Removed {}", store.path().display());
    Ok(())
}

fn describe_expiry(tokens: &OAuthTokens, now: f64) -> String {
    let refreshable = tokens.refresh_token.is_some();
    match tokens.remaining_secs(now) {
        None => "no expiry recorded".to_string(),
        Some(remaining) if remaining > 0.0 => {
            let remaining = remaining as u64;
            let hours = remaining / 3600;
            let mins = (remaining % 3600) / 60;
            format!("valid ({hours}h {mins}m remaining)")
        },
        Some(_) if refreshable => "expired, will refresh on next call".to_string(),
        Some(_) => "expired, run `nibe auth login`".to_string(),
    }
}
