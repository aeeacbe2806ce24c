//! Configuration for the NIBE Uplink client: application registration,
//! API endpoint and token file location.

pub mod env_subst;
pub mod loader;
pub mod schema;

use std::path::PathBuf;

pub use {
    loader::{config_dir, discover_and_load, home_dir, load_config},
    schema::{ApiSettings, NibeConfig, OAuthSettings},
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("unsupported config format: .{0}")]
    UnsupportedFormat(String),

    #[error("oauth.{0} is not configured; set it in nibe.toml or the environment")]
    MissingCredential(&'static str),
}
