mod api_commands;
mod auth_commands;
mod session;

use std::path::PathBuf;

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "nibe", version, about = "NIBE Uplink API client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ./nibe.toml, then ~/.config/nibe/nibe.toml).
    #[arg(long, global = true, env = "NIBE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Token management for the Uplink OAuth2 server.
    Auth {
        #[command(subcommand)]
        action: auth_commands::AuthAction,
    },
    /// List the systems assigned to the authorized user.
    Systems,
    /// Print the parameters of every category of every unit of every system.
    Parameters {
        /// Print the tree as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    debug!(version = env!("CARGO_PKG_VERSION"), "nibe starting");
    let config = nibe_config::discover_and_load(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command {
        Commands::Auth { action } => auth_commands::handle_auth(action, &config).await,
        Commands::Systems => api_commands::systems(&config).await,
        Commands::Parameters { json } => api_commands::parameters(&config, json).await,
    }
}
