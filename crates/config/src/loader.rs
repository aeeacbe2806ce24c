use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{ConfigError, env_subst::substitute_env, schema::NibeConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["nibe.toml", "nibe.yaml", "nibe.yml", "nibe.json"];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<NibeConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Load the config and apply `NIBE_*` environment overrides.
///
/// An explicit path must exist. Otherwise the standard locations are searched:
/// 1. `./nibe.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/nibe/nibe.{toml,yaml,yml,json}` (user-global)
///
/// Falls back to `NibeConfig::default()` when no file is found.
pub fn discover_and_load(explicit: Option<&Path>) -> Result<NibeConfig, ConfigError> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(&search_dirs()),
    };

    let mut config = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_config(&path)?
        },
        None => {
            debug!("no config file found, using defaults");
            NibeConfig::default()
        },
    };
    config.apply_env_overrides();
    Ok(config)
}

/// Returns the user-global config directory: `~/.config/nibe/`.
pub fn config_dir() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".config").join("nibe"))
}

pub fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

fn search_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from(".")];
    dirs.extend(config_dir());
    dirs
}

/// Find the first config file in `dirs`, honouring [`CONFIG_FILENAMES`] order.
fn find_config_file(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)))
        .find(|p| p.exists())
}

fn parse_config(raw: &str, path: &Path) -> Result<NibeConfig, ConfigError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
    let parse_err = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };

    match ext {
        "toml" => toml::from_str(raw).map_err(|e| parse_err(e.to_string())),
        "yaml" | "yml" => serde_yaml::from_str(raw).map_err(|e| parse_err(e.to_string())),
        "json" => serde_json::from_str(raw).map_err(|e| parse_err(e.to_string())),
        _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
    }
}
