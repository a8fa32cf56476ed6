use std::path::{Path, PathBuf};

use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::{overwrite::overwrite_str, Error, RobotConfig};

const CONFIG_PATH_ENV_NAME: &str = "VSROBOT_CONFIG_PATH";

/// Get config path from input or env VSROBOT_CONFIG_PATH
pub fn get_config_path(config_path: Option<PathBuf>) -> Option<PathBuf> {
    config_path.or_else(|| {
        std::env::var(CONFIG_PATH_ENV_NAME)
            .map(|s| {
                warn!("### ENV VAR {CONFIG_PATH_ENV_NAME}={s} is used ###");
                PathBuf::from(s)
            })
            .ok()
    })
}

/// Loads the config from `config_path` (or the default config), then applies
/// the `--config` scripts in `overwrite`.
pub fn resolve_robot_config(
    config_path: Option<&Path>,
    overwrite: Option<&str>,
) -> Result<RobotConfig, Error> {
    match (config_path, overwrite) {
        (Some(config_path), Some(overwrite)) => {
            let s = std::fs::read_to_string(config_path)
                .map_err(|e| Error::NoFile(config_path.to_owned(), e))?;
            let s = overwrite_str(&s, overwrite)?;
            RobotConfig::from_str(&s, config_path)
        }
        (Some(config_path), None) => RobotConfig::new(config_path),
        (None, Some(overwrite)) => {
            let s = toml::to_string(&RobotConfig::default())?;
            let s = overwrite_str(&s, overwrite)?;
            toml::from_str(&s).map_err(Error::InvalidConfig)
        }
        (None, None) => Ok(RobotConfig::default()),
    }
}

/// Initializes the global `tracing` subscriber. The filter is read from `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}
