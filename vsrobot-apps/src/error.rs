use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("vsrobot-apps: Failed to parse {:?} as toml ({}).", .0, .1)]
    TomlParseFailure(PathBuf, #[source] toml::de::Error),
    #[error("vsrobot-apps: Failed to parse config ({}).", .0)]
    InvalidConfig(#[source] toml::de::Error),
    #[error("vsrobot-apps: Failed to serialize config ({}).", .0)]
    TomlSerializeFailure(#[from] toml::ser::Error),
    #[error("vsrobot-apps: No File {:?} is found ({}).", .0, .1)]
    NoFile(PathBuf, #[source] std::io::Error),
    #[error("vsrobot-apps: Invalid --config script at line {line}: {message}")]
    InvalidScript { line: usize, message: String },
    #[error("vsrobot-apps: Failed to apply --config script at line {line} ({source}).")]
    Overwrite {
        line: usize,
        #[source]
        source: toml_query::error::Error,
    },
    #[error("vsrobot-apps: vsrobot: {:?}", .0)]
    Vsrobot(#[from] vsrobot::Error),
}
