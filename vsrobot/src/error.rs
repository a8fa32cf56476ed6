use thiserror::Error;

use crate::ControlFrame;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(
        "vsrobot: Cannot {} in the specified control frame ({:?})",
        operation,
        frame
    )]
    UnsupportedFrame {
        frame: ControlFrame,
        operation: &'static str,
    },
    #[error("vsrobot: Failed to construct robot : {}", message)]
    Construction { message: String },
    #[error("vsrobot: Uninitialized : {}", message)]
    Uninitialized { message: String },
    #[error("vsrobot: Connection error : {}", message)]
    Connection { message: String },
    #[error("vsrobot: Other: {:?}", .0)]
    Other(#[from] anyhow::Error),
}
