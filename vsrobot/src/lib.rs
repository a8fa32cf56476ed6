//! Abstract interface for robots driven by 6-DOF velocity commands and
//! observed through odometry.

mod clients;
mod error;
mod stamp;
mod traits;
mod utils;

pub use clients::*;
pub use error::*;
pub use stamp::*;
pub use traits::*;
pub use utils::*;

// re-export
pub use nalgebra;
pub use nalgebra::{UnitQuaternion, Vector3, Vector6};
