use auto_impl::auto_impl;
use nalgebra::Vector6;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{error::Result, Error, Stamp};

/// Frame in which velocities, positions and displacements are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub enum ControlFrame {
    /// The fixed frame the robot reports odometry in.
    #[default]
    Reference,
    /// Joint space.
    Articular,
    /// Frame attached to the camera.
    Camera,
    /// Frame attached to the end effector.
    EndEffector,
    /// Translation in the reference frame, rotation in the end effector frame.
    Mixed,
}

impl ControlFrame {
    /// Returns `Ok(())` if `self` is the reference frame, and
    /// [`Error::UnsupportedFrame`] otherwise.
    ///
    /// # Example
    ///
    /// ```
    /// use vsrobot::ControlFrame;
    ///
    /// assert!(ControlFrame::Reference.ensure_reference("get position").is_ok());
    /// assert!(ControlFrame::Camera.ensure_reference("get position").is_err());
    /// ```
    pub fn ensure_reference(self, operation: &'static str) -> Result<()> {
        if self == ControlFrame::Reference {
            Ok(())
        } else {
            Err(Error::UnsupportedFrame {
                frame: self,
                operation,
            })
        }
    }
}

/// A robot commanded with 6-DOF velocities (`[vx, vy, vz, wx, wy, wz]`).
///
/// Positions and displacements are 6-vectors `[x, y, z, rx, ry, rz]` whose
/// rotational part uses the XYZ Euler convention (see [`rxyz_from_rotation`](crate::rxyz_from_rotation)).
#[auto_impl(Box, Rc, Arc)]
pub trait VelocityRobot {
    /// Sends a velocity command. This does not wait for the robot to apply it.
    fn send_velocity(&self, frame: ControlFrame, velocity: &Vector6<f64>) -> Result<()>;

    /// Returns the last known absolute pose.
    fn current_position(&self, frame: ControlFrame) -> Result<Vector6<f64>>;

    /// Returns the displacement accumulated since the previous call, together
    /// with the time of the last odometry update.
    fn stamped_displacement(&self, frame: ControlFrame) -> Result<(Vector6<f64>, Stamp)>;

    /// Returns the displacement accumulated since the previous call.
    fn displacement(&self, frame: ControlFrame) -> Result<Vector6<f64>> {
        self.stamped_displacement(frame).map(|(d, _)| d)
    }
}
