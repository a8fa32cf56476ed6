//! [`vsrobot::VelocityRobot`] wrapper that records every call with [`tracing`].
//!
//! The events are emitted at `TRACE` level with the `method` field set to the
//! called trait method, and can be read back with [`de::from_str`] when they
//! were written by the JSON formatter of `tracing-subscriber`.

#![warn(rust_2018_idioms)]

pub mod de;

use tracing::trace;
use vsrobot::{ControlFrame, Error, Stamp, Vector6};

#[derive(Debug)]
pub struct Tracing<T>(T);

impl<T> Tracing<T> {
    pub fn new(v: T) -> Self {
        Self(v)
    }

    pub fn get_ref(&self) -> &T {
        &self.0
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Tracing<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: vsrobot::VelocityRobot> vsrobot::VelocityRobot for Tracing<T> {
    fn send_velocity(&self, frame: ControlFrame, velocity: &Vector6<f64>) -> Result<(), Error> {
        trace!(
            method = "vsrobot::VelocityRobot::send_velocity",
            ?frame,
            velocity_vx = velocity[0],
            velocity_vy = velocity[1],
            velocity_vz = velocity[2],
            velocity_wx = velocity[3],
            velocity_wy = velocity[4],
            velocity_wz = velocity[5],
        );
        self.0.send_velocity(frame, velocity)
    }

    fn current_position(&self, frame: ControlFrame) -> Result<Vector6<f64>, Error> {
        let position = self.0.current_position(frame)?;
        trace!(
            method = "vsrobot::VelocityRobot::current_position",
            ?frame,
            position_x = position[0],
            position_y = position[1],
            position_z = position[2],
            position_rx = position[3],
            position_ry = position[4],
            position_rz = position[5],
        );
        Ok(position)
    }

    fn stamped_displacement(&self, frame: ControlFrame) -> Result<(Vector6<f64>, Stamp), Error> {
        let (displacement, stamp) = self.0.stamped_displacement(frame)?;
        trace!(
            method = "vsrobot::VelocityRobot::stamped_displacement",
            ?frame,
            displacement_x = displacement[0],
            displacement_y = displacement[1],
            displacement_z = displacement[2],
            displacement_rx = displacement[3],
            displacement_ry = displacement[4],
            displacement_rz = displacement[5],
            stamp_sec = stamp.sec,
            stamp_nsec = stamp.nsec,
        );
        Ok((displacement, stamp))
    }
}
