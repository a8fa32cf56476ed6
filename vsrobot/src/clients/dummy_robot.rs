use std::sync::Mutex;

use nalgebra::Vector6;

use crate::{
    error::{Error, Result},
    traits::{ControlFrame, VelocityRobot},
    Stamp,
};

/// Dummy VelocityRobot for debug or tests.
///
/// Remembers the last commanded velocity. Position and displacement are
/// whatever the test put in `current_position` and `pending_displacement`.
#[derive(Debug)]
pub struct DummyRobot {
    pub current_velocity: Mutex<Vector6<f64>>,
    pub current_position: Mutex<Vector6<f64>>,
    pub pending_displacement: Mutex<Vector6<f64>>,
}

impl DummyRobot {
    pub fn new() -> Self {
        Self {
            current_velocity: Mutex::new(Vector6::zeros()),
            current_position: Mutex::new(Vector6::zeros()),
            pending_displacement: Mutex::new(Vector6::zeros()),
        }
    }

    pub fn last_velocity(&self) -> Vector6<f64> {
        *lock(&self.current_velocity)
    }
}

impl Default for DummyRobot {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl VelocityRobot for DummyRobot {
    fn send_velocity(&self, frame: ControlFrame, velocity: &Vector6<f64>) -> Result<(), Error> {
        frame.ensure_reference("send the robot velocity")?;
        *lock(&self.current_velocity) = *velocity;
        Ok(())
    }

    fn current_position(&self, frame: ControlFrame) -> Result<Vector6<f64>, Error> {
        frame.ensure_reference("get the robot position")?;
        Ok(*lock(&self.current_position))
    }

    fn stamped_displacement(&self, frame: ControlFrame) -> Result<(Vector6<f64>, Stamp), Error> {
        frame.ensure_reference("get the robot displacement")?;
        let d = std::mem::replace(&mut *lock(&self.pending_displacement), Vector6::zeros());
        Ok((d, Stamp::ZERO))
    }
}
