//! Deserialize tracing log in JSON format

use serde::Deserialize;
use vsrobot::{ControlFrame, Stamp, Vector6};

pub type Timestamp = chrono::DateTime<chrono::Utc>;

pub fn from_str(lines: &str) -> Result<Vec<TracingLog>, vsrobot::Error> {
    let mut res = vec![];
    for line in lines.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let value: serde_json::Value =
            serde_json::from_str(line).map_err(|e| vsrobot::Error::Other(e.into()))?;
        // ignore unrelated line and log for other target (library/binary/module).
        if !matches!(value.get("target"), Some(target) if target == "vsrobot_tracing") {
            continue;
        }
        let Some(fields) = value.get("fields") else {
            continue;
        };
        match fields.get("method") {
            Some(v) if v == "vsrobot::VelocityRobot::send_velocity" => {
                let log: SendVelocityLog =
                    serde_json::from_value(value).map_err(|e| vsrobot::Error::Other(e.into()))?;
                res.push(TracingLog::SendVelocity(log));
            }
            Some(v) if v == "vsrobot::VelocityRobot::current_position" => {
                let log: CurrentPositionLog =
                    serde_json::from_value(value).map_err(|e| vsrobot::Error::Other(e.into()))?;
                res.push(TracingLog::CurrentPosition(log));
            }
            Some(v) if v == "vsrobot::VelocityRobot::stamped_displacement" => {
                let log: DisplacementLog =
                    serde_json::from_value(value).map_err(|e| vsrobot::Error::Other(e.into()))?;
                res.push(TracingLog::Displacement(log));
            }
            _ => continue,
        }
    }
    Ok(res)
}

#[derive(Debug)]
#[non_exhaustive]
pub enum TracingLog {
    /// [`vsrobot::VelocityRobot::send_velocity`]
    SendVelocity(SendVelocityLog),
    /// [`vsrobot::VelocityRobot::current_position`]
    CurrentPosition(CurrentPositionLog),
    /// [`vsrobot::VelocityRobot::stamped_displacement`]
    Displacement(DisplacementLog),
}

#[derive(Deserialize)]
struct RawTracingLog<Fields> {
    timestamp: Timestamp,
    fields: Fields,
}

#[derive(Debug)]
#[non_exhaustive]
pub struct SendVelocityLog {
    pub timestamp: Timestamp,
    pub frame: ControlFrame,
    pub velocity: Vector6<f64>,
}

impl<'de> Deserialize<'de> for SendVelocityLog {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Fields {
            frame: ControlFrame,
            velocity_vx: f64,
            velocity_vy: f64,
            velocity_vz: f64,
            velocity_wx: f64,
            velocity_wy: f64,
            velocity_wz: f64,
        }
        let v = RawTracingLog::<Fields>::deserialize(deserializer)?;
        let f = v.fields;
        Ok(Self {
            timestamp: v.timestamp,
            frame: f.frame,
            velocity: Vector6::new(
                f.velocity_vx,
                f.velocity_vy,
                f.velocity_vz,
                f.velocity_wx,
                f.velocity_wy,
                f.velocity_wz,
            ),
        })
    }
}

#[derive(Debug)]
#[non_exhaustive]
pub struct CurrentPositionLog {
    pub timestamp: Timestamp,
    pub frame: ControlFrame,
    pub position: Vector6<f64>,
}

impl<'de> Deserialize<'de> for CurrentPositionLog {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Fields {
            frame: ControlFrame,
            position_x: f64,
            position_y: f64,
            position_z: f64,
            position_rx: f64,
            position_ry: f64,
            position_rz: f64,
        }
        let v = RawTracingLog::<Fields>::deserialize(deserializer)?;
        let f = v.fields;
        Ok(Self {
            timestamp: v.timestamp,
            frame: f.frame,
            position: Vector6::new(
                f.position_x,
                f.position_y,
                f.position_z,
                f.position_rx,
                f.position_ry,
                f.position_rz,
            ),
        })
    }
}

#[derive(Debug)]
#[non_exhaustive]
pub struct DisplacementLog {
    pub timestamp: Timestamp,
    pub frame: ControlFrame,
    pub displacement: Vector6<f64>,
    /// Time of the odometry update the displacement ends at.
    pub stamp: Stamp,
}

impl<'de> Deserialize<'de> for DisplacementLog {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Fields {
            frame: ControlFrame,
            displacement_x: f64,
            displacement_y: f64,
            displacement_z: f64,
            displacement_rx: f64,
            displacement_ry: f64,
            displacement_rz: f64,
            stamp_sec: u32,
            stamp_nsec: u32,
        }
        let v = RawTracingLog::<Fields>::deserialize(deserializer)?;
        let f = v.fields;
        Ok(Self {
            timestamp: v.timestamp,
            frame: f.frame,
            displacement: Vector6::new(
                f.displacement_x,
                f.displacement_y,
                f.displacement_z,
                f.displacement_rx,
                f.displacement_ry,
                f.displacement_rz,
            ),
            stamp: Stamp::new(f.stamp_sec, f.stamp_nsec),
        })
    }
}
