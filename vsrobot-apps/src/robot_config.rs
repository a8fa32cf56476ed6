use std::{fs, path::Path};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vsrobot::VelocityRobot;
use vsrobot_ros::{Connector, RosRobot, RosRobotConfig};
use vsrobot_tracing::Tracing;

use crate::Error;

pub type BoxVelocityRobot = Box<dyn VelocityRobot + Send + Sync>;

/// Top-level config of the vsrobot applications.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RobotConfig {
    /// Record every call to the robot with `tracing` (target `vsrobot_tracing`).
    #[serde(default)]
    pub enable_tracing: bool,
    #[serde(default)]
    pub ros_robot: RosRobotConfig,
}

impl RobotConfig {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let s = fs::read_to_string(path).map_err(|e| Error::NoFile(path.to_owned(), e))?;
        Self::from_str(&s, path)
    }

    /// Parses `s`. `path` is only used in error messages.
    pub fn from_str<P: AsRef<Path>>(s: &str, path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let config: Self =
            toml::from_str(s).map_err(|e| Error::TomlParseFailure(path.to_owned(), e))?;
        debug!(?path, ?config, "loaded config");
        Ok(config)
    }

    /// Creates a [`RosRobot`] and initializes it with `connector`.
    pub fn create_robot(&self, connector: &dyn Connector) -> Result<BoxVelocityRobot, Error> {
        let robot = RosRobot::new(self.ros_robot.clone());
        robot.init(connector)?;
        if self.enable_tracing {
            Ok(Box::new(Tracing::new(robot)))
        } else {
            Ok(Box::new(robot))
        }
    }
}
