use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::StampPolicy;

pub const DEFAULT_MASTER_URI: &str = "http://127.0.0.1:11311";

/// Configuration for [`RosRobot`](crate::RosRobot).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct RosRobotConfig {
    /// URI of the ROS master the robot expects to be registered with.
    pub master_uri: String,
    /// Node name used when this process starts the ROS session itself.
    /// A random suffix is appended.
    pub node_name: String,
    /// Prefix of both topic names. Concatenated as is, so it usually ends with `/`.
    pub namespace: String,
    /// Topic name for geometry_msgs/Twist.
    pub cmd_vel_topic: String,
    /// Topic name for nav_msgs/Odometry.
    pub odom_topic: String,
    /// Queue size of both the publisher and the subscriber.
    pub queue_size: usize,
    /// Do not integrate odometry whose stamp is not newer than the previous one.
    pub skip_non_monotonic_stamps: bool,
}

impl Default for RosRobotConfig {
    fn default() -> Self {
        Self {
            master_uri: DEFAULT_MASTER_URI.to_owned(),
            node_name: "vsrobot_node".to_owned(),
            namespace: String::new(),
            cmd_vel_topic: "cmd_vel".to_owned(),
            odom_topic: "odom".to_owned(),
            queue_size: 1,
            skip_non_monotonic_stamps: false,
        }
    }
}

impl RosRobotConfig {
    pub fn cmd_vel_topic_name(&self) -> String {
        format!("{}{}", self.namespace, self.cmd_vel_topic)
    }

    pub fn odom_topic_name(&self) -> String {
        format!("{}{}", self.namespace, self.odom_topic)
    }

    pub fn stamp_policy(&self) -> StampPolicy {
        if self.skip_non_monotonic_stamps {
            StampPolicy::SkipNonMonotonic
        } else {
            StampPolicy::Integrate
        }
    }
}
