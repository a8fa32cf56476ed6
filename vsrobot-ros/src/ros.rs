//! [`Session`] backed by rosrust (ROS1).

use std::sync::{Arc, OnceLock};

use tracing::{debug, info};
use vsrobot::{nalgebra::Quaternion, Error, Stamp, Vector3};

use crate::{
    config::DEFAULT_MASTER_URI,
    transport::{remapping_arg, MASTER_ARG_PREFIX, NAME_ARG_PREFIX},
    Connector, OdometryCallback, OdometrySample, Session, Subscription, Twist, TwistPublisher,
};

mod msg {
    rosrust::rosmsg_include!(geometry_msgs / Twist, nav_msgs / Odometry);
}

const MASTER_URI_ENV_NAME: &str = "ROS_MASTER_URI";

static MASTER_URI: OnceLock<String> = OnceLock::new();

fn connection_error(context: &str, e: rosrust::error::Error) -> Error {
    Error::Connection {
        message: format!("rosrust {context} error: {e}"),
    }
}

fn env_master_uri() -> String {
    std::env::var(MASTER_URI_ENV_NAME).unwrap_or_else(|_| DEFAULT_MASTER_URI.to_owned())
}

impl From<&msg::nav_msgs::Odometry> for OdometrySample {
    fn from(odom: &msg::nav_msgs::Odometry) -> Self {
        let p = &odom.pose.pose.position;
        let q = &odom.pose.pose.orientation;
        let linear = &odom.twist.twist.linear;
        let angular = &odom.twist.twist.angular;
        Self {
            position: Vector3::new(p.x, p.y, p.z),
            orientation: Quaternion::new(q.w, q.x, q.y, q.z),
            linear: Vector3::new(linear.x, linear.y, linear.z),
            angular: Vector3::new(angular.x, angular.y, angular.z),
            stamp: Stamp::new(odom.header.stamp.sec, odom.header.stamp.nsec),
        }
    }
}

impl From<Twist> for msg::geometry_msgs::Twist {
    fn from(twist: Twist) -> Self {
        let mut msg = msg::geometry_msgs::Twist::default();
        msg.linear.x = twist.linear.x;
        msg.linear.y = twist.linear.y;
        msg.linear.z = twist.linear.z;
        msg.angular.x = twist.angular.x;
        msg.angular.y = twist.angular.y;
        msg.angular.z = twist.angular.z;
        msg
    }
}

/// The process-wide rosrust node.
#[derive(Debug)]
pub struct RosSession {
    master_uri: String,
}

impl Session for RosSession {
    fn master_uri(&self) -> String {
        self.master_uri.clone()
    }

    fn advertise(&self, topic: &str, queue_size: usize) -> Result<Box<dyn TwistPublisher>, Error> {
        let publisher = rosrust::publish::<msg::geometry_msgs::Twist>(topic, queue_size)
            .map_err(|e| connection_error("publish", e))?;
        debug!(topic, queue_size, "advertised");
        Ok(Box::new(RosTwistPublisher { publisher }))
    }

    fn subscribe(
        &self,
        topic: &str,
        queue_size: usize,
        callback: OdometryCallback,
    ) -> Result<Box<dyn Subscription>, Error> {
        let subscriber = rosrust::subscribe(
            topic,
            queue_size,
            move |odom: msg::nav_msgs::Odometry| callback(OdometrySample::from(&odom)),
        )
        .map_err(|e| connection_error("subscribe", e))?;
        debug!(topic, queue_size, "subscribed");
        Ok(Box::new(RosSubscription {
            _subscriber: subscriber,
        }))
    }
}

struct RosTwistPublisher {
    publisher: rosrust::Publisher<msg::geometry_msgs::Twist>,
}

impl TwistPublisher for RosTwistPublisher {
    fn publish(&self, twist: Twist) -> Result<(), Error> {
        self.publisher
            .send(twist.into())
            .map_err(|e| connection_error("send", e))
    }
}

struct RosSubscription {
    // unsubscribes on drop
    _subscriber: rosrust::Subscriber,
}

impl Subscription for RosSubscription {}

/// [`Connector`] for the rosrust node of this process.
#[derive(Debug, Default, Clone, Copy)]
pub struct RosConnector;

impl RosConnector {
    pub fn new() -> Self {
        Self
    }
}

impl Connector for RosConnector {
    fn current(&self) -> Option<Arc<dyn Session>> {
        if !rosrust::is_initialized() {
            return None;
        }
        let master_uri = MASTER_URI.get().cloned().unwrap_or_else(env_master_uri);
        Some(Arc::new(RosSession { master_uri }))
    }

    fn connect(&self, args: &[String]) -> Result<Arc<dyn Session>, Error> {
        if let Some(session) = self.current() {
            return Ok(session);
        }
        let master_uri = remapping_arg(args, MASTER_ARG_PREFIX)
            .map(str::to_owned)
            .unwrap_or_else(env_master_uri);
        let name = remapping_arg(args, NAME_ARG_PREFIX).unwrap_or("vsrobot_node");
        // rosrust reads the master from the environment (or from the real
        // process arguments, which take precedence).
        std::env::set_var(MASTER_URI_ENV_NAME, &master_uri);
        rosrust::try_init_with_options(name, true).map_err(|e| Error::Construction {
            message: format!("rosrust init error: {e}"),
        })?;
        let master_uri = MASTER_URI.get_or_init(|| master_uri).clone();
        info!(name, %master_uri, "rosrust node started");
        Ok(Arc::new(RosSession { master_uri }))
    }
}
