//! The pub/sub transport seam.
//!
//! [`RosRobot`](crate::RosRobot) never talks to a middleware directly. It is
//! handed a [`Session`] (or a [`Connector`] able to produce one) and only uses
//! it to advertise the velocity topic and to subscribe to the odometry topic.

use std::{fmt, sync::Arc};

use vsrobot::{Error, Vector3, Vector6};

use crate::OdometrySample;

/// Outgoing velocity command (`geometry_msgs/Twist`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Twist {
    pub linear: Vector3<f64>,
    pub angular: Vector3<f64>,
}

impl From<&Vector6<f64>> for Twist {
    fn from(v: &Vector6<f64>) -> Self {
        Self {
            linear: Vector3::new(v[0], v[1], v[2]),
            angular: Vector3::new(v[3], v[4], v[5]),
        }
    }
}

impl From<Twist> for Vector6<f64> {
    fn from(t: Twist) -> Self {
        Vector6::new(
            t.linear.x,
            t.linear.y,
            t.linear.z,
            t.angular.x,
            t.angular.y,
            t.angular.z,
        )
    }
}

pub type OdometryCallback = Box<dyn Fn(OdometrySample) + Send + Sync + 'static>;

/// Publishing end of an advertised topic.
pub trait TwistPublisher: Send {
    /// Queues `twist` for delivery. Does not wait for any subscriber.
    fn publish(&self, twist: Twist) -> Result<(), Error>;
}

/// A live subscription. Dropping it stops the delivery of messages and waits
/// for any running callback to return.
pub trait Subscription: Send {}

/// A connection to the pub/sub middleware.
pub trait Session: Send + Sync + fmt::Debug {
    /// Address of the master this session is registered with.
    fn master_uri(&self) -> String;

    fn advertise(&self, topic: &str, queue_size: usize) -> Result<Box<dyn TwistPublisher>, Error>;

    /// Subscribes `callback` to `topic`. The callback runs on a background
    /// worker owned by the transport, one message at a time.
    fn subscribe(
        &self,
        topic: &str,
        queue_size: usize,
        callback: OdometryCallback,
    ) -> Result<Box<dyn Subscription>, Error>;
}

/// Creates sessions, and knows about the one already running in this process.
pub trait Connector: fmt::Debug {
    /// The session already running in this process, if any.
    fn current(&self) -> Option<Arc<dyn Session>>;

    /// Starts a session from process-style arguments (e.g. `__master:=<uri>`).
    fn connect(&self, args: &[String]) -> Result<Arc<dyn Session>, Error>;
}

/// Prefix of the remapping argument that selects the master.
pub const MASTER_ARG_PREFIX: &str = "__master:=";
/// Prefix of the remapping argument that selects the node name.
pub const NAME_ARG_PREFIX: &str = "__name:=";

/// Finds the value of a `<prefix><value>` remapping argument.
///
/// # Example
///
/// ```
/// use vsrobot_ros::{remapping_arg, MASTER_ARG_PREFIX};
///
/// let args = vec!["ros.exe".to_owned(), "__master:=http://host:11311".to_owned()];
/// assert_eq!(remapping_arg(&args, MASTER_ARG_PREFIX), Some("http://host:11311"));
/// assert_eq!(remapping_arg(&args, "__name:="), None);
/// ```
pub fn remapping_arg<'a>(args: &'a [String], prefix: &str) -> Option<&'a str> {
    args.iter().rev().find_map(|arg| arg.strip_prefix(prefix))
}
