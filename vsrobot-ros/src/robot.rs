use std::{fmt, sync::Arc};

use parking_lot::Mutex;
use rand::Rng;
use tracing::{debug, info};
use vsrobot::{ControlFrame, Error, Stamp, Vector6, VelocityRobot};

use crate::{
    transport::{MASTER_ARG_PREFIX, NAME_ARG_PREFIX},
    Connector, OdometryTracker, RosRobotConfig, Session, Subscription, Twist, TwistPublisher,
};

struct Connection {
    publisher: Box<dyn TwistPublisher>,
    // Dropped before `session`, which stops the odometry callbacks.
    _subscription: Box<dyn Subscription>,
    session: Arc<dyn Session>,
}

/// [`VelocityRobot`] implementation on top of a ROS-style pub/sub [`Session`].
///
/// Velocity commands are published as `geometry_msgs/Twist`, and
/// `nav_msgs/Odometry` messages feed an [`OdometryTracker`].
///
/// The robot starts uninitialized: position and displacement reads return the
/// initial (zero) state and [`send_velocity`](VelocityRobot::send_velocity)
/// fails until one of the `init*` methods succeeds.
pub struct RosRobot {
    config: RosRobotConfig,
    tracker: Arc<OdometryTracker>,
    connection: Mutex<Option<Connection>>,
}

impl fmt::Debug for RosRobot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RosRobot")
            .field("config", &self.config)
            .field("tracker", &self.tracker)
            .field("is_initialized", &self.is_initialized())
            .finish()
    }
}

impl RosRobot {
    pub fn new(config: RosRobotConfig) -> Self {
        let tracker = Arc::new(OdometryTracker::new(config.stamp_policy()));
        Self {
            config,
            tracker,
            connection: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &RosRobotConfig {
        &self.config
    }

    pub fn tracker(&self) -> &Arc<OdometryTracker> {
        &self.tracker
    }

    pub fn is_initialized(&self) -> bool {
        self.connection.lock().is_some()
    }

    /// Master URI of the session in use, if initialized.
    pub fn master_uri(&self) -> Option<String> {
        self.connection.lock().as_ref().map(|c| c.session.master_uri())
    }

    /// Advertises the velocity topic and subscribes to the odometry topic on
    /// `session`. Does nothing if already initialized.
    pub fn init_with_session(&self, session: Arc<dyn Session>) -> Result<(), Error> {
        let mut connection = self.connection.lock();
        if connection.is_some() {
            debug!("RosRobot is already initialized");
            return Ok(());
        }
        let cmd_vel_topic = self.config.cmd_vel_topic_name();
        let odom_topic = self.config.odom_topic_name();
        let publisher = session.advertise(&cmd_vel_topic, self.config.queue_size)?;
        let tracker = self.tracker.clone();
        let subscription = session.subscribe(
            &odom_topic,
            self.config.queue_size,
            Box::new(move |sample| tracker.update(&sample)),
        )?;
        info!(
            master_uri = %session.master_uri(),
            %cmd_vel_topic,
            %odom_topic,
            "RosRobot initialized"
        );
        *connection = Some(Connection {
            publisher,
            _subscription: subscription,
            session,
        });
        Ok(())
    }

    /// Uses the session already running in this process, or starts one from
    /// `args`. Does nothing if already initialized.
    pub fn init_with_args(&self, connector: &dyn Connector, args: &[String]) -> Result<(), Error> {
        if self.is_initialized() {
            debug!("RosRobot is already initialized");
            return Ok(());
        }
        let session = match connector.current() {
            Some(session) => session,
            None => connector.connect(args)?,
        };
        self.init_with_session(session)
    }

    /// Like [`init_with_args`](Self::init_with_args), with arguments derived
    /// from the configured master URI.
    ///
    /// Fails with [`Error::Construction`] if a session is already running with
    /// a different master URI.
    pub fn init(&self, connector: &dyn Connector) -> Result<(), Error> {
        if let Some(current) = connector.current() {
            let master_uri = current.master_uri();
            if master_uri != self.config.master_uri {
                return Err(Error::Construction {
                    message: format!(
                        "ROS already initialized with a different master URI ({master_uri} != {})",
                        self.config.master_uri
                    ),
                });
            }
        }
        if self.is_initialized() {
            return Ok(());
        }
        let args = self.bootstrap_args();
        self.init_with_args(connector, &args)
    }

    /// Process-style arguments used by [`init`](Self::init).
    pub fn bootstrap_args(&self) -> Vec<String> {
        let suffix: u32 = rand::thread_rng().gen();
        vec![
            env!("CARGO_PKG_NAME").to_owned(),
            format!("{MASTER_ARG_PREFIX}{}", self.config.master_uri),
            format!("{NAME_ARG_PREFIX}{}_{suffix}", self.config.node_name),
        ]
    }

    /// Stops the odometry subscription and releases the publisher and the
    /// session. Does nothing if not initialized.
    pub fn shutdown(&self) {
        let connection = self.connection.lock().take();
        if let Some(connection) = connection {
            drop(connection);
            info!("RosRobot shut down");
        }
    }

    /// Clears the accumulated displacement. The next odometry message is
    /// treated as the first one.
    pub fn reset_displacement(&self) {
        self.tracker.reset();
    }
}

impl Drop for RosRobot {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl VelocityRobot for RosRobot {
    fn send_velocity(&self, frame: ControlFrame, velocity: &Vector6<f64>) -> Result<(), Error> {
        frame.ensure_reference("send the robot velocity")?;
        let connection = self.connection.lock();
        let connection = connection.as_ref().ok_or_else(|| Error::Uninitialized {
            message: "RosRobot::send_velocity called before init".to_owned(),
        })?;
        connection.publisher.publish(Twist::from(velocity))
    }

    fn current_position(&self, frame: ControlFrame) -> Result<Vector6<f64>, Error> {
        self.tracker.position(frame)
    }

    fn stamped_displacement(&self, frame: ControlFrame) -> Result<(Vector6<f64>, Stamp), Error> {
        self.tracker.stamped_displacement(frame)
    }
}
