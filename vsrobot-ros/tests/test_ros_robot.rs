#![cfg(all(feature = "ros", target_os = "linux"))]

use std::{
    sync::mpsc,
    time::{Duration, Instant},
};

use assert_approx_eq::assert_approx_eq;
use vsrobot::{ControlFrame, Error, Stamp, Vector6, VelocityRobot};
use vsrobot_ros::{Connector, RosConnector, RosRobot, RosRobotConfig};

mod msg {
    rosrust::rosmsg_include!(geometry_msgs / Twist, nav_msgs / Odometry);
}
use msg::{geometry_msgs, nav_msgs, std_msgs};

mod util;

fn odometry(sec: u32, x: f64, vx: f64) -> nav_msgs::Odometry {
    nav_msgs::Odometry {
        header: std_msgs::Header {
            seq: sec,
            stamp: rosrust::Time { sec, nsec: 0 },
            frame_id: "odom".to_owned(),
        },
        child_frame_id: "base_link".to_owned(),
        pose: geometry_msgs::PoseWithCovariance {
            pose: geometry_msgs::Pose {
                position: geometry_msgs::Point { x, y: 0.0, z: 0.0 },
                orientation: geometry_msgs::Quaternion {
                    x: 0.0,
                    y: 0.0,
                    z: 0.0,
                    w: 1.0,
                },
            },
            covariance: [0f64; 36],
        },
        twist: geometry_msgs::TwistWithCovariance {
            twist: geometry_msgs::Twist {
                linear: geometry_msgs::Vector3 {
                    x: vx,
                    y: 0.0,
                    z: 0.0,
                },
                angular: geometry_msgs::Vector3::default(),
            },
            covariance: [0f64; 36],
        },
    }
}

fn wait_until(mut f: impl FnMut() -> bool) {
    let start = Instant::now();
    while !f() {
        assert!(start.elapsed() < Duration::from_secs(10), "timed out");
        std::thread::sleep(Duration::from_millis(10));
    }
}

// rosrust keeps a single node per process, so everything runs in one test.
#[test]
fn test_ros_robot() {
    let (_roscore, master_uri) = util::run_roscore();
    let config = RosRobotConfig {
        master_uri: master_uri.clone(),
        namespace: "/vsrobot_test/".to_owned(),
        ..Default::default()
    };
    let robot = RosRobot::new(config);
    let connector = RosConnector::new();
    assert!(connector.current().is_none());
    robot.init(&connector).unwrap();
    assert_eq!(robot.master_uri().unwrap(), master_uri);
    assert_eq!(connector.current().unwrap().master_uri(), master_uri);

    // a second robot with another master cannot join this process
    let other = RosRobot::new(RosRobotConfig {
        master_uri: "http://localhost:1".to_owned(),
        ..Default::default()
    });
    let e = other.init(&connector).unwrap_err();
    assert!(matches!(e, Error::Construction { .. }), "{e:?}");

    let (tx, rx) = mpsc::channel::<geometry_msgs::Twist>();
    let _sub = rosrust::subscribe("/vsrobot_test/cmd_vel", 1, move |v: geometry_msgs::Twist| {
        tx.send(v).unwrap();
    })
    .unwrap();
    let odom = rosrust::publish::<nav_msgs::Odometry>("/vsrobot_test/odom", 1).unwrap();
    wait_until(|| odom.subscriber_count() > 0);

    let vel = Vector6::new(0.2, 0.0, 0.0, 0.0, 0.0, 0.1);
    let twist = loop {
        robot.send_velocity(ControlFrame::Reference, &vel).unwrap();
        if let Ok(twist) = rx.recv_timeout(Duration::from_millis(100)) {
            break twist;
        }
    };
    assert_approx_eq!(twist.linear.x, 0.2);
    assert_approx_eq!(twist.angular.z, 0.1);

    odom.send(odometry(1, 0.0, 1.0)).unwrap();
    wait_until(|| robot.tracker().snapshot().stamp == Stamp::new(1, 0));
    odom.send(odometry(3, 2.5, 0.5)).unwrap();
    wait_until(|| robot.tracker().snapshot().stamp == Stamp::new(3, 0));

    let position = robot.current_position(ControlFrame::Reference).unwrap();
    assert_approx_eq!(position[0], 2.5);
    let (d, stamp) = robot
        .stamped_displacement(ControlFrame::Reference)
        .unwrap();
    assert_approx_eq!(d[0], 1.0);
    assert_eq!(stamp, Stamp::new(3, 0));

    robot.shutdown();
    assert!(!robot.is_initialized());
}
