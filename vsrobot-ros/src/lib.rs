//! [`vsrobot`] implementation on top of a ROS-style pub/sub transport.
//!
//! The transport is injected through the [`Session`] and [`Connector`]
//! traits. [`LocalSession`] is an in-process loopback; with the `ros` feature,
//! [`RosSession`] uses rosrust.

#![warn(rust_2018_idioms)]

mod config;
mod local;
mod odometry;
mod robot;
#[cfg(feature = "ros")]
mod ros;
mod transport;

#[cfg(feature = "ros")]
pub use crate::ros::*;
pub use crate::{config::*, local::*, odometry::*, robot::*, transport::*};
