use std::{path::PathBuf, thread, time::Duration};

use anyhow::{ensure, Result};
use clap::Parser;
use tracing::{debug, info};
use vsrobot::{ControlFrame, Vector6};
use vsrobot_apps::{utils::init_tracing, RobotConfig};
use vsrobot_ros::RosConnector;

/// Prints the odometry of a ROS robot, optionally while driving it at a
/// constant velocity.
#[derive(Parser, Debug)]
#[clap(name = env!("CARGO_BIN_NAME"))]
struct Opt {
    /// Path to the setting file.
    #[clap(short, long, value_parser)]
    config_path: Option<PathBuf>,
    /// Set options from command line. These settings take priority over the
    /// setting file specified by --config-path.
    #[clap(long)]
    config: Option<String>,
    /// Print the default setting as TOML and exit.
    #[clap(long)]
    show_default_config: bool,
    /// Velocity `vx,vy,vz,wx,wy,wz` sent at every iteration.
    #[clap(long, value_delimiter = ',', allow_negative_numbers = true)]
    velocity: Option<Vec<f64>>,
    /// Interval between two iterations in milliseconds.
    #[clap(long, default_value_t = 100)]
    interval_ms: u64,
    /// Number of iterations.
    #[clap(short = 'n', long, default_value_t = 50)]
    iterations: usize,
}

fn main() -> Result<()> {
    init_tracing();
    let opt = Opt::parse();
    debug!(?opt);

    if opt.show_default_config {
        print!("{}", toml::to_string(&RobotConfig::default())?);
        return Ok(());
    }

    if let Some(v) = &opt.velocity {
        ensure!(v.len() == 6, "--velocity takes 6 values, got {}", v.len());
    }

    let config_path = vsrobot_apps::utils::get_config_path(opt.config_path);
    let config = vsrobot_apps::utils::resolve_robot_config(
        config_path.as_deref(),
        opt.config.as_deref(),
    )?;
    let robot = config.create_robot(&RosConnector::new())?;

    let velocity = opt.velocity.map(|v| Vector6::from_column_slice(&v));
    let interval = Duration::from_millis(opt.interval_ms);
    for i in 0..opt.iterations {
        if let Some(velocity) = &velocity {
            robot.send_velocity(ControlFrame::Reference, velocity)?;
        }
        thread::sleep(interval);
        let position = robot.current_position(ControlFrame::Reference)?;
        let (displacement, stamp) = robot.stamped_displacement(ControlFrame::Reference)?;
        println!(
            "[{i}] stamp: {}.{:09} position: {:?} displacement: {:?}",
            stamp.sec,
            stamp.nsec,
            position.as_slice(),
            displacement.as_slice()
        );
    }

    if velocity.is_some() {
        info!("stopping the robot");
        robot.send_velocity(ControlFrame::Reference, &Vector6::zeros())?;
    }
    Ok(())
}
