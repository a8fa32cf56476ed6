use anyhow::Result;
use clap::{Parser, ValueEnum};
use schemars::schema_for;
use tracing::debug;

#[derive(Debug, Parser)]
#[clap(name = env!("CARGO_BIN_NAME"))]
struct Args {
    #[clap(subcommand)]
    subcommand: Subcommand,
}

#[derive(Debug, clap::Subcommand)]
enum Subcommand {
    /// Generate JSON schema for the specified config file.
    Schema {
        /// Kind of config file.
        #[clap(value_enum, ignore_case = true)]
        kind: ConfigKind,
    },
    /// Print the default config as TOML.
    Default {
        #[clap(value_enum, ignore_case = true)]
        kind: ConfigKind,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ConfigKind {
    RobotConfig,
    RosRobotConfig,
}

fn main() -> Result<()> {
    vsrobot_apps::utils::init_tracing();
    let args = Args::parse();
    debug!(?args);

    match args.subcommand {
        Subcommand::Schema { kind } => {
            let schema = match kind {
                ConfigKind::RobotConfig => schema_for!(vsrobot_apps::RobotConfig),
                ConfigKind::RosRobotConfig => schema_for!(vsrobot_ros::RosRobotConfig),
            };
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Subcommand::Default { kind } => {
            let s = match kind {
                ConfigKind::RobotConfig => toml::to_string(&vsrobot_apps::RobotConfig::default())?,
                ConfigKind::RosRobotConfig => {
                    toml::to_string(&vsrobot_ros::RosRobotConfig::default())?
                }
            };
            print!("{s}");
        }
    }
    Ok(())
}
