#![warn(rust_2018_idioms)]

mod error;
pub mod overwrite;
mod robot_config;
pub mod utils;

pub use crate::{error::*, robot_config::*};
