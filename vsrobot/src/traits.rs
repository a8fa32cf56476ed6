mod velocity_robot;

pub use velocity_robot::*;
