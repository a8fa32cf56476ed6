mod dummy_robot;

pub use dummy_robot::*;
