use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Message time as a (seconds, nanoseconds) pair.
///
/// A zero stamp means "no update received yet".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct Stamp {
    pub sec: u32,
    pub nsec: u32,
}

impl Stamp {
    pub const ZERO: Self = Self { sec: 0, nsec: 0 };

    pub fn new(sec: u32, nsec: u32) -> Self {
        Self { sec, nsec }
    }

    pub fn is_zero(&self) -> bool {
        self.sec == 0 && self.nsec == 0
    }

    /// Signed elapsed time in seconds from `earlier` to `self`.
    ///
    /// Negative when `earlier` is actually later.
    ///
    /// # Example
    ///
    /// ```
    /// use assert_approx_eq::assert_approx_eq;
    /// use vsrobot::Stamp;
    ///
    /// let a = Stamp::new(10, 900_000_000);
    /// let b = Stamp::new(11, 100_000_000);
    /// assert_approx_eq!(b.seconds_since(&a), 0.2);
    /// assert_approx_eq!(a.seconds_since(&b), -0.2);
    /// ```
    pub fn seconds_since(&self, earlier: &Stamp) -> f64 {
        (f64::from(self.sec) - f64::from(earlier.sec))
            + (f64::from(self.nsec) - f64::from(earlier.nsec)) / 1_000_000_000.0
    }
}

impl From<Stamp> for Duration {
    fn from(stamp: Stamp) -> Self {
        Duration::new(u64::from(stamp.sec), stamp.nsec)
    }
}
