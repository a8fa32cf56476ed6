use parking_lot::Mutex;
use tracing::debug;
use vsrobot::{
    nalgebra::Quaternion, pose_vector, ControlFrame, Error, Stamp, UnitQuaternion, Vector3,
    Vector6,
};

/// One odometry update, independent of the transport it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OdometrySample {
    pub position: Vector3<f64>,
    /// Raw (possibly unnormalized) orientation as received.
    pub orientation: Quaternion<f64>,
    pub linear: Vector3<f64>,
    pub angular: Vector3<f64>,
    pub stamp: Stamp,
}

impl Default for OdometrySample {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            orientation: Quaternion::identity(),
            linear: Vector3::zeros(),
            angular: Vector3::zeros(),
            stamp: Stamp::ZERO,
        }
    }
}

impl OdometrySample {
    fn velocity(&self) -> Vector6<f64> {
        Vector6::new(
            self.linear.x,
            self.linear.y,
            self.linear.z,
            self.angular.x,
            self.angular.y,
            self.angular.z,
        )
    }
}

/// What to do with an update whose stamp is not after the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StampPolicy {
    /// Integrate `velocity * dt` even when `dt` is zero or negative.
    #[default]
    Integrate,
    /// Keep the new pose but integrate nothing and keep the newer stamp.
    SkipNonMonotonic,
}

#[derive(Debug, Clone, Copy)]
struct State {
    position: Vector3<f64>,
    orientation: UnitQuaternion<f64>,
    accumulated: Vector6<f64>,
    baseline: Vector6<f64>,
    stamp: Stamp,
}

impl State {
    fn new() -> Self {
        Self {
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
            accumulated: Vector6::zeros(),
            baseline: Vector6::zeros(),
            stamp: Stamp::ZERO,
        }
    }
}

/// A consistent copy of the tracker state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OdometrySnapshot {
    pub position: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
    /// Total displacement integrated since startup or the last reset.
    pub accumulated: Vector6<f64>,
    pub stamp: Stamp,
}

/// Latest pose and integrated displacement, fed by odometry messages and read
/// by polling.
///
/// Every field is guarded by one lock, so readers always see the pose,
/// accumulator and stamp of the same update.
#[derive(Debug)]
pub struct OdometryTracker {
    state: Mutex<State>,
    policy: StampPolicy,
}

impl Default for OdometryTracker {
    fn default() -> Self {
        Self::new(StampPolicy::default())
    }
}

impl OdometryTracker {
    pub fn new(policy: StampPolicy) -> Self {
        Self {
            state: Mutex::new(State::new()),
            policy,
        }
    }

    pub fn policy(&self) -> StampPolicy {
        self.policy
    }

    /// Applies one odometry message.
    ///
    /// The first update after startup or [`reset`](Self::reset) only records
    /// its stamp and pose.
    pub fn update(&self, sample: &OdometrySample) {
        let orientation = normalize(&sample.orientation);
        let mut state = self.state.lock();
        state.position = sample.position;
        state.orientation = orientation;
        if state.stamp.is_zero() {
            state.stamp = sample.stamp;
            return;
        }
        let dt = sample.stamp.seconds_since(&state.stamp);
        if dt <= 0.0 && self.policy == StampPolicy::SkipNonMonotonic {
            debug!(
                ?dt,
                stamp = ?sample.stamp,
                "skipping integration of a non-monotonic odometry stamp"
            );
            return;
        }
        state.accumulated += sample.velocity() * dt;
        state.stamp = sample.stamp;
    }

    /// Returns `[x, y, z, rx, ry, rz]` of the last received pose.
    pub fn position(&self, frame: ControlFrame) -> Result<Vector6<f64>, Error> {
        frame.ensure_reference("get the robot position")?;
        let state = self.state.lock();
        Ok(pose_vector(&state.position, &state.orientation))
    }

    /// Returns the displacement accumulated since the previous call.
    pub fn displacement(&self, frame: ControlFrame) -> Result<Vector6<f64>, Error> {
        self.stamped_displacement(frame).map(|(d, _)| d)
    }

    /// Returns the displacement accumulated since the previous call, and the
    /// stamp of the last update at the time of reading.
    pub fn stamped_displacement(
        &self,
        frame: ControlFrame,
    ) -> Result<(Vector6<f64>, Stamp), Error> {
        frame.ensure_reference("get the robot displacement")?;
        let mut state = self.state.lock();
        let current = state.accumulated;
        let delta = current - state.baseline;
        state.baseline = current;
        Ok((delta, state.stamp))
    }

    pub fn snapshot(&self) -> OdometrySnapshot {
        let state = self.state.lock();
        OdometrySnapshot {
            position: state.position,
            orientation: state.orientation,
            accumulated: state.accumulated,
            stamp: state.stamp,
        }
    }

    /// Clears the accumulator, the baseline and the stored stamp. The pose is kept.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.accumulated = Vector6::zeros();
        state.baseline = Vector6::zeros();
        state.stamp = Stamp::ZERO;
    }
}

fn normalize(q: &Quaternion<f64>) -> UnitQuaternion<f64> {
    UnitQuaternion::try_new(*q, f64::EPSILON).unwrap_or_else(|| {
        debug!(?q, "degenerate orientation in odometry, using identity");
        UnitQuaternion::identity()
    })
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use assert_approx_eq::assert_approx_eq;
    use vsrobot::{rotation_from_rxyz, rxyz_from_rotation};

    use super::*;

    fn sample(stamp: Stamp, linear: [f64; 3], angular: [f64; 3]) -> OdometrySample {
        OdometrySample {
            linear: Vector3::from(linear),
            angular: Vector3::from(angular),
            stamp,
            ..Default::default()
        }
    }

    fn assert_vec6_eq(a: &Vector6<f64>, b: &Vector6<f64>) {
        for i in 0..6 {
            assert_approx_eq!(a[i], b[i]);
        }
    }

    #[test]
    fn test_first_update_is_not_integrated() {
        let tracker = OdometryTracker::default();
        tracker.update(&sample(Stamp::new(5, 0), [10.0; 3], [10.0; 3]));
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.accumulated, Vector6::zeros());
        assert_eq!(snapshot.stamp, Stamp::new(5, 0));
    }

    #[test]
    fn test_accumulates_velocity_times_dt() {
        let tracker = OdometryTracker::default();
        let updates = [
            (Stamp::new(1, 0), [9.0, 9.0, 9.0], [9.0, 9.0, 9.0]),
            (Stamp::new(1, 500_000_000), [1.0, 0.0, 0.0], [0.0, 0.0, 0.2]),
            (Stamp::new(2, 0), [1.0, 2.0, 0.0], [0.0, 0.0, -0.4]),
            (Stamp::new(4, 250_000_000), [0.5, 0.0, 1.0], [0.1, 0.0, 0.0]),
        ];
        let mut expected = Vector6::zeros();
        let mut prev: Option<Stamp> = None;
        for (stamp, linear, angular) in updates {
            let s = sample(stamp, linear, angular);
            if let Some(prev) = prev {
                expected += s.velocity() * stamp.seconds_since(&prev);
            }
            prev = Some(stamp);
            tracker.update(&s);
        }
        assert_vec6_eq(&tracker.snapshot().accumulated, &expected);
        assert_approx_eq!(expected[0], 0.5 + 0.5 + 1.125);
        assert_approx_eq!(expected[5], 0.1 - 0.2);
    }

    #[test]
    fn test_displacement_consumes_baseline() {
        let tracker = OdometryTracker::default();
        tracker.update(&sample(Stamp::new(1, 0), [0.0; 3], [0.0; 3]));
        tracker.update(&sample(Stamp::new(2, 0), [1.0, 0.0, 0.0], [0.0; 3]));

        let (d, stamp) = tracker
            .stamped_displacement(ControlFrame::Reference)
            .unwrap();
        assert_approx_eq!(d[0], 1.0);
        assert_eq!(stamp, Stamp::new(2, 0));

        let d = tracker.displacement(ControlFrame::Reference).unwrap();
        assert_eq!(d, Vector6::zeros());

        tracker.update(&sample(Stamp::new(4, 0), [0.0, -0.5, 0.0], [0.0; 3]));
        let d = tracker.displacement(ControlFrame::Reference).unwrap();
        assert_approx_eq!(d[0], 0.0);
        assert_approx_eq!(d[1], -1.0);
    }

    #[test]
    fn test_negative_dt_is_integrated_by_default() {
        let tracker = OdometryTracker::default();
        tracker.update(&sample(Stamp::new(10, 0), [0.0; 3], [0.0; 3]));
        tracker.update(&sample(Stamp::new(9, 0), [2.0, 0.0, 0.0], [0.0; 3]));
        let snapshot = tracker.snapshot();
        assert_approx_eq!(snapshot.accumulated[0], -2.0);
        assert_eq!(snapshot.stamp, Stamp::new(9, 0));
    }

    #[test]
    fn test_skip_non_monotonic() {
        let tracker = OdometryTracker::new(StampPolicy::SkipNonMonotonic);
        tracker.update(&sample(Stamp::new(10, 0), [0.0; 3], [0.0; 3]));
        let mut late = sample(Stamp::new(9, 0), [2.0, 0.0, 0.0], [0.0; 3]);
        late.position = Vector3::new(3.0, 0.0, 0.0);
        tracker.update(&late);
        tracker.update(&sample(Stamp::new(10, 0), [2.0, 0.0, 0.0], [0.0; 3]));

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.accumulated, Vector6::zeros());
        assert_eq!(snapshot.stamp, Stamp::new(10, 0));
        assert_approx_eq!(snapshot.position.x, 0.0);

        tracker.update(&sample(Stamp::new(11, 0), [2.0, 0.0, 0.0], [0.0; 3]));
        assert_approx_eq!(tracker.snapshot().accumulated[0], 2.0);
    }

    #[test]
    fn test_skip_non_monotonic_keeps_latest_pose() {
        let tracker = OdometryTracker::new(StampPolicy::SkipNonMonotonic);
        tracker.update(&sample(Stamp::new(10, 0), [0.0; 3], [0.0; 3]));
        let mut late = sample(Stamp::new(9, 0), [0.0; 3], [0.0; 3]);
        late.position = Vector3::new(3.0, 0.0, 0.0);
        tracker.update(&late);
        assert_approx_eq!(tracker.snapshot().position.x, 3.0);
    }

    #[test]
    fn test_reset() {
        let tracker = OdometryTracker::default();
        tracker.update(&sample(Stamp::new(1, 0), [1.0; 3], [1.0; 3]));
        tracker.update(&sample(Stamp::new(2, 0), [1.0; 3], [1.0; 3]));
        tracker.displacement(ControlFrame::Reference).unwrap();
        tracker.reset();
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.accumulated, Vector6::zeros());
        assert!(snapshot.stamp.is_zero());

        // first update after reset
        tracker.update(&sample(Stamp::new(7, 0), [1.0; 3], [1.0; 3]));
        assert_eq!(tracker.snapshot().accumulated, Vector6::zeros());
        assert_eq!(
            tracker.displacement(ControlFrame::Reference).unwrap(),
            Vector6::zeros()
        );
    }

    #[test]
    fn test_position() {
        let tracker = OdometryTracker::default();
        let expected = Vector3::new(0.3, -0.2, 1.1);
        let q = rotation_from_rxyz(&expected);
        tracker.update(&OdometrySample {
            position: Vector3::new(1.0, 2.0, 3.0),
            orientation: *q.quaternion(),
            ..Default::default()
        });
        let pose = tracker.position(ControlFrame::Reference).unwrap();
        assert_approx_eq!(pose[0], 1.0);
        assert_approx_eq!(pose[1], 2.0);
        assert_approx_eq!(pose[2], 3.0);
        assert_approx_eq!(pose[3], expected.x);
        assert_approx_eq!(pose[4], expected.y);
        assert_approx_eq!(pose[5], expected.z);
    }

    #[test]
    fn test_unnormalized_and_zero_orientation() {
        let tracker = OdometryTracker::default();
        let q = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.5);
        tracker.update(&OdometrySample {
            orientation: *q.quaternion() * 3.0,
            ..Default::default()
        });
        assert_approx_eq!(tracker.position(ControlFrame::Reference).unwrap()[5], 0.5);

        tracker.update(&OdometrySample {
            orientation: Quaternion::new(0.0, 0.0, 0.0, 0.0),
            ..Default::default()
        });
        let rxyz = rxyz_from_rotation(&tracker.snapshot().orientation);
        assert_eq!(rxyz, Vector3::zeros());
    }

    #[test]
    fn test_unsupported_frame_leaves_state_unchanged() {
        let tracker = OdometryTracker::default();
        tracker.update(&sample(Stamp::new(1, 0), [0.0; 3], [0.0; 3]));
        tracker.update(&sample(Stamp::new(2, 0), [1.0; 3], [1.0; 3]));
        let before = tracker.snapshot();

        for frame in [
            ControlFrame::Articular,
            ControlFrame::Camera,
            ControlFrame::EndEffector,
            ControlFrame::Mixed,
        ] {
            assert!(matches!(
                tracker.position(frame),
                Err(Error::UnsupportedFrame { .. })
            ));
            assert!(matches!(
                tracker.displacement(frame),
                Err(Error::UnsupportedFrame { .. })
            ));
            assert!(matches!(
                tracker.stamped_displacement(frame),
                Err(Error::UnsupportedFrame { .. })
            ));
        }
        assert_eq!(tracker.snapshot(), before);
        // the failed reads did not consume the baseline
        assert_approx_eq!(tracker.displacement(ControlFrame::Reference).unwrap()[0], 1.0);
    }

    #[test]
    fn test_concurrent_readers_see_consistent_pose() {
        let tracker = Arc::new(OdometryTracker::default());
        let writer = {
            let tracker = tracker.clone();
            thread::spawn(move || {
                for i in 1..2000_u32 {
                    // position.x always equals the z rotation angle
                    let angle = f64::from(i % 300) / 100.0;
                    let q = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angle);
                    tracker.update(&OdometrySample {
                        position: Vector3::new(angle, 0.0, 0.0),
                        orientation: *q.quaternion(),
                        linear: Vector3::new(1.0, 0.0, 0.0),
                        angular: Vector3::zeros(),
                        stamp: Stamp::new(i, 0),
                    });
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let tracker = tracker.clone();
                thread::spawn(move || {
                    let mut total = 0.0;
                    for _ in 0..2000 {
                        let pose = tracker.position(ControlFrame::Reference).unwrap();
                        assert!((pose[0] - pose[5]).abs() < 1e-9, "{pose:?}");
                        total += tracker.displacement(ControlFrame::Reference).unwrap()[0];
                    }
                    total
                })
            })
            .collect();
        writer.join().unwrap();
        let read: f64 = readers.into_iter().map(|r| r.join().unwrap()).sum();
        let rest = tracker.displacement(ControlFrame::Reference).unwrap()[0];
        // every increment is reported exactly once across all readers
        assert_approx_eq!(read + rest, 1998.0);
    }
}
