use nalgebra::{UnitQuaternion, Vector3, Vector6};

/// Below this magnitude, `R[1][2]` and `R[2][2]` are both treated as zero
/// (gimbal lock) and the first angle is fixed to zero.
const COEF_MIN_ROT: f64 = 1e-6;

/// Converts a rotation to XYZ Euler angles `[rx, ry, rz]` such that
/// `R = Rx(rx) * Ry(ry) * Rz(rz)`.
///
/// Note that this is not the same convention as
/// [`UnitQuaternion::euler_angles`], which returns angles for
/// `Rz(yaw) * Ry(pitch) * Rx(roll)`.
pub fn rxyz_from_rotation(rotation: &UnitQuaternion<f64>) -> Vector3<f64> {
    let rotation = rotation.to_rotation_matrix();
    let r = rotation.matrix();
    let rx = if r[(1, 2)].abs() < COEF_MIN_ROT && r[(2, 2)].abs() < COEF_MIN_ROT {
        0.0
    } else {
        (-r[(1, 2)]).atan2(r[(2, 2)])
    };
    let (si, co) = rx.sin_cos();
    let ry = r[(0, 2)].atan2(-si * r[(1, 2)] + co * r[(2, 2)]);
    let rz = (co * r[(1, 0)] + si * r[(2, 0)]).atan2(co * r[(1, 1)] + si * r[(2, 1)]);
    Vector3::new(rx, ry, rz)
}

/// Inverse of [`rxyz_from_rotation`].
pub fn rotation_from_rxyz(rxyz: &Vector3<f64>) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::x_axis(), rxyz.x)
        * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), rxyz.y)
        * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), rxyz.z)
}

/// Packs a position and an orientation into `[x, y, z, rx, ry, rz]`.
///
/// # Example
///
/// ```
/// use assert_approx_eq::assert_approx_eq;
/// use vsrobot::{pose_vector, UnitQuaternion, Vector3};
///
/// let q = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.5);
/// let pose = pose_vector(&Vector3::new(1.0, 2.0, 3.0), &q);
/// assert_approx_eq!(pose[0], 1.0);
/// assert_approx_eq!(pose[3], 0.0);
/// assert_approx_eq!(pose[5], 0.5);
/// ```
pub fn pose_vector(position: &Vector3<f64>, orientation: &UnitQuaternion<f64>) -> Vector6<f64> {
    let rxyz = rxyz_from_rotation(orientation);
    Vector6::new(position.x, position.y, position.z, rxyz.x, rxyz.y, rxyz.z)
}
