/// Rotation helpers shared by the frame builders
use nalgebra::{Unit, UnitQuaternion, Vector3};

use crate::error::GeometryError;

/// Vectors shorter than this are treated as zero length.
pub const EPSILON: f64 = 1e-9;

/// Normalize `v`, reporting a degenerate direction as a [`GeometryError`].
pub fn unit_direction(
    v: Vector3<f64>,
    what: &'static str,
) -> Result<Unit<Vector3<f64>>, GeometryError> {
    if !v.iter().all(|c| c.is_finite()) {
        return Err(GeometryError::NonFinite { what });
    }
    Unit::try_new(v, EPSILON).ok_or(GeometryError::ZeroLength { what })
}

/// Rotation that points local +Z along `direction`.
///
/// Local +X is `up × direction` with world +Y as up, so the frame keeps no
/// roll of its own. A direction parallel to +Y falls back to world +Z as up.
pub fn look_rotation(direction: &Unit<Vector3<f64>>) -> UnitQuaternion<f64> {
    let up = if direction.dot(&Vector3::y()).abs() > 1.0 - 1e-6 {
        Vector3::z()
    } else {
        Vector3::y()
    };
    UnitQuaternion::face_towards(&direction.into_inner(), &up)
}

/// Apply `base` first, then rotate by `angle` radians about the world-space `axis`.
pub fn rotate_about(
    base: &UnitQuaternion<f64>,
    axis: &Unit<Vector3<f64>>,
    angle: f64,
) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(axis, angle) * base
}

/// Local +Z of `orientation` expressed in world space.
pub fn local_z(orientation: &UnitQuaternion<f64>) -> Unit<Vector3<f64>> {
    orientation * Vector3::z_axis()
}

/// Distance between two rotations in quaternion space, insensitive to sign.
#[cfg(test)]
pub(crate) fn rotation_distance(a: &UnitQuaternion<f64>, b: &UnitQuaternion<f64>) -> f64 {
    let (qa, qb) = (a.quaternion().coords, b.quaternion().coords);
    (qa - qb).norm().min((qa + qb).norm())
}
