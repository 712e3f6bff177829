/// Planes and orthogonal projection onto them
use nalgebra::{Point3, Unit, Vector3};

use crate::error::GeometryError;
use crate::transform::unit_direction;

/// An infinite plane through `anchor` with unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    anchor: Point3<f64>,
    normal: Unit<Vector3<f64>>,
}

impl Plane {
    pub fn new(anchor: Point3<f64>, normal: Unit<Vector3<f64>>) -> Self {
        Self { anchor, normal }
    }

    /// Build a plane from an arbitrary-length normal.
    pub fn from_normal(anchor: Point3<f64>, normal: Vector3<f64>) -> Result<Self, GeometryError> {
        Ok(Self::new(anchor, unit_direction(normal, "plane normal")?))
    }

    pub fn anchor(&self) -> Point3<f64> {
        self.anchor
    }

    pub fn normal(&self) -> Unit<Vector3<f64>> {
        self.normal
    }

    /// Signed distance of `point` along the normal.
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        (point - self.anchor).dot(&self.normal.into_inner())
    }

    /// Project `point` onto the plane along its normal.
    ///
    /// Equivalent to intersecting the ray from `point` along `-normal` with the
    /// plane, but also defined for points behind the plane.
    pub fn project(&self, point: &Point3<f64>) -> Point3<f64> {
        point - self.normal.into_inner() * self.signed_distance(point)
    }
}

/// Project `point` onto the plane through `anchor` with the given `normal`.
pub fn project_point(
    point: &Point3<f64>,
    anchor: &Point3<f64>,
    normal: &Vector3<f64>,
) -> Result<Point3<f64>, GeometryError> {
    Ok(Plane::from_normal(*anchor, *normal)?.project(point))
}
