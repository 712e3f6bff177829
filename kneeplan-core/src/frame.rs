/// Immutable reference frames and reference lines
use nalgebra::{Isometry3, Point3, Translation3, Unit, UnitQuaternion, Vector3};

use crate::error::GeometryError;
use crate::projection::Plane;
use crate::transform::{local_z, look_rotation, unit_direction};

/// An anchored, oriented reference plane.
///
/// The normal is always the orientation's local +Z in world space. Frames
/// are never mutated; every parameter change produces a new one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    anchor: Point3<f64>,
    orientation: UnitQuaternion<f64>,
    normal: Unit<Vector3<f64>>,
}

impl Frame {
    pub fn new(anchor: Point3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        Self {
            anchor,
            orientation,
            normal: local_z(&orientation),
        }
    }

    /// Frame at `anchor` whose local +Z points at `target`.
    pub fn looking_at(anchor: Point3<f64>, target: Point3<f64>) -> Result<Self, GeometryError> {
        let direction = unit_direction(target - anchor, "frame direction")?;
        Ok(Self::new(anchor, look_rotation(&direction)))
    }

    pub fn anchor(&self) -> Point3<f64> {
        self.anchor
    }

    pub fn orientation(&self) -> UnitQuaternion<f64> {
        self.orientation
    }

    pub fn normal(&self) -> Unit<Vector3<f64>> {
        self.normal
    }

    pub fn plane(&self) -> Plane {
        Plane::new(self.anchor, self.normal)
    }

    /// Same orientation, different anchor.
    pub fn with_anchor(&self, anchor: Point3<f64>) -> Self {
        Self::new(anchor, self.orientation)
    }

    /// Local-to-world transform.
    pub fn isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.anchor.coords), self.orientation)
    }

    /// Corners of a `size × size` display quad centered on the anchor, counter-clockwise
    /// around the normal.
    pub fn corners(&self, size: f64) -> [Point3<f64>; 4] {
        let half = size / 2.0;
        let iso = self.isometry();
        [
            iso * Point3::new(-half, -half, 0.0),
            iso * Point3::new(half, -half, 0.0),
            iso * Point3::new(half, half, 0.0),
            iso * Point3::new(-half, half, 0.0),
        ]
    }
}

/// An ordered pair of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

impl Line {
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self { start, end }
    }

    pub fn direction(&self) -> Result<Unit<Vector3<f64>>, GeometryError> {
        unit_direction(self.end - self.start, "line direction")
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Both endpoints projected onto `plane`.
    pub fn projected(&self, plane: &Plane) -> Self {
        Self::new(plane.project(&self.start), plane.project(&self.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_follows_orientation() {
        let frame = Frame::looking_at(Point3::new(1.0, 1.0, 1.0), Point3::new(1.0, 1.0, 5.0)).unwrap();
        assert!((frame.normal().into_inner() - Vector3::z()).norm() < 1e-12);

        let moved = frame.with_anchor(Point3::origin());
        assert_eq!(moved.orientation(), frame.orientation());
        assert_eq!(moved.anchor(), Point3::origin());
    }

    #[test]
    fn test_looking_at_self_fails() {
        let p = Point3::new(2.0, 3.0, 4.0);
        assert!(Frame::looking_at(p, p).is_err());
    }

    #[test]
    fn test_corners_lie_in_plane() {
        let frame = Frame::looking_at(Point3::new(0.5, -1.0, 2.0), Point3::new(3.0, 1.0, 0.0)).unwrap();
        let plane = frame.plane();
        for corner in frame.corners(5.0) {
            assert!(plane.signed_distance(&corner).abs() < 1e-12);
            assert!(((corner - frame.anchor()).norm() - 5.0 / 2f64.sqrt()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_line_direction() {
        let line = Line::new(Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 0.0, -3.0));
        assert!((line.direction().unwrap().into_inner() + Vector3::z()).norm() < 1e-12);
        assert_eq!(line.length(), 3.0);
        assert!(Line::new(line.start, line.start).direction().is_err());
    }
}
