/// Anterior reference line derived from the epicondyles
use nalgebra::{Point3, Unit, Vector3};

use crate::config::LimbSide;
use crate::error::GeometryError;
use crate::frame::{Frame, Line};
use crate::transform::unit_direction;

/// The cached basis of the anterior line.
///
/// Only depends on landmarks, so length changes reuse it instead of
/// re-deriving the direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnteriorReference {
    start: Point3<f64>,
    direction: Unit<Vector3<f64>>,
    projected_epicondyles: Line,
}

impl AnteriorReference {
    /// Project both epicondyles onto the mechanical-axis plane and take the
    /// direction perpendicular to the projected epicondylar line within it.
    pub fn derive(
        axis: &Frame,
        medial_epicondyle: Point3<f64>,
        lateral_epicondyle: Point3<f64>,
        side: LimbSide,
    ) -> Result<Self, GeometryError> {
        let plane = axis.plane();
        let projected = Line::new(
            plane.project(&medial_epicondyle),
            plane.project(&lateral_epicondyle),
        );
        let across = projected.end - projected.start;
        let direction = unit_direction(
            across.cross(&axis.normal().into_inner()) * side.sign(),
            "anterior direction",
        )?;

        Ok(Self {
            start: axis.anchor(),
            direction,
            projected_epicondyles: projected,
        })
    }

    pub fn start(&self) -> Point3<f64> {
        self.start
    }

    /// Cross-product direction; the anterior line runs opposite to it.
    pub fn direction(&self) -> Unit<Vector3<f64>> {
        self.direction
    }

    /// Medial and lateral epicondyles projected onto the mechanical-axis plane.
    pub fn projected_epicondyles(&self) -> Line {
        self.projected_epicondyles
    }

    /// The anterior line for a given length parameter, scaled by `unit_scale`.
    pub fn line(&self, length: f64, unit_scale: f64) -> Line {
        let offset = self.direction.into_inner() * (-length * unit_scale);
        Line::new(self.start, self.start + offset)
    }
}
