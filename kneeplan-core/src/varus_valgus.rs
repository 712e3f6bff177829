/// Varus/valgus correction and the lateral reference line
use nalgebra::Point3;

use crate::config::LimbSide;
use crate::error::GeometryError;
use crate::frame::{Frame, Line};
use crate::transform::{rotate_about, unit_direction};

/// Output of the varus/valgus stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarusValgus {
    pub frame: Frame,
    /// The anterior line projected onto the corrected plane.
    pub projected_anterior: Line,
    /// Runs from the projected femur center toward the lateral side.
    pub lateral: Line,
}

/// Rotate the mechanical-axis frame about the anterior line by `angle`.
///
/// The corrected frame is anchored at the anterior line's start. The lateral
/// line is rebuilt from scratch within the corrected plane, perpendicular to
/// the projected anterior line, with reach `lateral_length * unit_scale`.
pub fn varus_valgus(
    base: &Frame,
    anterior: &Line,
    femur_center: Point3<f64>,
    angle: f64,
    lateral_length: f64,
    unit_scale: f64,
    side: LimbSide,
) -> Result<VarusValgus, GeometryError> {
    let axis = anterior.direction()?;
    let frame = Frame::new(
        anterior.start,
        rotate_about(&base.orientation(), &axis, angle),
    );

    let plane = frame.plane();
    let projected_anterior = anterior.projected(&plane);
    let along = projected_anterior.direction()?;
    let perpendicular = unit_direction(
        frame.normal().cross(&along.into_inner()) * side.sign(),
        "lateral direction",
    )?;

    let start = plane.project(&femur_center);
    let end = start + perpendicular.into_inner() * (lateral_length * unit_scale);

    Ok(VarusValgus {
        frame,
        projected_anterior,
        lateral: Line::new(start, end),
    })
}
