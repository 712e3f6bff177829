/// Mechanical-axis frame derived from the femur and hip centers
use nalgebra::Point3;

use crate::error::GeometryError;
use crate::frame::Frame;
use crate::transform::{look_rotation, unit_direction};

/// Frame anchored at the femur center whose normal points at the hip center.
///
/// Fails when the two landmarks coincide.
pub fn mechanical_axis_frame(
    femur_center: Point3<f64>,
    hip_center: Point3<f64>,
) -> Result<Frame, GeometryError> {
    let direction = unit_direction(hip_center - femur_center, "mechanical axis")?;
    Ok(Frame::new(femur_center, look_rotation(&direction)))
}
