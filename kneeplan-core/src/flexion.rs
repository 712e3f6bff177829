/// Flexion/extension correction about the lateral axis
use crate::error::GeometryError;
use crate::frame::{Frame, Line};
use crate::transform::rotate_about;

/// Rotate the varus/valgus frame by `angle` about the lateral line.
///
/// The varus/valgus orientation is applied first and the extension rotation
/// about the fixed world-space lateral axis second, matching the varus/valgus
/// stage. The anchor is unchanged.
pub fn flexion_extension(
    varus_valgus: &Frame,
    lateral: &Line,
    angle: f64,
) -> Result<Frame, GeometryError> {
    let axis = lateral.direction()?;
    Ok(Frame::new(
        varus_valgus.anchor(),
        rotate_about(&varus_valgus.orientation(), &axis, angle),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::rotation_distance;
    use nalgebra::{Point3, Vector3};

    fn varus_valgus_frame() -> Frame {
        Frame::looking_at(Point3::new(0.1, 0.0, 0.0), Point3::new(0.1, 5.0, 0.2)).unwrap()
    }

    fn lateral_line() -> Line {
        Line::new(Point3::new(0.1, 0.0, 0.0), Point3::new(0.2, 0.0, 0.0))
    }

    #[test]
    fn test_zero_angle_is_identity() {
        let base = varus_valgus_frame();
        let frame = flexion_extension(&base, &lateral_line(), 0.0).unwrap();
        assert_eq!(frame, base);
    }

    #[test]
    fn test_rotation_about_lateral_axis() {
        let base = Frame::looking_at(Point3::origin(), Point3::new(0.0, 0.0, 1.0)).unwrap();
        let frame = flexion_extension(&base, &lateral_line(), std::f64::consts::FRAC_PI_2).unwrap();
        // +Z rotated a quarter turn about +X is -Y
        assert!((frame.normal().into_inner() + Vector3::y()).norm() < 1e-12);
        assert_eq!(frame.anchor(), base.anchor());
    }

    #[test]
    fn test_angle_and_inverse() {
        let base = varus_valgus_frame();
        let lateral = lateral_line();
        let bent = flexion_extension(&base, &lateral, -0.4).unwrap();
        let back = flexion_extension(&bent, &lateral, 0.4).unwrap();
        assert!(rotation_distance(&back.orientation(), &base.orientation()) < 1e-12);
    }

    #[test]
    fn test_collapsed_lateral_line() {
        let base = varus_valgus_frame();
        let collapsed = Line::new(base.anchor(), base.anchor());
        assert!(flexion_extension(&base, &collapsed, 0.1).is_err());
    }
}
