/// Distal medial and distal resection planes
use nalgebra::{Point3, Unit, Vector3};

use crate::frame::Frame;
use crate::transform::look_rotation;

/// Re-anchor the flexion/extension plane at the distal medial landmark.
///
/// The orientation is rebuilt by looking along the parent normal, so the two
/// planes stay parallel while the roll is reset.
pub fn distal_medial_plane(flexion_extension: &Frame, distal_medial: Point3<f64>) -> Frame {
    Frame::new(distal_medial, look_rotation(&flexion_extension.normal()))
}

/// The distal resection plane and the normal it was offset along.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResectionPlane {
    pub frame: Frame,
    /// Flexion/extension normal; the cutting solid is laid against it.
    pub normal: Unit<Vector3<f64>>,
    /// Offset from the distal medial plane in scene units.
    pub offset: f64,
}

/// Offset the distal medial plane by `depth * unit_scale` along `normal`.
///
/// `depth` is expected to be clamped by the caller.
pub fn distal_resection_plane(
    distal_medial: &Frame,
    normal: Unit<Vector3<f64>>,
    depth: f64,
    unit_scale: f64,
) -> ResectionPlane {
    let offset = depth * unit_scale;
    let anchor = distal_medial.anchor() + normal.into_inner() * offset;
    ResectionPlane {
        frame: Frame::new(anchor, distal_medial.orientation()),
        normal,
        offset,
    }
}
