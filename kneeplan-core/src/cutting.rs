/// Cutting solid laid against the distal resection plane
use nalgebra::{Isometry3, Point3, Translation3, Unit, Vector3};

use crate::config::CutterConfig;
use crate::distal::ResectionPlane;
use crate::geometry::Mesh;
use crate::transform::look_rotation;

/// A box volume for boolean subtraction against the bone surface.
///
/// Local geometry spans `z ∈ [-depth, 0]`; the placement puts local `z = 0`
/// on the resection plane with local +Z facing the reference point, so the
/// solid covers the side of the plane away from it.
#[derive(Debug, Clone, PartialEq)]
pub struct CuttingSolid {
    local: Mesh,
    placement: Isometry3<f64>,
    size: f64,
    depth: f64,
}

impl CuttingSolid {
    /// Build the solid for `plane`, facing `reference`.
    ///
    /// The caller must only invoke this once the resection plane exists.
    pub fn build(plane: &ResectionPlane, cutter: &CutterConfig, reference: Point3<f64>) -> Self {
        let local = Mesh::cuboid(cutter.size, cutter.size, cutter.depth)
            .translated(&Vector3::new(0.0, 0.0, -cutter.depth / 2.0));

        let anchor = plane.frame.anchor();
        let facing = if plane.normal.dot(&(reference - anchor)) < 0.0 {
            Unit::new_unchecked(-plane.normal.into_inner())
        } else {
            plane.normal
        };
        let placement = Isometry3::from_parts(
            Translation3::from(anchor.coords),
            look_rotation(&facing),
        );

        Self {
            local,
            placement,
            size: cutter.size,
            depth: cutter.depth,
        }
    }

    /// Untransformed box geometry.
    pub fn local_mesh(&self) -> &Mesh {
        &self.local
    }

    /// Local-to-world transform of the solid.
    pub fn placement(&self) -> &Isometry3<f64> {
        &self.placement
    }

    /// Direction from the flush face into the solid, in world space.
    pub fn extrusion_direction(&self) -> Unit<Vector3<f64>> {
        Unit::new_unchecked(-(self.placement.rotation * Vector3::z()))
    }

    /// The solid with its placement baked into vertex data.
    pub fn world_mesh(&self) -> Mesh {
        self.local.transformed(&self.placement)
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }
}
