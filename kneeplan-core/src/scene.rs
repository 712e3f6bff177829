/// What a renderer receives from a plan snapshot
use nalgebra::Point3;

use crate::cutting::CuttingSolid;
use crate::frame::{Frame, Line};
use crate::planner::{PlanSnapshot, PlaneKind, ReferenceLine};

/// Per-plane visibility toggles. All planes start hidden.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaneVisibility {
    pub mechanical_axis: bool,
    pub varus_valgus: bool,
    pub flexion_extension: bool,
    pub distal_medial: bool,
    pub distal_resection: bool,
}

impl PlaneVisibility {
    pub fn all() -> Self {
        Self {
            mechanical_axis: true,
            varus_valgus: true,
            flexion_extension: true,
            distal_medial: true,
            distal_resection: true,
        }
    }

    pub fn is_visible(&self, kind: PlaneKind) -> bool {
        *self.slot(kind)
    }

    pub fn set(&mut self, kind: PlaneKind, visible: bool) {
        *self.slot_mut(kind) = visible;
    }

    pub fn toggle(&mut self, kind: PlaneKind) {
        let slot = self.slot_mut(kind);
        *slot = !*slot;
    }

    fn slot(&self, kind: PlaneKind) -> &bool {
        match kind {
            PlaneKind::MechanicalAxis => &self.mechanical_axis,
            PlaneKind::VarusValgus => &self.varus_valgus,
            PlaneKind::FlexionExtension => &self.flexion_extension,
            PlaneKind::DistalMedial => &self.distal_medial,
            PlaneKind::DistalResection => &self.distal_resection,
        }
    }

    fn slot_mut(&mut self, kind: PlaneKind) -> &mut bool {
        match kind {
            PlaneKind::MechanicalAxis => &mut self.mechanical_axis,
            PlaneKind::VarusValgus => &mut self.varus_valgus,
            PlaneKind::FlexionExtension => &mut self.flexion_extension,
            PlaneKind::DistalMedial => &mut self.distal_medial,
            PlaneKind::DistalResection => &mut self.distal_resection,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DisplayOptions {
    pub planes: PlaneVisibility,
    /// Show the resected bone instead of the intact one.
    pub resection: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenePlane {
    pub kind: PlaneKind,
    pub frame: Frame,
    pub corners: [Point3<f64>; 4],
}

/// Renderable output of one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneOutput<'a> {
    pub revision: u64,
    pub lines: Vec<(ReferenceLine, Line)>,
    pub planes: Vec<ScenePlane>,
    pub cutting_solid: Option<&'a CuttingSolid>,
}

impl<'a> SceneOutput<'a> {
    pub fn build(snapshot: &'a PlanSnapshot, display: &DisplayOptions, plane_size: f64) -> Self {
        let planes = PlaneKind::ALL
            .iter()
            .filter(|&&kind| display.planes.is_visible(kind))
            .filter_map(|&kind| {
                snapshot.frame(kind).map(|frame| ScenePlane {
                    kind,
                    frame,
                    corners: frame.corners(plane_size),
                })
            })
            .collect();

        Self {
            revision: snapshot.revision,
            lines: snapshot.lines(),
            planes,
            cutting_solid: snapshot
                .cutting_solid
                .as_ref()
                .filter(|_| display.resection),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.planes.is_empty() && self.cutting_solid.is_none()
    }
}
