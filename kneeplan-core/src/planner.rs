/// The landmark-driven planning chain and its immutable snapshots
use std::sync::Arc;

use nalgebra::Point3;

use crate::anterior::AnteriorReference;
use crate::axis::mechanical_axis_frame;
use crate::config::{PlanParameters, PlannerConfig};
use crate::controls::Adjustment;
use crate::cutting::CuttingSolid;
use crate::distal::{distal_medial_plane, distal_resection_plane, ResectionPlane};
use crate::error::{GeometryError, LandmarkError};
use crate::flexion::flexion_extension;
use crate::frame::{Frame, Line};
use crate::landmark::{Landmark, LandmarkStore};
use crate::varus_valgus::{varus_valgus, VarusValgus};

/// Reference lines handed to the renderer, in drawing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceLine {
    MechanicalAxis,
    CanalAxis,
    Epicondylar,
    PosteriorCondylar,
    ProjectedEpicondylar,
    Anterior,
    Lateral,
    ProjectedAnterior,
}

impl ReferenceLine {
    pub const ALL: [ReferenceLine; 8] = [
        ReferenceLine::MechanicalAxis,
        ReferenceLine::CanalAxis,
        ReferenceLine::Epicondylar,
        ReferenceLine::PosteriorCondylar,
        ReferenceLine::ProjectedEpicondylar,
        ReferenceLine::Anterior,
        ReferenceLine::Lateral,
        ReferenceLine::ProjectedAnterior,
    ];

    /// Landmark pair for lines drawn straight between two placed landmarks.
    fn endpoints(self) -> Option<(Landmark, Landmark)> {
        match self {
            ReferenceLine::MechanicalAxis => Some((Landmark::FemurCenter, Landmark::HipCenter)),
            ReferenceLine::CanalAxis => {
                Some((Landmark::FemurProximalCanal, Landmark::FemurDistalCanal))
            }
            ReferenceLine::Epicondylar => {
                Some((Landmark::MedialEpicondyle, Landmark::LateralEpicondyle))
            }
            ReferenceLine::PosteriorCondylar => {
                Some((Landmark::PosteriorMedialPt, Landmark::PosteriorLateralPt))
            }
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ReferenceLine::MechanicalAxis => "mechanical axis",
            ReferenceLine::CanalAxis => "canal axis",
            ReferenceLine::Epicondylar => "epicondylar",
            ReferenceLine::PosteriorCondylar => "posterior condylar",
            ReferenceLine::ProjectedEpicondylar => "projected epicondylar",
            ReferenceLine::Anterior => "anterior",
            ReferenceLine::Lateral => "lateral",
            ReferenceLine::ProjectedAnterior => "projected anterior",
        }
    }
}

/// The five derived planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneKind {
    MechanicalAxis,
    VarusValgus,
    FlexionExtension,
    DistalMedial,
    DistalResection,
}

impl PlaneKind {
    pub const ALL: [PlaneKind; 5] = [
        PlaneKind::MechanicalAxis,
        PlaneKind::VarusValgus,
        PlaneKind::FlexionExtension,
        PlaneKind::DistalMedial,
        PlaneKind::DistalResection,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PlaneKind::MechanicalAxis => "mechanical axis",
            PlaneKind::VarusValgus => "varus/valgus",
            PlaneKind::FlexionExtension => "flexion/extension",
            PlaneKind::DistalMedial => "distal medial",
            PlaneKind::DistalResection => "distal resection",
        }
    }
}

/// Which stages of a snapshot are available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readiness {
    pub mechanical_axis: bool,
    pub anterior: bool,
    pub varus_valgus: bool,
    pub flexion_extension: bool,
    pub distal_medial: bool,
    pub distal_resection: bool,
    pub cutting_solid: bool,
}

impl Readiness {
    pub fn is_complete(&self) -> bool {
        self.cutting_solid
    }

    pub fn plane(&self, kind: PlaneKind) -> bool {
        match kind {
            PlaneKind::MechanicalAxis => self.mechanical_axis,
            PlaneKind::VarusValgus => self.varus_valgus,
            PlaneKind::FlexionExtension => self.flexion_extension,
            PlaneKind::DistalMedial => self.distal_medial,
            PlaneKind::DistalResection => self.distal_resection,
        }
    }
}

/// One fully computed state of the chain.
///
/// Every stage is either complete or absent; a stage is only present when all
/// of its prerequisites are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanSnapshot {
    pub revision: u64,
    /// Lines drawn directly between placed landmark pairs.
    pub landmark_lines: Vec<(ReferenceLine, Line)>,
    pub mechanical_axis: Option<Frame>,
    pub projected_epicondyles: Option<Line>,
    pub anterior: Option<Line>,
    pub varus_valgus: Option<VarusValgus>,
    pub flexion_extension: Option<Frame>,
    pub distal_medial: Option<Frame>,
    pub resection: Option<ResectionPlane>,
    pub cutting_solid: Option<CuttingSolid>,
}

impl PlanSnapshot {
    pub fn readiness(&self) -> Readiness {
        Readiness {
            mechanical_axis: self.mechanical_axis.is_some(),
            anterior: self.anterior.is_some(),
            varus_valgus: self.varus_valgus.is_some(),
            flexion_extension: self.flexion_extension.is_some(),
            distal_medial: self.distal_medial.is_some(),
            distal_resection: self.resection.is_some(),
            cutting_solid: self.cutting_solid.is_some(),
        }
    }

    pub fn frame(&self, kind: PlaneKind) -> Option<Frame> {
        match kind {
            PlaneKind::MechanicalAxis => self.mechanical_axis,
            PlaneKind::VarusValgus => self.varus_valgus.map(|vv| vv.frame),
            PlaneKind::FlexionExtension => self.flexion_extension,
            PlaneKind::DistalMedial => self.distal_medial,
            PlaneKind::DistalResection => self.resection.map(|r| r.frame),
        }
    }

    pub fn line(&self, kind: ReferenceLine) -> Option<Line> {
        match kind {
            ReferenceLine::ProjectedEpicondylar => self.projected_epicondyles,
            ReferenceLine::Anterior => self.anterior,
            ReferenceLine::Lateral => self.varus_valgus.map(|vv| vv.lateral),
            ReferenceLine::ProjectedAnterior => self.varus_valgus.map(|vv| vv.projected_anterior),
            _ => self
                .landmark_lines
                .iter()
                .find(|(k, _)| *k == kind)
                .map(|(_, line)| *line),
        }
    }

    /// All available lines in drawing order.
    pub fn lines(&self) -> Vec<(ReferenceLine, Line)> {
        ReferenceLine::ALL
            .iter()
            .filter_map(|&kind| self.line(kind).map(|line| (kind, line)))
            .collect()
    }
}

/// Everything the chain is computed from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanInputs {
    pub landmarks: LandmarkStore,
    pub parameters: PlanParameters,
}

/// Compute a full snapshot from scratch.
pub fn derive_plan(config: &PlannerConfig, inputs: &PlanInputs) -> PlanSnapshot {
    let anterior = derive_anterior(config, &inputs.landmarks);
    assemble(config, inputs, anterior.as_ref(), 0)
}

fn stage<T>(name: &str, result: Result<T, GeometryError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("{name} unavailable: {err}");
            None
        }
    }
}

fn landmark_lines(landmarks: &LandmarkStore) -> Vec<(ReferenceLine, Line)> {
    ReferenceLine::ALL
        .iter()
        .filter_map(|&kind| {
            let (a, b) = kind.endpoints()?;
            Some((kind, Line::new(landmarks.get(a)?, landmarks.get(b)?)))
        })
        .collect()
}

fn derive_anterior(config: &PlannerConfig, landmarks: &LandmarkStore) -> Option<AnteriorReference> {
    let femur_center = landmarks.get(Landmark::FemurCenter)?;
    let hip_center = landmarks.get(Landmark::HipCenter)?;
    let medial = landmarks.get(Landmark::MedialEpicondyle)?;
    let lateral = landmarks.get(Landmark::LateralEpicondyle)?;
    // A degenerate axis is reported when the chain is assembled.
    let axis = mechanical_axis_frame(femur_center, hip_center).ok()?;
    stage(
        "anterior reference",
        AnteriorReference::derive(&axis, medial, lateral, config.limb_side),
    )
}

fn assemble(
    config: &PlannerConfig,
    inputs: &PlanInputs,
    anterior: Option<&AnteriorReference>,
    revision: u64,
) -> PlanSnapshot {
    let landmarks = &inputs.landmarks;
    let params = &inputs.parameters;
    let scale = config.unit_scale;

    let mut plan = PlanSnapshot {
        revision,
        landmark_lines: landmark_lines(landmarks),
        ..PlanSnapshot::default()
    };

    let (Some(femur_center), Some(hip_center)) = (
        landmarks.get(Landmark::FemurCenter),
        landmarks.get(Landmark::HipCenter),
    ) else {
        return plan;
    };
    let Some(axis) = stage("mechanical axis", mechanical_axis_frame(femur_center, hip_center))
    else {
        return plan;
    };
    plan.mechanical_axis = Some(axis);

    let Some(anterior) = anterior else {
        return plan;
    };
    let anterior_line = anterior.line(params.anterior_line_length, scale);
    plan.projected_epicondyles = Some(anterior.projected_epicondyles());
    plan.anterior = Some(anterior_line);

    let Some(vv) = stage(
        "varus/valgus plane",
        varus_valgus(
            &axis,
            &anterior_line,
            femur_center,
            config.limb_side.oriented(params.varus_valgus_angle),
            params.lateral_line_length,
            scale,
            config.limb_side,
        ),
    ) else {
        return plan;
    };
    plan.varus_valgus = Some(vv);

    let Some(fe) = stage(
        "flexion/extension plane",
        flexion_extension(
            &vv.frame,
            &vv.lateral,
            config.limb_side.oriented(params.extension_angle),
        ),
    ) else {
        return plan;
    };
    plan.flexion_extension = Some(fe);

    let Some(distal_medial_pt) = landmarks.get(Landmark::DistalMedialPt) else {
        return plan;
    };
    let distal_medial = distal_medial_plane(&fe, distal_medial_pt);
    plan.distal_medial = Some(distal_medial);

    let resection = distal_resection_plane(&distal_medial, fe.normal(), params.resection_depth, scale);
    plan.resection = Some(resection);

    if let Some(reference) = landmarks.get(config.cutter.reference) {
        plan.cutting_solid = Some(CuttingSolid::build(&resection, &config.cutter, reference));
    }

    plan
}

/// Owns the planning inputs and recomputes the chain whenever they change.
///
/// Each recompute publishes a new snapshot with a higher revision; earlier
/// snapshots held by consumers stay valid and unchanged.
#[derive(Debug)]
pub struct Planner {
    config: PlannerConfig,
    inputs: PlanInputs,
    /// Anterior basis and the landmarks it was derived from.
    anterior_cache: Option<(LandmarkStore, Option<AnteriorReference>)>,
    revision: u64,
    snapshot: Arc<PlanSnapshot>,
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Self {
        let parameters = config.defaults.clamped(&config.limits);
        Self::with_inputs(
            config,
            PlanInputs {
                landmarks: LandmarkStore::new(),
                parameters,
            },
        )
    }

    pub fn with_inputs(config: PlannerConfig, inputs: PlanInputs) -> Self {
        let mut planner = Self {
            config,
            inputs,
            anterior_cache: None,
            revision: 0,
            snapshot: Arc::new(PlanSnapshot::default()),
        };
        planner.recompute();
        planner
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn inputs(&self) -> &PlanInputs {
        &self.inputs
    }

    pub fn landmarks(&self) -> &LandmarkStore {
        &self.inputs.landmarks
    }

    pub fn parameters(&self) -> &PlanParameters {
        &self.inputs.parameters
    }

    /// The latest snapshot.
    pub fn snapshot(&self) -> Arc<PlanSnapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn place_landmark(
        &mut self,
        landmark: Landmark,
        position: Point3<f64>,
    ) -> Result<(), LandmarkError> {
        self.inputs.landmarks.place(landmark, position)?;
        self.recompute();
        Ok(())
    }

    pub fn clear_landmark(&mut self, landmark: Landmark) {
        if self.inputs.landmarks.clear(landmark).is_some() {
            self.recompute();
        }
    }

    pub fn set_landmarks(&mut self, landmarks: LandmarkStore) {
        self.inputs.landmarks = landmarks;
        self.recompute();
    }

    pub fn set_parameters(&mut self, parameters: PlanParameters) {
        self.inputs.parameters = parameters.clamped(&self.config.limits);
        self.recompute();
    }

    pub fn adjust(&mut self, adjustment: Adjustment) {
        self.inputs.parameters = self
            .inputs
            .parameters
            .adjusted(adjustment, &self.config.limits);
        self.recompute();
    }

    /// Apply several edits and recompute once.
    pub fn update(&mut self, edit: impl FnOnce(&mut PlanInputs)) {
        edit(&mut self.inputs);
        self.inputs.parameters = self.inputs.parameters.clamped(&self.config.limits);
        self.recompute();
    }

    fn anterior_reference(&mut self) -> Option<AnteriorReference> {
        if let Some((source, cached)) = &self.anterior_cache {
            if *source == self.inputs.landmarks {
                return *cached;
            }
        }
        let derived = derive_anterior(&self.config, &self.inputs.landmarks);
        self.anterior_cache = Some((self.inputs.landmarks.clone(), derived));
        derived
    }

    fn recompute(&mut self) {
        self.revision += 1;
        let anterior = self.anterior_reference();
        let snapshot = assemble(&self.config, &self.inputs, anterior.as_ref(), self.revision);
        log::debug!(
            "plan revision {}: {:?}",
            snapshot.revision,
            snapshot.readiness()
        );
        self.snapshot = Arc::new(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_landmarks() -> LandmarkStore {
        let mut store = LandmarkStore::new();
        let points = [
            (Landmark::FemurCenter, Point3::new(0.0, 0.0, 0.0)),
            (Landmark::HipCenter, Point3::new(0.1, 10.0, -0.2)),
            (Landmark::FemurProximalCanal, Point3::new(0.0, 3.0, 0.1)),
            (Landmark::FemurDistalCanal, Point3::new(0.0, 0.5, 0.1)),
            (Landmark::MedialEpicondyle, Point3::new(-1.0, 0.1, 0.2)),
            (Landmark::LateralEpicondyle, Point3::new(1.0, -0.1, 0.1)),
            (Landmark::DistalMedialPt, Point3::new(-0.5, -0.6, 0.2)),
            (Landmark::DistalLateralPt, Point3::new(0.5, -0.6, 0.2)),
            (Landmark::PosteriorMedialPt, Point3::new(-0.5, -0.3, -0.6)),
            (Landmark::PosteriorLateralPt, Point3::new(0.5, -0.3, -0.6)),
        ];
        for (landmark, p) in points {
            store.place(landmark, p).unwrap();
        }
        store
    }

    fn planner() -> Planner {
        let mut planner = Planner::new(PlannerConfig::default());
        planner.set_landmarks(full_landmarks());
        planner
    }

    #[test]
    fn test_complete_chain() {
        let snapshot = planner().snapshot();
        let readiness = snapshot.readiness();
        assert!(readiness.is_complete());
        assert_eq!(snapshot.lines().len(), ReferenceLine::ALL.len());
        for kind in PlaneKind::ALL {
            assert!(snapshot.frame(kind).is_some(), "{} missing", kind.name());
        }
    }

    #[test]
    fn test_empty_planner_has_nothing() {
        let planner = Planner::new(PlannerConfig::default());
        let snapshot = planner.snapshot();
        assert_eq!(snapshot.readiness(), Readiness::default());
        assert!(snapshot.lines().is_empty());
        assert_eq!(snapshot.revision, 1);
    }

    #[test]
    fn test_every_change_bumps_revision() {
        let mut planner = planner();
        let before = planner.snapshot();
        planner.adjust(Adjustment::VarusValgus(1.0));
        let after = planner.snapshot();
        assert_eq!(after.revision, before.revision + 1);
        // The earlier snapshot is untouched.
        assert_ne!(before.varus_valgus, after.varus_valgus);
        assert_eq!(before.mechanical_axis, after.mechanical_axis);
    }

    #[test]
    fn test_batched_update_is_one_revision() {
        let mut planner = Planner::new(PlannerConfig::default());
        let start = planner.revision();
        planner.update(|inputs| {
            inputs.landmarks = full_landmarks();
            inputs.parameters.varus_valgus_angle = 0.1;
            inputs.parameters.extension_angle = -0.05;
        });
        assert_eq!(planner.revision(), start + 1);
        assert!(planner.snapshot().readiness().is_complete());
    }

    #[test]
    fn test_missing_distal_medial_stops_at_flexion() {
        let mut planner = planner();
        planner.clear_landmark(Landmark::DistalMedialPt);
        let readiness = planner.snapshot().readiness();
        assert!(readiness.flexion_extension);
        assert!(!readiness.distal_medial);
        assert!(!readiness.distal_resection);
        assert!(!readiness.cutting_solid);
    }

    #[test]
    fn test_missing_reference_skips_only_cutter() {
        let config = PlannerConfig {
            cutter: crate::config::CutterConfig {
                reference: Landmark::DistalLateralPt,
                ..Default::default()
            },
            ..PlannerConfig::default()
        };
        let mut landmarks = full_landmarks();
        landmarks.clear(Landmark::DistalLateralPt);
        let planner = Planner::with_inputs(
            config,
            PlanInputs {
                landmarks,
                parameters: PlanParameters::default(),
            },
        );
        let readiness = planner.snapshot().readiness();
        assert!(readiness.distal_resection);
        assert!(!readiness.cutting_solid);
    }

    #[test]
    fn test_degenerate_epicondyles_keep_axis() {
        let mut planner = planner();
        planner
            .place_landmark(Landmark::LateralEpicondyle, Point3::new(-1.0, 0.1, 0.2))
            .unwrap();
        let snapshot = planner.snapshot();
        assert!(snapshot.mechanical_axis.is_some());
        assert!(snapshot.anterior.is_none());
        assert!(snapshot.varus_valgus.is_none());
        // Raw landmark lines are independent of the failed stage.
        assert!(snapshot.line(ReferenceLine::Epicondylar).is_some());
        assert!(snapshot.line(ReferenceLine::CanalAxis).is_some());
    }

    #[test]
    fn test_length_change_reuses_anterior_direction() {
        let mut planner = planner();
        let before = planner.snapshot().anterior.unwrap();
        planner.adjust(Adjustment::AnteriorLength(20.0));
        let after = planner.snapshot().anterior.unwrap();

        assert_eq!(planner.parameters().anterior_line_length, 20.0);
        assert_eq!(before.start, after.start);
        let (d0, d1) = (before.direction().unwrap(), after.direction().unwrap());
        assert!((d0.into_inner() - d1.into_inner()).norm() < 1e-12);
        assert!((after.length() - 2.0 * before.length()).abs() < 1e-12);
    }

    #[test]
    fn test_derive_plan_matches_planner() {
        let planner = planner();
        let fresh = derive_plan(planner.config(), planner.inputs());
        let published = planner.snapshot();
        assert_eq!(fresh.cutting_solid, published.cutting_solid);
        assert_eq!(fresh.lines(), published.lines());
    }
}
