use std::f64::consts::PI;

use kneeplan_core::{
    derive_plan, Adjustment, DisplayOptions, Landmark, LandmarkStore, LimbSide, PlanInputs,
    PlanParameters, PlaneKind, PlaneVisibility, Planner, PlannerConfig, ReferenceLine,
    SceneOutput,
};
use nalgebra::{Point3, Vector3};

const LANDMARKS: &str = r#"{
    "Femur Center": [0.0, 0.0, 0.0],
    "Hip Center": [0.0, 10.0, 0.0],
    "Femur Proximal Canal": [0.02, 2.5, 0.05],
    "Femur Distal Canal": [0.01, 0.8, 0.04],
    "Medial Epicondyle": [-1.0, 0.0, 1.0],
    "Lateral Epicondyle": [1.0, 0.0, 1.0],
    "Distal Medial Pt": [-0.4, -0.5, 0.6],
    "Distal Lateral Pt": [0.4, -0.5, 0.6],
    "Posterior Medial Pt": [-0.5, -0.2, -0.3],
    "Posterior Lateral Pt": [0.5, -0.2, -0.3]
}"#;

fn planner() -> Planner {
    let mut planner = Planner::new(PlannerConfig::default());
    planner.set_landmarks(LandmarkStore::from_json_str(LANDMARKS).unwrap());
    planner
}

#[test]
fn test_mechanical_axis_points_at_hip() {
    let snapshot = planner().snapshot();
    let axis = snapshot.mechanical_axis.unwrap();
    assert_eq!(axis.anchor(), Point3::origin());
    assert!((axis.normal().into_inner() - Vector3::y()).norm() < 1e-12);
}

#[test]
fn test_epicondyles_on_axis_plane_project_unchanged() {
    let snapshot = planner().snapshot();
    let projected = snapshot.projected_epicondyles.unwrap();
    assert!((projected.start - Point3::new(-1.0, 0.0, 1.0)).norm() < 1e-12);
    assert!((projected.end - Point3::new(1.0, 0.0, 1.0)).norm() < 1e-12);
}

#[test]
fn test_doubling_anterior_length_doubles_offset() {
    let mut planner = planner();
    let short = planner.snapshot().anterior.unwrap();
    let d = short.direction().unwrap().into_inner();

    planner.adjust(Adjustment::AnteriorLength(20.0));
    let long = planner.snapshot().anterior.unwrap();

    assert!((short.end - (short.start + d * 0.10)).norm() < 1e-12);
    assert!((long.end - (short.start + d * 0.20)).norm() < 1e-12);
}

#[test]
fn test_half_turn_varus_valgus_negates_lateral_line() {
    let mut planner = planner();
    let straight = planner.snapshot().varus_valgus.unwrap();

    let mut params = *planner.parameters();
    params.varus_valgus_angle = PI;
    planner.set_parameters(params);
    let turned = planner.snapshot().varus_valgus.unwrap();

    let a = straight.lateral.direction().unwrap().into_inner();
    let b = turned.lateral.direction().unwrap().into_inner();
    assert!((a + b).norm() < 1e-9);
}

#[test]
fn test_zero_varus_valgus_reproduces_axis_orientation() {
    let snapshot = planner().snapshot();
    let axis = snapshot.mechanical_axis.unwrap();
    let vv = snapshot.varus_valgus.unwrap();
    assert_eq!(vv.frame.orientation(), axis.orientation());
}

#[test]
fn test_resection_offset_matches_depth() {
    let mut planner = planner();
    for steps in [0.0, 3.0, -20.0] {
        planner.adjust(Adjustment::ResectionDepth(steps));
        let snapshot = planner.snapshot();
        let depth = planner.parameters().resection_depth;
        let medial = snapshot.distal_medial.unwrap();
        let resection = snapshot.resection.unwrap();
        let normal = snapshot.flexion_extension.unwrap().normal().into_inner();

        let delta = resection.frame.anchor() - medial.anchor();
        assert!((delta.norm() - depth * 0.01).abs() < 1e-12);
        assert!(delta.cross(&normal).norm() < 1e-12);
    }
    assert_eq!(planner.parameters().resection_depth, 0.0);
}

#[test]
fn test_missing_hip_center_empties_the_chain() {
    let mut planner = planner();
    planner.clear_landmark(Landmark::HipCenter);
    let snapshot = planner.snapshot();

    assert!(snapshot.mechanical_axis.is_none());
    assert!(snapshot.anterior.is_none());
    assert!(snapshot.varus_valgus.is_none());
    assert!(snapshot.flexion_extension.is_none());
    assert!(snapshot.distal_medial.is_none());
    assert!(snapshot.resection.is_none());
    assert!(snapshot.cutting_solid.is_none());

    let display = DisplayOptions {
        planes: PlaneVisibility::all(),
        resection: true,
    };
    let scene = SceneOutput::build(&snapshot, &display, 5.0);
    assert!(scene.planes.is_empty());
    assert!(scene.cutting_solid.is_none());
    // Only the raw landmark lines not involving the hip remain.
    let kinds: Vec<ReferenceLine> = scene.lines.iter().map(|(kind, _)| *kind).collect();
    assert_eq!(
        kinds,
        vec![
            ReferenceLine::CanalAxis,
            ReferenceLine::Epicondylar,
            ReferenceLine::PosteriorCondylar,
        ]
    );
}

#[test]
fn test_coincident_axis_landmarks_are_absent_not_fatal() {
    let mut planner = planner();
    planner
        .place_landmark(Landmark::HipCenter, Point3::origin())
        .unwrap();
    let snapshot = planner.snapshot();
    assert!(snapshot.mechanical_axis.is_none());
    assert!(snapshot.cutting_solid.is_none());
    assert!(!snapshot.landmark_lines.is_empty());
}

#[test]
fn test_cutting_solid_sits_flush_on_resection_plane() {
    let snapshot = planner().snapshot();
    let resection = snapshot.resection.unwrap();
    let solid = snapshot.cutting_solid.as_ref().unwrap();
    let plane = resection.frame.plane();

    let distances: Vec<f64> = solid
        .world_mesh()
        .vertices()
        .map(|v| plane.signed_distance(&v.position))
        .collect();
    let on_plane = distances.iter().filter(|d| d.abs() < 1e-9).count();
    let off_plane = distances
        .iter()
        .filter(|d| (d.abs() - solid.depth()).abs() < 1e-9)
        .count();
    assert_eq!(on_plane + off_plane, distances.len());
    assert!(on_plane > 0 && off_plane > 0);

    // The solid lies on the far side of the plane from the femur center.
    let toward_reference = plane.signed_distance(&Point3::origin()).signum();
    assert!(distances
        .iter()
        .filter(|d| d.abs() > 1e-9)
        .all(|d| d.signum() == -toward_reference));
}

#[test]
fn test_flexion_extension_rotates_about_lateral_axis() {
    let mut planner = planner();
    let before = planner.snapshot();
    planner.adjust(Adjustment::Extension(5.0));
    let after = planner.snapshot();

    let lateral = after.varus_valgus.unwrap().lateral.direction().unwrap().into_inner();
    let n0 = before.flexion_extension.unwrap().normal().into_inner();
    let n1 = after.flexion_extension.unwrap().normal().into_inner();

    assert!((n0.angle(&n1) - 5f64.to_radians()).abs() < 1e-9);
    assert!((n0.dot(&lateral) - n1.dot(&lateral)).abs() < 1e-12);
    // Distal medial plane follows the new normal.
    let dm = after.distal_medial.unwrap().normal().into_inner();
    assert!((dm - n1).norm() < 1e-12);
}

const TILTED_RIGHT: &str = r#"{
    "Femur Center": [0.1, 0.0, 0.05],
    "Hip Center": [0.9, 9.6, -0.4],
    "Medial Epicondyle": [-0.8, -0.1, 0.9],
    "Lateral Epicondyle": [1.1, 0.2, 1.2],
    "Distal Medial Pt": [-0.3, -0.6, 0.5]
}"#;

fn mirror(p: Point3<f64>) -> Point3<f64> {
    Point3::new(-p.x, p.y, p.z)
}

fn mirror_vector(v: Vector3<f64>) -> Vector3<f64> {
    Vector3::new(-v.x, v.y, v.z)
}

#[test]
fn test_left_limb_mirrors_right_limb() {
    let right_landmarks = LandmarkStore::from_json_str(TILTED_RIGHT).unwrap();
    let mut left_landmarks = LandmarkStore::new();
    for (landmark, p) in right_landmarks.iter() {
        left_landmarks.place(landmark, mirror(p)).unwrap();
    }
    let parameters = PlanParameters {
        varus_valgus_angle: 0.2,
        extension_angle: 0.2,
        ..PlanParameters::default()
    };

    let right = derive_plan(
        &PlannerConfig::default(),
        &PlanInputs {
            landmarks: right_landmarks,
            parameters,
        },
    );
    let left_config = PlannerConfig {
        limb_side: LimbSide::Left,
        ..PlannerConfig::default()
    };
    let left = derive_plan(
        &left_config,
        &PlanInputs {
            landmarks: left_landmarks,
            parameters,
        },
    );

    for kind in PlaneKind::ALL {
        let r = right.frame(kind).unwrap();
        let l = left.frame(kind).unwrap();
        let normal_error = (l.normal().into_inner() - mirror_vector(r.normal().into_inner())).norm();
        assert!(normal_error < 1e-9, "{} normal off by {normal_error}", kind.name());
        assert!((l.anchor() - mirror(r.anchor())).norm() < 1e-9, "{}", kind.name());
    }

    // The lateral line still points to the mirrored lateral side.
    let r_lateral = right.varus_valgus.unwrap().lateral;
    let l_lateral = left.varus_valgus.unwrap().lateral;
    assert!((l_lateral.end - mirror(r_lateral.end)).norm() < 1e-9);

    let r_cut = right.cutting_solid.as_ref().unwrap().extrusion_direction();
    let l_cut = left.cutting_solid.as_ref().unwrap().extrusion_direction();
    assert!((l_cut.into_inner() - mirror_vector(r_cut.into_inner())).norm() < 1e-9);
}
