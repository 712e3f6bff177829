/// Kneeplan Web - WASM bindings for the resection planner
///
/// Planes are returned as `[anchor x, y, z, quaternion x, y, z, w, normal x, y, z]`,
/// lines as `[start x, y, z, end x, y, z]`.

use kneeplan_core::{
    Adjustment, DisplayOptions, Frame, Landmark, PlaneKind, Planner, PlannerConfig,
    ReferenceLine, ResectionScheduler,
};
use nalgebra::Point3;
use std::time::Duration;
use wasm_bindgen::prelude::*;

fn plane_kind(name: &str) -> Result<PlaneKind, JsValue> {
    PlaneKind::ALL
        .into_iter()
        .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| JsValue::from_str(&format!("unknown plane: {name}")))
}

fn line_kind(name: &str) -> Result<ReferenceLine, JsValue> {
    ReferenceLine::ALL
        .into_iter()
        .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| JsValue::from_str(&format!("unknown line: {name}")))
}

fn landmark(name: &str) -> Result<Landmark, JsValue> {
    name.parse()
        .map_err(|err: kneeplan_core::LandmarkError| JsValue::from_str(&err.to_string()))
}

fn frame_values(frame: &Frame) -> Vec<f64> {
    let a = frame.anchor();
    let q = frame.orientation();
    let n = frame.normal();
    vec![a.x, a.y, a.z, q.i, q.j, q.k, q.w, n.x, n.y, n.z]
}

/// Negative and NaN clamp to zero, values too large for a `Duration` saturate.
fn millis(now_ms: f64) -> Duration {
    Duration::try_from_secs_f64(now_ms.max(0.0) / 1000.0).unwrap_or(Duration::MAX)
}

#[wasm_bindgen]
pub struct WebPlanner {
    planner: Planner,
    display: DisplayOptions,
    scheduler: ResectionScheduler,
    submitted_revision: u64,
}

impl WebPlanner {
    fn with_planner(planner: Planner) -> Self {
        let scheduler = ResectionScheduler::new(planner.config().settle_delay());
        Self {
            planner,
            display: DisplayOptions::default(),
            scheduler,
            submitted_revision: 0,
        }
    }

    fn edit(&mut self, now_ms: f64, edit: impl FnOnce(&mut Planner)) {
        edit(&mut self.planner);
        self.sync_scheduler(millis(now_ms));
    }

    fn sync_scheduler(&mut self, now: Duration) {
        let snapshot = self.planner.snapshot();
        if snapshot.revision == self.submitted_revision {
            return;
        }
        self.submitted_revision = snapshot.revision;
        match &snapshot.cutting_solid {
            Some(solid) => {
                self.scheduler.submit(snapshot.revision, solid.clone(), now);
            }
            None => self.scheduler.withdraw(snapshot.revision),
        }
    }
}

#[wasm_bindgen]
impl WebPlanner {
    /// Create a planner, optionally from a JSON config.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WebPlanner, JsValue> {
        let config = match config_json {
            Some(json) => PlannerConfig::from_json_str(&json)
                .map_err(|err| JsValue::from_str(&err.to_string()))?,
            None => PlannerConfig::default(),
        };
        Ok(Self::with_planner(Planner::new(config)))
    }

    /// Same representation as the revisions from `pollResection`.
    pub fn revision(&self) -> f64 {
        self.planner.revision() as f64
    }

    #[wasm_bindgen(js_name = setLandmark)]
    pub fn set_landmark(
        &mut self,
        name: &str,
        x: f64,
        y: f64,
        z: f64,
        now_ms: f64,
    ) -> Result<(), JsValue> {
        let landmark = landmark(name)?;
        self.planner
            .place_landmark(landmark, Point3::new(x, y, z))
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        self.sync_scheduler(millis(now_ms));
        Ok(())
    }

    #[wasm_bindgen(js_name = clearLandmark)]
    pub fn clear_landmark(&mut self, name: &str, now_ms: f64) -> Result<(), JsValue> {
        let landmark = landmark(name)?;
        self.edit(now_ms, |planner| planner.clear_landmark(landmark));
        Ok(())
    }

    /// Angles in degrees.
    #[wasm_bindgen(js_name = setAngles)]
    pub fn set_angles(&mut self, varus_valgus_deg: f64, extension_deg: f64, now_ms: f64) {
        self.edit(now_ms, |planner| {
            planner.update(|inputs| {
                inputs.parameters.varus_valgus_angle = varus_valgus_deg.to_radians();
                inputs.parameters.extension_angle = extension_deg.to_radians();
            })
        });
    }

    #[wasm_bindgen(js_name = setResectionDepth)]
    pub fn set_resection_depth(&mut self, depth: f64, now_ms: f64) {
        self.edit(now_ms, |planner| {
            planner.update(|inputs| inputs.parameters.resection_depth = depth)
        });
    }

    #[wasm_bindgen(js_name = setLineLengths)]
    pub fn set_line_lengths(&mut self, anterior: f64, lateral: f64, now_ms: f64) {
        self.edit(now_ms, |planner| {
            planner.update(|inputs| {
                inputs.parameters.anterior_line_length = anterior;
                inputs.parameters.lateral_line_length = lateral;
            })
        });
    }

    /// Step a parameter by `steps` increments. `parameter` is one of
    /// `varus_valgus`, `extension`, `depth`, `anterior` or `lateral`.
    pub fn adjust(&mut self, parameter: &str, steps: f64, now_ms: f64) -> Result<(), JsValue> {
        let adjustment = match parameter {
            "varus_valgus" => Adjustment::VarusValgus(steps),
            "extension" => Adjustment::Extension(steps),
            "depth" => Adjustment::ResectionDepth(steps),
            "anterior" => Adjustment::AnteriorLength(steps),
            "lateral" => Adjustment::LateralLength(steps),
            other => return Err(JsValue::from_str(&format!("unknown parameter: {other}"))),
        };
        self.edit(now_ms, |planner| planner.adjust(adjustment));
        Ok(())
    }

    /// `[varus/valgus deg, extension deg, depth, anterior length, lateral length]`
    pub fn parameters(&self) -> Vec<f64> {
        let p = self.planner.parameters();
        vec![
            p.varus_valgus_angle.to_degrees(),
            p.extension_angle.to_degrees(),
            p.resection_depth,
            p.anterior_line_length,
            p.lateral_line_length,
        ]
    }

    pub fn line(&self, kind: &str) -> Result<Option<Vec<f64>>, JsValue> {
        let kind = line_kind(kind)?;
        Ok(self.planner.snapshot().line(kind).map(|line| {
            vec![
                line.start.x,
                line.start.y,
                line.start.z,
                line.end.x,
                line.end.y,
                line.end.z,
            ]
        }))
    }

    /// The plane frame, or `None` when it is absent or hidden.
    pub fn plane(&self, kind: &str) -> Result<Option<Vec<f64>>, JsValue> {
        let kind = plane_kind(kind)?;
        if !self.display.planes.is_visible(kind) {
            return Ok(None);
        }
        Ok(self.planner.snapshot().frame(kind).map(|frame| frame_values(&frame)))
    }

    /// Corners of the display quad, or `None` when the plane is absent or hidden.
    #[wasm_bindgen(js_name = planeCorners)]
    pub fn plane_corners(&self, kind: &str) -> Result<Option<Vec<f64>>, JsValue> {
        let kind = plane_kind(kind)?;
        if !self.display.planes.is_visible(kind) {
            return Ok(None);
        }
        let size = self.planner.config().plane_display_size;
        Ok(self.planner.snapshot().frame(kind).map(|frame| {
            frame
                .corners(size)
                .iter()
                .flat_map(|p| [p.x, p.y, p.z])
                .collect()
        }))
    }

    #[wasm_bindgen(js_name = setPlaneVisible)]
    pub fn set_plane_visible(&mut self, kind: &str, visible: bool) -> Result<(), JsValue> {
        let kind = plane_kind(kind)?;
        self.display.planes.set(kind, visible);
        Ok(())
    }

    #[wasm_bindgen(js_name = setResectionVisible)]
    pub fn set_resection_visible(&mut self, visible: bool) {
        self.display.resection = visible;
    }

    #[wasm_bindgen(js_name = isReady)]
    pub fn is_ready(&self, kind: &str) -> Result<bool, JsValue> {
        let kind = plane_kind(kind)?;
        Ok(self.planner.snapshot().readiness().plane(kind))
    }

    #[wasm_bindgen(js_name = isComplete)]
    pub fn is_complete(&self) -> bool {
        self.planner.snapshot().readiness().is_complete()
    }

    /// World-space cutter triangle positions, flattened.
    #[wasm_bindgen(js_name = cuttingSolidPositions)]
    pub fn cutting_solid_positions(&self) -> Option<Vec<f32>> {
        self.planner
            .snapshot()
            .cutting_solid
            .as_ref()
            .map(|solid| solid.world_mesh().positions_f32())
    }

    /// Revision of the cutter to subtract once inputs have settled.
    ///
    /// Only reported while resection display is on.
    #[wasm_bindgen(js_name = pollResection)]
    pub fn poll_resection(&mut self, now_ms: f64) -> Option<f64> {
        if !self.display.resection {
            return None;
        }
        let request = self.scheduler.poll(millis(now_ms))?;
        log::info!("cutting solid settled at revision {}", request.revision);
        Some(request.revision as f64)
    }

    /// Whether a subtraction result computed for `revision` is still current.
    #[wasm_bindgen(js_name = acceptResection)]
    pub fn accept_resection(&self, revision: f64) -> bool {
        self.scheduler.is_current(revision as u64)
    }
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(target_family = "wasm")]
    console_log::init_with_level(log::Level::Info)
        .map_err(|err| JsValue::from_str(&err.to_string()))?;

    Ok(())
}
