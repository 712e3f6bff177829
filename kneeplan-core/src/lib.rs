/// Kneeplan Core Library - Landmark-driven resection planning geometry
///
/// This library derives the chain of reference planes used to plan a distal
/// femoral cut: the mechanical-axis plane, the varus/valgus and
/// flexion/extension corrections, the distal medial and resection planes, and
/// the cutting solid handed to an external boolean kernel.

pub mod anterior;
pub mod axis;
pub mod config;
pub mod controls;
pub mod cutting;
pub mod distal;
pub mod error;
pub mod flexion;
pub mod frame;
pub mod geometry;
pub mod landmark;
pub mod planner;
pub mod projection;
pub mod resection;
pub mod scene;
pub mod transform;
pub mod varus_valgus;

// Re-export commonly used types
pub use config::{LimbSide, PlanParameters, PlannerConfig};
pub use controls::Adjustment;
pub use cutting::CuttingSolid;
pub use error::{ConfigError, GeometryError, LandmarkError};
pub use frame::{Frame, Line};
pub use geometry::{Mesh, Triangle, Vertex};
pub use landmark::{Landmark, LandmarkStore};
pub use planner::{derive_plan, PlanInputs, PlanSnapshot, PlaneKind, Planner, Readiness, ReferenceLine};
pub use projection::Plane;
pub use resection::{BooleanKernel, ResectedSurface, ResectionRequest, ResectionScheduler};
pub use scene::{DisplayOptions, PlaneVisibility, SceneOutput};
