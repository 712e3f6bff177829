/// Debounced hand-off of cutting solids to an external boolean kernel
use std::time::Duration;

use crate::cutting::CuttingSolid;
use crate::geometry::Mesh;

/// Boolean subtraction provided by an external geometry kernel.
pub trait BooleanKernel {
    type Error: std::error::Error;

    /// Remove `cutter` from `bone`. Both meshes are in world space.
    fn subtract(&self, bone: &Mesh, cutter: &Mesh) -> Result<Mesh, Self::Error>;
}

/// A settled cutting solid ready for subtraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ResectionRequest {
    pub revision: u64,
    pub cutter: CuttingSolid,
}

/// Result of a subtraction, tagged with the plan revision it was made for.
#[derive(Debug, Clone, PartialEq)]
pub struct ResectedSurface {
    pub revision: u64,
    pub mesh: Mesh,
}

#[derive(Debug)]
struct Pending {
    request: ResectionRequest,
    submitted_at: Duration,
}

/// Runs the expensive subtraction only once inputs have settled.
///
/// Timestamps are caller-supplied offsets from any fixed epoch.
#[derive(Debug)]
pub struct ResectionScheduler {
    settle_delay: Duration,
    pending: Option<Pending>,
    latest_revision: u64,
}

impl ResectionScheduler {
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            settle_delay,
            pending: None,
            latest_revision: 0,
        }
    }

    /// Queue `cutter` for `revision`, replacing any pending request and
    /// restarting the settle timer. Revisions older than one already seen
    /// are ignored.
    pub fn submit(&mut self, revision: u64, cutter: CuttingSolid, now: Duration) -> bool {
        if revision < self.latest_revision {
            log::debug!(
                "ignoring resection request for revision {revision}, already at {}",
                self.latest_revision
            );
            return false;
        }
        self.latest_revision = revision;
        self.pending = Some(Pending {
            request: ResectionRequest { revision, cutter },
            submitted_at: now,
        });
        true
    }

    /// Drop the pending request, e.g. when the cutting solid disappeared.
    ///
    /// Results for `revision` or earlier are discarded from now on.
    pub fn withdraw(&mut self, revision: u64) {
        self.pending = None;
        self.latest_revision = self.latest_revision.max(revision);
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn latest_revision(&self) -> u64 {
        self.latest_revision
    }

    /// Take the pending request once it has been quiet for the settle delay.
    pub fn poll(&mut self, now: Duration) -> Option<ResectionRequest> {
        let settled = self
            .pending
            .as_ref()
            .is_some_and(|p| now.saturating_sub(p.submitted_at) >= self.settle_delay);
        if !settled {
            return None;
        }
        self.pending.take().map(|p| p.request)
    }

    /// Whether a result for `revision` may still be applied.
    pub fn is_current(&self, revision: u64) -> bool {
        revision == self.latest_revision && self.pending.is_none()
    }

    /// Keep `surface` only if nothing newer was submitted after its request.
    pub fn accept(&self, surface: ResectedSurface) -> Option<ResectedSurface> {
        if self.is_current(surface.revision) {
            Some(surface)
        } else {
            log::debug!(
                "discarding stale resection for revision {} (latest {})",
                surface.revision,
                self.latest_revision
            );
            None
        }
    }

    /// Poll and, if a request has settled, subtract it from `bone`.
    pub fn run<K: BooleanKernel>(
        &mut self,
        kernel: &K,
        bone: &Mesh,
        now: Duration,
    ) -> Option<Result<ResectedSurface, K::Error>> {
        let request = self.poll(now)?;
        log::info!("running resection for plan revision {}", request.revision);
        let result = kernel
            .subtract(bone, &request.cutter.world_mesh())
            .map(|mesh| ResectedSurface {
                revision: request.revision,
                mesh,
            });
        match result {
            Ok(surface) => self.accept(surface).map(Ok),
            Err(err) => {
                log::warn!("resection for revision {} failed: {err}", request.revision);
                Some(Err(err))
            }
        }
    }
}
