//! Async Operation Tracker: wraps one long-running backend call with a
//! cosmetic progress indicator and exactly one terminal notification.

pub mod progress;

pub use progress::{ProgressPlan, ProgressStage};

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info, warn};

use crate::errors::ClientError;
use crate::notifications::NotificationCenter;

/// Busy flag and progress for one logical operation (upload, analysis).
///
/// `Tracker::run` takes the slot by `&mut`, so two runs on the same slot
/// cannot overlap.
#[derive(Debug)]
pub struct OperationSlot {
    plan: ProgressPlan,
    busy: bool,
    progress: watch::Sender<ProgressStage>,
    last_outcome: Option<ProgressStage>,
}

impl OperationSlot {
    pub fn new(plan: ProgressPlan) -> Self {
        let (progress, _) = watch::channel(ProgressStage::Idle);
        Self {
            plan,
            busy: false,
            progress,
            last_outcome: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn progress(&self) -> ProgressStage {
        *self.progress.borrow()
    }

    pub fn percent(&self) -> u8 {
        self.plan.percent(self.progress())
    }

    /// `Complete` or `Failed` for the last finished run.
    pub fn last_outcome(&self) -> Option<ProgressStage> {
        self.last_outcome
    }

    pub fn plan(&self) -> ProgressPlan {
        self.plan
    }

    /// Live progress feed for renderers.
    pub fn watch(&self) -> watch::Receiver<ProgressStage> {
        self.progress.subscribe()
    }

    fn set_progress(&self, stage: ProgressStage) {
        self.progress.send_replace(stage);
    }

    fn begin(&mut self) {
        self.busy = true;
        self.set_progress(ProgressStage::Stage(0));
    }
}

/// Runs on every exit from `Tracker::run`, including a dropped future.
struct SlotGuard<'a> {
    slot: &'a mut OperationSlot,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.slot.busy = false;
        if self.slot.progress() != ProgressStage::Complete {
            self.slot.set_progress(ProgressStage::Idle);
        }
    }
}

/// User-facing text for one kind of tracked operation.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedOp {
    pub title: &'static str,
    pub in_progress: &'static str,
    pub success: &'static str,
    /// Shown when the error carries no message of its own.
    pub failure_fallback: &'static str,
}

impl TrackedOp {
    pub const UPLOAD: TrackedOp = TrackedOp {
        title: "Upload",
        in_progress: "Uploading and parsing CV...",
        success: "CV uploaded and parsed successfully!",
        failure_fallback: "Upload failed",
    };

    pub const ANALYSIS: TrackedOp = TrackedOp {
        title: "Analysis",
        in_progress: "Analyzing CV against job description...",
        success: "Analysis completed successfully!",
        failure_fallback: "Analysis failed",
    };
}

#[derive(Clone)]
pub struct Tracker {
    center: NotificationCenter,
}

impl Tracker {
    pub fn new(center: NotificationCenter) -> Self {
        Self { center }
    }

    /// Runs `action` against `slot`.
    ///
    /// Emits an in-progress notification first, advances the slot's stage
    /// on the plan's cadence while the action is outstanding, then emits
    /// exactly one success or error notification. The busy flag is cleared
    /// on every path; on failure the progress returns to `Idle`.
    pub async fn run<T, F, Fut>(
        &self,
        slot: &mut OperationSlot,
        op: &TrackedOp,
        action: F,
    ) -> Result<T, ClientError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let plan = slot.plan;
        slot.begin();
        self.center.info(op.title, op.in_progress);
        info!("{} started", op.title);

        let mut guard = SlotGuard { slot };
        let started = Instant::now();
        // interval_at rejects a zero period.
        let period = plan.cadence.max(Duration::from_millis(1));
        let mut ticker = interval_at(started + period, period);

        let action = action();
        tokio::pin!(action);

        let result = loop {
            let advancing = plan.ticks() && guard.slot.progress() != ProgressStage::Stage(plan.max_stage);
            tokio::select! {
                result = &mut action => break result,
                _ = ticker.tick(), if advancing => {
                    let stage = plan.stage_at(started.elapsed());
                    debug!("{} progress: {:?}", op.title, stage);
                    guard.slot.set_progress(stage);
                }
            }
        };

        match &result {
            Ok(_) => {
                guard.slot.set_progress(ProgressStage::Complete);
                guard.slot.last_outcome = Some(ProgressStage::Complete);
                info!("{} finished in {:?}", op.title, started.elapsed());
                self.center.success(op.title, op.success);
            }
            Err(e) => {
                guard.slot.last_outcome = Some(ProgressStage::Failed);
                warn!("{} failed: {e}", op.title);
                self.center.error(op.title, e.message_or(op.failure_fallback));
            }
        }
        drop(guard);
        result
    }
}
