use std::time::Duration;

use serde::Serialize;

/// Cosmetic progress of a tracked operation.
///
/// The backend reports no real progress. Stages advance purely on elapsed
/// wall-clock time so the user sees something move while waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "stage", rename_all = "snake_case")]
pub enum ProgressStage {
    Idle,
    /// Zero-based stage index, never above the plan's `max_stage`.
    Stage(u8),
    Complete,
    Failed,
}

impl ProgressStage {
    pub fn is_running(&self) -> bool {
        matches!(self, ProgressStage::Stage(_))
    }
}

/// How a slot's cosmetic stages advance: one step per `cadence`, capped at
/// `max_stage` until the action settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressPlan {
    pub cadence: Duration,
    pub max_stage: u8,
}

impl ProgressPlan {
    /// Five visible steps (0..=4), one every 1.5 s.
    pub const fn analysis() -> Self {
        Self {
            cadence: Duration::from_millis(1500),
            max_stage: 4,
        }
    }

    /// A busy indicator only; the stage never moves past 0.
    pub const fn busy_only() -> Self {
        Self {
            cadence: Duration::from_millis(1500),
            max_stage: 0,
        }
    }

    pub fn ticks(&self) -> bool {
        self.max_stage > 0 && !self.cadence.is_zero()
    }

    /// Stage reached after `elapsed` time in flight.
    pub fn stage_at(&self, elapsed: Duration) -> ProgressStage {
        if !self.ticks() {
            return ProgressStage::Stage(0);
        }
        let steps = elapsed.as_millis() / self.cadence.as_millis();
        let stage = steps.min(u128::from(self.max_stage)) as u8;
        ProgressStage::Stage(stage)
    }

    /// Percentage for a progress bar. `Stage(n)` maps to `n / (max + 1)`,
    /// so 100 is reserved for `Complete`.
    pub fn percent(&self, stage: ProgressStage) -> u8 {
        match stage {
            ProgressStage::Idle | ProgressStage::Failed => 0,
            ProgressStage::Complete => 100,
            ProgressStage::Stage(n) => {
                let n = u32::from(n.min(self.max_stage));
                (n * 100 / (u32::from(self.max_stage) + 1)) as u8
            }
        }
    }
}
