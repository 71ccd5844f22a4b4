//! Achievement Tracker.
//!
//! Each achievement moves through `Locked → Unlocked → Claimed` and never
//! goes back. Points are credited to the user's total only when a reward is
//! claimed, never at unlock time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    EngineError, ResultEngine,
    achievements::{AchievementCategory, AchievementDefinition, OnboardingUnlock},
};

/// Per-user state of one achievement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementState {
    #[serde(flatten)]
    pub definition: AchievementDefinition,
    pub progress: u32,
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
    pub claimed: bool,
}

impl AchievementState {
    fn locked(definition: AchievementDefinition) -> Self {
        Self {
            definition,
            progress: 0,
            unlocked: false,
            unlocked_at: None,
            claimed: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn is_claimable(&self) -> bool {
        self.unlocked && !self.claimed
    }

    fn unlock(&mut self, at: DateTime<Utc>) {
        self.progress = self.definition.target;
        self.unlocked = true;
        self.unlocked_at = Some(at);
    }
}

/// Result of a progress update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub progress: u32,
    pub target: u32,
    /// `true` only on the call that reached the target.
    pub newly_unlocked: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClaimOutcome {
    Claimed { points: u32, title: String },
    NotUnlocked,
    AlreadyClaimed,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AchievementTracker {
    states: Vec<AchievementState>,
    total_points: u32,
}

impl AchievementTracker {
    /// Creates one locked state per definition and applies the onboarding
    /// unlocks.
    ///
    /// Does nothing when achievement state already exists. Returns whether
    /// the tracker was initialized by this call.
    pub fn initialize(
        &mut self,
        catalog: &[AchievementDefinition],
        onboarding: &[OnboardingUnlock],
    ) -> bool {
        if !self.states.is_empty() {
            return false;
        }
        self.states = catalog.iter().cloned().map(AchievementState::locked).collect();
        for unlock in onboarding {
            if let Some(state) = self.states.iter_mut().find(|s| s.id() == unlock.id) {
                state.unlock(unlock.unlocked_at);
            }
        }
        tracing::debug!(
            achievements = self.states.len(),
            onboarding = onboarding.len(),
            "achievement state initialized"
        );
        true
    }

    fn state_mut(&mut self, id: &str) -> ResultEngine<&mut AchievementState> {
        self.states
            .iter_mut()
            .find(|s| s.id() == id)
            .ok_or_else(|| EngineError::NotFound(format!("achievement {id}")))
    }

    pub fn get(&self, id: &str) -> Option<&AchievementState> {
        self.states.iter().find(|s| s.id() == id)
    }

    /// Adds `delta` to the progress counter, saturating at the target.
    ///
    /// Reaching the target unlocks the achievement and stamps `now`. Calls
    /// after the unlock leave the state (and the unlock time) untouched.
    pub fn record_progress(
        &mut self,
        id: &str,
        delta: u32,
        now: DateTime<Utc>,
    ) -> ResultEngine<ProgressUpdate> {
        let state = self.state_mut(id)?;
        let target = state.definition.target;
        if state.unlocked {
            return Ok(ProgressUpdate {
                progress: state.progress,
                target,
                newly_unlocked: false,
            });
        }

        state.progress = state.progress.saturating_add(delta).min(target);
        let newly_unlocked = state.progress == target;
        if newly_unlocked {
            state.unlock(now);
        }
        Ok(ProgressUpdate {
            progress: state.progress,
            target,
            newly_unlocked,
        })
    }

    /// Claims the reward of an unlocked achievement.
    ///
    /// The point value is added to the total exactly once; claiming a locked
    /// or already claimed achievement changes nothing.
    pub fn claim(&mut self, id: &str) -> ResultEngine<ClaimOutcome> {
        let state = self.state_mut(id)?;
        if !state.unlocked {
            return Ok(ClaimOutcome::NotUnlocked);
        }
        if state.claimed {
            return Ok(ClaimOutcome::AlreadyClaimed);
        }
        state.claimed = true;
        let points = state.definition.points;
        let title = state.definition.title.clone();
        self.total_points = self.total_points.saturating_add(points);
        Ok(ClaimOutcome::Claimed { points, title })
    }

    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    pub fn all(&self) -> &[AchievementState] {
        &self.states
    }

    /// Achievements of one category, or all of them for `None`.
    pub fn by_category(&self, category: Option<AchievementCategory>) -> Vec<&AchievementState> {
        self.states
            .iter()
            .filter(|s| category.is_none_or(|c| s.definition.category == c))
            .collect()
    }

    pub fn unlocked_count(&self) -> usize {
        self.states.iter().filter(|s| s.unlocked).count()
    }

    /// Share of unlocked achievements in `0.0..=1.0`.
    pub fn progress_ratio(&self) -> f64 {
        if self.states.is_empty() {
            return 0.0;
        }
        self.unlocked_count() as f64 / self.states.len() as f64
    }
}
