use chrono::Utc;

use crate::{
    achievements::AchievementCategory,
    notify::Severity,
    tracker::{AchievementState, ClaimOutcome},
};

use super::{Engine, Outcome};

impl Engine {
    /// Adds progress towards an achievement, unlocking it at the target.
    pub async fn record_progress(&mut self, achievement_id: &str, delta: u32) -> Outcome {
        self.simulate_latency().await;
        let update = match self
            .state
            .achievements
            .record_progress(achievement_id, delta, Utc::now())
        {
            Ok(update) => update,
            Err(err) => return self.reject("record_progress", err),
        };
        self.persist().await;

        if update.newly_unlocked {
            let title = self
                .state
                .achievements
                .get(achievement_id)
                .map(|s| s.definition.title.clone())
                .unwrap_or_else(|| achievement_id.to_string());
            let message = format!("Achievement unlocked: {title}!");
            self.notifier.notify(&message, Severity::Success);
            return Outcome {
                success: true,
                message,
                transactions: Vec::new(),
                error: None,
            };
        }
        Outcome {
            success: true,
            message: format!("Progress {}/{}", update.progress, update.target),
            transactions: Vec::new(),
            error: None,
        }
    }

    /// Claims the reward of an unlocked achievement.
    ///
    /// Locked or already claimed achievements are left alone and reported as
    /// unsuccessful without a notification.
    pub async fn claim(&mut self, achievement_id: &str) -> Outcome {
        self.simulate_latency().await;
        match self.state.achievements.claim(achievement_id) {
            Ok(ClaimOutcome::Claimed { points, title }) => {
                self.persist().await;
                let message = format!("Claimed {points} points for \"{title}\"!");
                self.notifier.notify(&message, Severity::Success);
                Outcome {
                    success: true,
                    message,
                    transactions: Vec::new(),
                    error: None,
                }
            }
            Ok(ClaimOutcome::NotUnlocked) => {
                Outcome::rejected("Achievement is still locked".to_string(), None)
            }
            Ok(ClaimOutcome::AlreadyClaimed) => {
                Outcome::rejected("Reward already claimed".to_string(), None)
            }
            Err(err) => self.reject("claim", err),
        }
    }

    pub fn achievements(&self, category: Option<AchievementCategory>) -> Vec<&AchievementState> {
        self.state.achievements.by_category(category)
    }

    pub fn achievement_progress(&self) -> f64 {
        self.state.achievements.progress_ratio()
    }

    pub fn total_points(&self) -> u32 {
        self.state.achievements.total_points()
    }
}
